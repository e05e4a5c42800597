// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! COCO-style detection dataset records.
//!
//! Each sidecar holds exactly one image, a single "Marker" category and one
//! annotation per box:
//!
//! ```json
//! {
//!   "images": [{ "id": 1, "file_name": "photo.jpg", "width": 800, "height": 600 }],
//!   "annotations": [
//!     { "id": 1, "image_id": 1, "category_id": 1,
//!       "bbox": [10.0, 20.0, 30.0, 40.0], "area": 1200.0, "iscrowd": 0 }
//!   ],
//!   "categories": [{ "id": 1, "name": "Marker" }]
//! }
//! ```

use crate::models::annotation::{AnnotationId, BoxAnnotation};
use crate::models::image::ImageDescriptor;
use serde::{Deserialize, Serialize};

/// Id of the single image entry in a sidecar.
pub const IMAGE_ID: i64 = 1;
/// Id of the single category entry in a sidecar.
pub const MARKER_CATEGORY_ID: i64 = 1;
pub const MARKER_CATEGORY_NAME: &str = "Marker";

/// Top-level COCO record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CocoDataset {
    pub images: Vec<CocoImage>,
    pub annotations: Vec<CocoAnnotation>,
    pub categories: Vec<CocoCategory>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CocoImage {
    pub id: i64,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CocoAnnotation {
    pub id: AnnotationId,
    #[serde(default = "default_image_id")]
    pub image_id: i64,
    #[serde(default = "default_category_id")]
    pub category_id: i64,
    /// `[left, top, width, height]`
    pub bbox: [f64; 4],
    #[serde(default)]
    pub area: f64,
    #[serde(default)]
    pub iscrowd: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CocoCategory {
    pub id: i64,
    pub name: String,
}

fn default_image_id() -> i64 {
    IMAGE_ID
}

fn default_category_id() -> i64 {
    MARKER_CATEGORY_ID
}

impl CocoDataset {
    /// Build the record for one image and its boxes.
    ///
    /// Boxes without a usable id get `index + 1`.
    pub fn from_boxes(image: &ImageDescriptor, boxes: &[BoxAnnotation]) -> Self {
        let annotations = boxes
            .iter()
            .enumerate()
            .map(|(index, b)| CocoAnnotation {
                id: b
                    .id
                    .clone()
                    .filter(|id| !id.is_blank())
                    .unwrap_or(AnnotationId::Number(index as i64 + 1)),
                image_id: IMAGE_ID,
                category_id: MARKER_CATEGORY_ID,
                bbox: [b.left, b.top, b.width, b.height],
                area: b.area(),
                iscrowd: 0,
            })
            .collect();

        Self {
            images: vec![CocoImage {
                id: IMAGE_ID,
                file_name: image.filename.clone(),
                width: image.width,
                height: image.height,
            }],
            annotations,
            categories: vec![CocoCategory {
                id: MARKER_CATEGORY_ID,
                name: MARKER_CATEGORY_NAME.to_string(),
            }],
        }
    }

    /// Project the annotations back to boxes, in file order.
    pub fn to_boxes(&self) -> Vec<BoxAnnotation> {
        self.annotations
            .iter()
            .map(|ann| {
                let [left, top, width, height] = ann.bbox;
                BoxAnnotation {
                    id: Some(ann.id.clone()),
                    left,
                    top,
                    width,
                    height,
                }
            })
            .collect()
    }
}
