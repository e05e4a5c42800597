// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Image descriptors.
//!
//! Dimensions always come from the source file itself; nothing about an
//! image is stored apart from it.

use super::annotation::BoxAnnotation;
use serde::{Deserialize, Serialize};

/// A source image as reported to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDescriptor {
    pub filename: String,
    pub width: u32,
    pub height: u32,
}

impl ImageDescriptor {
    /// Create a descriptor with the given filename and dimensions.
    pub fn new(filename: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            filename: filename.into(),
            width,
            height,
        }
    }
}

/// All annotations of one image, as pushed to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationSet {
    pub filename: String,
    pub annotations: Vec<BoxAnnotation>,
}

/// Body of `POST /api/annotations/:filename`.
///
/// Both fields are optional on the wire so a missing one can be reported
/// as a client error instead of a decode failure.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SaveRequest {
    #[serde(default)]
    pub annotations: Option<Vec<BoxAnnotation>>,
    #[serde(default, rename = "imageData")]
    pub image_data: Option<ImageDescriptor>,
}
