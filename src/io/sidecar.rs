// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation sidecar persistence.
//!
//! Every annotated image gets `<output>/<filename>.json` holding a COCO
//! record (see [`crate::io::coco`]). Saves replace the whole file.

use crate::io::coco::CocoDataset;
use crate::models::annotation::BoxAnnotation;
use crate::models::image::ImageDescriptor;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Reads and writes sidecar files in the output directory.
#[derive(Debug, Clone)]
pub struct SidecarStore {
    dir: PathBuf,
}

impl SidecarStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Sidecar path for a source image.
    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.dir.join(format!("{}.json", filename))
    }

    /// Load the boxes saved for an image.
    ///
    /// A missing sidecar means no annotations. An unreadable or malformed
    /// one is logged and treated the same way.
    pub fn read(&self, filename: &str) -> Vec<BoxAnnotation> {
        let path = self.path_of(filename);
        if !path.exists() {
            return Vec::new();
        }
        match import_json(&path) {
            Ok(dataset) => dataset.to_boxes(),
            Err(e) => {
                log::warn!("Ignoring unreadable sidecar {}: {:#}", path.display(), e);
                Vec::new()
            }
        }
    }

    /// Replace the sidecar of `filename` with the given boxes.
    pub fn write(
        &self,
        filename: &str,
        image: &ImageDescriptor,
        boxes: &[BoxAnnotation],
    ) -> Result<PathBuf> {
        let path = self.path_of(filename);
        let dataset = CocoDataset::from_boxes(image, boxes);
        export_json(&dataset, &path)?;
        log::info!("Saved {} annotations to {}", boxes.len(), path.display());
        Ok(path)
    }
}

/// Write a dataset as pretty-printed JSON.
///
/// The data goes to a sibling temp file first and is renamed over the
/// target, so readers never observe a partial write.
pub fn export_json(data: &CocoDataset, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    let tmp = path.with_extension(format!("json.{}.tmp", uuid::Uuid::new_v4().simple()));
    std::fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("Failed to replace {}", path.display()));
    }
    Ok(())
}

/// Read a dataset from JSON.
pub fn import_json(path: &Path) -> Result<CocoDataset> {
    let json = std::fs::read_to_string(path)?;
    let data = serde_json::from_str(&json)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScratchDir;

    fn photo() -> ImageDescriptor {
        ImageDescriptor::new("photo.jpg", 800, 600)
    }

    fn sample_boxes() -> Vec<BoxAnnotation> {
        vec![
            BoxAnnotation::new(1, 10.0, 20.0, 30.0, 40.0),
            BoxAnnotation::new(1718000000123, 100.5, 50.25, 64.0, 64.0),
        ]
    }

    #[test]
    fn test_missing_sidecar_reads_empty() {
        let scratch = ScratchDir::new();
        let store = SidecarStore::new(scratch.path());
        assert!(store.read("photo.jpg").is_empty());
    }

    #[test]
    fn test_write_then_read_roundtrip() {
        let scratch = ScratchDir::new();
        let store = SidecarStore::new(scratch.path());
        let boxes = sample_boxes();

        let path = store.write("photo.jpg", &photo(), &boxes).unwrap();
        assert_eq!(path, scratch.path().join("photo.jpg.json"));
        assert_eq!(store.read("photo.jpg"), boxes);
    }

    #[test]
    fn test_repeated_save_is_byte_identical() {
        let scratch = ScratchDir::new();
        let store = SidecarStore::new(scratch.path());

        let path = store.write("photo.jpg", &photo(), &sample_boxes()).unwrap();
        let first = std::fs::read(&path).unwrap();
        store.write("photo.jpg", &photo(), &sample_boxes()).unwrap();
        let second = std::fs::read(&path).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_save_replaces_previous_set() {
        let scratch = ScratchDir::new();
        let store = SidecarStore::new(scratch.path());

        store.write("photo.jpg", &photo(), &sample_boxes()).unwrap();
        let replacement = vec![BoxAnnotation::new(5, 1.0, 1.0, 8.0, 8.0)];
        store.write("photo.jpg", &photo(), &replacement).unwrap();
        assert_eq!(store.read("photo.jpg"), replacement);

        let leftovers: Vec<_> = std::fs::read_dir(scratch.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_empty_save_writes_valid_record() {
        let scratch = ScratchDir::new();
        let store = SidecarStore::new(scratch.path());

        let path = store.write("photo.jpg", &photo(), &[]).unwrap();
        let dataset = import_json(&path).unwrap();
        assert!(dataset.annotations.is_empty());
        assert_eq!(dataset.images[0].file_name, "photo.jpg");
        assert_eq!(dataset.categories[0].name, "Marker");
        assert!(store.read("photo.jpg").is_empty());
    }

    #[test]
    fn test_persisted_area() {
        let scratch = ScratchDir::new();
        let store = SidecarStore::new(scratch.path());

        let path = store.write("photo.jpg", &photo(), &sample_boxes()).unwrap();
        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        for ann in raw["annotations"].as_array().unwrap() {
            let bbox = ann["bbox"].as_array().unwrap();
            let (w, h) = (bbox[2].as_f64().unwrap(), bbox[3].as_f64().unwrap());
            assert_eq!(ann["area"].as_f64().unwrap(), w * h);
        }
    }

    #[test]
    fn test_malformed_sidecar_reads_empty() {
        let scratch = ScratchDir::new();
        let store = SidecarStore::new(scratch.path());
        std::fs::write(store.path_of("photo.jpg"), "{ not json").unwrap();
        assert!(store.read("photo.jpg").is_empty());

        std::fs::write(store.path_of("photo.jpg"), r#"{"annotations": 3}"#).unwrap();
        assert!(store.read("photo.jpg").is_empty());
    }
}
