// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Source image directory.
//!
//! The image store only ever reads: it lists the JPEGs in the input
//! directory with their pixel dimensions and hands out their raw bytes.

use crate::models::image::ImageDescriptor;
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Whether a filename has a `.jpg` or `.jpeg` extension, in any case.
pub fn is_jpeg_name(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".jpg") || lower.ends_with(".jpeg")
}

/// Whether a client-supplied filename stays inside its directory.
pub fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// Content type served for an image file.
pub fn content_type(name: &str) -> &'static str {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else if is_jpeg_name(&lower) {
        "image/jpeg"
    } else {
        "application/octet-stream"
    }
}

/// Read-only view of the input directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of a source image, whether or not it exists.
    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// Names of all JPEG files in the directory, sorted.
    pub fn jpeg_names(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.dir)
            .with_context(|| format!("Failed to read image directory {}", self.dir.display()))?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if is_jpeg_name(name) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Describe every JPEG in the directory.
    ///
    /// Images whose header cannot be decoded are reported as 0x0 rather
    /// than failing the whole listing.
    pub fn list(&self) -> Result<Vec<ImageDescriptor>> {
        let descriptors = self
            .jpeg_names()?
            .into_iter()
            .map(|filename| {
                let (width, height) = match image::image_dimensions(self.path_of(&filename)) {
                    Ok(dims) => dims,
                    Err(e) => {
                        log::warn!("Failed to read dimensions of {}: {}", filename, e);
                        (0, 0)
                    }
                };
                ImageDescriptor::new(filename, width, height)
            })
            .collect();
        Ok(descriptors)
    }

    /// Raw bytes of a source image, `None` if it does not exist.
    pub fn read_bytes(&self, filename: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_of(filename);
        if !path.is_file() {
            return Ok(None);
        }
        let bytes =
            std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{write_jpeg, ScratchDir};

    #[test]
    fn test_jpeg_names() {
        assert!(is_jpeg_name("a.jpg"));
        assert!(is_jpeg_name("B.JPEG"));
        assert!(is_jpeg_name("c.JpG"));
        assert!(!is_jpeg_name("d.png"));
        assert!(!is_jpeg_name("jpg"));
    }

    #[test]
    fn test_safe_filenames() {
        assert!(is_safe_filename("photo.jpg"));
        assert!(is_safe_filename("my photo (1).jpeg"));
        assert!(!is_safe_filename(""));
        assert!(!is_safe_filename("../secret.jpg"));
        assert!(!is_safe_filename("a/b.jpg"));
        assert!(!is_safe_filename("a\\b.jpg"));
        assert!(!is_safe_filename(".."));
        assert!(!is_safe_filename("."));
        assert!(is_safe_filename("shot..1.jpg"));
        assert!(is_safe_filename("..hidden.jpg"));
    }

    #[test]
    fn test_list_filters_and_measures() {
        let scratch = ScratchDir::new();
        write_jpeg(scratch.path(), "b.jpg", 16, 8);
        write_jpeg(scratch.path(), "a.JPEG", 4, 4);
        std::fs::write(scratch.path().join("notes.txt"), "x").unwrap();
        std::fs::write(scratch.path().join("broken.jpg"), "not an image").unwrap();
        scratch.subdir("nested.jpg");

        let images = ImageStore::new(scratch.path()).list().unwrap();
        assert_eq!(
            images,
            vec![
                ImageDescriptor::new("a.JPEG", 4, 4),
                ImageDescriptor::new("b.jpg", 16, 8),
                ImageDescriptor::new("broken.jpg", 0, 0),
            ]
        );
    }

    #[test]
    fn test_read_bytes_missing_is_none() {
        let scratch = ScratchDir::new();
        let store = ImageStore::new(scratch.path());
        assert!(store.read_bytes("nope.jpg").unwrap().is_none());

        write_jpeg(scratch.path(), "x.jpg", 2, 2);
        let bytes = store.read_bytes("x.jpg").unwrap().unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_list_missing_directory_fails() {
        let scratch = ScratchDir::new();
        let store = ImageStore::new(scratch.path().join("absent"));
        assert!(store.list().is_err());
    }
}
