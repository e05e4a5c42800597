// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Overlay rendering.
//!
//! Produces a flattened JPEG copy of a source image with every box burned
//! into the pixels: a translucent fill and a solid border. Renders are
//! written as `<output>/<prefix><filename>` and never replace the source.

use crate::config::{parse_hex_color, OverlayConfig};
use crate::io::media::ImageStore;
use crate::models::annotation::BoxAnnotation;
use crate::util::geometry::{snap_to_pixels, PixelRect, Rect};
use anyhow::{Context, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{Rgb, RgbImage};
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Resolved colors and encoding settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayStyle {
    pub fill: [u8; 3],
    pub fill_opacity: f32,
    pub stroke: [u8; 3],
    pub stroke_width: u32,
    pub jpeg_quality: u8,
}

impl OverlayStyle {
    pub fn from_config(config: &OverlayConfig) -> Result<Self> {
        Ok(Self {
            fill: parse_hex_color(&config.fill_color)?,
            fill_opacity: config.fill_opacity.clamp(0.0, 1.0),
            stroke: parse_hex_color(&config.stroke_color)?,
            stroke_width: config.stroke_width,
            jpeg_quality: config.jpeg_quality.clamp(1, 100),
        })
    }
}

/// Burn boxes into an image, in order.
pub fn draw_boxes(img: &mut RgbImage, boxes: &[BoxAnnotation], style: &OverlayStyle) {
    let (width, height) = img.dimensions();
    for b in boxes {
        if let Some(rect) = snap_to_pixels(&Rect::from_box(b), width, height) {
            fill_rect(img, &rect, style.fill, style.fill_opacity);
            stroke_rect(img, &rect, style.stroke, style.stroke_width);
        }
    }
}

fn fill_rect(img: &mut RgbImage, rect: &PixelRect, color: [u8; 3], opacity: f32) {
    for y in rect.y0..rect.y1 {
        for x in rect.x0..rect.x1 {
            let px = img.get_pixel_mut(x, y);
            for (channel, &c) in px.0.iter_mut().zip(color.iter()) {
                let blended = *channel as f32 * (1.0 - opacity) + c as f32 * opacity;
                *channel = blended.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

/// Border drawn inward from the rectangle's edges.
fn stroke_rect(img: &mut RgbImage, rect: &PixelRect, color: [u8; 3], width: u32) {
    if width == 0 {
        return;
    }
    let band_x = width.min(rect.width());
    let band_y = width.min(rect.height());
    for y in rect.y0..rect.y1 {
        for x in rect.x0..rect.x1 {
            let on_edge = x < rect.x0 + band_x
                || x >= rect.x1 - band_x
                || y < rect.y0 + band_y
                || y >= rect.y1 - band_y;
            if on_edge {
                img.put_pixel(x, y, Rgb(color));
            }
        }
    }
}

/// Renders overlays from the input directory into the output directory.
#[derive(Debug, Clone)]
pub struct OverlayRenderer {
    images: ImageStore,
    output_dir: PathBuf,
    prefix: String,
    style: OverlayStyle,
}

impl OverlayRenderer {
    pub fn new(images: ImageStore, output_dir: impl Into<PathBuf>, config: &OverlayConfig) -> Result<Self> {
        Ok(Self {
            images,
            output_dir: output_dir.into(),
            prefix: config.prefix.clone(),
            style: OverlayStyle::from_config(config)?,
        })
    }

    /// Where the overlay of `filename` is written.
    pub fn output_path(&self, filename: &str) -> PathBuf {
        self.output_dir.join(format!("{}{}", self.prefix, filename))
    }

    /// Render `boxes` over the source image and write the result.
    ///
    /// Nothing is rendered for an empty box list; any overlay from an
    /// earlier save is left as it was.
    pub fn render(&self, filename: &str, boxes: &[BoxAnnotation]) -> Result<Option<PathBuf>> {
        if boxes.is_empty() {
            return Ok(None);
        }

        let source = self.images.path_of(filename);
        let mut img = image::open(&source)
            .with_context(|| format!("Failed to open source image {}", source.display()))?
            .to_rgb8();

        draw_boxes(&mut img, boxes, &self.style);

        let path = self.output_path(filename);
        write_jpeg(&img, &path, self.style.jpeg_quality)?;
        log::info!("Rendered {} boxes onto {}", boxes.len(), path.display());
        Ok(Some(path))
    }

    /// Source JPEGs that have no rendered overlay yet, sorted.
    pub fn missing_overlays(&self) -> Result<Vec<String>> {
        let rendered: HashSet<String> = match std::fs::read_dir(&self.output_dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .filter_map(|e| e.file_name().to_str().map(str::to_string))
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("Failed to read output directory {}", self.output_dir.display())
                })
            }
        };

        Ok(self
            .images
            .jpeg_names()?
            .into_iter()
            .filter(|name| !rendered.contains(&format!("{}{}", self.prefix, name)))
            .collect())
    }
}

fn write_jpeg(img: &RgbImage, path: &Path, quality: u8) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
    img.write_with_encoder(encoder)
        .with_context(|| format!("Failed to encode {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{write_jpeg as write_fixture, ScratchDir};

    fn style() -> OverlayStyle {
        OverlayStyle::from_config(&OverlayConfig::default()).unwrap()
    }

    fn renderer(scratch: &ScratchDir) -> OverlayRenderer {
        let images = ImageStore::new(scratch.subdir("input"));
        OverlayRenderer::new(images, scratch.subdir("output"), &OverlayConfig::default()).unwrap()
    }

    #[test]
    fn test_draw_boxes_fills_and_strokes() {
        let mut img = RgbImage::from_pixel(20, 20, Rgb([255, 255, 255]));
        let boxes = vec![BoxAnnotation::new(1, 5.0, 5.0, 10.0, 10.0)];
        draw_boxes(&mut img, &boxes, &style());

        // Border
        assert_eq!(img.get_pixel(5, 5).0, [0, 123, 255]);
        assert_eq!(img.get_pixel(14, 10).0, [0, 123, 255]);
        // Interior: 70% white + 30% fill
        let [r, g, b] = img.get_pixel(10, 10).0;
        assert!((178..=179).contains(&r), "red was {}", r);
        assert_eq!((g, b), (215, 255));
        // Outside untouched
        assert_eq!(img.get_pixel(4, 4).0, [255, 255, 255]);
        assert_eq!(img.get_pixel(15, 15).0, [255, 255, 255]);
    }

    #[test]
    fn test_draw_tiny_and_offscreen_boxes() {
        let mut img = RgbImage::from_pixel(10, 10, Rgb([255, 255, 255]));
        let boxes = vec![
            BoxAnnotation::new(1, 2.0, 2.0, 0.0, 0.0),
            BoxAnnotation::new(2, 50.0, 50.0, 5.0, 5.0),
        ];
        draw_boxes(&mut img, &boxes, &style());
        assert_eq!(img.get_pixel(2, 2).0, [0, 123, 255]);
        assert_eq!(img.get_pixel(3, 3).0, [255, 255, 255]);
    }

    #[test]
    fn test_render_writes_prefixed_copy() {
        let scratch = ScratchDir::new();
        let renderer = renderer(&scratch);
        let source = write_fixture(&scratch.path().join("input"), "photo.jpg", 40, 30);
        let before = std::fs::read(&source).unwrap();

        let boxes = vec![BoxAnnotation::new(1, 10.0, 10.0, 12.0, 12.0)];
        let path = renderer.render("photo.jpg", &boxes).unwrap().unwrap();

        assert_eq!(path, scratch.path().join("output").join("annotated_photo.jpg"));
        assert_eq!(image::image_dimensions(&path).unwrap(), (40, 30));
        let rendered = image::open(&path).unwrap().to_rgb8();
        let center = rendered.get_pixel(16, 16).0;
        assert!(center[0] < 220 && center[2] > 200, "center was {:?}", center);
        assert_eq!(std::fs::read(&source).unwrap(), before);
    }

    #[test]
    fn test_render_skips_empty_box_list() {
        let scratch = ScratchDir::new();
        let renderer = renderer(&scratch);
        write_fixture(&scratch.path().join("input"), "photo.jpg", 8, 8);

        assert!(renderer.render("photo.jpg", &[]).unwrap().is_none());
        assert!(!renderer.output_path("photo.jpg").exists());
    }

    #[test]
    fn test_render_missing_source_fails() {
        let scratch = ScratchDir::new();
        let renderer = renderer(&scratch);
        let boxes = vec![BoxAnnotation::new(1, 0.0, 0.0, 2.0, 2.0)];
        assert!(renderer.render("ghost.jpg", &boxes).is_err());
    }

    #[test]
    fn test_missing_overlays() {
        let scratch = ScratchDir::new();
        let renderer = renderer(&scratch);
        let input = scratch.path().join("input");
        write_fixture(&input, "a.jpg", 8, 8);
        write_fixture(&input, "b.jpg", 8, 8);
        write_fixture(&input, "c.JPG", 8, 8);

        renderer
            .render("b.jpg", &[BoxAnnotation::new(1, 1.0, 1.0, 3.0, 3.0)])
            .unwrap();
        assert_eq!(renderer.missing_overlays().unwrap(), vec!["a.jpg", "c.JPG"]);
    }
}
