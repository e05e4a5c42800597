// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the constant-time box math shared by the canvas
//! controller (drag-to-draw, uniform scaling) and the overlay renderer
//! (snapping boxes onto the pixel grid).

use crate::models::annotation::BoxAnnotation;

/// A 2D point in source-image pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Geometry of a box without its identity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn from_box(b: &BoxAnnotation) -> Self {
        Self {
            left: b.left,
            top: b.top,
            width: b.width,
            height: b.height,
        }
    }
}

/// Rectangle spanned by dragging from `anchor` to `pointer`.
///
/// With `square` set, the side is the larger of the two deltas and the box
/// grows in the drag direction from the anchor.
pub fn drag_rect(anchor: Point, pointer: Point, square: bool) -> Rect {
    let dx = pointer.x - anchor.x;
    let dy = pointer.y - anchor.y;

    if square {
        let size = dx.abs().max(dy.abs());
        Rect {
            left: if dx >= 0.0 { anchor.x } else { anchor.x - size },
            top: if dy >= 0.0 { anchor.y } else { anchor.y - size },
            width: size,
            height: size,
        }
    } else {
        Rect {
            left: anchor.x.min(pointer.x),
            top: anchor.y.min(pointer.y),
            width: dx.abs(),
            height: dy.abs(),
        }
    }
}

/// Lock a pair of scale factors to the larger one.
pub fn uniform_scale(scale_x: f64, scale_y: f64) -> (f64, f64) {
    let s = scale_x.max(scale_y);
    (s, s)
}

/// Integer pixel rectangle, already clipped to an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    /// Exclusive.
    pub x1: u32,
    /// Exclusive.
    pub y1: u32,
}

impl PixelRect {
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }
}

/// Snap a box to rounded integer coordinates, with width and height floored
/// to 1px, then clip it to a `width` x `height` image.
///
/// Returns `None` when nothing of the box is left inside the image.
pub fn snap_to_pixels(rect: &Rect, width: u32, height: u32) -> Option<PixelRect> {
    let left = rect.left.round() as i64;
    let top = rect.top.round() as i64;
    let w = (rect.width.round() as i64).max(1);
    let h = (rect.height.round() as i64).max(1);

    let x0 = left.clamp(0, width as i64);
    let y0 = top.clamp(0, height as i64);
    let x1 = left.saturating_add(w).clamp(0, width as i64);
    let y1 = top.saturating_add(h).clamp(0, height as i64);

    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    Some(PixelRect {
        x0: x0 as u32,
        y0: y0 as u32,
        x1: x1 as u32,
        y1: y1 as u32,
    })
}
