// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Annotation data structures.
//!
//! This module defines the bounding-box annotation exchanged with clients
//! and the identifier type clients attach to it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Client-generated annotation identifier.
///
/// Browsers use a millisecond timestamp, but any JSON integer or string is
/// accepted so foreign clients can pick their own scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnnotationId {
    Number(i64),
    Text(String),
}

impl AnnotationId {
    /// Whether this id carries no information (integer zero or empty text).
    pub fn is_blank(&self) -> bool {
        match self {
            AnnotationId::Number(n) => *n == 0,
            AnnotationId::Text(s) => s.is_empty(),
        }
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationId::Number(n) => write!(f, "{}", n),
            AnnotationId::Text(s) => f.write_str(s),
        }
    }
}

/// A rectangular annotation in source-image pixels, top-left origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxAnnotation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<AnnotationId>,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl BoxAnnotation {
    /// Create a box with a numeric id and the given geometry.
    pub fn new(id: i64, left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            id: Some(AnnotationId::Number(id)),
            left,
            top,
            width,
            height,
        }
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Check whether a point lies inside the box (edges inclusive).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x <= self.left + self.width && y >= self.top && y <= self.top + self.height
    }

    /// Whether this box carries the given id.
    pub fn has_id(&self, id: &AnnotationId) -> bool {
        self.id.as_ref() == Some(id)
    }
}
