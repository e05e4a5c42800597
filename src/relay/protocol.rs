// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Relay wire format.
//!
//! Every WebSocket text frame is a JSON object `{"event": <name>, "data": <payload>}`.
//! Event names are typed. Box edits travel as [`RelayPayload`]s, which the
//! server forwards untouched; only the clients give them meaning.

use crate::models::annotation::{AnnotationId, BoxAnnotation};
use crate::models::image::AnnotationSet;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One box edit on one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationChange {
    pub filename: String,
    pub annotation: BoxAnnotation,
}

/// Removal of one box from one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRemoval {
    pub filename: String,
    #[serde(rename = "annotationId")]
    pub annotation_id: AnnotationId,
}

/// The `data` of a relayed edit, kept exactly as the sender wrote it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelayPayload(pub Value);

impl RelayPayload {
    /// The `filename` field, if the sender included one.
    pub fn filename(&self) -> Option<&str> {
        self.0.get("filename").and_then(Value::as_str)
    }

    /// Read the payload as a typed edit. `None` if it does not fit.
    pub fn decode<T: DeserializeOwned>(&self) -> Option<T> {
        T::deserialize(&self.0).ok()
    }
}

impl From<AnnotationChange> for RelayPayload {
    fn from(change: AnnotationChange) -> Self {
        Self(json!(change))
    }
}

impl From<AnnotationRemoval> for RelayPayload {
    fn from(removal: AnnotationRemoval) -> Self {
        Self(json!(removal))
    }
}

/// Frames sent by clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientMessage {
    #[serde(rename = "request:annotations")]
    RequestAnnotations(String),
    #[serde(rename = "annotation:create")]
    Create(RelayPayload),
    #[serde(rename = "annotation:update")]
    Update(RelayPayload),
    #[serde(rename = "annotation:delete")]
    Delete(RelayPayload),
}

/// Frames pushed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ServerEvent {
    /// Persisted boxes, answered to the requesting client only.
    #[serde(rename = "annotations:loaded")]
    Loaded(AnnotationSet),
    #[serde(rename = "annotation:created")]
    Created(RelayPayload),
    #[serde(rename = "annotation:updated-remote")]
    UpdatedRemote(RelayPayload),
    #[serde(rename = "annotation:deleted-remote")]
    DeletedRemote(RelayPayload),
    /// Full set after a successful save, sent to everyone.
    #[serde(rename = "annotation:updated")]
    Saved(AnnotationSet),
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Loaded(_) => "annotations:loaded",
            ServerEvent::Created(_) => "annotation:created",
            ServerEvent::UpdatedRemote(_) => "annotation:updated-remote",
            ServerEvent::DeletedRemote(_) => "annotation:deleted-remote",
            ServerEvent::Saved(_) => "annotation:updated",
        }
    }

    /// Image the event concerns. Relayed edits without a filename have none.
    pub fn filename(&self) -> Option<&str> {
        match self {
            ServerEvent::Loaded(set) | ServerEvent::Saved(set) => Some(&set.filename),
            ServerEvent::Created(payload)
            | ServerEvent::UpdatedRemote(payload)
            | ServerEvent::DeletedRemote(payload) => payload.filename(),
        }
    }
}
