// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! HTTP-facing errors.
//!
//! Internal layers return `anyhow::Result`; route handlers convert failures
//! into an [`ApiError`], which renders as `{"error": ...}` with a status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Error returned by HTTP handlers.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    /// I/O or codec failure. Only `context` is shown to the caller.
    #[error("{context}: {source:#}")]
    Internal {
        context: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ApiError {
    pub fn internal(context: &'static str, source: impl Into<anyhow::Error>) -> Self {
        ApiError::Internal {
            context,
            source: source.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) => msg.clone(),
            ApiError::Internal { context, .. } => {
                log::error!("{:#}", self);
                context.to_string()
            }
        };
        (self.status(), Json(json!({ "error": message }))).into_response()
    }
}
