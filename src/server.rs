// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! HTTP API.
//!
//! Routes:
//! - `GET  /api/images` lists the source JPEGs with their dimensions
//! - `GET  /api/images/:filename` serves one source image
//! - `GET  /api/annotations/:filename` returns the saved boxes
//! - `POST /api/annotations/:filename` saves boxes, renders the overlay and
//!   notifies every relay client
//! - `GET  /ws` upgrades to the relay socket
//!
//! Anything else is served from the public directory.

use crate::app::AppState;
use crate::error::ApiError;
use crate::io::coco::CocoDataset;
use crate::io::media::{content_type, is_safe_filename};
use crate::models::annotation::BoxAnnotation;
use crate::models::image::{AnnotationSet, ImageDescriptor, SaveRequest};
use crate::relay::protocol::ServerEvent;
use crate::relay::socket::ws_handler;
use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::services::ServeDir;

/// Response of `GET /api/annotations/:filename`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationsResponse {
    pub annotations: Vec<BoxAnnotation>,
}

/// Response of a successful save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub success: bool,
    pub message: String,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let public = ServeDir::new(&state.config.public_dir);
    let body_limit = DefaultBodyLimit::max(state.config.max_body_bytes);

    Router::new()
        .route("/api/images", get(list_images))
        .route("/api/images/:filename", get(get_image))
        .route(
            "/api/annotations/:filename",
            get(get_annotations).post(save_annotations),
        )
        .route("/ws", get(ws_handler))
        .fallback_service(public)
        .layer(body_limit)
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn run(state: AppState) -> Result<()> {
    let address = state.config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    log::info!("Server running on {}", address);
    log::info!("Input directory: {}", state.config.input_dir.display());
    log::info!("Output directory: {}", state.config.output_dir.display());

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutting down");
}

fn checked_filename(filename: &str) -> Result<(), ApiError> {
    if is_safe_filename(filename) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!("Invalid filename: {:?}", filename)))
    }
}

/// Run blocking filesystem work off the async workers.
async fn blocking<T, F>(context: &'static str, work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| ApiError::internal(context, e))?
        .map_err(|e| ApiError::internal(context, e))
}

async fn list_images(State(state): State<AppState>) -> Result<Json<Vec<ImageDescriptor>>, ApiError> {
    let images = state.images.clone();
    let list = blocking("Failed to read images", move || images.list()).await?;
    Ok(Json(list))
}

async fn get_image(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Response, ApiError> {
    checked_filename(&filename)?;
    let images = state.images.clone();
    let name = filename.clone();
    let bytes = blocking("Failed to read image", move || images.read_bytes(&name))
        .await?
        .ok_or_else(|| ApiError::NotFound("Image not found".to_string()))?;

    Ok(([(header::CONTENT_TYPE, content_type(&filename))], bytes).into_response())
}

async fn get_annotations(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<Json<AnnotationsResponse>, ApiError> {
    checked_filename(&filename)?;
    let sidecars = state.sidecars.clone();
    let annotations =
        blocking("Failed to read annotations", move || Ok(sidecars.read(&filename))).await?;
    Ok(Json(AnnotationsResponse { annotations }))
}

async fn save_annotations(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    payload: Result<Json<SaveRequest>, JsonRejection>,
) -> Result<Json<SaveResponse>, ApiError> {
    checked_filename(&filename)?;
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let (Some(annotations), Some(image)) = (request.annotations, request.image_data) else {
        return Err(ApiError::BadRequest("Missing annotations or imageData.".to_string()));
    };
    // Clients hear the ids as persisted, fallbacks included
    let annotations = CocoDataset::from_boxes(&image, &annotations).to_boxes();

    let (sidecars, renderer) = (state.sidecars.clone(), state.renderer.clone());
    let (name, boxes) = (filename.clone(), annotations.clone());
    blocking("Failed to save annotations", move || {
        sidecars.write(&name, &image, &boxes)?;
        renderer.render(&name, &boxes)?;
        Ok(())
    })
    .await?;

    let reached = state.hub.broadcast_all(ServerEvent::Saved(AnnotationSet {
        filename,
        annotations,
    }));
    log::debug!("Save broadcast to {} clients", reached);

    Ok(Json(SaveResponse {
        success: true,
        message: "Annotations and annotated image saved.".to_string(),
    }))
}
