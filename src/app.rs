// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Shared application state.
//!
//! This module wires the configuration, the filesystem stores and the relay
//! hub together into the state handed to every HTTP handler and socket task.

use crate::config::Config;
use crate::io::{media::ImageStore, overlay::OverlayRenderer, sidecar::SidecarStore};
use crate::relay::hub::Hub;
use anyhow::{Context, Result};
use std::sync::Arc;

/// Everything a request or socket needs, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub images: Arc<ImageStore>,
    pub sidecars: Arc<SidecarStore>,
    pub renderer: Arc<OverlayRenderer>,
    pub hub: Arc<Hub>,
}

impl AppState {
    /// Build the state, creating the input and output directories if needed.
    pub fn new(config: Config) -> Result<Self> {
        for dir in [&config.input_dir, &config.output_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory {}", dir.display()))?;
        }

        let images = ImageStore::new(&config.input_dir);
        let sidecars = SidecarStore::new(&config.output_dir);
        let renderer = OverlayRenderer::new(images.clone(), &config.output_dir, &config.overlay)?;

        Ok(Self {
            config: Arc::new(config),
            images: Arc::new(images),
            sidecars: Arc::new(sidecars),
            renderer: Arc::new(renderer),
            hub: Arc::new(Hub::new()),
        })
    }
}
