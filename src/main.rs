// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! boxsync - collaborative bounding-box annotation server
//!
//! Serves a directory of images over HTTP, stores box annotations as
//! COCO-style sidecar files, renders previews with the boxes burned in and
//! relays live edits between connected clients.
//!
//! Usage: `boxsync [serve]` runs the server, `boxsync check` lists images
//! that have no rendered overlay yet.

use anyhow::{bail, Result};
use boxsync::app::AppState;
use boxsync::config::Config;
use boxsync::io::{media::ImageStore, overlay::OverlayRenderer};
use boxsync::server;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;

    // Initialize logging; RUST_LOG takes precedence over the config file
    env_logger::Builder::new()
        .filter_level(config.log_level.to_level_filter())
        .parse_default_env()
        .init();

    match std::env::args().nth(1).as_deref() {
        None | Some("serve") => server::run(AppState::new(config)?).await,
        Some("check") => check_overlays(&config),
        Some(other) => bail!("Unknown command {:?}, expected `serve` or `check`", other),
    }
}

/// Print every source image without a rendered overlay.
fn check_overlays(config: &Config) -> Result<()> {
    let images = ImageStore::new(&config.input_dir);
    let renderer = OverlayRenderer::new(images, &config.output_dir, &config.overlay)?;
    let missing = renderer.missing_overlays()?;

    if missing.is_empty() {
        println!("Every JPG in {} has an overlay", config.input_dir.display());
    } else {
        println!("JPG files without an overlay in {}:", config.output_dir.display());
        for name in missing {
            println!("{}", name);
        }
    }
    Ok(())
}
