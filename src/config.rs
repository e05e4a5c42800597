// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Server configuration.
//!
//! Settings come from an optional YAML file and a handful of environment
//! overrides. Every field has a default, so running with no file at all
//! serves `./input` on port 3000.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file read when `BOXSYNC_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "boxsync.yaml";

/// Log level setting for the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Appearance and encoding of rendered overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Prepended to the source filename to name the rendered copy.
    pub prefix: String,
    /// Box fill as `#rrggbb`.
    pub fill_color: String,
    pub fill_opacity: f32,
    /// Box border as `#rrggbb`.
    pub stroke_color: String,
    pub stroke_width: u32,
    pub jpeg_quality: u8,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            prefix: "annotated_".to_string(),
            fill_color: "#007bff".to_string(),
            fill_opacity: 0.3,
            stroke_color: "#007bff".to_string(),
            stroke_width: 3,
            jpeg_quality: 90,
        }
    }
}

/// Canvas drawing behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingConfig {
    /// Keep drawn and resized boxes square.
    pub square_lock: bool,
    /// Boxes must exceed this size in both dimensions to be kept.
    pub min_box_size: f64,
}

impl Default for DrawingConfig {
    fn default() -> Self {
        Self {
            square_lock: true,
            min_box_size: 5.0,
        }
    }
}

/// Complete server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Source images, never written to.
    pub input_dir: PathBuf,
    /// Sidecar JSON files and rendered overlays.
    pub output_dir: PathBuf,
    /// Static front-end assets.
    pub public_dir: PathBuf,
    pub log_level: LogLevel,
    pub max_body_bytes: usize,
    pub overlay: OverlayConfig,
    pub drawing: DrawingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            public_dir: PathBuf::from("public"),
            log_level: LogLevel::Info,
            max_body_bytes: 50 * 1024 * 1024,
            overlay: OverlayConfig::default(),
            drawing: DrawingConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the file named by `BOXSYNC_CONFIG` (or
    /// `boxsync.yaml` when present), then apply environment overrides.
    pub fn load() -> Result<Self> {
        let explicit = std::env::var_os("BOXSYNC_CONFIG").map(PathBuf::from);
        let mut config = match explicit {
            Some(path) => Self::from_yaml_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_yaml_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a YAML config file.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_yaml(&yaml).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Apply `PORT`, `BOXSYNC_HOST`, `BOXSYNC_INPUT_DIR` and
    /// `BOXSYNC_OUTPUT_DIR` from `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(port) = lookup("PORT") {
            self.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT is not a valid port: {:?}", port))?;
        }
        if let Some(host) = lookup("BOXSYNC_HOST") {
            self.host = host;
        }
        if let Some(dir) = lookup("BOXSYNC_INPUT_DIR") {
            self.input_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("BOXSYNC_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    /// Reject settings the renderer or canvas cannot work with.
    pub fn validate(&self) -> Result<()> {
        let overlay = &self.overlay;
        if overlay.prefix.is_empty() {
            bail!("overlay.prefix must not be empty, overlays would overwrite source names");
        }
        parse_hex_color(&overlay.fill_color).context("overlay.fill_color")?;
        parse_hex_color(&overlay.stroke_color).context("overlay.stroke_color")?;
        if !(0.0..=1.0).contains(&overlay.fill_opacity) {
            bail!("overlay.fill_opacity must be within 0..=1, got {}", overlay.fill_opacity);
        }
        if !(1..=100).contains(&overlay.jpeg_quality) {
            bail!("overlay.jpeg_quality must be within 1..=100, got {}", overlay.jpeg_quality);
        }
        if self.drawing.min_box_size < 0.0 {
            bail!("drawing.min_box_size must not be negative");
        }
        Ok(())
    }

    /// Socket address string to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Parse `#rrggbb` (leading `#` optional) into RGB bytes.
pub fn parse_hex_color(value: &str) -> Result<[u8; 3]> {
    let hex = value.strip_prefix('#').unwrap_or(value);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("expected a #rrggbb color, got {:?}", value);
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16);
    Ok([channel(0)?, channel(2)?, channel(4)?])
}
