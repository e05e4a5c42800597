// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! boxsync library: storage, rendering, relay and canvas logic behind the
//! `boxsync` server binary.

pub mod app;
pub mod config;
pub mod error;
pub mod io;
pub mod models;
pub mod relay;
pub mod server;
pub mod ui;
pub mod util;

#[cfg(test)]
mod test_support;
