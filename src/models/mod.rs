// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model shared by the server, the relay and the canvas controller.

pub mod annotation;
pub mod image;
