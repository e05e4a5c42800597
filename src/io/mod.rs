// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Filesystem I/O: source images, annotation sidecars and overlay renders.

pub mod coco;
pub mod media;
pub mod overlay;
pub mod sidecar;
