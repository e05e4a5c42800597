// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Client-side canvas logic, independent of any rendering toolkit.

pub mod canvas;
pub mod toolbar;
