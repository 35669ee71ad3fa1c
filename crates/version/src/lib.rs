// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

//! Models for the vendor's per-version manifests and asset indexes.

mod checks;
mod error;
pub mod library;
pub mod model;

pub use error::*;
pub use library::*;
pub use model::*;
