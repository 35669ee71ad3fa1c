// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

//! The heavy repair workflow: validate a server installation against its
//! indexes, download what is missing, finalize mod loaders. Runs inside a
//! detached worker process driven over a line-based message channel.

mod dist;
mod documents;
mod error;
pub mod messages;
mod orchestrator;
mod processor;
pub mod receiver;
pub mod transmitter;
mod vendor;

pub use dist::DistributionIndexProcessor;
pub use documents::{fetch_document, load_cached_document, persist_document};
pub use error::*;
pub use messages::*;
pub use orchestrator::FullRepair;
pub use processor::{Category, IndexProcessor, InvalidAssets};
pub use transmitter::RepairWorker;
pub use vendor::{VendorIndexProcessor, VersionManifest};
