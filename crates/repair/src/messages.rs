// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

//! The wire protocol between the launcher and its repair worker process.
//!
//! One JSON document per line, discriminated by a `type` field. Logs travel
//! separately over the child's stderr.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Parent to child.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkerCommand {
    #[serde(rename_all = "camelCase")]
    Validate {
        server_id: String,
        launcher_directory: PathBuf,
        common_directory: PathBuf,
        instance_directory: PathBuf,
        dev_mode: bool,
    },
    Download,
}

/// Child to parent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WorkerReply {
    #[serde(rename_all = "camelCase")]
    ValidateProgress { percent: u8 },
    #[serde(rename_all = "camelCase")]
    ValidateComplete { invalid_count: usize },
    #[serde(rename_all = "camelCase")]
    DownloadProgress { percent: u8 },
    DownloadComplete,
    Error { displayable: Option<String> },
}
