// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

use serde::{Deserialize, Serialize};

/// Configuration for controlling download behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DownloadConfig {
    /// Maximum number of concurrent download tasks.
    ///
    /// This limits how many downloads can happen at the same time (i.e. max
    /// connections). A higher number increases parallelism, but may use more
    /// system/network resources. Default is `15`.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// How many times a failed download is retried before the last error is
    /// surfaced. Default is `10`.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Whether a mismatch between declared and received byte counts is a hard
    /// error. When unset the engine re-validates the file on disk and only
    /// logs the disagreement.
    #[serde(default)]
    pub strict_size_check: bool,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            max_retries: default_max_retries(),
            strict_size_check: false,
        }
    }
}

fn default_concurrency() -> usize {
    15
}

fn default_max_retries() -> u32 {
    10
}
