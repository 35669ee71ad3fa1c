// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

//! The closed family of index processors the repair pipeline composes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use download::Asset;

use crate::dist::DistributionIndexProcessor;
use crate::error::*;
use crate::vendor::VendorIndexProcessor;

/// Which bucket of the invalid-asset map an asset belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Assets,
    Libraries,
    Client,
    Misc,
    Files,
}

pub type InvalidAssets = HashMap<Category, Vec<Asset>>;

/// An index processor knows how to tell which of its files are missing or
/// corrupt, and how to finalize after they have been re-downloaded.
pub enum IndexProcessor {
    Vendor(VendorIndexProcessor),
    Distribution(DistributionIndexProcessor),
}

impl IndexProcessor {
    /// Acquires the remote documents validation needs. Unrecoverable loss is
    /// fatal.
    pub async fn init(&mut self) -> Result<()> {
        match self {
            Self::Vendor(processor) => processor.init().await,
            Self::Distribution(processor) => processor.init().await,
        }
    }

    /// How many coarse progress ticks this processor contributes.
    pub fn total_stages(&self) -> u64 {
        match self {
            Self::Vendor(processor) => processor.total_stages(),
            Self::Distribution(processor) => processor.total_stages(),
        }
    }

    /// Computes the set of invalid assets, invoking `on_stage_complete`
    /// after each stage.
    pub async fn validate(
        &mut self,
        on_stage_complete: &(dyn Fn() + Send + Sync),
    ) -> Result<InvalidAssets> {
        match self {
            Self::Vendor(processor) => processor.validate(on_stage_complete).await,
            Self::Distribution(processor) => processor.validate(on_stage_complete).await,
        }
    }

    /// Runs after every invalid asset has been downloaded and hashed.
    pub async fn post_download(&mut self) -> Result<()> {
        match self {
            Self::Vendor(processor) => processor.post_download().await,
            Self::Distribution(processor) => processor.post_download().await,
        }
    }
}
