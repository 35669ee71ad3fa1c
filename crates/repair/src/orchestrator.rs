// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

//! The two-phase validate/download contract over both index processors.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{error, info, warn};

use config::download::DownloadConfig;
use distribution::Distribution;
use download::{Asset, download_all, is_valid_on_disk};
use folder::LauncherLocation;
use task::{Progress, Step};

use crate::dist::DistributionIndexProcessor;
use crate::error::*;
use crate::processor::IndexProcessor;
use crate::vendor::VendorIndexProcessor;

pub struct FullRepair {
    download_config: DownloadConfig,
    processors: Vec<IndexProcessor>,
    /// Retained between the validate and download phases.
    invalid: Vec<Asset>,
    progress: Progress,
    validated: bool,
}

impl FullRepair {
    /// Loads the distribution document, selects the server and composes the
    /// two index processors. A missing document or unknown server id is
    /// fatal.
    pub fn new(
        server_id: &str,
        launcher_directory: &Path,
        common_directory: &Path,
        instance_directory: &Path,
        dev_mode: bool,
    ) -> Result<Self> {
        let layout = LauncherLocation::new(
            launcher_directory.as_os_str(),
            common_directory.as_os_str(),
            instance_directory.as_os_str(),
        );
        let download_config = match config::load_config_file(&layout.root.join("config.toml")) {
            Ok(config) => config.download,
            Err(err) => {
                warn!("Could not load core config, using defaults: {err}");
                config::CoreConfig::default().download
            }
        };
        let distribution = Distribution::load(&layout, dev_mode)?;
        let server = distribution.get_server(server_id)?.clone();
        info!(
            "Repairing server {} (minecraft {})",
            server.id, server.minecraft_version
        );
        let minecraft_version = server.minecraft_version.clone();
        let processors = vec![
            IndexProcessor::Distribution(DistributionIndexProcessor::new(layout.clone(), server)),
            IndexProcessor::Vendor(VendorIndexProcessor::new(layout, &minecraft_version)),
        ];
        Ok(Self {
            download_config,
            processors,
            invalid: Vec::new(),
            progress: Progress::default(),
            validated: false,
        })
    }

    /// Phase one: init every processor, then collect the invalid-asset set.
    ///
    /// `on_percent` observes `floor(completed_stages / total_stages * 100)`.
    pub async fn validate(
        &mut self,
        on_percent: &(dyn Fn(u8) + Send + Sync),
    ) -> Result<usize> {
        self.progress.set_step(Step::FetchIndexDocuments);
        for processor in &mut self.processors {
            processor.init().await?;
        }

        self.progress.set_step(Step::VerifyExistingFiles);
        self.progress.reset(Ordering::SeqCst);
        let total_stages: u64 = self
            .processors
            .iter()
            .map(IndexProcessor::total_stages)
            .sum();
        self.progress.total.store(total_stages, Ordering::SeqCst);

        let mut invalid = Vec::new();
        let progress = self.progress.clone();
        let on_stage_complete = move || {
            progress.completed.fetch_add(1, Ordering::SeqCst);
            on_percent(progress.percent(Ordering::SeqCst));
        };
        for processor in &mut self.processors {
            let categorized = processor.validate(&on_stage_complete).await?;
            invalid.extend(categorized.into_values().flatten());
        }

        info!("Validation finished, {} file(s) to fetch", invalid.len());
        self.invalid = invalid;
        self.validated = true;
        Ok(self.invalid.len())
    }

    /// Phase two: fetch everything validate flagged, then run the
    /// finalizers. Refused until validate has completed.
    pub async fn download(&mut self, on_percent: &(dyn Fn(u8) + Send + Sync)) -> Result<()> {
        if !self.validated {
            return Err(Error::ValidateNotRun);
        }
        self.progress.set_step(Step::DownloadFiles);
        let expected_total: u64 = self.invalid.iter().map(|asset| asset.size).sum();
        let last_percent = AtomicU64::new(u64::MAX);
        let received = download_all(
            self.invalid.clone(),
            &self.download_config,
            |aggregate| {
                if expected_total == 0 {
                    return;
                }
                let percent = aggregate.min(expected_total) * 100 / expected_total;
                // only forward integer percent changes
                if last_percent.swap(percent, Ordering::SeqCst) != percent {
                    on_percent(percent as u8);
                }
            },
        )
        .await?;

        for asset in &self.invalid {
            let Some(&received_bytes) = received.get(&asset.id) else {
                continue;
            };
            // zero means the file was already valid and never requested
            if received_bytes == 0 || received_bytes == asset.size {
                continue;
            }
            warn!(
                "Received {received_bytes} byte(s) for {} but its index declares {}",
                asset.id, asset.size
            );
            if is_valid_on_disk(&asset.path, &asset.checksum) {
                continue;
            }
            error!("{} is corrupted on disk", asset.id);
            if self.download_config.strict_size_check {
                return Err(Error::SizeMismatch(asset.id.clone()));
            }
        }

        self.progress.set_step(Step::Finalize);
        for processor in &mut self.processors {
            processor.post_download().await?;
        }
        info!("Repair download phase complete");
        Ok(())
    }
}
