// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

//! Discovery, introspection and provisioning of Java runtimes.
//!
//! The guard walks the platform's conventional installation spots, asks each
//! candidate what it is over a child process, and keeps only 64-bit runtimes
//! whose version satisfies the requested range. When nothing qualifies, a
//! fresh JDK can be resolved from Adoptium or Corretto and unpacked into the
//! launcher's runtime directory.

use std::path::Path;

use log::info;
use semver::VersionReq;

pub mod discover;
mod error;
pub mod inspect;
pub mod install;
pub mod remote;

pub use discover::*;
pub use error::*;
pub use inspect::*;
pub use install::*;
pub use remote::*;

/// Discovers every usable runtime on this machine, ranked best-first.
pub async fn scan_jvms(range: &VersionReq, runtime_directory: &Path) -> Vec<JvmDetails> {
    let candidates = discover_candidates(runtime_directory);
    let mut details = Vec::with_capacity(candidates.len());
    for root in candidates {
        if let Some(detail) = resolve_details(&root).await {
            details.push(detail);
        }
    }
    rank(filter_by_range(details, range))
}

/// The best installed runtime satisfying `range`, if any.
pub async fn discover_best_jvm(
    range: &VersionReq,
    runtime_directory: &Path,
) -> Option<JvmDetails> {
    let ranked = scan_jvms(range, runtime_directory).await;
    match ranked.into_iter().next() {
        Some(detail) => {
            info!(
                "Selected Java {} at {}",
                detail.version_string,
                detail.path.display()
            );
            Some(detail)
        }
        None => {
            info!("No installed Java runtime satisfies the requested range");
            None
        }
    }
}

/// Resolves, downloads and unpacks a fresh JDK, returning its executable.
///
/// `on_progress` observes `(transferred, total)` bytes of the archive
/// download.
pub async fn provision_jdk<F>(
    distribution: JdkDistribution,
    major: u32,
    runtime_directory: &Path,
    download_config: &config::download::DownloadConfig,
    on_progress: F,
) -> Result<std::path::PathBuf>
where
    F: Fn(u64, u64),
{
    let asset = latest_jdk_asset(distribution, major, runtime_directory).await?;
    info!("Provisioning {} ({} bytes)", asset.id, asset.size);
    download::download_file(&asset, download_config, on_progress).await?;
    let destination = asset
        .path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| runtime_directory.to_path_buf());
    let executable = install_jdk_archive(&asset.path, &destination).await?;
    let _ = tokio::fs::remove_file(&asset.path).await;
    Ok(executable)
}
