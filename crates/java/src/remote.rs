// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

//! Resolving downloadable JDK builds from the supported distributions.

use std::{path::Path, str::FromStr};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use download::{Asset, Checksum};
use platform::{OsFamily, PLATFORM_INFO};
use shared::HTTP_CLIENT;

use crate::error::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JdkDistribution {
    Adoptium,
    Corretto,
}

impl FromStr for JdkDistribution {
    type Err = Error;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw {
            "ADOPTIUM" => Ok(Self::Adoptium),
            "CORRETTO" => Ok(Self::Corretto),
            other => Err(Error::UnknownDistribution(other.to_string())),
        }
    }
}

impl JdkDistribution {
    /// Corretto publishes notarized macOS builds, everywhere else Adoptium
    /// is the default.
    pub fn default_for_platform() -> Self {
        match PLATFORM_INFO.os_family {
            OsFamily::Macos => Self::Corretto,
            _ => Self::Adoptium,
        }
    }
}

/// Resolves the newest build of `major` for the host platform into a
/// download [`Asset`] rooted below `runtime_directory`.
pub async fn latest_jdk_asset(
    distribution: JdkDistribution,
    major: u32,
    runtime_directory: &Path,
) -> Result<Asset> {
    match distribution {
        JdkDistribution::Adoptium => latest_adoptium(major, runtime_directory).await,
        JdkDistribution::Corretto => latest_corretto(major, runtime_directory).await,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AdoptiumAsset {
    pub binary: AdoptiumBinary,
    pub version: AdoptiumVersionData,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AdoptiumBinary {
    pub os: String,
    pub architecture: String,
    pub image_type: String,
    pub package: AdoptiumPackage,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AdoptiumPackage {
    pub name: String,
    pub link: String,
    pub size: u64,
    pub checksum: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct AdoptiumVersionData {
    pub major: u32,
}

fn adoptium_os_name() -> &'static str {
    match PLATFORM_INFO.os_family {
        OsFamily::Windows => "windows",
        OsFamily::Macos => "mac",
        OsFamily::Linux => "linux",
    }
}

pub(crate) fn pick_adoptium_asset(
    assets: Vec<AdoptiumAsset>,
    major: u32,
    os: &str,
    arch: &str,
) -> Option<AdoptiumAsset> {
    assets.into_iter().find(|asset| {
        asset.version.major == major
            && asset.binary.os == os
            && asset.binary.image_type == "jdk"
            && asset.binary.architecture == arch
    })
}

async fn latest_adoptium(major: u32, runtime_directory: &Path) -> Result<Asset> {
    let url =
        format!("https://api.adoptium.net/v3/assets/latest/{major}/hotspot?vendor=eclipse");
    info!("Resolving Adoptium JDK {major}");
    let assets: Vec<AdoptiumAsset> = HTTP_CLIENT.get(&url).send().await?.json().await?;
    let arch = &PLATFORM_INFO.arch;
    let asset = pick_adoptium_asset(assets, major, adoptium_os_name(), arch)
        .ok_or_else(|| Error::NoRemoteBuild(format!("Adoptium {major}")))?;
    Ok(Asset {
        id: asset.binary.package.name.clone(),
        url: asset.binary.package.link,
        size: asset.binary.package.size,
        checksum: Checksum::Sha256(asset.binary.package.checksum),
        path: runtime_directory.join(arch).join(asset.binary.package.name),
    })
}

fn corretto_os_name() -> &'static str {
    match PLATFORM_INFO.os_family {
        OsFamily::Windows => "windows",
        OsFamily::Macos => "macos",
        OsFamily::Linux => "linux",
    }
}

fn corretto_extension() -> &'static str {
    match PLATFORM_INFO.os_family {
        OsFamily::Windows => "zip",
        _ => "tar.gz",
    }
}

pub(crate) fn corretto_artifact_name(major: u32) -> String {
    format!(
        "amazon-corretto-{major}-{}-{}-jdk.{}",
        PLATFORM_INFO.arch,
        corretto_os_name(),
        corretto_extension()
    )
}

async fn latest_corretto(major: u32, runtime_directory: &Path) -> Result<Asset> {
    let artifact = corretto_artifact_name(major);
    let url = format!("https://corretto.aws/downloads/latest/{artifact}");
    info!("Resolving Corretto JDK {major}");

    // HEAD follows the redirect so the final URL names the exact release
    let head = HTTP_CLIENT.head(&url).send().await?;
    if !head.status().is_success() {
        return Err(Error::NoRemoteBuild(format!("Corretto {major}")));
    }
    let final_url = head.url().clone();
    let name = final_url
        .path_segments()
        .and_then(|segments| segments.filter(|segment| !segment.is_empty()).next_back())
        .unwrap_or(artifact.as_str())
        .to_string();
    let size = head.content_length().unwrap_or_else(|| {
        warn!("Corretto did not report a content length for {name}");
        0
    });

    let checksum_url = format!("https://corretto.aws/downloads/latest_checksum/{artifact}");
    let md5 = HTTP_CLIENT
        .get(&checksum_url)
        .send()
        .await?
        .text()
        .await?
        .trim()
        .to_lowercase();

    Ok(Asset {
        id: name.clone(),
        url: final_url.to_string(),
        size,
        checksum: Checksum::Md5(md5),
        path: runtime_directory.join(&PLATFORM_INFO.arch).join(name),
    })
}
