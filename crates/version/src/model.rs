// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

use std::{cmp::Ordering, collections::HashMap, str::FromStr};

use crate::error::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetIndex {
    pub id: String,
    pub sha1: String,
    pub size: u64,
    pub url: String,
    pub total_size: Option<u64>,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct Download {
    pub sha1: String,
    pub size: u64,
    pub url: String,
}

#[derive(Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaVersion {
    pub component: String,
    pub major_version: i32,
}

impl Default for JavaVersion {
    fn default() -> Self {
        Self {
            component: "jre-legacy".to_string(),
            major_version: 8,
        }
    }
}

#[derive(Clone, Deserialize, Serialize)]
pub struct Logging {
    pub file: LoggingFileDownload,
    pub argument: String,
    pub r#type: String,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct LoggingFileDownload {
    pub id: String,
    pub sha1: String,
    pub size: u64,
    pub url: String,
}

/// The raw json format provided by Minecraft.
///
/// Mod loaders ship partial documents of the same shape that point at their
/// base game version through `inherits_from`.
#[derive(Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub id: String,
    pub time: Option<String>,
    pub r#type: Option<String>,
    pub release_time: Option<String>,
    pub inherits_from: Option<String>,
    pub minimum_launcher_version: Option<i32>,
    pub main_class: Option<String>,
    pub libraries: Option<Vec<Value>>,
    pub jar: Option<String>,
    pub asset_index: Option<AssetIndex>,
    pub assets: Option<String>,
    pub downloads: Option<HashMap<String, Download>>,
    pub logging: Option<HashMap<String, Logging>>,
    pub java_version: Option<JavaVersion>,
}

impl FromStr for Version {
    type Err = crate::Error;
    fn from_str(raw: &str) -> std::result::Result<Version, crate::Error> {
        Ok(serde_json::from_str(raw)?)
    }
}

impl Version {
    pub fn client_download(&self) -> Result<&Download> {
        self.downloads
            .as_ref()
            .and_then(|downloads| downloads.get("client"))
            .ok_or(Error::InvalidVersionJson("downloads.client".to_string()))
    }

    pub fn client_logging(&self) -> Option<&Logging> {
        self.logging
            .as_ref()
            .and_then(|logging| logging.get("client"))
    }
}

#[derive(Clone, Deserialize, Serialize)]
pub struct AssetIndexObjectInfo {
    pub hash: String,
    pub size: u64,
}

pub type AssetIndexObject = HashMap<String, AssetIndexObjectInfo>;

/// Minecraft Version
///
/// It used to compare the version of the game
#[derive(Debug, Clone, Serialize, PartialEq)]
pub enum MinecraftVersion {
    Release(u8, u8, Option<u8>),
    Snapshot(u8, u8, String),
    Unknown(String),
}

impl FromStr for MinecraftVersion {
    type Err = Error;
    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        parse_version(raw)
    }
}

impl MinecraftVersion {
    /// Release ordering against `(major, minor, patch)`. Snapshots and
    /// unparsable versions are not comparable.
    pub fn compare_release(&self, major: u8, minor: u8, patch: u8) -> Option<Ordering> {
        match self {
            Self::Release(own_major, own_minor, own_patch) => Some(
                (*own_major, *own_minor, own_patch.unwrap_or(0)).cmp(&(major, minor, patch)),
            ),
            _ => None,
        }
    }

    /// Whether this is a release at or above `(major, minor, patch)`.
    pub fn at_least(&self, major: u8, minor: u8, patch: u8) -> bool {
        matches!(
            self.compare_release(major, minor, patch),
            Some(Ordering::Greater) | Some(Ordering::Equal)
        )
    }
}

fn parse_version(raw: &str) -> Result<MinecraftVersion> {
    if raw.contains(".") {
        let split = raw.split(".").collect::<Vec<&str>>();
        Ok(MinecraftVersion::Release(
            #[allow(clippy::get_first)]
            split
                .get(0)
                .ok_or(Error::InvalidMinecraftVersion)?
                .parse()
                .map_err(|_| Error::InvalidMinecraftVersion)?,
            split
                .get(1)
                .ok_or(Error::InvalidMinecraftVersion)?
                .parse()
                .map_err(|_| Error::InvalidMinecraftVersion)?,
            match split.get(2) {
                Some(x) => Some(x.parse().map_err(|_| Error::InvalidMinecraftVersion)?),
                None => None,
            },
        ))
    } else if raw.contains("w") {
        let split = raw.split("w").collect::<Vec<&str>>();
        let minor_version = split.get(1).ok_or(Error::InvalidMinecraftVersion)?;
        Ok(MinecraftVersion::Snapshot(
            split
                .first()
                .ok_or(Error::InvalidMinecraftVersion)?
                .parse()
                .map_err(|_| Error::InvalidMinecraftVersion)?,
            (minor_version[..2])
                .parse()
                .map_err(|_| Error::InvalidMinecraftVersion)?,
            (minor_version[2..]).to_string(),
        ))
    } else {
        Ok(MinecraftVersion::Unknown(raw.to_string()))
    }
}
