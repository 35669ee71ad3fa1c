// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

//! Validation against the game vendor's own indexes: assets, libraries,
//! the client jar and the log config.

use std::collections::HashMap;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use download::{Asset, Checksum, filter_invalid_assets};
use folder::{CommonLocation, LauncherLocation};
use version::{AssetIndexObject, Libraries, Version};

use crate::documents::{fetch_document, load_cached_document};
use crate::error::*;
use crate::processor::{Category, InvalidAssets};

const VERSION_MANIFEST_URL: &str =
    "https://piston-meta.mojang.com/mc/game/version_manifest_v2.json";
const ASSET_CDN: &str = "https://resources.download.minecraft.net";

#[derive(Clone, Deserialize, Serialize)]
pub struct VersionManifest {
    pub latest: LatestVersion,
    pub versions: Vec<VersionInfo>,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct LatestVersion {
    pub release: String,
    pub snapshot: String,
}

#[derive(Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub id: String,
    pub r#type: String,
    pub url: String,
    pub time: String,
    pub release_time: String,
    pub sha1: String,
    pub compliance_level: u8,
}

pub struct VendorIndexProcessor {
    layout: LauncherLocation,
    version_id: String,
    pub(crate) version: Option<Version>,
    pub(crate) asset_index: Option<AssetIndexObject>,
}

impl VendorIndexProcessor {
    pub fn new(layout: LauncherLocation, version_id: &str) -> Self {
        Self {
            layout,
            version_id: version_id.to_string(),
            version: None,
            asset_index: None,
        }
    }

    pub async fn init(&mut self) -> Result<()> {
        let manifest = self.load_version_manifest().await;
        let version = self.load_version_json(manifest).await?;
        self.asset_index = Some(self.load_asset_index(&version).await?);
        self.version = Some(version);
        Ok(())
    }

    pub fn total_stages(&self) -> u64 {
        4
    }

    pub async fn validate(
        &mut self,
        on_stage_complete: &(dyn Fn() + Send + Sync),
    ) -> Result<InvalidAssets> {
        let version = self.version.as_ref().ok_or(Error::InitNotRun)?;
        let asset_index = self.asset_index.as_ref().ok_or(Error::InitNotRun)?;
        let common = &self.layout.common;

        let mut invalid = HashMap::new();
        invalid.insert(
            Category::Assets,
            filter_invalid_assets(assets_from_index(asset_index, common)),
        );
        on_stage_complete();
        invalid.insert(
            Category::Libraries,
            filter_invalid_assets(libraries_from_version(version, common)?),
        );
        on_stage_complete();
        invalid.insert(
            Category::Client,
            filter_invalid_assets(client_from_version(version, common)?),
        );
        on_stage_complete();
        invalid.insert(
            Category::Misc,
            filter_invalid_assets(log_config_from_version(version, common)),
        );
        on_stage_complete();

        let total: usize = invalid.values().map(Vec::len).sum();
        info!("Vendor index validation found {total} invalid file(s)");
        Ok(invalid)
    }

    /// The vendor's documents need no finalization.
    pub async fn post_download(&mut self) -> Result<()> {
        Ok(())
    }

    async fn load_version_manifest(&self) -> Option<VersionManifest> {
        match fetch_document(VERSION_MANIFEST_URL).await {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(manifest) => Some(manifest),
                Err(error) => {
                    warn!("Version manifest did not parse: {error}");
                    None
                }
            },
            Err(error) => {
                warn!("Version manifest unreachable: {error}");
                None
            }
        }
    }

    async fn load_version_json(&self, manifest: Option<VersionManifest>) -> Result<Version> {
        let path = self.layout.common.get_version_json(&self.version_id);
        match manifest {
            Some(manifest) => {
                let info = manifest
                    .versions
                    .into_iter()
                    .find(|info| info.id == self.version_id)
                    .ok_or_else(|| Error::VersionNotFound(self.version_id.clone()))?;
                let bytes = load_cached_document(&path, &info.url, Some(&info.sha1)).await?;
                Ok(serde_json::from_slice(&bytes)?)
            }
            None if path.is_file() => {
                info!("Working from the locally cached version json");
                Ok(serde_json::from_slice(&tokio::fs::read(&path).await?)?)
            }
            None => Err(Error::ManifestUnreachable),
        }
    }

    async fn load_asset_index(&self, version: &Version) -> Result<AssetIndexObject> {
        let meta = version
            .asset_index
            .as_ref()
            .ok_or_else(|| version::Error::InvalidVersionJson("assetIndex".to_string()))?;
        let path = self.layout.common.get_asset_index(&meta.id);
        let bytes = load_cached_document(&path, &meta.url, Some(&meta.sha1)).await?;
        let document: serde_json::Value = serde_json::from_slice(&bytes)?;
        Ok(serde_json::from_value(document["objects"].clone())?)
    }
}

pub(crate) fn assets_from_index(index: &AssetIndexObject, common: &CommonLocation) -> Vec<Asset> {
    index
        .iter()
        .map(|(logical_name, info)| Asset {
            id: logical_name.clone(),
            url: format!("{ASSET_CDN}/{}/{}", &info.hash[0..2], info.hash),
            size: info.size,
            checksum: Checksum::Sha1(info.hash.clone()),
            path: common.get_asset_object(&info.hash),
        })
        .collect()
}

pub(crate) fn libraries_from_version(
    version: &Version,
    common: &CommonLocation,
) -> Result<Vec<Asset>> {
    let raw = version.libraries.clone().unwrap_or_default();
    Ok(Libraries::new(raw)
        .to_resolved()?
        .into_iter()
        .map(|library| Asset {
            id: library.download_info.path.clone(),
            size: library.download_info.size.unwrap_or(0),
            checksum: match &library.download_info.sha1 {
                Some(sha1) => Checksum::Sha1(sha1.clone()),
                None => Checksum::None,
            },
            path: common.get_library_by_path(&library.download_info.path),
            url: library.download_info.url,
        })
        .collect())
}

pub(crate) fn client_from_version(version: &Version, common: &CommonLocation) -> Result<Vec<Asset>> {
    let client = version.client_download()?;
    Ok(vec![Asset {
        id: format!("{}.jar", version.id),
        url: client.url.clone(),
        size: client.size,
        checksum: Checksum::Sha1(client.sha1.clone()),
        path: common.get_version_jar(&version.id),
    }])
}

pub(crate) fn log_config_from_version(version: &Version, common: &CommonLocation) -> Vec<Asset> {
    match version.client_logging() {
        Some(logging) => vec![Asset {
            id: logging.file.id.clone(),
            url: logging.file.url.clone(),
            size: logging.file.size,
            checksum: Checksum::Sha1(logging.file.sha1.clone()),
            path: common.get_log_config(&logging.file.id),
        }],
        None => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use std::sync::atomic::{AtomicU64, Ordering};

    const VERSION_JSON: &str = r#"{
        "id": "1.15.2",
        "assetIndex": {
            "id": "1.15",
            "sha1": "5c685c5ffc5b0a6e59f05c280f0c08edd119d33f",
            "size": 233644,
            "totalSize": 261812358,
            "url": "https://piston-meta.mojang.com/v1/packages/5c685c5ffc5b0a6e59f05c280f0c08edd119d33f/1.15.json"
        },
        "downloads": {
            "client": {
                "sha1": "e3f78cf389f9a16f1119ab2252c06e5a74373f0f",
                "size": 30265692,
                "url": "https://piston-data.mojang.com/v1/objects/e3f78cf389f9a16f1119ab2252c06e5a74373f0f/client.jar"
            }
        },
        "libraries": [
            {
                "name": "com.mojang:patchy:1.1",
                "downloads": {
                    "artifact": {
                        "path": "com/mojang/patchy/1.1/patchy-1.1.jar",
                        "sha1": "aef610b34a1be37fa851825f12372b78424d8903",
                        "size": 15817,
                        "url": "https://libraries.minecraft.net/com/mojang/patchy/1.1/patchy-1.1.jar"
                    }
                }
            }
        ],
        "logging": {
            "client": {
                "argument": "-Dlog4j.configurationFile=${path}",
                "file": {
                    "id": "client-1.12.xml",
                    "sha1": "bd65e7d2e3c237be76cfbef4c2405033d7f91521",
                    "size": 888,
                    "url": "https://piston-data.mojang.com/v1/objects/bd65e7d2e3c237be76cfbef4c2405033d7f91521/client-1.12.xml"
                }
            }
        },
        "mainClass": "net.minecraft.client.main.Main"
    }"#;

    fn sample_index() -> AssetIndexObject {
        serde_json::from_str(
            r#"{
                "icons/icon_16x16.png": {
                    "hash": "bdf48ef6b5d0d23bbb02e17d04865216179f510a",
                    "size": 3665
                },
                "minecraft/sounds/ambient/cave/cave1.ogg": {
                    "hash": "c77cbb6d8ee2b1f74423b19286c3a2b533f244a4",
                    "size": 22054
                }
            }"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn validate_reports_all_categories_on_an_empty_tree() {
        let dir = tempfile::tempdir().unwrap();
        let layout = LauncherLocation::from_root(dir.path().as_os_str());
        let mut processor = VendorIndexProcessor::new(layout, "1.15.2");
        processor.version = Some(Version::from_str(VERSION_JSON).unwrap());
        processor.asset_index = Some(sample_index());

        let stages = AtomicU64::new(0);
        let invalid = processor
            .validate(&|| {
                stages.fetch_add(1, Ordering::SeqCst);
            })
            .await
            .unwrap();

        assert_eq!(stages.load(Ordering::SeqCst), processor.total_stages());
        assert_eq!(invalid.get(&Category::Assets).unwrap().len(), 2);
        assert_eq!(invalid.get(&Category::Libraries).unwrap().len(), 1);
        assert_eq!(invalid.get(&Category::Client).unwrap().len(), 1);
        assert_eq!(invalid.get(&Category::Misc).unwrap().len(), 1);
    }

    #[test]
    fn asset_paths_and_urls_are_content_addressed() {
        let dir = tempfile::tempdir().unwrap();
        let layout = LauncherLocation::from_root(dir.path().as_os_str());
        let assets = assets_from_index(&sample_index(), &layout.common);
        let icon = assets
            .iter()
            .find(|asset| asset.id == "icons/icon_16x16.png")
            .unwrap();
        assert_eq!(
            icon.url,
            "https://resources.download.minecraft.net/bd/bdf48ef6b5d0d23bbb02e17d04865216179f510a"
        );
        assert!(icon.path.ends_with("assets/objects/bd/bdf48ef6b5d0d23bbb02e17d04865216179f510a"));
        assert_eq!(icon.size, 3665);
    }

    #[test]
    fn client_asset_targets_versions_tree() {
        let dir = tempfile::tempdir().unwrap();
        let layout = LauncherLocation::from_root(dir.path().as_os_str());
        let version = Version::from_str(VERSION_JSON).unwrap();
        let client = client_from_version(&version, &layout.common).unwrap();
        assert_eq!(client.len(), 1);
        assert!(client[0].path.ends_with("versions/1.15.2/1.15.2.jar"));

        let log_config = log_config_from_version(&version, &layout.common);
        assert_eq!(log_config.len(), 1);
        assert!(log_config[0]
            .path
            .ends_with("assets/log_configs/client-1.12.xml"));
    }
}
