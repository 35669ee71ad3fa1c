// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

//! Validation of a server's module tree against the distribution document.

use std::{collections::HashMap, io::Read, path::Path, str::FromStr};

use log::info;

use distribution::{Module, ModuleType, Server};
use download::{Asset, Checksum, filter_invalid_assets};
use folder::LauncherLocation;
use version::MinecraftVersion;

use crate::documents::persist_document;
use crate::error::*;
use crate::processor::{Category, InvalidAssets};

/// Forge builds above this never need their installer unpacked for the
/// overlay manifest.
const LEGACY_FORGE_CAP: [u32; 4] = [14, 23, 5, 2847];

pub struct DistributionIndexProcessor {
    layout: LauncherLocation,
    server: Server,
}

impl DistributionIndexProcessor {
    pub fn new(layout: LauncherLocation, server: Server) -> Self {
        Self { layout, server }
    }

    /// The distribution document is loaded by the orchestrator, nothing to
    /// acquire here.
    pub async fn init(&mut self) -> Result<()> {
        Ok(())
    }

    pub fn total_stages(&self) -> u64 {
        1
    }

    pub async fn validate(
        &mut self,
        on_stage_complete: &(dyn Fn() + Send + Sync),
    ) -> Result<InvalidAssets> {
        let mut candidates = Vec::new();
        for module in self.server.flat_modules() {
            candidates.push(module_asset(module, &self.server.id, &self.layout)?);
        }
        let invalid = filter_invalid_assets(candidates);
        info!(
            "Distribution validation found {} invalid file(s) for {}",
            invalid.len(),
            self.server.id
        );
        on_stage_complete();
        Ok(HashMap::from([(Category::Files, invalid)]))
    }

    /// Puts the mod loader's overlay `version.json` at its canonical path.
    pub async fn post_download(&mut self) -> Result<()> {
        let loader = match self
            .server
            .flat_modules()
            .into_iter()
            .find(|module| module.r#type.is_mod_loader())
        {
            Some(loader) => loader.clone(),
            None => {
                info!("Server {} carries no mod loader", self.server.id);
                return Ok(());
            }
        };
        // the Forge installer refuses to run without a profile store
        self.layout.common.seed_launcher_profiles();

        if uses_sibling_manifest(&loader, &self.server.minecraft_version)? {
            let manifest_module = loader
                .sub_modules
                .iter()
                .find(|module| module.r#type == ModuleType::VersionManifest)
                .ok_or(Error::MissingOverlayManifest)?;
            let path = manifest_module.resolve_path(&self.server.id, &self.layout)?;
            let manifest = version::Version::from_str(&tokio::fs::read_to_string(&path).await?)?;
            info!("Mod loader manifest {} is in place", manifest.id);
        } else {
            let archive = loader.resolve_path(&self.server.id, &self.layout)?;
            let bytes = read_zip_entry(&archive, "version.json")?;
            let manifest = version::Version::from_str(&String::from_utf8_lossy(&bytes))?;
            let target = self.layout.common.get_version_json(&manifest.id);
            persist_document(&target, &bytes).await?;
            info!("Extracted mod loader manifest {} from the installer", manifest.id);
        }
        Ok(())
    }
}

fn module_asset(module: &Module, server_id: &str, layout: &LauncherLocation) -> Result<Asset> {
    Ok(Asset {
        id: module.id.clone(),
        url: module.artifact.url.clone(),
        size: module.artifact.size,
        checksum: match &module.artifact.md5 {
            Some(md5) => Checksum::Md5(md5.to_lowercase()),
            None => Checksum::None,
        },
        path: module.resolve_path(server_id, layout)?,
    })
}

/// Fabric always ships the overlay as a sibling manifest module, Forge only
/// from Minecraft 1.13 or builds above the legacy cap.
fn uses_sibling_manifest(loader: &Module, minecraft_version: &str) -> Result<bool> {
    if loader.r#type == ModuleType::Fabric {
        return Ok(true);
    }
    let minecraft = MinecraftVersion::from_str(minecraft_version)?;
    if minecraft.at_least(1, 13, 0) {
        return Ok(true);
    }
    Ok(forge_version_components(loader)? > LEGACY_FORGE_CAP.to_vec())
}

fn forge_version_components(loader: &Module) -> Result<Vec<u32>> {
    let maven = loader.maven()?;
    let forge_part = maven
        .version
        .split('-')
        .nth(1)
        .ok_or_else(|| Error::MalformedForgeVersion(maven.version.clone()))?;
    forge_part
        .split('.')
        .map(|component| component.parse::<u32>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|_| Error::MalformedForgeVersion(maven.version.clone()))
}

fn read_zip_entry(archive_path: &Path, entry_name: &str) -> Result<Vec<u8>> {
    let file = std::fs::File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)?;
    let mut entry = archive
        .by_name(entry_name)
        .map_err(|_| Error::MissingOverlayManifest)?;
    let mut bytes = Vec::new();
    entry.read_to_end(&mut bytes)?;
    Ok(bytes)
}
