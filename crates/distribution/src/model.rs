// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

use std::{fmt::Display, path::PathBuf, str::FromStr};

use serde::{Deserialize, Serialize};

use folder::LauncherLocation;
use platform::{PLATFORM_INFO, PlatformInfo};

use crate::error::*;
use crate::maven::MavenComponents;

/// What a module is, which decides where it lands on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleType {
    Library,
    Forge,
    ForgeHosted,
    Fabric,
    ForgeMod,
    LiteMod,
    FabricMod,
    File,
    VersionManifest,
    LiteLoader,
}

impl ModuleType {
    /// Forge, ForgeHosted and Fabric overlay the base version manifest.
    pub fn is_mod_loader(&self) -> bool {
        matches!(self, Self::Forge | Self::ForgeHosted | Self::Fabric)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    pub size: u64,
    #[serde(rename = "MD5")]
    pub md5: Option<String>,
    pub url: String,
    /// Explicit relative path, overrides the Maven-derived one.
    pub path: Option<String>,
}

/// A node in a server's tree of required artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    /// Either a Maven coordinate or a plain identifier (File modules only).
    pub id: String,
    pub name: Option<String>,
    pub r#type: ModuleType,
    pub artifact: Artifact,
    #[serde(default)]
    pub sub_modules: Vec<Module>,
}

impl Module {
    pub fn maven(&self) -> Result<MavenComponents> {
        self.id.parse()
    }

    /// The version id a `VersionManifest` module's document describes, taken
    /// from the version component of the Maven coordinate.
    pub fn version_id(&self) -> Result<String> {
        Ok(self.maven()?.version)
    }

    fn relative_path(&self) -> Result<String> {
        match &self.artifact.path {
            Some(path) => Ok(path.clone()),
            None => Ok(self.maven()?.to_path()),
        }
    }

    /// Computes the effective on-disk location for this module.
    ///
    /// Sub-modules inherit `server_id`, File modules land inside that
    /// server's instance directory while everything else is shared.
    pub fn resolve_path(&self, server_id: &str, layout: &LauncherLocation) -> Result<PathBuf> {
        Ok(match self.r#type {
            ModuleType::Library
            | ModuleType::Forge
            | ModuleType::ForgeHosted
            | ModuleType::Fabric
            | ModuleType::LiteLoader => layout.common.get_library_by_path(self.relative_path()?),
            ModuleType::ForgeMod | ModuleType::LiteMod => {
                layout.common.modstore.join(self.relative_path()?)
            }
            ModuleType::FabricMod => layout.common.fabric_mods.join(self.relative_path()?),
            ModuleType::VersionManifest => layout.common.get_version_json(self.version_id()?),
            ModuleType::File => layout
                .get_instance_root(server_id)
                .join(self.relative_path()?),
        })
    }
}

/// `host[:port]`, port defaulting to the vanilla server port.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
}

impl FromStr for ServerAddress {
    type Err = Error;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        match raw.split_once(':') {
            None => Ok(Self {
                host: raw.to_string(),
                port: 25565,
            }),
            Some((host, port)) => Ok(Self {
                host: host.to_string(),
                port: port
                    .parse()
                    .map_err(|_| Error::MalformedAddress(raw.to_string()))?,
            }),
        }
    }
}

impl Display for ServerAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaPlatformOptions {
    pub platform: String,
    pub architecture: Option<String>,
    pub distribution: Option<String>,
    pub supported: Option<String>,
    pub suggested_major: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JavaOptions {
    pub distribution: Option<String>,
    /// A semver range the runtime must satisfy, e.g. `>=17.x`.
    pub supported: Option<String>,
    pub suggested_major: Option<u32>,
    pub platform_options: Option<Vec<JavaPlatformOptions>>,
}

/// Server-level Java requirements with the platform-specific override, if
/// any, already applied.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct EffectiveJavaOptions {
    pub distribution: Option<String>,
    pub supported: Option<String>,
    pub suggested_major: Option<u32>,
}

impl JavaOptions {
    pub fn effective(&self, platform_info: &PlatformInfo) -> EffectiveJavaOptions {
        let platform_override = self.platform_options.as_ref().and_then(|options| {
            options.iter().find(|option| {
                option.platform == platform_info.os_family.to_string()
                    && option
                        .architecture
                        .as_ref()
                        .is_none_or(|architecture| architecture == &platform_info.arch)
            })
        });
        match platform_override {
            Some(option) => EffectiveJavaOptions {
                distribution: option
                    .distribution
                    .clone()
                    .or_else(|| self.distribution.clone()),
                supported: option.supported.clone().or_else(|| self.supported.clone()),
                suggested_major: option.suggested_major.or(self.suggested_major),
            },
            None => EffectiveJavaOptions {
                distribution: self.distribution.clone(),
                supported: self.supported.clone(),
                suggested_major: self.suggested_major,
            },
        }
    }
}

/// A logical game server and its required artifact tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    pub id: String,
    pub name: Option<String>,
    pub address: String,
    pub minecraft_version: String,
    #[serde(default)]
    pub main_server: bool,
    pub java_options: Option<JavaOptions>,
    #[serde(default)]
    pub modules: Vec<Module>,
}

impl Server {
    pub fn parse_address(&self) -> Result<ServerAddress> {
        self.address.parse()
    }

    pub fn effective_java_options(&self) -> EffectiveJavaOptions {
        self.java_options
            .as_ref()
            .map(|options| options.effective(&PLATFORM_INFO))
            .unwrap_or_default()
    }

    /// Depth-first walk over the module tree.
    pub fn flat_modules(&self) -> Vec<&Module> {
        fn walk<'a>(module: &'a Module, into: &mut Vec<&'a Module>) {
            into.push(module);
            for sub_module in &module.sub_modules {
                walk(sub_module, into);
            }
        }
        let mut result = Vec::new();
        for module in &self.modules {
            walk(module, &mut result);
        }
        result
    }
}
