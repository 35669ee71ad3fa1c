// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

//! The publisher's distribution document: servers, module trees and the
//! rules that map both onto the local file system.

use std::{path::Path, str::FromStr};

use log::info;
use serde::{Deserialize, Serialize};

use folder::LauncherLocation;

mod error;
pub mod maven;
pub mod model;

pub use error::*;
pub use maven::*;
pub use model::*;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Distribution {
    pub version: Option<String>,
    pub servers: Vec<Server>,
}

impl FromStr for Distribution {
    type Err = Error;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        let distribution: Distribution = serde_json::from_str(raw)?;
        // a malformed address is a publishing mistake, surface it immediately
        for server in &distribution.servers {
            server.parse_address()?;
        }
        Ok(distribution)
    }
}

impl Distribution {
    /// Reads the locally persisted document, see
    /// [`LauncherLocation::get_distribution`] for where it lives.
    pub fn load(layout: &LauncherLocation, dev_mode: bool) -> Result<Self> {
        let path = layout.get_distribution(dev_mode);
        Self::load_path(&path)
    }

    pub fn load_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::MissingDocument(path.display().to_string()));
        }
        let raw = std::fs::read_to_string(path)?;
        let distribution = Self::from_str(&raw)?;
        info!(
            "Loaded distribution with {} server(s)",
            distribution.servers.len()
        );
        Ok(distribution)
    }

    /// The server marked `mainServer`, or the first one when nothing is
    /// marked.
    pub fn get_main_server(&self) -> Result<&Server> {
        self.servers
            .iter()
            .find(|server| server.main_server)
            .or_else(|| self.servers.first())
            .ok_or(Error::NoServers)
    }

    pub fn get_server(&self, id: &str) -> Result<&Server> {
        self.servers
            .iter()
            .find(|server| server.id == id)
            .ok_or(Error::ServerNotFound(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use platform::PLATFORM_INFO;

    const SAMPLE: &str = r#"{
        "version": "1.0.0",
        "servers": [
            {
                "id": "example-1",
                "address": "play.example.net",
                "minecraftVersion": "1.12.2",
                "modules": [
                    {
                        "id": "net.minecraftforge:forge:1.12.2-14.23.5.2847",
                        "type": "ForgeHosted",
                        "artifact": {
                            "size": 4464068,
                            "MD5": "c9a9f069fd89e9bb0aefcdd9cf5bbbfc",
                            "url": "https://files.example.net/forge.jar"
                        },
                        "subModules": [
                            {
                                "id": "example:config:1.0.0@zip",
                                "type": "File",
                                "artifact": {
                                    "size": 120,
                                    "MD5": "900150983cd24fb0d6963f7d28e17f72",
                                    "url": "https://files.example.net/config.zip",
                                    "path": "config/server.zip"
                                }
                            }
                        ]
                    }
                ]
            },
            {
                "id": "example-2",
                "address": "play.example.net:25570",
                "minecraftVersion": "1.20.1",
                "mainServer": true,
                "modules": []
            }
        ]
    }"#;

    #[test]
    fn marked_main_server_wins() {
        let distribution = Distribution::from_str(SAMPLE).unwrap();
        assert_eq!(distribution.get_main_server().unwrap().id, "example-2");
    }

    #[test]
    fn first_server_is_promoted_when_none_marked() {
        let mut distribution = Distribution::from_str(SAMPLE).unwrap();
        distribution.servers[1].main_server = false;
        assert_eq!(distribution.get_main_server().unwrap().id, "example-1");
    }

    #[test]
    fn addresses_parse_with_default_port() {
        let distribution = Distribution::from_str(SAMPLE).unwrap();
        let first = distribution.servers[0].parse_address().unwrap();
        assert_eq!(first.port, 25565);
        let second = distribution.servers[1].parse_address().unwrap();
        assert_eq!(second.port, 25570);
    }

    #[test]
    fn malformed_port_is_fatal() {
        let raw = SAMPLE.replace("play.example.net:25570", "play.example.net:notaport");
        assert!(matches!(
            Distribution::from_str(&raw),
            Err(Error::MalformedAddress(_))
        ));
    }

    #[test]
    fn module_paths_follow_type_rules() {
        let distribution = Distribution::from_str(SAMPLE).unwrap();
        let layout = LauncherLocation::from_root("/data");
        let server = distribution.get_server("example-1").unwrap();
        let modules = server.flat_modules();

        let forge = modules[0].resolve_path(&server.id, &layout).unwrap();
        assert_eq!(
            forge,
            Path::new("/data/common/libraries/net/minecraftforge/forge/1.12.2-14.23.5.2847/forge-1.12.2-14.23.5.2847.jar")
        );

        let file = modules[1].resolve_path(&server.id, &layout).unwrap();
        assert_eq!(
            file,
            Path::new("/data/instances/example-1/config/server.zip")
        );
    }

    #[test]
    fn version_manifest_module_lands_in_versions() {
        let module = Module {
            id: "net.minecraftforge:forge:1.12.2-14.23.5.2847:universal@json".to_string(),
            name: None,
            r#type: ModuleType::VersionManifest,
            artifact: Artifact {
                size: 100,
                md5: None,
                url: "https://files.example.net/version.json".to_string(),
                path: None,
            },
            sub_modules: vec![],
        };
        let layout = LauncherLocation::from_root("/data");
        assert_eq!(
            module.resolve_path("example-1", &layout).unwrap(),
            Path::new("/data/common/versions/1.12.2-14.23.5.2847/1.12.2-14.23.5.2847.json")
        );
    }

    #[test]
    fn platform_override_beats_server_level() {
        let options = JavaOptions {
            distribution: Some("ADOPTIUM".to_string()),
            supported: Some(">=17.x".to_string()),
            suggested_major: Some(17),
            platform_options: Some(vec![JavaPlatformOptions {
                platform: PLATFORM_INFO.os_family.to_string(),
                architecture: None,
                distribution: None,
                supported: Some(">=21.x".to_string()),
                suggested_major: Some(21),
            }]),
        };
        let effective = options.effective(&PLATFORM_INFO);
        assert_eq!(effective.supported.as_deref(), Some(">=21.x"));
        assert_eq!(effective.suggested_major, Some(21));
        // untouched fields fall back to the server level
        assert_eq!(effective.distribution.as_deref(), Some("ADOPTIUM"));
    }
}
