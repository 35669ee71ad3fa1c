// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

use std::path::Path;

use log::{debug, error, info};
use serde::{Deserialize, Serialize};

pub mod download;
pub mod error;

use error::*;

/// Reads the core configuration file from disk.
///
/// If the file does not exist or cannot be understood, a default
/// configuration is generated and saved back.
pub fn load_config_file(config_file_path: &Path) -> Result<CoreConfig> {
    if !config_file_path.exists() {
        info!("No config file, using default config");
        return reset_config(config_file_path);
    }
    let data = match std::fs::read_to_string(config_file_path) {
        Ok(x) => x,
        Err(_) => {
            error!("Could not read config file, reset it");
            return reset_config(config_file_path);
        }
    };
    if let Ok(config) = toml::from_str::<CoreConfig>(&data) {
        info!("Loaded config from file");
        let write_back_data = toml::to_string_pretty(&config)?;
        std::fs::write(config_file_path, write_back_data)?;
        Ok(config)
    } else {
        error!("Config file is not a toml file, reset it");
        reset_config(config_file_path)
    }
}

pub fn reset_config(config_file_path: &Path) -> Result<CoreConfig> {
    let default_config = CoreConfig::default();
    let data = toml::to_string_pretty(&default_config)?;
    if let Some(parent) = config_file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(config_file_path, data)?;
    Ok(default_config)
}

/// Saves the current configuration to the configuration file.
pub fn save_config(config: &CoreConfig, config_file_path: &Path) -> Result<()> {
    let data = toml::to_string_pretty(config)?;
    std::fs::write(config_file_path, data)?;
    debug!("Saved config to file");
    Ok(())
}

/// The core configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CoreConfig {
    /// Whether to load the dev-mode distribution document by default.
    #[serde(default)]
    pub dev_mode: bool,

    /// Download-related configuration.
    #[serde(default)]
    pub download: download::DownloadConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            dev_mode: false,
            download: download::DownloadConfig::default(),
        }
    }
}
