// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

//! The launcher folder layout parser

use std::{
    ffi::OsStr,
    fmt::Display,
    path::{Path, PathBuf},
};

use log::error;
use serde::Serialize;

/// The Forge installer refuses to run without this file next to the version
/// store, an empty profile set is enough to satisfy it.
const DEFAULT_LAUNCHER_PROFILE: &[u8] = b"{}";

#[derive(Debug, Clone, Serialize)]
/// The shared game file tree. All methods return paths below the common root
/// that every server installation reads from.
pub struct CommonLocation {
    pub root: PathBuf,
    pub libraries: PathBuf,
    pub assets: PathBuf,
    pub versions: PathBuf,
    pub modstore: PathBuf,
    pub fabric_mods: PathBuf,
}

impl CommonLocation {
    pub fn new<S: AsRef<OsStr> + ?Sized>(root: &S) -> CommonLocation {
        let root = Path::new(root);
        CommonLocation {
            root: root.to_path_buf(),
            assets: root.join("assets"),
            libraries: root.join("libraries"),
            versions: root.join("versions"),
            modstore: root.join("modstore"),
            fabric_mods: root.join("mods").join("fabric"),
        }
    }

    pub fn get_version_root<P: AsRef<Path>>(&self, version_id: P) -> PathBuf {
        self.versions.join(version_id)
    }

    pub fn get_version_json<P: AsRef<Path> + Display>(&self, version_id: P) -> PathBuf {
        self.get_version_root(&version_id)
            .join(format!("{version_id}.json"))
    }

    pub fn get_version_jar<P: AsRef<Path> + Display>(&self, version_id: P) -> PathBuf {
        self.get_version_root(&version_id)
            .join(format!("{version_id}.jar"))
    }

    pub fn get_library_by_path<P: AsRef<Path>>(&self, library_path: P) -> PathBuf {
        self.libraries.join(library_path)
    }

    pub fn get_asset_index(&self, index_id: &str) -> PathBuf {
        self.assets.join("indexes").join(format!("{index_id}.json"))
    }

    /// Content-addressed object store path: `assets/objects/<hh>/<hash>`.
    pub fn get_asset_object(&self, hash: &str) -> PathBuf {
        self.assets.join("objects").join(&hash[0..2]).join(hash)
    }

    pub fn get_log_config(&self, file_id: &str) -> PathBuf {
        self.assets.join("log_configs").join(file_id)
    }

    /// Seeds `launcher_profiles.json` if it is not already present.
    pub fn seed_launcher_profiles(&self) {
        let path = self.root.join("launcher_profiles.json");
        if path.exists() {
            return;
        }
        if let Some(parent) = path.parent()
            && std::fs::create_dir_all(parent).is_err()
        {
            error!("Unable to create the common directory");
            return;
        }
        if std::fs::write(&path, DEFAULT_LAUNCHER_PROFILE).is_err() {
            error!("Unable to write launcher_profiles.json, forge may not install properly")
        }
    }
}

/// Everything the launcher persists, rooted at the directories the embedding
/// application hands us.
#[derive(Debug, Clone, Serialize)]
pub struct LauncherLocation {
    /// Where `distribution.json` and launcher-level state live.
    pub root: PathBuf,
    pub common: CommonLocation,
    /// Per-server instance directories keyed by server id.
    pub instances: PathBuf,
    /// Installed Java runtimes, one subdirectory per architecture.
    pub runtime: PathBuf,
}

impl LauncherLocation {
    /// Builds a layout from explicitly supplied directories, the shape the
    /// repair worker receives over its command channel.
    pub fn new<S: AsRef<OsStr> + ?Sized>(launcher: &S, common: &S, instances: &S) -> Self {
        let root = Path::new(launcher).to_path_buf();
        Self {
            common: CommonLocation::new(common),
            instances: Path::new(instances).to_path_buf(),
            runtime: root.join("runtime"),
            root,
        }
    }

    /// Derives the conventional sub-tree below a single launcher root.
    pub fn from_root<S: AsRef<OsStr> + ?Sized>(root: &S) -> Self {
        let root = Path::new(root);
        Self::new(
            root.as_os_str(),
            root.join("common").as_os_str(),
            root.join("instances").as_os_str(),
        )
    }

    /// `distribution.json`, or the dev-mode variant next to it.
    pub fn get_distribution(&self, dev_mode: bool) -> PathBuf {
        if dev_mode {
            self.root.join("distribution_dev.json")
        } else {
            self.root.join("distribution.json")
        }
    }

    pub fn get_instance_root(&self, server_id: &str) -> PathBuf {
        self.instances.join(server_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_paths_follow_layout() {
        let common = CommonLocation::new("/data/common");
        assert_eq!(
            common.get_version_json("1.20.1"),
            PathBuf::from("/data/common/versions/1.20.1/1.20.1.json")
        );
        assert_eq!(
            common.get_version_jar("1.20.1"),
            PathBuf::from("/data/common/versions/1.20.1/1.20.1.jar")
        );
        assert_eq!(
            common.get_asset_object("d61f2a2b18f1f045a9de49fb788eb2f57b26fdf5"),
            PathBuf::from("/data/common/assets/objects/d6/d61f2a2b18f1f045a9de49fb788eb2f57b26fdf5")
        );
        assert_eq!(
            common.get_log_config("client-1.12.xml"),
            PathBuf::from("/data/common/assets/log_configs/client-1.12.xml")
        );
    }

    #[test]
    fn distribution_file_respects_dev_mode() {
        let location = LauncherLocation::from_root("/data");
        assert_eq!(
            location.get_distribution(false),
            PathBuf::from("/data/distribution.json")
        );
        assert_eq!(
            location.get_distribution(true),
            PathBuf::from("/data/distribution_dev.json")
        );
    }

    #[test]
    fn seed_launcher_profiles_writes_empty_object() {
        let dir = tempfile::tempdir().expect("temp dir");
        let common = CommonLocation::new(dir.path().join("common").as_os_str());
        common.seed_launcher_profiles();
        let contents =
            std::fs::read_to_string(common.root.join("launcher_profiles.json")).expect("seeded");
        assert_eq!(contents, "{}");
    }
}
