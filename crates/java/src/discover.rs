// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

//! Where Java installations hide on each platform.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use log::debug;
use platform::{OsFamily, PLATFORM_INFO};

/// Relative path of the launch executable below an installation root.
pub fn executable_relative_path() -> &'static str {
    match PLATFORM_INFO.os_family {
        OsFamily::Windows => "bin/javaw.exe",
        OsFamily::Macos => "Contents/Home/bin/java",
        OsFamily::Linux => "bin/java",
    }
}

/// Whether `root` actually carries a Java executable.
pub fn has_executable(root: &Path) -> bool {
    root.join(executable_relative_path()).is_file()
}

/// A single way of locating candidate installation roots. Strategies are
/// cheap and purely local, they never talk to the network.
pub trait DiscoveryStrategy {
    fn discover(&self) -> HashSet<PathBuf>;
}

/// Tests a fixed list of absolute paths for the per-OS executable.
pub struct PathBasedStrategy {
    paths: Vec<PathBuf>,
}

impl PathBasedStrategy {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl DiscoveryStrategy for PathBasedStrategy {
    fn discover(&self) -> HashSet<PathBuf> {
        self.paths
            .iter()
            .filter(|path| has_executable(path))
            .cloned()
            .collect()
    }
}

/// Lists each given directory and offers every child as a candidate root.
pub struct DirectoryBasedStrategy {
    directories: Vec<PathBuf>,
}

impl DirectoryBasedStrategy {
    pub fn new(directories: Vec<PathBuf>) -> Self {
        Self { directories }
    }
}

impl DiscoveryStrategy for DirectoryBasedStrategy {
    fn discover(&self) -> HashSet<PathBuf> {
        let mut result = HashSet::new();
        for directory in &self.directories {
            let Ok(entries) = std::fs::read_dir(directory) else {
                continue;
            };
            for entry in entries.flatten() {
                let candidate = entry.path();
                if has_executable(&candidate) {
                    result.insert(candidate);
                }
            }
        }
        result
    }
}

const HOME_VARIABLES: [&str; 3] = ["JAVA_HOME", "JRE_HOME", "JDK_HOME"];

/// Reads the conventional `*_HOME` variables, stripping `bin/java`-like
/// suffixes people sometimes point them at.
pub struct EnvironmentBasedStrategy;

impl DiscoveryStrategy for EnvironmentBasedStrategy {
    fn discover(&self) -> HashSet<PathBuf> {
        let mut result = HashSet::new();
        for variable in HOME_VARIABLES {
            let Ok(value) = std::env::var(variable) else {
                continue;
            };
            let candidate = strip_executable_suffix(PathBuf::from(value));
            if has_executable(&candidate) {
                result.insert(candidate);
            }
        }
        result
    }
}

fn strip_executable_suffix(mut path: PathBuf) -> PathBuf {
    let is_executable_name = |name: &str| {
        name.eq_ignore_ascii_case("java")
            || name.eq_ignore_ascii_case("java.exe")
            || name.eq_ignore_ascii_case("javaw.exe")
    };
    if path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(is_executable_name)
    {
        path.pop();
    }
    if path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.eq_ignore_ascii_case("bin"))
    {
        path.pop();
    }
    path
}

/// Enumerates the `HKLM\SOFTWARE\JavaSoft` version keys. A no-op outside
/// Windows.
pub struct RegistryBasedStrategy;

impl DiscoveryStrategy for RegistryBasedStrategy {
    #[cfg(windows)]
    fn discover(&self) -> HashSet<PathBuf> {
        use winreg::RegKey;
        use winreg::enums::HKEY_LOCAL_MACHINE;

        const REGISTRY_KEYS: [&str; 4] = [
            r"SOFTWARE\JavaSoft\Java Runtime Environment",
            r"SOFTWARE\JavaSoft\Java Development Kit",
            r"SOFTWARE\JavaSoft\JRE",
            r"SOFTWARE\JavaSoft\JDK",
        ];

        let mut result = HashSet::new();
        let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
        for key_path in REGISTRY_KEYS {
            let Ok(key) = hklm.open_subkey(key_path) else {
                continue;
            };
            for version_key in key.enum_keys().flatten() {
                let Ok(version) = key.open_subkey(&version_key) else {
                    continue;
                };
                let Ok(java_home) = version.get_value::<String, _>("JavaHome") else {
                    continue;
                };
                // 32-bit installations live under Program Files (x86)
                if java_home.contains("(x86)") {
                    continue;
                }
                result.insert(PathBuf::from(java_home));
            }
        }
        result
    }

    #[cfg(not(windows))]
    fn discover(&self) -> HashSet<PathBuf> {
        HashSet::new()
    }
}

#[cfg(windows)]
fn mounted_roots() -> Vec<PathBuf> {
    (b'A'..=b'Z')
        .map(|letter| PathBuf::from(format!("{}:\\", letter as char)))
        .filter(|root| root.exists())
        .collect()
}

#[cfg(not(windows))]
fn mounted_roots() -> Vec<PathBuf> {
    Vec::new()
}

const WINDOWS_VENDOR_DIRECTORIES: [&str; 5] = [
    "Program Files\\Java",
    "Program Files\\Eclipse Adoptium",
    "Program Files\\Eclipse Foundation",
    "Program Files\\AdoptOpenJDK",
    "Program Files\\Amazon Corretto",
];

/// The per-OS strategy composition.
pub fn discovery_strategies(runtime_directory: &Path) -> Vec<Box<dyn DiscoveryStrategy>> {
    match PLATFORM_INFO.os_family {
        OsFamily::Windows => {
            let mut directories = vec![runtime_directory.to_path_buf()];
            for root in mounted_roots() {
                for vendor in WINDOWS_VENDOR_DIRECTORIES {
                    directories.push(root.join(vendor));
                }
            }
            vec![
                Box::new(EnvironmentBasedStrategy),
                Box::new(DirectoryBasedStrategy::new(directories)),
                Box::new(RegistryBasedStrategy),
            ]
        }
        OsFamily::Macos => vec![
            Box::new(EnvironmentBasedStrategy),
            Box::new(DirectoryBasedStrategy::new(vec![
                PathBuf::from("/Library/Java/JavaVirtualMachines"),
                runtime_directory.to_path_buf(),
            ])),
            Box::new(PathBasedStrategy::new(vec![PathBuf::from(
                "/Library/Internet Plug-Ins/JavaAppletPlugin.plugin",
            )])),
        ],
        OsFamily::Linux => vec![
            Box::new(EnvironmentBasedStrategy),
            Box::new(DirectoryBasedStrategy::new(vec![
                PathBuf::from("/usr/lib/jvm"),
                runtime_directory.to_path_buf(),
            ])),
        ],
    }
}

/// Runs every strategy and unions the roots that carry an executable.
pub fn discover_candidates(runtime_directory: &Path) -> HashSet<PathBuf> {
    let mut candidates = HashSet::new();
    for strategy in discovery_strategies(runtime_directory) {
        candidates.extend(strategy.discover());
    }
    debug!("Discovered {} Java candidate root(s)", candidates.len());
    candidates.into_iter().filter(|root| has_executable(root)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_installation(root: &Path) {
        let executable = root.join(executable_relative_path());
        std::fs::create_dir_all(executable.parent().unwrap()).unwrap();
        std::fs::write(executable, b"#!").unwrap();
    }

    #[test]
    fn directory_strategy_offers_children() {
        let dir = tempfile::tempdir().expect("temp dir");
        fake_installation(&dir.path().join("jdk-17"));
        std::fs::create_dir_all(dir.path().join("not-a-jvm")).unwrap();

        let strategy = DirectoryBasedStrategy::new(vec![dir.path().to_path_buf()]);
        let found = strategy.discover();
        assert_eq!(found.len(), 1);
        assert!(found.contains(&dir.path().join("jdk-17")));
    }

    #[test]
    fn path_strategy_requires_executable() {
        let dir = tempfile::tempdir().expect("temp dir");
        let present = dir.path().join("present");
        fake_installation(&present);
        let strategy = PathBasedStrategy::new(vec![present.clone(), dir.path().join("absent")]);
        let found = strategy.discover();
        assert_eq!(found.into_iter().collect::<Vec<_>>(), vec![present]);
    }

    #[test]
    fn environment_suffixes_are_stripped() {
        assert_eq!(
            strip_executable_suffix(PathBuf::from("/opt/jdk-17/bin/java")),
            PathBuf::from("/opt/jdk-17")
        );
        assert_eq!(
            strip_executable_suffix(PathBuf::from("/opt/jdk-17/bin")),
            PathBuf::from("/opt/jdk-17")
        );
        assert_eq!(
            strip_executable_suffix(PathBuf::from("/opt/jdk-17")),
            PathBuf::from("/opt/jdk-17")
        );
    }
}
