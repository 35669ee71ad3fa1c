// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

use std::fmt::Display;

use once_cell::sync::Lazy;
use os_info::{Type, Version};
use serde::{Deserialize, Serialize};

pub static PLATFORM_INFO: Lazy<PlatformInfo> = Lazy::new(PlatformInfo::new);

/// Represents the high-level operating system family.
///
/// This is an abstraction over detailed OS types (e.g., Ubuntu, Windows 10) to group
/// them by family: Windows, Linux, or macOS.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub enum OsFamily {
    /// Microsoft Windows OS family
    Windows,

    /// Linux-based distributions (e.g., Ubuntu, Arch, Debian)
    Linux,

    /// Apple macOS family
    Macos,
}

impl Display for OsFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Windows => write!(f, "windows"),
            Self::Linux => write!(f, "linux"),
            Self::Macos => write!(f, "macos"),
        }
    }
}

impl OsFamily {
    /// The name Mojang uses for this family inside version.json rules and
    /// natives tables. Differs from [`Display`] only for macOS (`osx`).
    pub fn vendor_name(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::Macos => "osx",
        }
    }
}

/// Contains detailed platform-related information, such as architecture,
/// OS type, version, and edition.
///
/// Typically used for environment-specific behavior or diagnostics.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct PlatformInfo {
    /// The target CPU architecture (e.g., "x64", "arm").
    pub arch: String,

    /// The architecture string as reported by `uname`, if available.
    pub arch_from_uname: Option<String>,

    /// The operating system type, as reported by the `os_info` crate.
    pub os_type: Type,

    /// The general OS family classification (Windows/Linux/macOS).
    pub os_family: OsFamily,

    /// The version of the OS (e.g., 10.15.7, 22.04, etc.).
    pub os_version: Version,

    /// The edition of the OS (e.g., "Home", "Professional"), if available.
    pub edition: Option<String>,
}

impl PlatformInfo {
    /// Constructs a new [`PlatformInfo`] instance using compile-time and runtime system data.
    ///
    /// - Detects architecture using `cfg!(target_arch)`
    /// - Detects OS family using `cfg!(target_os)`
    /// - Uses `os_info` crate to get detailed version, type, and edition info
    ///
    /// # Panics
    /// Panics if the OS is not supported by the program.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let os_family = if cfg!(target_os = "windows") {
            OsFamily::Windows
        } else if cfg!(target_os = "linux") {
            OsFamily::Linux
        } else if cfg!(target_os = "macos") {
            OsFamily::Macos
        } else {
            panic!("Sorry, but this program does not support your system!")
        };
        let os_info = os_info::get();
        Self {
            arch_from_uname: os_info.architecture().map(|x| x.to_owned()),
            os_family,
            os_version: os_info.version().to_owned(),
            arch: if cfg!(target_arch = "x86_64") {
                "x64"
            } else if cfg!(target_arch = "x86") {
                "x86"
            } else if cfg!(target_arch = "arm") {
                "arm"
            } else if cfg!(target_arch = "aarch64") {
                "aarch64"
            } else {
                "unknown"
            }
            .to_string(),
            os_type: os_info.os_type(),
            edition: os_info.edition().map(|x| x.to_owned()),
        }
    }

    /// Whether the host CPU is a 64-bit ARM. Such hosts only accept `aarch64`
    /// Java runtimes, there is no emulation layer to fall back on.
    pub fn is_arm64(&self) -> bool {
        self.arch == "aarch64"
    }

    /// The pointer width of the host as the word Mojang uses in natives
    /// classifiers (`"64"` or `"32"`).
    pub fn word_size(&self) -> &'static str {
        if cfg!(target_pointer_width = "64") {
            "64"
        } else {
            "32"
        }
    }
}
