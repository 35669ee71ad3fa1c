// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

//! Asking a candidate JVM what it actually is.

use std::{cmp::Ordering, collections::HashMap, path::Path, path::PathBuf};

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use semver::VersionReq;
use serde::{Deserialize, Serialize};

use platform::{OsFamily, PLATFORM_INFO};
use version::MinecraftVersion;

use crate::discover::executable_relative_path;
use crate::error::*;

/// `{major}.{minor}.{patch}` as reported by the runtime itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JavaRuntimeVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl JavaRuntimeVersion {
    fn as_tuple(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }

    fn as_semver(&self) -> semver::Version {
        semver::Version::new(self.major, self.minor, self.patch)
    }
}

/// Everything the guard knows about one usable installation.
#[derive(Debug, Clone, Serialize)]
pub struct JvmDetails {
    /// The launch executable (`javaw.exe` on Windows).
    pub path: PathBuf,
    pub vendor: Option<String>,
    pub version: JavaRuntimeVersion,
    pub version_string: String,
}

static LEGACY_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^1\.(\d+)\.(\d+)_(\d+)(?:-b\d+)?").expect("The program is broken")
});
static MODERN_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\.(\d+)\.(\d+)(?:[+.]\d+)?").expect("The program is broken"));

/// Parses a `java.version` property value.
///
/// Legacy values look like `1.8.0_351`, modern ones like `17.0.6+9-LTS`.
/// Anything else yields `None`.
pub fn parse_java_runtime_version(raw: &str) -> Option<JavaRuntimeVersion> {
    let pattern: &Regex = if raw.starts_with("1.") {
        &LEGACY_VERSION
    } else {
        &MODERN_VERSION
    };
    let captures = pattern.captures(raw)?;
    let component = |index: usize| captures.get(index)?.as_str().parse::<u64>().ok();
    Some(JavaRuntimeVersion {
        major: component(1)?,
        minor: component(2)?,
        patch: component(3)?,
    })
}

/// Parses the stderr of `java -XshowSettings:properties -version`.
///
/// Properties print at a four-space indent as `key = value`; an eight-space
/// indent continues the previous key into a list (`java.library.path` and
/// friends).
pub fn parse_properties(output: &str) -> HashMap<String, Vec<String>> {
    let mut properties: HashMap<String, Vec<String>> = HashMap::new();
    let mut last_key: Option<String> = None;
    for line in output.lines() {
        if let Some(continuation) = line.strip_prefix("        ") {
            if let Some(key) = &last_key
                && let Some(values) = properties.get_mut(key)
            {
                values.push(continuation.trim().to_string());
            }
            continue;
        }
        if let Some(property) = line.strip_prefix("    ")
            && let Some((key, value)) = property.split_once(" = ")
        {
            let key = key.trim().to_string();
            properties.insert(key.clone(), vec![value.trim().to_string()]);
            last_key = Some(key);
        }
    }
    properties
}

fn first_property<'a>(
    properties: &'a HashMap<String, Vec<String>>,
    key: &str,
) -> Option<&'a str> {
    properties
        .get(key)
        .and_then(|values| values.first())
        .map(String::as_str)
}

/// Spawns the candidate and reads its property table.
pub async fn load_properties(root: &Path) -> Result<HashMap<String, Vec<String>>> {
    let mut executable = root.join(executable_relative_path());
    // javaw.exe swallows its console output, probe with java.exe instead
    if PLATFORM_INFO.os_family == OsFamily::Windows {
        executable = executable.with_file_name("java.exe");
    }
    let output = tokio::process::Command::new(&executable)
        .arg("-XshowSettings:properties")
        .arg("-version")
        .output()
        .await?;
    Ok(parse_properties(&String::from_utf8_lossy(&output.stderr)))
}

/// Turns a candidate root into [`JvmDetails`], or `None` when the runtime is
/// unusable for the game (32-bit, foreign architecture, unparsable version).
pub async fn resolve_details(root: &Path) -> Option<JvmDetails> {
    let properties = match load_properties(root).await {
        Ok(properties) => properties,
        Err(error) => {
            warn!("Could not inspect {}: {error}", root.display());
            return None;
        }
    };
    details_from_properties(root, &properties)
}

fn details_from_properties(
    root: &Path,
    properties: &HashMap<String, Vec<String>>,
) -> Option<JvmDetails> {
    if first_property(properties, "sun.arch.data.model") != Some("64") {
        debug!("Dropping 32-bit runtime at {}", root.display());
        return None;
    }
    if PLATFORM_INFO.is_arm64() && first_property(properties, "os.arch") != Some("aarch64") {
        debug!("Dropping non-aarch64 runtime at {}", root.display());
        return None;
    }
    let version_string = first_property(properties, "java.version")?.to_string();
    let Some(version) = parse_java_runtime_version(&version_string) else {
        warn!(
            "Could not understand java.version {version_string:?} at {}",
            root.display()
        );
        return None;
    };
    Some(JvmDetails {
        path: root.join(executable_relative_path()),
        vendor: first_property(properties, "java.vendor").map(str::to_string),
        version,
        version_string,
    })
}

static WILDCARD_COMPONENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.[xX*]").expect("The program is broken"));

/// Parses a distribution-style semver range such as `>=17.x` or `^17.x`.
///
/// Ranges published for Node-flavored semver spell wildcards as `.x`, which
/// comparator operators here do not always accept; dropping the wildcard
/// component keeps the same meaning.
pub fn parse_range(range: &str) -> Result<VersionReq> {
    if let Ok(parsed) = VersionReq::parse(range) {
        return Ok(parsed);
    }
    let normalized = WILDCARD_COMPONENT.replace_all(range, "");
    VersionReq::parse(&normalized).map_err(|_| Error::InvalidRange(range.to_string()))
}

/// Keeps the details whose `{major}.{minor}.{patch}` satisfies `range`.
pub fn filter_by_range(details: Vec<JvmDetails>, range: &VersionReq) -> Vec<JvmDetails> {
    details
        .into_iter()
        .filter(|detail| range.matches(&detail.version.as_semver()))
        .collect()
}

/// Sorts descending by version. Equal versions prefer the path that does not
/// look like a JDK, a plain JRE is lighter to keep hot.
pub fn rank(mut details: Vec<JvmDetails>) -> Vec<JvmDetails> {
    details.sort_by(|a, b| {
        b.version
            .as_tuple()
            .cmp(&a.version.as_tuple())
            .then_with(|| jdk_tiebreak(a, b))
    });
    details
}

fn jdk_tiebreak(a: &JvmDetails, b: &JvmDetails) -> Ordering {
    let is_jdk = |detail: &JvmDetails| detail.path.to_string_lossy().contains("jdk");
    match (is_jdk(a), is_jdk(b)) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

/// The range and suggested major to use when the distribution does not pin
/// its own requirement.
pub fn default_java_range(minecraft_version: &MinecraftVersion) -> (&'static str, u32) {
    if minecraft_version.at_least(1, 20, 5) {
        (">=21.x", 21)
    } else if minecraft_version.at_least(1, 17, 0) {
        (">=17.x", 17)
    } else {
        ("8.x", 8)
    }
}
