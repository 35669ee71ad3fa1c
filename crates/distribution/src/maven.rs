// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

use std::str::FromStr;

use serde::Serialize;

use crate::error::*;

/// A parsed `group:artifact:version[:classifier][@extension]` coordinate.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MavenComponents {
    pub group: String,
    pub artifact: String,
    pub version: String,
    pub classifier: Option<String>,
    pub extension: String,
}

impl FromStr for MavenComponents {
    type Err = Error;

    fn from_str(raw: &str) -> std::result::Result<Self, Self::Err> {
        let malformed = || Error::MalformedModuleId(raw.to_string());
        let (coordinate, extension) = match raw.rsplit_once('@') {
            Some((coordinate, extension)) if !extension.is_empty() => (coordinate, extension),
            Some(_) => return Err(malformed()),
            None => (raw, "jar"),
        };
        let parts: Vec<&str> = coordinate.split(':').collect();
        if parts.iter().any(|part| part.is_empty()) {
            return Err(malformed());
        }
        match parts.as_slice() {
            [group, artifact, version] => Ok(Self {
                group: group.to_string(),
                artifact: artifact.to_string(),
                version: version.to_string(),
                classifier: None,
                extension: extension.to_string(),
            }),
            [group, artifact, version, classifier] => Ok(Self {
                group: group.to_string(),
                artifact: artifact.to_string(),
                version: version.to_string(),
                classifier: Some(classifier.to_string()),
                extension: extension.to_string(),
            }),
            _ => Err(malformed()),
        }
    }
}

impl MavenComponents {
    /// The Maven-layout relative path:
    /// `<group slashed>/<artifact>/<version>/<artifact>-<version>[-classifier].<ext>`.
    pub fn to_path(&self) -> String {
        let group = self.group.replace('.', "/");
        let mut file = format!("{}-{}", self.artifact, self.version);
        if let Some(classifier) = &self.classifier {
            file.push('-');
            file.push_str(classifier);
        }
        file.push('.');
        file.push_str(&self.extension);
        format!("{group}/{}/{}/{file}", self.artifact, self.version)
    }
}
