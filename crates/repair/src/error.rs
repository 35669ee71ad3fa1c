// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

use std::result;

use serde::Serialize;
use serde_with::serde_as;
use thiserror::Error;

pub type Result<T> = result::Result<T, Error>;

#[serde_as]
#[derive(Debug, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum Error {
    #[error(transparent)]
    Io(
        #[from]
        #[serde_as(as = "serde_with::DisplayFromStr")]
        std::io::Error,
    ),

    #[error(transparent)]
    JsonParse(
        #[from]
        #[serde_as(as = "serde_with::DisplayFromStr")]
        serde_json::Error,
    ),

    #[error(transparent)]
    Download(#[from] download::Error),

    #[error(transparent)]
    Distribution(#[from] distribution::Error),

    #[error(transparent)]
    Version(#[from] version::Error),

    #[error(transparent)]
    Zip(
        #[from]
        #[serde_as(as = "serde_with::DisplayFromStr")]
        zip::result::ZipError,
    ),

    #[error("Document request failed: {0} {1}")]
    DocumentFetch(u16, String),

    #[error("Version {0} is not listed in the version manifest")]
    VersionNotFound(String),

    #[error("Version manifest unreachable and no local version json exists")]
    ManifestUnreachable,

    #[error("Processor used before init ran")]
    InitNotRun,

    #[error("Download was requested before validation finished")]
    ValidateNotRun,

    #[error("Could not understand Forge version: {0}")]
    MalformedForgeVersion(String),

    #[error("The Forge installer archive carries no version.json entry")]
    MissingOverlayManifest,

    #[error("Received byte count disagrees with declared size for {0}")]
    SizeMismatch(String),
}
