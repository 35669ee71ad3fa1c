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

    #[error("No distribution document at {0}")]
    MissingDocument(String),

    #[error("Malformed server address: {0}")]
    MalformedAddress(String),

    #[error("Module id is not a Maven coordinate: {0}")]
    MalformedModuleId(String),

    #[error("Server not found in distribution: {0}")]
    ServerNotFound(String),

    #[error("The distribution document contains no servers")]
    NoServers,
}
