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

    /// The downloaded bytes do not hash to the expected digest.
    #[error("Downloaded file failed checksum validation: {0}")]
    Validation(String),

    #[error(transparent)]
    Network(
        #[from]
        #[serde_as(as = "serde_with::DisplayFromStr")]
        reqwest::Error,
    ),

    #[error("{0} {1}")]
    HttpResponseNotSuccess(u16, String),
}

impl Error {
    /// Whether another attempt could plausibly succeed. Server errors and
    /// transport-level failures qualify, checksum mismatches and client
    /// errors never do.
    ///
    /// The transport classes accepted here are a superset of the usual
    /// connect/reset/timeout/dns codes, reqwest folds those into its
    /// connect and request categories.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::HttpResponseNotSuccess(code, _) => (500..600).contains(code),
            Self::Network(error) => {
                error.is_timeout() || error.is_connect() || error.is_request() || error.is_body()
            }
            _ => false,
        }
    }
}
