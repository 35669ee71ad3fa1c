// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

//! REST clients for the two identity providers.
//!
//! Every outbound operation resolves to a [`RestResponse`] envelope instead
//! of an error type: callers always get a status, optionally a displayable
//! message and a provider-specific error code they can branch on.

use serde::Serialize;

pub mod microsoft;
pub mod mojang;

pub use microsoft::*;
pub use mojang::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RestStatus {
    Success,
    Error,
}

/// The uniform wrapper around every provider operation.
///
/// `status` and `provider_code` are independent: an error envelope may or
/// may not carry a provider-specific code.
#[derive(Debug, Clone, Serialize)]
pub struct RestResponse<T, C> {
    pub data: Option<T>,
    pub status: RestStatus,
    pub error: Option<String>,
    pub provider_code: Option<C>,
}

impl<T, C> RestResponse<T, C> {
    pub fn success(data: T) -> Self {
        Self {
            data: Some(data),
            status: RestStatus::Success,
            error: None,
            provider_code: None,
        }
    }

    pub fn failure(error: impl Into<String>, provider_code: Option<C>) -> Self {
        Self {
            data: None,
            status: RestStatus::Error,
            error: Some(error.into()),
            provider_code,
        }
    }

    pub fn failure_with_data(data: T, error: impl Into<String>, provider_code: Option<C>) -> Self {
        Self {
            data: Some(data),
            status: RestStatus::Error,
            error: Some(error.into()),
            provider_code,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RestStatus::Success
    }
}
