// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

use std::time::Duration;

use once_cell::sync::Lazy;

pub static APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// How long we are willing to wait for a TCP connection before giving up.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound for a whole request, download bodies included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::ClientBuilder::new()
        .pool_idle_timeout(Duration::from_secs(60))
        .pool_max_idle_per_host(200)
        .connect_timeout(CONNECT_TIMEOUT)
        .use_rustls_tls()
        .user_agent(format!("ConicCore/{APP_VERSION}"))
        .build()
        .expect("Failed to build HTTP client")
});
