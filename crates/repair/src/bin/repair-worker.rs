// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

//! The detached repair worker. One positional argument selects the handler;
//! commands arrive on stdin, replies leave on stdout, logs go to stderr
//! where the parent forwards them.

use std::process::exit;

#[tokio::main]
async fn main() {
    env_logger::init();
    let Some(handler_name) = std::env::args().nth(1) else {
        eprintln!("usage: repair-worker <handler>");
        exit(1);
    };
    exit(repair::receiver::run(&handler_name).await)
}
