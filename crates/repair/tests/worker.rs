// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

//! End-to-end checks of the worker process bridge.

use std::path::PathBuf;

use repair::messages::{WorkerCommand, WorkerReply};
use repair::transmitter::RepairWorker;

fn worker_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_repair-worker"))
}

#[tokio::test]
async fn unknown_handler_exits_with_one() {
    let status = tokio::process::Command::new(worker_binary())
        .arg("no-such-handler")
        .stderr(std::process::Stdio::null())
        .status()
        .await
        .expect("spawn worker");
    assert_eq!(status.code(), Some(1));
}

#[tokio::test]
async fn parent_disconnect_shuts_the_worker_down() {
    let worker = RepairWorker::spawn(&worker_binary(), "full-repair").expect("spawn worker");
    worker.disconnect().await.expect("clean disconnect");
}

#[tokio::test]
async fn missing_distribution_document_surfaces_as_displayable_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut worker = RepairWorker::spawn(&worker_binary(), "full-repair").expect("spawn worker");
    worker
        .send(&WorkerCommand::Validate {
            server_id: "example-1".to_string(),
            launcher_directory: dir.path().to_path_buf(),
            common_directory: dir.path().join("common"),
            instance_directory: dir.path().join("instances"),
            dev_mode: false,
        })
        .await
        .expect("send validate");

    match worker.next_reply().await.expect("read reply") {
        Some(WorkerReply::Error { displayable }) => {
            assert!(displayable.is_some());
        }
        other => panic!("unexpected reply: {other:?}"),
    }
}

#[tokio::test]
async fn download_before_validate_is_refused() {
    let mut worker = RepairWorker::spawn(&worker_binary(), "full-repair").expect("spawn worker");
    worker
        .send(&WorkerCommand::Download)
        .await
        .expect("send download");

    match worker.next_reply().await.expect("read reply") {
        Some(WorkerReply::Error { .. }) => {}
        other => panic!("unexpected reply: {other:?}"),
    }
}
