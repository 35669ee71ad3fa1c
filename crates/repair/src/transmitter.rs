// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

//! The parent side of the repair bridge: spawn the worker, exchange
//! messages, forward its logs.

use std::path::Path;
use std::process::Stdio;

use log::info;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::error::*;
use crate::messages::{WorkerCommand, WorkerReply};

pub struct RepairWorker {
    child: Child,
    stdin: ChildStdin,
    replies: Lines<BufReader<ChildStdout>>,
}

impl RepairWorker {
    /// Spawns the worker binary with the given handler key.
    ///
    /// The child's stderr is forwarded line by line into our log, prefixed
    /// so worker output is easy to tell apart.
    pub fn spawn(program: &Path, handler_key: &str) -> Result<Self> {
        let mut child = Command::new(program)
            .arg(handler_key)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| std::io::Error::other("worker stdin not piped"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| std::io::Error::other("worker stdout not piped"))?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    info!(target: "repair_worker", "[worker] {line}");
                }
            });
        }
        Ok(Self {
            child,
            stdin,
            replies: BufReader::new(stdout).lines(),
        })
    }

    pub async fn send(&mut self, command: &WorkerCommand) -> Result<()> {
        let mut raw = serde_json::to_string(command)?;
        raw.push('\n');
        self.stdin.write_all(raw.as_bytes()).await?;
        self.stdin.flush().await?;
        Ok(())
    }

    /// The next reply, or `None` once the worker has gone away.
    pub async fn next_reply(&mut self) -> Result<Option<WorkerReply>> {
        loop {
            match self.replies.next_line().await? {
                None => return Ok(None),
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => return Ok(Some(serde_json::from_str(&line)?)),
            }
        }
    }

    /// Closes the command channel, which the worker treats as disconnect,
    /// then reaps it.
    pub async fn disconnect(mut self) -> Result<()> {
        drop(self.stdin);
        let status = self.child.wait().await?;
        info!("Repair worker exited with {status}");
        Ok(())
    }
}
