// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

//! The child-process side of the repair bridge.
//!
//! The worker binary selects one handler by its single positional argument,
//! then dispatches commands from stdin one at a time. Replies go to stdout,
//! logs to stderr. stdin EOF is the disconnect signal.

use std::io::Write as _;

use log::error;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::*;
use crate::messages::{WorkerCommand, WorkerReply};
use crate::orchestrator::FullRepair;

/// Drives a [`FullRepair`] over the message channel.
#[derive(Default)]
pub struct FullRepairHandler {
    repair: Option<FullRepair>,
}

impl FullRepairHandler {
    async fn execute(
        &mut self,
        command: WorkerCommand,
        reply: &(dyn Fn(WorkerReply) + Send + Sync),
    ) -> Result<()> {
        match command {
            WorkerCommand::Validate {
                server_id,
                launcher_directory,
                common_directory,
                instance_directory,
                dev_mode,
            } => {
                let mut repair = FullRepair::new(
                    &server_id,
                    &launcher_directory,
                    &common_directory,
                    &instance_directory,
                    dev_mode,
                )?;
                let invalid_count = repair
                    .validate(&|percent| reply(WorkerReply::ValidateProgress { percent }))
                    .await?;
                self.repair = Some(repair);
                reply(WorkerReply::ValidateComplete { invalid_count });
                Ok(())
            }
            WorkerCommand::Download => {
                let repair = self.repair.as_mut().ok_or(Error::ValidateNotRun)?;
                repair
                    .download(&|percent| reply(WorkerReply::DownloadProgress { percent }))
                    .await?;
                reply(WorkerReply::DownloadComplete);
                Ok(())
            }
        }
    }

    /// A user-facing string for failures worth explaining, `None` otherwise.
    fn classify_error(&self, error: &Error) -> Option<String> {
        match error {
            Error::Download(download::Error::Network(_))
            | Error::Download(download::Error::HttpResponseNotSuccess(..))
            | Error::DocumentFetch(..)
            | Error::ManifestUnreachable => Some(
                "A network error occurred while repairing the server files. \
                 Check your connection and try again."
                    .to_string(),
            ),
            Error::Download(download::Error::Validation(_)) => Some(
                "A downloaded file failed validation. Running another repair \
                 usually resolves this."
                    .to_string(),
            ),
            Error::Distribution(distribution::Error::MissingDocument(_)) => Some(
                "The launcher has no distribution index yet. Restart the \
                 launcher while online to fetch one."
                    .to_string(),
            ),
            Error::VersionNotFound(version) => Some(format!(
                "Minecraft {version} is not listed by the version manifest."
            )),
            _ => None,
        }
    }
}

/// The static handler registry, keyed by the worker's startup argument.
pub enum RegisteredHandler {
    FullRepair(FullRepairHandler),
}

pub fn lookup_handler(name: &str) -> Option<RegisteredHandler> {
    match name {
        "full-repair" => Some(RegisteredHandler::FullRepair(FullRepairHandler::default())),
        _ => None,
    }
}

impl RegisteredHandler {
    async fn execute(
        &mut self,
        command: WorkerCommand,
        reply: &(dyn Fn(WorkerReply) + Send + Sync),
    ) -> Result<()> {
        match self {
            Self::FullRepair(handler) => handler.execute(command, reply).await,
        }
    }

    fn classify_error(&self, error: &Error) -> Option<String> {
        match self {
            Self::FullRepair(handler) => handler.classify_error(error),
        }
    }
}

fn emit(reply: &WorkerReply) {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    if let Ok(raw) = serde_json::to_string(reply) {
        let _ = writeln!(lock, "{raw}");
        let _ = lock.flush();
    }
}

/// The receiver loop. Returns the process exit code.
pub async fn run(handler_name: &str) -> i32 {
    let Some(mut handler) = lookup_handler(handler_name) else {
        error!("Unknown handler: {handler_name}");
        return 1;
    };
    let reply = |message: WorkerReply| emit(&message);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            // EOF or a torn pipe both mean the parent disconnected
            Ok(None) | Err(_) => return 0,
        };
        if line.trim().is_empty() {
            continue;
        }
        let command: WorkerCommand = match serde_json::from_str(&line) {
            Ok(command) => command,
            Err(parse_error) => {
                error!("Unintelligible command: {parse_error}");
                emit(&WorkerReply::Error { displayable: None });
                return 1;
            }
        };
        if let Err(execute_error) = handler.execute(command, &reply).await {
            error!("Repair worker failed: {execute_error}");
            let displayable = handler.classify_error(&execute_error);
            emit(&WorkerReply::Error { displayable });
            let _ = std::io::stdout().flush();
            return 1;
        }
    }
}
