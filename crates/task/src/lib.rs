// Conic Launcher
// Copyright 2022-2026 Broken-Deer and contributors. All rights reserved.
// SPDX-License-Identifier: GPL-3.0-only

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};

/// The coarse phase a long-running job is currently in.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub enum Step {
    Idle,
    FetchIndexDocuments,
    VerifyExistingFiles,
    DownloadFiles,
    Finalize,
}

#[derive(Clone)]
/// We use this to store the progress of a validate/repair task
pub struct Progress {
    pub completed: Arc<AtomicU64>,
    pub total: Arc<AtomicU64>,
    pub step: Arc<Mutex<Step>>,
}

impl Default for Progress {
    fn default() -> Self {
        Self {
            completed: Arc::new(AtomicU64::new(0)),
            total: Arc::new(AtomicU64::new(0)),
            step: Arc::new(Mutex::new(Step::Idle)),
        }
    }
}

impl Progress {
    pub fn reset(&self, ordering: Ordering) {
        self.completed.store(0, ordering);
        self.total.store(0, ordering);
    }

    pub fn set_step(&self, step: Step) {
        let mut current = self
            .step
            .lock()
            .expect("Internal error: another thread hold lock and panic");
        *current = step;
    }

    /// Integer percent of `completed` over `total`, truncated. Zero while the
    /// total is still unknown.
    pub fn percent(&self, ordering: Ordering) -> u8 {
        let total = self.total.load(ordering);
        if total == 0 {
            return 0;
        }
        let completed = self.completed.load(ordering).min(total);
        (completed * 100 / total) as u8
    }
}
