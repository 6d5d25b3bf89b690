//! Deferred file writes
//!
//! With lazy sync enabled, file sinks queue paths here instead of writing.
//! A later [`PendingSync::flush`] rebuilds and writes each queued file.

use crate::sinks::BatchReport;
use metahub_common::Result;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;

/// Files whose metadata write is pending
#[derive(Debug, Default)]
pub struct PendingSync {
    paths: Mutex<BTreeSet<PathBuf>>,
}

impl PendingSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a file; returns `false` if it was already queued
    pub fn add_pending(&self, path: &Path) -> bool {
        self.lock().insert(path.to_path_buf())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Dequeue everything, sorted by path
    pub fn take_all(&self) -> Vec<PathBuf> {
        std::mem::take(&mut *self.lock()).into_iter().collect()
    }

    /// Write every queued file with `writer`
    ///
    /// The queue is drained first, so paths queued by `writer` itself land
    /// in the next flush.
    pub fn flush<F>(&self, mut writer: F) -> BatchReport
    where
        F: FnMut(&Path) -> Result<bool>,
    {
        let pending = self.take_all();
        let mut report = BatchReport::default();
        for path in pending {
            let outcome = writer(&path);
            report.record(path, outcome);
        }
        info!(
            written = report.written.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "Flushed pending metadata writes"
        );
        report
    }

    fn lock(&self) -> MutexGuard<'_, BTreeSet<PathBuf>> {
        self.paths.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
