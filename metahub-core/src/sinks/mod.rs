//! Sink adapters
//!
//! Apply a hub to records, decoded metadata, files and image buffers. Each
//! adapter follows the hub's [`WritePlan`](crate::policy::WritePlan) and
//! reports whether it changed anything.

mod accessor;
mod buffer;
mod record;

use crate::collaborators::{ItemRecord, MetadataAccessor, MetadataOpener};
use crate::hub::MetadataHub;
use crate::lazy_sync::PendingSync;
use crate::policy::WriteMode;
use metahub_common::{FileChangeObserver, MetadataSettings, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Outcome of writing one hub to many sinks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Sinks that were changed
    pub written: Vec<PathBuf>,
    /// Sinks with nothing to write
    pub skipped: Vec<PathBuf>,
    /// Sinks left for the lazy sync queue to flush
    pub queued: Vec<PathBuf>,
    /// Sinks that failed, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    /// File one write outcome under `path`
    pub fn record(&mut self, path: PathBuf, outcome: Result<bool>) {
        match outcome {
            Ok(true) => self.written.push(path),
            Ok(false) => self.skipped.push(path),
            Err(e) => self.failed.push((path, e.to_string())),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.written.len() + self.queued.len() + self.skipped.len() + self.failed.len()
    }
}

/// Writes hubs to files through a [`MetadataOpener`]
///
/// After each successful commit the observer is told the file changed.
pub struct FileSink<O, F = ()> {
    opener: O,
    observer: F,
    pending: Option<Arc<PendingSync>>,
}

impl<O: MetadataOpener> FileSink<O> {
    pub fn new(opener: O) -> Self {
        Self {
            opener,
            observer: (),
            pending: None,
        }
    }
}

impl<O: MetadataOpener, F: FileChangeObserver> FileSink<O, F> {
    pub fn with_observer<G: FileChangeObserver>(self, observer: G) -> FileSink<O, G> {
        FileSink {
            opener: self.opener,
            observer,
            pending: self.pending,
        }
    }

    /// Queue used when the settings ask for lazy sync
    pub fn with_pending(mut self, pending: Arc<PendingSync>) -> Self {
        self.pending = Some(pending);
        self
    }

    pub fn opener(&self) -> &O {
        &self.opener
    }

    /// Write the hub to the file at `path`
    ///
    /// `Ok(false)`: nothing to write. `Ok(true)`: committed, or queued for
    /// lazy sync. `Err`: the file could not be read or committed.
    pub fn write(
        &self,
        hub: &MetadataHub,
        path: &Path,
        mode: WriteMode,
        settings: &MetadataSettings,
    ) -> Result<bool> {
        if !hub.will_write(mode, settings) {
            return Ok(false);
        }
        if self.queue(path, settings) {
            return Ok(true);
        }
        self.commit(hub, path, mode, settings)
    }

    /// Write, ignoring lazy sync; used when flushing the queue
    pub fn write_now(
        &self,
        hub: &MetadataHub,
        path: &Path,
        mode: WriteMode,
        settings: &MetadataSettings,
    ) -> Result<bool> {
        if !hub.will_write(mode, settings) {
            return Ok(false);
        }
        self.commit(hub, path, mode, settings)
    }

    /// Write the hub to the file of one of the records it was loaded from
    ///
    /// The hub is first projected onto the record, so tags that differ
    /// across the loaded records keep their per-record state in the file.
    pub fn write_record_file<R: ItemRecord + ?Sized>(
        &self,
        hub: &MetadataHub,
        record: &R,
        mode: WriteMode,
        settings: &MetadataSettings,
    ) -> Result<bool> {
        let Some(path) = record.file_path() else {
            debug!("Record has no file, nothing to write");
            return Ok(false);
        };
        let projected = hub.project_onto_record(record);
        self.write(&projected, &path, mode, settings)
    }

    /// Write one hub to many files, collecting failures
    ///
    /// Files taken by the lazy sync queue are reported as queued, not written.
    pub fn write_files<I, P>(
        &self,
        hub: &MetadataHub,
        paths: I,
        mode: WriteMode,
        settings: &MetadataSettings,
    ) -> BatchReport
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut report = BatchReport::default();
        for path in paths {
            let path = path.as_ref();
            if !hub.will_write(mode, settings) {
                report.record(path.to_path_buf(), Ok(false));
            } else if self.queue(path, settings) {
                report.queued.push(path.to_path_buf());
            } else {
                let outcome = self.commit(hub, path, mode, settings);
                report.record(path.to_path_buf(), outcome);
            }
        }
        report
    }

    fn queue(&self, path: &Path, settings: &MetadataSettings) -> bool {
        if !settings.use_lazy_sync {
            return false;
        }
        let Some(pending) = &self.pending else {
            return false;
        };
        pending.add_pending(path);
        debug!(path = ?path, "Queued metadata write");
        true
    }

    fn commit(
        &self,
        hub: &MetadataHub,
        path: &Path,
        mode: WriteMode,
        settings: &MetadataSettings,
    ) -> Result<bool> {
        let mut metadata = self.opener.open(path)?;
        if !hub.write_to_metadata(&mut metadata, mode, settings) {
            return Ok(false);
        }

        if let Err(e) = metadata.apply_changes() {
            warn!(path = ?path, error = %e, "Failed to commit metadata");
            return Err(e);
        }
        self.observer.file_metadata_changed(path);
        Ok(true)
    }
}
