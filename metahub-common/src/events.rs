//! Event types for metahub notifications
//!
//! Provides the shared event definitions and an EventBus used by sinks
//! (file metadata changed) and tag authorities (tag deleted). Long-lived
//! hubs subscribe to the bus instead of reaching for global signals.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::broadcast;

/// Metadata engine events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MetadataEvent {
    /// Embedded or sidecar metadata of a file was committed
    ///
    /// Triggers:
    /// - File watchers: ignore the self-inflicted change
    /// - Views: refresh the item
    FileMetadataChanged {
        /// File whose metadata changed
        path: PathBuf,
        /// When the commit finished
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A tag was removed from the tag authority
    ///
    /// Long-lived hubs drop the tag from their status table.
    TagDeleted {
        /// Identifier of the deleted tag
        tag_id: i64,
    },

    /// The backing database changed wholesale; cached hubs are stale
    DatabaseChanged,
}

/// Receiver of "file metadata changed" notifications
pub trait FileChangeObserver {
    /// Called after a sink committed new metadata to `path`
    fn file_metadata_changed(&self, path: &Path);
}

/// Observer that ignores notifications
impl FileChangeObserver for () {
    fn file_metadata_changed(&self, _path: &Path) {}
}

/// Broadcast bus for [`MetadataEvent`]s
///
/// Cloning the bus shares the underlying channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<MetadataEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// # Arguments
    ///
    /// * `capacity` - Number of events to buffer before dropping old events
    ///
    /// # Examples
    ///
    /// ```
    /// use metahub_common::events::EventBus;
    ///
    /// let event_bus = EventBus::new(100);
    /// assert_eq!(event_bus.capacity(), 100);
    /// ```
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<MetadataEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: MetadataEvent,
    ) -> Result<usize, broadcast::error::SendError<MetadataEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: MetadataEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl FileChangeObserver for EventBus {
    fn file_metadata_changed(&self, path: &Path) {
        self.emit_lossy(MetadataEvent::FileMetadataChanged {
            path: path.to_path_buf(),
            timestamp: crate::time::now(),
        });
    }
}
