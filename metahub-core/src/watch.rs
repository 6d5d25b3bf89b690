//! Long-lived hub that follows tag authority changes
//!
//! A hub kept across editing sessions can outlive tags it refers to. A
//! [`WatchedHub`] subscribes to the [`EventBus`] and applies pending
//! notifications before its hub is read or written.

use crate::hub::MetadataHub;
use metahub_common::{EventBus, MetadataEvent};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{debug, warn};

/// [`MetadataHub`] kept in sync with tag deletions and database resets
#[derive(Debug)]
pub struct WatchedHub {
    hub: MetadataHub,
    events: broadcast::Receiver<MetadataEvent>,
    bus: EventBus,
}

impl WatchedHub {
    pub fn new(hub: MetadataHub, bus: &EventBus) -> Self {
        Self {
            hub,
            events: bus.subscribe(),
            bus: bus.clone(),
        }
    }

    /// Drain pending notifications without blocking
    ///
    /// `TagDeleted` drops the tag from the hub, `DatabaseChanged` resets it.
    /// Returns the number of notifications applied.
    pub fn apply_change_notifications(&mut self) -> usize {
        let mut applied = 0;
        loop {
            match self.events.try_recv() {
                Ok(MetadataEvent::TagDeleted { tag_id }) => {
                    self.hub.notify_tag_deleted(tag_id);
                    applied += 1;
                }
                Ok(MetadataEvent::DatabaseChanged) => {
                    debug!("Database changed, resetting hub");
                    self.hub.reset();
                    applied += 1;
                }
                Ok(MetadataEvent::FileMetadataChanged { .. }) => {}
                Err(TryRecvError::Lagged(missed)) => {
                    warn!(missed, "Hub missed change notifications");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
        applied
    }

    /// The hub, with pending notifications applied
    pub fn hub(&mut self) -> &MetadataHub {
        self.apply_change_notifications();
        &self.hub
    }

    /// Mutable hub, with pending notifications applied
    pub fn hub_mut(&mut self) -> &mut MetadataHub {
        self.apply_change_notifications();
        &mut self.hub
    }

    pub fn into_inner(mut self) -> MetadataHub {
        self.apply_change_notifications();
        self.hub
    }
}

/// Deep copy of the hub with a fresh subscription
///
/// Notifications still queued for the original are not seen by the copy.
impl Clone for WatchedHub {
    fn clone(&self) -> Self {
        Self::new(self.hub.clone(), &self.bus)
    }
}
