//! # metahub common library
//!
//! Shared code for the metadata reconciliation engine and its tools:
//! - Error type and result alias
//! - Write settings and configuration loading
//! - Event bus for file-changed and tag-deleted notifications
//! - Timestamp helpers

pub mod config;
pub mod error;
pub mod events;
pub mod time;

pub use config::{FieldPermissions, MetadataSettings};
pub use error::{Error, Result};
pub use events::{EventBus, FileChangeObserver, MetadataEvent};
