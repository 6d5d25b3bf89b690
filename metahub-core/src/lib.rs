//! metahub-core: metadata reconciliation engine
//!
//! Merges descriptive metadata (capture date, titles, captions, labels,
//! rating, template, tags) from several sources into one view, tracks which
//! fields were explicitly edited, and writes the result back to records,
//! files and image buffers under a write policy.
//!
//! ```
//! use metahub_core::{MemoryRecord, MergeStatus, MetadataHub, WriteMode};
//!
//! let mut hub = MetadataHub::path_keyed();
//! hub.load_record(&MemoryRecord::new().with_rating(3));
//! hub.load_record(&MemoryRecord::new().with_rating(5));
//! assert_eq!(hub.rating().status(), MergeStatus::Disjoint);
//!
//! hub.set_rating(4, MergeStatus::Available);
//! let mut record = MemoryRecord::new();
//! assert!(hub.write_to_record(&mut record, WriteMode::PartialWrite));
//! assert_eq!(record.rating, 4);
//! ```

pub mod collaborators;
pub mod hub;
pub mod lazy_sync;
pub mod merge;
pub mod policy;
pub mod sinks;
pub mod tags;
pub mod types;
pub mod watch;

pub use collaborators::{
    BlobKind, DocumentMetadata, ImageBuffer, ItemRecord, MemoryRecord, MetadataAccessor,
    MetadataDocument, MetadataOpener, NoTags, SidecarOpener, TagLookup, TagTree,
};
pub use hub::MetadataHub;
pub use lazy_sync::PendingSync;
pub use merge::FieldMerge;
pub use policy::{FieldGroup, WriteMode, WritePlan};
pub use sinks::{BatchReport, FileSink};
pub use tags::{cleanup_tags, TagMode, TagStatusTable};
pub use types::{MergeStatus, TagId, TagStatus, UNSET_VALUE};
pub use watch::WatchedHub;
