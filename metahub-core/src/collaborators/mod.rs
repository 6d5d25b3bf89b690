//! Capability interfaces consumed by the hub
//!
//! The hub never touches a database, a codec or the tag tree directly. It
//! reads and writes through these narrow traits:
//! - [`TagLookup`]: tag id <-> path authority
//! - [`ItemRecord`]: one persisted item (database row)
//! - [`MetadataAccessor`]: decoded metadata of a file or buffer
//! - [`MetadataOpener`]: constructs accessors for file paths
//!
//! Reference implementations live in the submodules.

pub mod buffer;
pub mod document;
pub mod memory_record;
pub mod tag_tree;

pub use buffer::{BlobKind, ImageBuffer};
pub use document::{
    sidecar_path, DocumentMetadata, MetadataDocument, SidecarOpener, SIDECAR_EXTENSION,
};
pub use memory_record::MemoryRecord;
pub use tag_tree::TagTree;

use crate::types::{
    Dimensions, FaceRegion, FaceTag, GeoPosition, LocalizedTextMap, MetadataTemplate, TagId,
};
use chrono::NaiveDateTime;
use metahub_common::Result;
use std::path::{Path, PathBuf};

// ============================================================================
// Tag Authority
// ============================================================================

/// Resolves tag identifiers and paths
///
/// Paths use `/` as separator and carry no leading slash (`People/Alice`).
pub trait TagLookup: Send + Sync {
    /// Id of an existing tag
    fn tag_for_path(&self, path: &str) -> Option<TagId>;

    /// Full path of a tag
    fn tag_path(&self, id: TagId) -> Option<String>;

    /// Display name of a tag (last path segment)
    fn tag_name(&self, id: TagId) -> Option<String> {
        self.tag_path(id)
            .and_then(|path| path.rsplit('/').next().map(str::to_string))
    }

    /// Internal tags (bookkeeping markers) are never loaded into a hub
    fn is_internal(&self, _id: TagId) -> bool {
        false
    }

    /// Whether the tag may appear in embedded metadata
    fn can_be_written_to_metadata(&self, id: TagId) -> bool {
        !self.is_internal(id)
    }

    /// Id of the tag at `path`, creating it if the authority supports that
    fn create_path(&self, path: &str) -> Option<TagId> {
        self.tag_for_path(path)
    }
}

/// Tag authority that knows no tags
///
/// Used by path keyed hubs, which never resolve ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTags;

impl TagLookup for NoTags {
    fn tag_for_path(&self, _path: &str) -> Option<TagId> {
        None
    }

    fn tag_path(&self, _id: TagId) -> Option<String> {
        None
    }
}

// ============================================================================
// Item Record
// ============================================================================

/// One persisted item, as seen by the hub
///
/// Labels and rating use [`UNSET_VALUE`](crate::types::UNSET_VALUE) when the
/// item carries none.
pub trait ItemRecord {
    /// File the record describes, for the file sink
    fn file_path(&self) -> Option<PathBuf>;

    fn date_time(&self) -> Option<NaiveDateTime>;
    fn titles(&self) -> LocalizedTextMap;
    fn comments(&self) -> LocalizedTextMap;
    fn pick_label(&self) -> i32;
    fn color_label(&self) -> i32;
    fn rating(&self) -> i32;
    fn template(&self) -> MetadataTemplate;
    fn tag_ids(&self) -> Vec<TagId>;

    /// Cached pixel dimensions; may be stale
    fn dimensions(&self) -> Option<Dimensions>;

    /// Confirmed face regions in pixel coordinates
    fn face_regions(&self) -> Vec<FaceRegion>;

    fn set_date_time(&mut self, date_time: NaiveDateTime);
    fn set_titles(&mut self, titles: &LocalizedTextMap);
    fn set_comments(&mut self, comments: &LocalizedTextMap);
    fn set_pick_label(&mut self, value: i32);
    fn set_color_label(&mut self, value: i32);
    fn set_rating(&mut self, value: i32);
    fn set_template(&mut self, template: &MetadataTemplate);
    fn remove_template(&mut self);
    fn add_tag(&mut self, id: TagId);
    fn remove_tag(&mut self, id: TagId);
}

// ============================================================================
// Metadata Accessor
// ============================================================================

/// Decoded metadata of one file or buffer
///
/// Getters report absence with empty values or [`UNSET_VALUE`](crate::types::UNSET_VALUE)
/// rather than errors. Setters return `true` when they changed the decoded
/// state (dirty); nothing reaches storage until [`apply_changes`](Self::apply_changes).
pub trait MetadataAccessor {
    /// File the metadata belongs to, if any
    fn file_path(&self) -> Option<&Path>;

    fn titles(&self) -> LocalizedTextMap;
    fn comments(&self) -> LocalizedTextMap;
    fn date_time(&self) -> Option<NaiveDateTime>;
    fn pick_label(&self) -> i32;
    fn color_label(&self) -> i32;
    fn rating(&self) -> i32;
    fn template(&self) -> MetadataTemplate;
    /// Keyword tag paths
    fn tag_paths(&self) -> Vec<String>;
    fn gps(&self) -> Option<GeoPosition>;
    fn face_tags(&self) -> Vec<FaceTag>;

    fn set_titles(&mut self, titles: &LocalizedTextMap) -> bool;
    fn set_comments(&mut self, comments: &LocalizedTextMap) -> bool;
    fn set_date_time(&mut self, date_time: NaiveDateTime) -> bool;
    fn set_pick_label(&mut self, value: i32) -> bool;
    fn set_color_label(&mut self, value: i32) -> bool;
    fn set_rating(&mut self, value: i32) -> bool;
    fn set_template(&mut self, template: &MetadataTemplate) -> bool;
    fn remove_template(&mut self) -> bool;

    /// Photographer, credit and copyright lines; `None` leaves a line as is
    fn set_credits(
        &mut self,
        photographer: Option<&str>,
        credit: Option<&str>,
        copyright: Option<&str>,
    ) -> bool;

    /// Remove then add keyword paths; paths in neither list stay untouched
    fn set_keywords(&mut self, to_remove: &[String], to_add: &[String]) -> bool;

    fn set_face_tags(&mut self, faces: &[FaceTag]) -> bool;

    /// Commit the decoded state to the underlying storage
    fn apply_changes(&mut self) -> Result<()>;
}

/// Builds accessors for file paths
pub trait MetadataOpener {
    type Accessor: MetadataAccessor;

    /// Decode the metadata of `path`
    fn open(&self, path: &Path) -> Result<Self::Accessor>;

    /// Accessor carrying no information, used when decoding failed
    fn empty(&self, path: &Path) -> Self::Accessor;
}
