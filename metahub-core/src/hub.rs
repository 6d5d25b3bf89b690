//! Metadata hub
//!
//! Merges the metadata of one or more sources into a single coalesced view.
//! Each field is a [`FieldMerge`]; tag assignments go through a
//! [`TagStatusTable`]. Explicit `set_*` calls override merged values and
//! raise per-field changed flags, which the write policy consults.
//!
//! The hub is a plain value: cloning deep-copies all merge state. It is not
//! shared across threads; concurrent workers each build their own.

use crate::collaborators::{
    ItemRecord, MetadataAccessor, MetadataOpener, NoTags, TagLookup,
};
use crate::merge::FieldMerge;
use crate::tags::{TagMode, TagStatusTable};
use crate::types::{
    Dimensions, FaceTag, LocalizedTextMap, MergeStatus, MetadataTemplate, PixelRect, TagId,
    TagStatus,
};
use chrono::NaiveDateTime;
use metahub_common::time;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Field values read from one source, before merging
struct FieldSnapshot {
    date_time: Option<NaiveDateTime>,
    titles: LocalizedTextMap,
    comments: LocalizedTextMap,
    pick_label: i32,
    color_label: i32,
    rating: i32,
    template: MetadataTemplate,
}

/// Coalesced metadata of a set of sources
#[derive(Clone)]
pub struct MetadataHub {
    lookup: Arc<dyn TagLookup>,
    date_time: FieldMerge<NaiveDateTime>,
    titles: FieldMerge<LocalizedTextMap>,
    comments: FieldMerge<LocalizedTextMap>,
    pick_label: FieldMerge<i32>,
    color_label: FieldMerge<i32>,
    rating: FieldMerge<i32>,
    template: FieldMerge<MetadataTemplate>,
    faces: FieldMerge<Vec<FaceTag>>,
    tags: TagStatusTable,
    load_count: usize,
}

impl MetadataHub {
    /// Hub with a fixed tag mode and tag authority
    pub fn new(mode: TagMode, lookup: Arc<dyn TagLookup>) -> Self {
        Self {
            lookup,
            date_time: FieldMerge::new(),
            titles: FieldMerge::new(),
            comments: FieldMerge::new(),
            pick_label: FieldMerge::new(),
            color_label: FieldMerge::new(),
            rating: FieldMerge::new(),
            template: FieldMerge::new(),
            faces: FieldMerge::new(),
            tags: TagStatusTable::new(mode),
            load_count: 0,
        }
    }

    /// Id keyed hub resolving tags through `lookup`
    pub fn with_tag_lookup(lookup: Arc<dyn TagLookup>) -> Self {
        Self::new(TagMode::IdKeyed, lookup)
    }

    /// Path keyed hub for keywords no tag authority knows
    pub fn path_keyed() -> Self {
        Self::new(TagMode::PathKeyed, Arc::new(NoTags))
    }

    /// Back to the construction-time state; mode and tag authority are kept
    pub fn reset(&mut self) {
        *self = Self::new(self.tags.mode(), Arc::clone(&self.lookup));
    }

    /// Clear every changed flag, keeping merge state
    pub fn reset_changed(&mut self) {
        self.date_time.reset_changed();
        self.titles.reset_changed();
        self.comments.reset_changed();
        self.pick_label.reset_changed();
        self.color_label.reset_changed();
        self.rating.reset_changed();
        self.template.reset_changed();
        self.faces.reset_changed();
        self.tags.reset_changed();
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Merge in a persisted record
    pub fn load_record<R: ItemRecord + ?Sized>(&mut self, record: &R) {
        let first_load = self.begin_load();

        self.merge_fields(FieldSnapshot {
            date_time: record.date_time(),
            titles: record.titles(),
            comments: record.comments(),
            pick_label: record.pick_label(),
            color_label: record.color_label(),
            rating: record.rating(),
            template: record.template(),
        });

        let ids: Vec<TagId> = record
            .tag_ids()
            .into_iter()
            .filter(|id| !self.lookup.is_internal(*id))
            .collect();

        match self.tags.mode() {
            TagMode::IdKeyed => self.tags.merge_ids(&ids, first_load),
            TagMode::PathKeyed => {
                let paths: Vec<String> =
                    ids.iter().filter_map(|id| self.lookup.tag_path(*id)).collect();
                self.tags.intersect_paths(&paths, first_load);
            }
        }
    }

    /// Merge in decoded metadata
    ///
    /// A missing capture date falls back to the file's modification time.
    /// In id keyed mode, keyword paths unknown to the tag authority are
    /// skipped with a warning.
    pub fn load_metadata<A: MetadataAccessor + ?Sized>(&mut self, metadata: &A) {
        let first_load = self.begin_load();

        let date_time = metadata
            .date_time()
            .or_else(|| metadata.file_path().and_then(time::file_modified));

        self.merge_fields(FieldSnapshot {
            date_time,
            titles: metadata.titles(),
            comments: metadata.comments(),
            pick_label: metadata.pick_label(),
            color_label: metadata.color_label(),
            rating: metadata.rating(),
            template: metadata.template(),
        });

        let paths = metadata.tag_paths();
        match self.tags.mode() {
            TagMode::IdKeyed => {
                let ids: Vec<TagId> = paths
                    .iter()
                    .filter_map(|path| {
                        let id = self.lookup.tag_for_path(path);
                        if id.is_none() {
                            warn!(path = %path, file = ?metadata.file_path(),
                                "Keyword not known to tag authority, skipped");
                        }
                        id
                    })
                    .filter(|id| !self.lookup.is_internal(*id))
                    .collect();
                self.tags.merge_ids(&ids, first_load);
            }
            TagMode::PathKeyed => self.tags.intersect_paths(&paths, first_load),
        }
    }

    /// Merge in the metadata of a file
    ///
    /// Returns `false` if the file could not be decoded. The load still
    /// counts, and the empty accessor is merged as "no information".
    pub fn load_file<O: MetadataOpener>(&mut self, path: &Path, opener: &O) -> bool {
        match opener.open(path) {
            Ok(metadata) => {
                self.load_metadata(&metadata);
                true
            }
            Err(e) => {
                warn!(path = ?path, error = %e, "Failed to read metadata, merging empty values");
                self.load_metadata(&opener.empty(path));
                false
            }
        }
    }

    /// Merge in a record's confirmed face regions
    ///
    /// Rectangles are made relative to `dimensions`, which the caller takes
    /// from the image itself rather than from the record's cached size.
    /// Faces whose tag has no name are dropped.
    pub fn load_face_tags<R: ItemRecord + ?Sized>(&mut self, record: &R, dimensions: Dimensions) {
        let faces = record
            .face_regions()
            .into_iter()
            .filter_map(|face| {
                let name = self.lookup.tag_name(face.tag_id).filter(|n| !n.is_empty())?;
                let region = face.region.to_relative(dimensions)?;
                Some(FaceTag { name, region })
            })
            .collect();
        self.faces.load_single(faces);
    }

    fn begin_load(&mut self) -> bool {
        let first_load = self.load_count == 0;
        self.load_count += 1;
        if !first_load {
            debug!(load_count = self.load_count, "Merging additional source");
        }
        first_load
    }

    fn merge_fields(&mut self, fields: FieldSnapshot) {
        if let Some(date_time) = fields.date_time {
            self.date_time.load_with_interval(date_time);
        }
        self.pick_label.load_with_interval(fields.pick_label);
        self.color_label.load_with_interval(fields.color_label);
        self.rating.load_with_interval(fields.rating);
        self.titles.load_single(fields.titles);
        self.comments.load_single(fields.comments);
        self.template.load_single(fields.template);
    }

    // ========================================================================
    // Explicit changes
    // ========================================================================

    pub fn set_date_time(&mut self, value: NaiveDateTime, status: MergeStatus) {
        self.date_time.set(value, status);
    }

    pub fn set_titles(&mut self, value: LocalizedTextMap, status: MergeStatus) {
        self.titles.set(value, status);
    }

    pub fn set_comments(&mut self, value: LocalizedTextMap, status: MergeStatus) {
        self.comments.set(value, status);
    }

    pub fn set_pick_label(&mut self, value: i32, status: MergeStatus) {
        self.pick_label.set(value, status);
    }

    pub fn set_color_label(&mut self, value: i32, status: MergeStatus) {
        self.color_label.set(value, status);
    }

    pub fn set_rating(&mut self, value: i32, status: MergeStatus) {
        self.rating.set(value, status);
    }

    pub fn set_template(&mut self, value: MetadataTemplate, status: MergeStatus) {
        self.template.set(value, status);
    }

    /// Override one tag; returns `false` for path keyed hubs
    pub fn set_tag(&mut self, id: TagId, has_tag: bool, status: MergeStatus) -> bool {
        self.tags.set_tag(id, has_tag, status)
    }

    /// Replace the face list with named pixel rectangles
    pub fn set_face_tags(&mut self, faces: &[(String, PixelRect)], dimensions: Dimensions) {
        let faces = faces
            .iter()
            .filter_map(|(name, rect)| {
                Some(FaceTag {
                    name: name.clone(),
                    region: rect.to_relative(dimensions)?,
                })
            })
            .collect();
        self.faces.set(faces, MergeStatus::Available);
    }

    /// Drop a tag the authority deleted
    pub fn notify_tag_deleted(&mut self, id: TagId) {
        if self.tags.remove(id) {
            debug!(tag_id = id, "Dropped deleted tag from hub");
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn load_count(&self) -> usize {
        self.load_count
    }

    pub fn tag_mode(&self) -> TagMode {
        self.tags.mode()
    }

    pub fn tag_lookup(&self) -> &Arc<dyn TagLookup> {
        &self.lookup
    }

    pub fn date_time(&self) -> &FieldMerge<NaiveDateTime> {
        &self.date_time
    }

    pub fn titles(&self) -> &FieldMerge<LocalizedTextMap> {
        &self.titles
    }

    pub fn comments(&self) -> &FieldMerge<LocalizedTextMap> {
        &self.comments
    }

    pub fn pick_label(&self) -> &FieldMerge<i32> {
        &self.pick_label
    }

    pub fn color_label(&self) -> &FieldMerge<i32> {
        &self.color_label
    }

    pub fn rating(&self) -> &FieldMerge<i32> {
        &self.rating
    }

    pub fn template(&self) -> &FieldMerge<MetadataTemplate> {
        &self.template
    }

    pub fn face_tags(&self) -> &FieldMerge<Vec<FaceTag>> {
        &self.faces
    }

    pub fn tags(&self) -> &TagStatusTable {
        &self.tags
    }

    pub fn tag_status(&self, id: TagId) -> TagStatus {
        self.tags.status_of_id(id)
    }

    pub fn tag_status_for_path(&self, path: &str) -> TagStatus {
        match self.tags.mode() {
            TagMode::PathKeyed => self.tags.status_of_path(path),
            TagMode::IdKeyed => self
                .lookup
                .tag_for_path(path)
                .map_or(TagStatus::INVALID, |id| self.tags.status_of_id(id)),
        }
    }

    /// Tag ids every source agreed are present
    pub fn keyword_ids(&self) -> Vec<TagId> {
        self.tags.agreed_ids()
    }

    /// Tag paths every source agreed are present
    pub fn keywords(&self) -> Vec<String> {
        match self.tags.mode() {
            TagMode::PathKeyed => self.tags.agreed_paths().to_vec(),
            TagMode::IdKeyed => self
                .tags
                .agreed_ids()
                .into_iter()
                .filter_map(|id| self.lookup.tag_path(id))
                .collect(),
        }
    }

    /// Every id keyed entry with its status
    pub fn tag_entries(&self) -> BTreeMap<TagId, TagStatus> {
        self.tags.entries()
    }

    // ========================================================================
    // Per-record projection
    // ========================================================================

    /// Copy of this hub specialised for writing to one of its records
    ///
    /// Disjoint tags are resolved against the record's own tags: present
    /// ones become `(Available, true)`, absent ones `(Available, false)`.
    /// Writing the projection to the record's file then keeps each file's
    /// own share of a disjoint tag instead of dropping it.
    pub fn project_onto_record<R: ItemRecord + ?Sized>(&self, record: &R) -> MetadataHub {
        let mut projected = self.clone();
        if self.tags.mode() != TagMode::IdKeyed {
            return projected;
        }

        let own: HashSet<TagId> = record.tag_ids().into_iter().collect();
        for (id, status) in self.tags.iter_ids() {
            if status.status == MergeStatus::Disjoint {
                projected.tags.resolve(id, own.contains(&id));
            }
        }
        projected
    }
}

impl fmt::Debug for MetadataHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetadataHub")
            .field("date_time", &self.date_time)
            .field("titles", &self.titles)
            .field("comments", &self.comments)
            .field("pick_label", &self.pick_label)
            .field("color_label", &self.color_label)
            .field("rating", &self.rating)
            .field("template", &self.template)
            .field("faces", &self.faces)
            .field("tags", &self.tags)
            .field("load_count", &self.load_count)
            .finish_non_exhaustive()
    }
}

/// Compares merge state; the tag authority is not part of it
impl PartialEq for MetadataHub {
    fn eq(&self, other: &Self) -> bool {
        self.date_time == other.date_time
            && self.titles == other.titles
            && self.comments == other.comments
            && self.pick_label == other.pick_label
            && self.color_label == other.color_label
            && self.rating == other.rating
            && self.template == other.template
            && self.faces == other.faces
            && self.tags == other.tags
            && self.load_count == other.load_count
    }
}
