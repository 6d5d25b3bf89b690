//! In-memory item record

use super::ItemRecord;
use crate::types::{
    Dimensions, FaceRegion, LocalizedTextMap, MetadataTemplate, TagId, UNSET_VALUE,
};
use chrono::NaiveDateTime;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Item record held in memory
///
/// Stands in for a database row in tools and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRecord {
    pub file_path: Option<PathBuf>,
    pub date_time: Option<NaiveDateTime>,
    pub titles: LocalizedTextMap,
    pub comments: LocalizedTextMap,
    pub pick_label: i32,
    pub color_label: i32,
    pub rating: i32,
    pub template: Option<MetadataTemplate>,
    pub tags: BTreeSet<TagId>,
    pub dimensions: Option<Dimensions>,
    pub faces: Vec<FaceRegion>,
}

impl Default for MemoryRecord {
    fn default() -> Self {
        Self {
            file_path: None,
            date_time: None,
            titles: LocalizedTextMap::new(),
            comments: LocalizedTextMap::new(),
            pick_label: UNSET_VALUE,
            color_label: UNSET_VALUE,
            rating: UNSET_VALUE,
            template: None,
            tags: BTreeSet::new(),
            dimensions: None,
            faces: Vec::new(),
        }
    }
}

impl MemoryRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record for the file at `path`
    pub fn for_file(path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = TagId>) -> Self {
        self.tags = tags.into_iter().collect();
        self
    }

    pub fn with_rating(mut self, rating: i32) -> Self {
        self.rating = rating;
        self
    }
}

impl ItemRecord for MemoryRecord {
    fn file_path(&self) -> Option<PathBuf> {
        self.file_path.clone()
    }

    fn date_time(&self) -> Option<NaiveDateTime> {
        self.date_time
    }

    fn titles(&self) -> LocalizedTextMap {
        self.titles.clone()
    }

    fn comments(&self) -> LocalizedTextMap {
        self.comments.clone()
    }

    fn pick_label(&self) -> i32 {
        self.pick_label
    }

    fn color_label(&self) -> i32 {
        self.color_label
    }

    fn rating(&self) -> i32 {
        self.rating
    }

    fn template(&self) -> MetadataTemplate {
        self.template.clone().unwrap_or_default()
    }

    fn tag_ids(&self) -> Vec<TagId> {
        self.tags.iter().copied().collect()
    }

    fn dimensions(&self) -> Option<Dimensions> {
        self.dimensions
    }

    fn face_regions(&self) -> Vec<FaceRegion> {
        self.faces.clone()
    }

    fn set_date_time(&mut self, date_time: NaiveDateTime) {
        self.date_time = Some(date_time);
    }

    fn set_titles(&mut self, titles: &LocalizedTextMap) {
        self.titles = titles.clone();
    }

    fn set_comments(&mut self, comments: &LocalizedTextMap) {
        self.comments = comments.clone();
    }

    fn set_pick_label(&mut self, value: i32) {
        self.pick_label = value;
    }

    fn set_color_label(&mut self, value: i32) {
        self.color_label = value;
    }

    fn set_rating(&mut self, value: i32) {
        self.rating = value;
    }

    fn set_template(&mut self, template: &MetadataTemplate) {
        self.template = Some(template.clone());
    }

    fn remove_template(&mut self) {
        self.template = None;
    }

    fn add_tag(&mut self, id: TagId) {
        self.tags.insert(id);
    }

    fn remove_tag(&mut self, id: TagId) {
        self.tags.remove(&id);
    }
}
