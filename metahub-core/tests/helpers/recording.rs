//! Metadata accessor that records which setters ran

use chrono::NaiveDateTime;
use metahub_core::types::{FaceTag, GeoPosition, LocalizedTextMap, MetadataTemplate};
use metahub_core::{MetadataAccessor, UNSET_VALUE};
use std::path::Path;

/// Accessor starting empty, logging every setter call by name
#[derive(Debug, Default)]
pub struct RecordingAccessor {
    pub calls: Vec<&'static str>,
    pub keywords_removed: Vec<String>,
    pub keywords_added: Vec<String>,
    pub fail_commit: bool,
}

impl RecordingAccessor {
    pub fn touched(&self, setter: &str) -> bool {
        self.calls.iter().any(|c| *c == setter)
    }

    fn call(&mut self, name: &'static str) -> bool {
        self.calls.push(name);
        true
    }
}

impl MetadataAccessor for RecordingAccessor {
    fn file_path(&self) -> Option<&Path> {
        None
    }
    fn titles(&self) -> LocalizedTextMap {
        LocalizedTextMap::new()
    }
    fn comments(&self) -> LocalizedTextMap {
        LocalizedTextMap::new()
    }
    fn date_time(&self) -> Option<NaiveDateTime> {
        None
    }
    fn pick_label(&self) -> i32 {
        UNSET_VALUE
    }
    fn color_label(&self) -> i32 {
        UNSET_VALUE
    }
    fn rating(&self) -> i32 {
        UNSET_VALUE
    }
    fn template(&self) -> MetadataTemplate {
        MetadataTemplate::default()
    }
    fn tag_paths(&self) -> Vec<String> {
        Vec::new()
    }
    fn gps(&self) -> Option<GeoPosition> {
        None
    }
    fn face_tags(&self) -> Vec<FaceTag> {
        Vec::new()
    }

    fn set_titles(&mut self, _titles: &LocalizedTextMap) -> bool {
        self.call("titles")
    }
    fn set_comments(&mut self, _comments: &LocalizedTextMap) -> bool {
        self.call("comments")
    }
    fn set_date_time(&mut self, _date_time: NaiveDateTime) -> bool {
        self.call("date_time")
    }
    fn set_pick_label(&mut self, _value: i32) -> bool {
        self.call("pick_label")
    }
    fn set_color_label(&mut self, _value: i32) -> bool {
        self.call("color_label")
    }
    fn set_rating(&mut self, _value: i32) -> bool {
        self.call("rating")
    }
    fn set_template(&mut self, _template: &MetadataTemplate) -> bool {
        self.call("template")
    }
    fn remove_template(&mut self) -> bool {
        self.call("remove_template")
    }
    fn set_credits(&mut self, _: Option<&str>, _: Option<&str>, _: Option<&str>) -> bool {
        self.call("credits")
    }
    fn set_keywords(&mut self, to_remove: &[String], to_add: &[String]) -> bool {
        self.keywords_removed = to_remove.to_vec();
        self.keywords_added = to_add.to_vec();
        self.call("keywords")
    }
    fn set_face_tags(&mut self, _faces: &[FaceTag]) -> bool {
        self.call("face_tags")
    }
    fn apply_changes(&mut self) -> metahub_common::Result<()> {
        if self.fail_commit {
            return Err(metahub_common::Error::Codec("commit refused".into()));
        }
        Ok(())
    }
}
