//! Record sink

use crate::collaborators::ItemRecord;
use crate::hub::MetadataHub;
use crate::policy::{FieldGroup, WriteMode};
use crate::tags::TagMode;
use metahub_common::FieldPermissions;
use tracing::{debug, warn};

impl MetadataHub {
    /// Apply the hub to a persisted record
    ///
    /// Records accept every field group they store, so only the write mode
    /// filters. Only `Available` tags are added or removed; disjoint tags
    /// stay as the record has them. Returns whether any mutator ran.
    pub fn write_to_record<R: ItemRecord + ?Sized>(&self, record: &mut R, mode: WriteMode) -> bool {
        let plan = self.write_plan(mode, &FieldPermissions::database());
        let mut touched = false;

        if plan.should_write(FieldGroup::Titles) {
            if let Some(titles) = self.titles().value() {
                record.set_titles(titles);
                touched = true;
            }
        }
        if plan.should_write(FieldGroup::Comments) {
            if let Some(comments) = self.comments().value() {
                record.set_comments(comments);
                touched = true;
            }
        }
        if plan.should_write(FieldGroup::DateTime) {
            if let Some(date_time) = self.date_time().value() {
                record.set_date_time(*date_time);
                touched = true;
            }
        }
        if plan.should_write(FieldGroup::PickLabel) {
            if let Some(value) = self.pick_label().value() {
                record.set_pick_label(*value);
                touched = true;
            }
        }
        if plan.should_write(FieldGroup::ColorLabel) {
            if let Some(value) = self.color_label().value() {
                record.set_color_label(*value);
                touched = true;
            }
        }
        if plan.should_write(FieldGroup::Rating) {
            if let Some(value) = self.rating().value() {
                record.set_rating(*value);
                touched = true;
            }
        }
        if plan.should_write(FieldGroup::Template) {
            if let Some(template) = self.template().value() {
                if template.is_removal() {
                    record.remove_template();
                    touched = true;
                } else if !template.title.is_empty() {
                    record.set_template(template);
                    touched = true;
                }
            }
        }
        if plan.should_write(FieldGroup::Tags) {
            touched |= self.write_record_tags(record);
        }

        touched
    }

    fn write_record_tags<R: ItemRecord + ?Sized>(&self, record: &mut R) -> bool {
        let mut touched = false;
        match self.tag_mode() {
            TagMode::IdKeyed => {
                for (id, status) in self.tags().iter_ids() {
                    if !status.status.is_available() {
                        debug!(tag_id = id, "Tag not agreed on, left as is");
                        continue;
                    }
                    if status.has_tag {
                        record.add_tag(id);
                    } else {
                        record.remove_tag(id);
                    }
                    touched = true;
                }
            }
            TagMode::PathKeyed => {
                for path in self.tags().agreed_paths() {
                    match self.tag_lookup().create_path(path) {
                        Some(id) => {
                            record.add_tag(id);
                            touched = true;
                        }
                        None => warn!(path = %path, "Cannot create tag for keyword, skipped"),
                    }
                }
            }
        }
        touched
    }
}
