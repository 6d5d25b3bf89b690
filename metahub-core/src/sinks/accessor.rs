//! Metadata accessor sink

use crate::collaborators::MetadataAccessor;
use crate::hub::MetadataHub;
use crate::policy::{FieldGroup, WriteMode};
use crate::tags::{cleanup_tags, TagMode};
use metahub_common::MetadataSettings;
use tracing::debug;

impl MetadataHub {
    /// Apply the hub to decoded metadata, without committing it
    ///
    /// Returns the OR of every setter's dirty flag.
    pub fn write_to_metadata<A: MetadataAccessor + ?Sized>(
        &self,
        metadata: &mut A,
        mode: WriteMode,
        settings: &MetadataSettings,
    ) -> bool {
        let plan = self.write_plan(mode, &settings.permissions());
        let mut dirty = false;

        if plan.should_write(FieldGroup::Titles) {
            if let Some(titles) = self.titles().value() {
                dirty |= metadata.set_titles(titles);
            }
        }
        if plan.should_write(FieldGroup::Comments) {
            if let Some(comments) = self.comments().value() {
                dirty |= metadata.set_comments(comments);
            }
        }
        if plan.should_write(FieldGroup::DateTime) {
            if let Some(date_time) = self.date_time().value() {
                dirty |= metadata.set_date_time(*date_time);
            }
        }
        if plan.should_write(FieldGroup::PickLabel) {
            if let Some(value) = self.pick_label().value() {
                dirty |= metadata.set_pick_label(*value);
            }
        }
        if plan.should_write(FieldGroup::ColorLabel) {
            if let Some(value) = self.color_label().value() {
                dirty |= metadata.set_color_label(*value);
            }
        }
        if plan.should_write(FieldGroup::Rating) {
            if let Some(value) = self.rating().value() {
                dirty |= metadata.set_rating(*value);
            }
        }
        if plan.should_write(FieldGroup::Template) {
            if let Some(template) = self.template().value() {
                if template.is_removal() {
                    dirty |= metadata.remove_template();
                } else if !template.title.is_empty() {
                    dirty |= metadata.remove_template();
                    dirty |= metadata.set_template(template);
                    dirty |= metadata.set_credits(
                        settings.photographer.as_deref(),
                        settings.credit.as_deref(),
                        settings.copyright.as_deref(),
                    );
                }
            }
        }
        if plan.should_write(FieldGroup::FaceTags) {
            if let Some(faces) = self.face_tags().value() {
                dirty |= metadata.set_face_tags(faces);
            }
        }
        if plan.should_write(FieldGroup::Tags) {
            let (to_remove, to_add) = self.keyword_changes();
            dirty |= metadata.set_keywords(&to_remove, &to_add);
        }

        dirty
    }

    /// Keyword paths to remove and to add on a metadata sink
    ///
    /// Only `Available` tags the authority allows in metadata take part.
    /// Disjoint tags are in neither list, so each sink keeps its own.
    fn keyword_changes(&self) -> (Vec<String>, Vec<String>) {
        if self.tag_mode() == TagMode::PathKeyed {
            return (Vec::new(), cleanup_tags(self.tags().agreed_paths()));
        }

        let lookup = self.tag_lookup();
        let mut to_remove = Vec::new();
        let mut to_add = Vec::new();
        for (id, status) in self.tags().iter_ids() {
            if !status.status.is_available() || !lookup.can_be_written_to_metadata(id) {
                continue;
            }
            let Some(path) = lookup.tag_path(id) else {
                debug!(tag_id = id, "Tag has no path, not written");
                continue;
            };
            if status.has_tag {
                to_add.push(path);
            } else {
                to_remove.push(path);
            }
        }
        (cleanup_tags(to_remove), cleanup_tags(to_add))
    }
}
