//! Write policy evaluator
//!
//! Decides, per field group, whether a write puts the hub's value on a sink.
//! The dry-run probe ([`MetadataHub::will_write`]) and every sink adapter go
//! through the same [`WritePlan`], so they cannot disagree.
//!
//! A field group is *eligible* when the permissions allow it and its merge
//! status is `Available`. Disjoint and invalid groups are never written.

use crate::hub::MetadataHub;
use crate::types::MergeStatus;
use metahub_common::{FieldPermissions, MetadataSettings};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which eligible fields a write puts on the sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WriteMode {
    /// Every eligible field
    FullWrite,
    /// Every eligible field, provided at least one eligible field changed
    FullWriteIfChanged,
    /// Only eligible fields that changed
    PartialWrite,
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WriteMode::FullWrite => "full",
            WriteMode::FullWriteIfChanged => "if-changed",
            WriteMode::PartialWrite => "partial",
        };
        f.write_str(name)
    }
}

impl FromStr for WriteMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(WriteMode::FullWrite),
            "if-changed" => Ok(WriteMode::FullWriteIfChanged),
            "partial" => Ok(WriteMode::PartialWrite),
            other => Err(format!(
                "unknown write mode '{}' (expected full, if-changed or partial)",
                other
            )),
        }
    }
}

/// Unit of the write decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldGroup {
    Titles,
    Comments,
    DateTime,
    PickLabel,
    ColorLabel,
    Rating,
    Template,
    Tags,
    FaceTags,
}

impl FieldGroup {
    pub const ALL: [FieldGroup; 9] = [
        FieldGroup::Titles,
        FieldGroup::Comments,
        FieldGroup::DateTime,
        FieldGroup::PickLabel,
        FieldGroup::ColorLabel,
        FieldGroup::Rating,
        FieldGroup::Template,
        FieldGroup::Tags,
        FieldGroup::FaceTags,
    ];

    pub fn is_permitted(self, permissions: &FieldPermissions) -> bool {
        match self {
            FieldGroup::Titles => permissions.titles,
            FieldGroup::Comments => permissions.comments,
            FieldGroup::DateTime => permissions.date_time,
            FieldGroup::PickLabel => permissions.pick_label,
            FieldGroup::ColorLabel => permissions.color_label,
            FieldGroup::Rating => permissions.rating,
            FieldGroup::Template => permissions.template,
            FieldGroup::Tags => permissions.tags,
            FieldGroup::FaceTags => permissions.face_tags,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Outcome of the write policy for one hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WritePlan {
    groups: [bool; 9],
}

impl WritePlan {
    pub fn should_write(&self, group: FieldGroup) -> bool {
        self.groups[group.index()]
    }

    /// Whether the write would touch anything at all
    pub fn any(&self) -> bool {
        self.groups.iter().any(|g| *g)
    }

    /// Groups that will be written, in declaration order
    pub fn groups(&self) -> impl Iterator<Item = FieldGroup> + '_ {
        FieldGroup::ALL
            .into_iter()
            .filter(|group| self.should_write(*group))
    }
}

impl MetadataHub {
    /// Merge status of a field group
    ///
    /// Tags count as `Available` when at least one entry has a single agreed
    /// state.
    pub fn group_status(&self, group: FieldGroup) -> MergeStatus {
        match group {
            FieldGroup::Titles => self.titles().status(),
            FieldGroup::Comments => self.comments().status(),
            FieldGroup::DateTime => self.date_time().status(),
            FieldGroup::PickLabel => self.pick_label().status(),
            FieldGroup::ColorLabel => self.color_label().status(),
            FieldGroup::Rating => self.rating().status(),
            FieldGroup::Template => self.template().status(),
            FieldGroup::FaceTags => self.face_tags().status(),
            FieldGroup::Tags => {
                if self.tags().has_available() {
                    MergeStatus::Available
                } else {
                    MergeStatus::Invalid
                }
            }
        }
    }

    pub fn group_changed(&self, group: FieldGroup) -> bool {
        match group {
            FieldGroup::Titles => self.titles().is_changed(),
            FieldGroup::Comments => self.comments().is_changed(),
            FieldGroup::DateTime => self.date_time().is_changed(),
            FieldGroup::PickLabel => self.pick_label().is_changed(),
            FieldGroup::ColorLabel => self.color_label().is_changed(),
            FieldGroup::Rating => self.rating().is_changed(),
            FieldGroup::Template => self.template().is_changed(),
            FieldGroup::Tags => self.tags().is_changed(),
            FieldGroup::FaceTags => self.face_tags().is_changed(),
        }
    }

    /// Evaluate the write policy
    pub fn write_plan(&self, mode: WriteMode, permissions: &FieldPermissions) -> WritePlan {
        let eligible = FieldGroup::ALL.map(|group| {
            group.is_permitted(permissions) && self.group_status(group) == MergeStatus::Available
        });

        let write_all = match mode {
            WriteMode::FullWrite => true,
            WriteMode::FullWriteIfChanged => FieldGroup::ALL
                .into_iter()
                .any(|group| eligible[group.index()] && self.group_changed(group)),
            WriteMode::PartialWrite => false,
        };

        WritePlan {
            groups: FieldGroup::ALL.map(|group| {
                eligible[group.index()] && (write_all || self.group_changed(group))
            }),
        }
    }

    /// Dry run: would a metadata write with these settings touch anything?
    pub fn will_write(&self, mode: WriteMode, settings: &MetadataSettings) -> bool {
        self.write_plan(mode, &settings.permissions()).any()
    }
}
