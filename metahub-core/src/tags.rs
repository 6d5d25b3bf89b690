//! Tag status table
//!
//! Per-tag three-state merge over the tag sets of all loaded sources. The
//! table runs in one of two modes, fixed when the hub is built:
//!
//! - **Id keyed**: `TagId -> TagStatus`, with full disjoint tracking.
//! - **Path keyed**: a running intersection of tag path strings, used when
//!   no tag authority can resolve the paths (e.g. importing keywords the tag
//!   tree does not know yet). It has no notion of disjoint: a path is either
//!   in the intersection or absent.

use crate::types::{MergeStatus, TagId, TagStatus};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Legacy root marker found in tag paths written by old tools
pub const LEGACY_ROOT_TAG: &str = "_Digikam_root_tag_";

/// Keying mode of a [`TagStatusTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagMode {
    IdKeyed,
    PathKeyed,
}

#[derive(Debug, Clone, PartialEq)]
enum Entries {
    IdKeyed(BTreeMap<TagId, TagStatus>),
    PathKeyed(Vec<String>),
}

/// Tag merge state plus its explicit-change flag
#[derive(Debug, Clone, PartialEq)]
pub struct TagStatusTable {
    entries: Entries,
    changed: bool,
}

impl TagStatusTable {
    pub fn new(mode: TagMode) -> Self {
        let entries = match mode {
            TagMode::IdKeyed => Entries::IdKeyed(BTreeMap::new()),
            TagMode::PathKeyed => Entries::PathKeyed(Vec::new()),
        };
        Self {
            entries,
            changed: false,
        }
    }

    pub fn mode(&self) -> TagMode {
        match self.entries {
            Entries::IdKeyed(_) => TagMode::IdKeyed,
            Entries::PathKeyed(_) => TagMode::PathKeyed,
        }
    }

    /// Merge the tag set of one source (id keyed mode)
    ///
    /// `first_load` is true for the first source of the hub. Ignored in path
    /// keyed mode.
    pub fn merge_ids(&mut self, present: &[TagId], first_load: bool) {
        let Entries::IdKeyed(map) = &mut self.entries else {
            return;
        };

        let present: BTreeSet<TagId> = present.iter().copied().collect();

        for id in &present {
            let status = map.entry(*id).or_default();
            if status.status == MergeStatus::Invalid {
                *status = if first_load {
                    TagStatus::available(true)
                } else {
                    // earlier sources did not have it, this one does
                    TagStatus::disjoint()
                };
            } else if *status == TagStatus::available(false) {
                // explicitly set as absent, but this source has it
                *status = TagStatus::disjoint();
            }
        }

        for (id, status) in map.iter_mut() {
            if !present.contains(id) && *status == TagStatus::available(true) {
                *status = TagStatus::disjoint();
            }
        }
    }

    /// Intersect with the tag paths of one source (path keyed mode)
    ///
    /// Surviving paths keep their original insertion order. Ignored in id
    /// keyed mode.
    pub fn intersect_paths(&mut self, present: &[String], first_load: bool) {
        let Entries::PathKeyed(paths) = &mut self.entries else {
            return;
        };

        if first_load {
            *paths = dedup_preserving_order(present.iter().cloned());
        } else {
            let incoming: HashSet<&String> = present.iter().collect();
            paths.retain(|path| incoming.contains(path));
        }
    }

    /// Status of a tag id; `(Invalid, false)` if no source mentioned it
    pub fn status_of_id(&self, id: TagId) -> TagStatus {
        match &self.entries {
            Entries::IdKeyed(map) => map.get(&id).copied().unwrap_or(TagStatus::INVALID),
            Entries::PathKeyed(_) => TagStatus::INVALID,
        }
    }

    /// Membership of a path in the running intersection (path keyed mode)
    pub fn status_of_path(&self, path: &str) -> TagStatus {
        match &self.entries {
            Entries::PathKeyed(paths) if paths.iter().any(|p| p == path) => {
                TagStatus::available(true)
            }
            _ => TagStatus::INVALID,
        }
    }

    /// Explicit override (id keyed mode); raises the changed flag
    ///
    /// Returns `false` in path keyed mode, where ids have no meaning.
    pub fn set_tag(&mut self, id: TagId, has_tag: bool, status: MergeStatus) -> bool {
        let Entries::IdKeyed(map) = &mut self.entries else {
            return false;
        };
        map.insert(id, TagStatus::new(status, has_tag));
        self.changed = true;
        true
    }

    /// Settle one entry to `(Available, has_tag)` without raising the changed flag
    pub(crate) fn resolve(&mut self, id: TagId, has_tag: bool) {
        if let Entries::IdKeyed(map) = &mut self.entries {
            map.insert(id, TagStatus::available(has_tag));
        }
    }

    /// Drop an entry, e.g. after the tag was deleted from the authority
    pub fn remove(&mut self, id: TagId) -> bool {
        match &mut self.entries {
            Entries::IdKeyed(map) => map.remove(&id).is_some(),
            Entries::PathKeyed(_) => false,
        }
    }

    /// Ids everyone agreed are present
    pub fn agreed_ids(&self) -> Vec<TagId> {
        match &self.entries {
            Entries::IdKeyed(map) => map
                .iter()
                .filter(|(_, status)| status.is_agreed_present())
                .map(|(id, _)| *id)
                .collect(),
            Entries::PathKeyed(_) => Vec::new(),
        }
    }

    /// The running intersection (path keyed mode)
    pub fn agreed_paths(&self) -> &[String] {
        match &self.entries {
            Entries::PathKeyed(paths) => paths,
            Entries::IdKeyed(_) => &[],
        }
    }

    /// All id keyed entries, including disjoint and explicitly absent ones
    pub fn entries(&self) -> BTreeMap<TagId, TagStatus> {
        match &self.entries {
            Entries::IdKeyed(map) => map.clone(),
            Entries::PathKeyed(_) => BTreeMap::new(),
        }
    }

    pub(crate) fn iter_ids(&self) -> impl Iterator<Item = (TagId, TagStatus)> + '_ {
        let map = match &self.entries {
            Entries::IdKeyed(map) => Some(map),
            Entries::PathKeyed(_) => None,
        };
        map.into_iter().flatten().map(|(id, status)| (*id, *status))
    }

    /// Whether at least one entry has a single agreed state that can be written
    pub fn has_available(&self) -> bool {
        match &self.entries {
            Entries::IdKeyed(map) => map.values().any(|s| s.status == MergeStatus::Available),
            Entries::PathKeyed(paths) => !paths.is_empty(),
        }
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn reset_changed(&mut self) {
        self.changed = false;
    }
}

/// Remove duplicate and obsolete entries from a to-write tag list
///
/// Drops empty entries, strips the legacy root marker and deduplicates,
/// keeping the first occurrence of each entry.
pub fn cleanup_tags<I, S>(to_clean: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let stripped = to_clean
        .into_iter()
        .map(|keyword| strip_legacy_root(keyword.as_ref()))
        .filter(|keyword| !keyword.is_empty());
    dedup_preserving_order(stripped)
}

fn strip_legacy_root(keyword: &str) -> String {
    if !keyword.contains(LEGACY_ROOT_TAG) {
        return keyword.to_string();
    }
    keyword
        .split('/')
        .filter(|segment| *segment != LEGACY_ROOT_TAG)
        .collect::<Vec<_>>()
        .join("/")
}

fn dedup_preserving_order(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items.filter(|item| seen.insert(item.clone())).collect()
}
