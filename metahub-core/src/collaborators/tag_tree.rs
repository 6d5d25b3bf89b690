//! In-memory tag authority
//!
//! Keeps the id <-> path mapping of a hierarchical tag tree. Creating a path
//! creates its missing parents. Deleting a tag announces it on the attached
//! event bus so long-lived hubs can drop it.

use super::TagLookup;
use crate::types::TagId;
use metahub_common::{EventBus, MetadataEvent};
use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
struct TagNode {
    path: String,
    internal: bool,
}

#[derive(Debug, Default)]
struct TreeState {
    by_id: BTreeMap<TagId, TagNode>,
    by_path: HashMap<String, TagId>,
    next_id: TagId,
}

impl TreeState {
    fn get_or_create(&mut self, path: &str, internal: bool) -> TagId {
        let mut prefix = String::new();
        let mut id = 0;
        for segment in path.split('/') {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);

            id = match self.by_path.get(&prefix) {
                Some(existing) => *existing,
                None => {
                    self.next_id += 1;
                    let new_id = self.next_id;
                    self.by_id.insert(
                        new_id,
                        TagNode {
                            path: prefix.clone(),
                            internal,
                        },
                    );
                    self.by_path.insert(prefix.clone(), new_id);
                    debug!(tag_id = new_id, path = %prefix, "Created tag");
                    new_id
                }
            };
        }
        id
    }
}

/// Hierarchical tag tree kept in memory
#[derive(Debug, Default)]
pub struct TagTree {
    state: RwLock<TreeState>,
    events: Option<EventBus>,
}

impl TagTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tree that announces deletions on `bus`
    pub fn with_event_bus(bus: EventBus) -> Self {
        Self {
            state: RwLock::default(),
            events: Some(bus),
        }
    }

    /// Tree holding the given paths (and their parents)
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tree = Self::new();
        for path in paths {
            tree.create_path(path.as_ref());
        }
        tree
    }

    /// Create (or find) an internal bookkeeping tag
    ///
    /// Returns `None` if `path` already names a regular tag; an existing tag
    /// never changes kind.
    pub fn add_internal(&self, path: &str) -> Option<TagId> {
        let path = normalize(path)?;
        let mut state = self.write();
        if let Some(&id) = state.by_path.get(&path) {
            let internal = state.by_id.get(&id).is_some_and(|node| node.internal);
            if !internal {
                warn!(tag_id = id, path = %path, "Tag already exists as a regular tag");
                return None;
            }
            return Some(id);
        }
        let id = state.get_or_create(&path, false);
        if let Some(node) = state.by_id.get_mut(&id) {
            node.internal = true;
        }
        Some(id)
    }

    /// Remove a tag and its children
    ///
    /// Emits one `TagDeleted` per removed tag. Returns the number removed.
    pub fn delete(&self, id: TagId) -> usize {
        let removed: Vec<TagId> = {
            let mut state = self.write();
            let Some(root) = state.by_id.get(&id).map(|n| n.path.clone()) else {
                return 0;
            };
            let child_prefix = format!("{}/", root);
            let doomed: Vec<(TagId, String)> = state
                .by_id
                .iter()
                .filter(|(_, node)| node.path == root || node.path.starts_with(&child_prefix))
                .map(|(id, node)| (*id, node.path.clone()))
                .collect();
            for (doomed_id, path) in &doomed {
                state.by_id.remove(doomed_id);
                state.by_path.remove(path);
            }
            doomed.into_iter().map(|(id, _)| id).collect()
        };

        if let Some(bus) = &self.events {
            for tag_id in &removed {
                bus.emit_lossy(MetadataEvent::TagDeleted { tag_id: *tag_id });
            }
        }
        removed.len()
    }

    /// All known paths, sorted
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.read().by_path.keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn len(&self) -> usize {
        self.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> RwLockReadGuard<'_, TreeState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, TreeState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl TagLookup for TagTree {
    fn tag_for_path(&self, path: &str) -> Option<TagId> {
        let path = normalize(path)?;
        self.read().by_path.get(&path).copied()
    }

    fn tag_path(&self, id: TagId) -> Option<String> {
        self.read().by_id.get(&id).map(|node| node.path.clone())
    }

    fn is_internal(&self, id: TagId) -> bool {
        self.read().by_id.get(&id).is_some_and(|node| node.internal)
    }

    fn create_path(&self, path: &str) -> Option<TagId> {
        let path = normalize(path)?;
        Some(self.write().get_or_create(&path, false))
    }
}

/// Strip surrounding slashes and empty segments; `None` if nothing remains
fn normalize(path: &str) -> Option<String> {
    let joined = path
        .split('/')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    (!joined.is_empty()).then_some(joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_path_creates_parents() {
        let tree = TagTree::new();
        let alice = tree.create_path("People/Family/Alice").unwrap();

        assert_eq!(tree.len(), 3);
        assert!(tree.tag_for_path("People").is_some());
        assert_eq!(tree.tag_for_path("People/Family/Alice"), Some(alice));
        assert_eq!(tree.tag_name(alice).as_deref(), Some("Alice"));
    }

    #[test]
    fn test_create_path_is_idempotent() {
        let tree = TagTree::new();
        let first = tree.create_path("Places/Paris");
        let second = tree.create_path("/Places/Paris/");
        assert_eq!(first, second);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn test_empty_path_is_rejected() {
        let tree = TagTree::new();
        assert_eq!(tree.create_path("//"), None);
        assert!(tree.is_empty());
    }

    #[test]
    fn test_internal_tag() {
        let tree = TagTree::new();
        let marker = tree.add_internal("_Internal_/Pending").unwrap();
        assert!(tree.is_internal(marker));
        assert!(!tree.can_be_written_to_metadata(marker));
    }

    #[test]
    fn test_internal_tag_is_found_again() {
        let tree = TagTree::new();
        let marker = tree.add_internal("_Internal_/Pending");
        assert_eq!(tree.add_internal("_Internal_/Pending"), marker);
    }

    #[test]
    fn test_regular_tag_is_not_made_internal() {
        let tree = TagTree::new();
        let alice = tree.create_path("People/Alice").unwrap();

        assert_eq!(tree.add_internal("People/Alice"), None);
        assert!(!tree.is_internal(alice));
        assert!(tree.can_be_written_to_metadata(alice));
    }

    #[test]
    fn test_delete_removes_children_and_emits() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();
        let tree = TagTree::with_event_bus(bus);
        let people = tree.create_path("People").unwrap();
        let alice = tree.create_path("People/Alice").unwrap();
        tree.create_path("Places").unwrap();

        assert_eq!(tree.delete(people), 2);
        assert_eq!(tree.tag_path(alice), None);
        assert_eq!(tree.paths(), vec!["Places".to_string()]);

        let mut deleted = vec![];
        while let Ok(MetadataEvent::TagDeleted { tag_id }) = rx.try_recv() {
            deleted.push(tag_id);
        }
        deleted.sort();
        assert_eq!(deleted, vec![people, alice]);
    }

    #[test]
    fn test_delete_unknown_tag() {
        let tree = TagTree::new();
        assert_eq!(tree.delete(42), 0);
    }
}
