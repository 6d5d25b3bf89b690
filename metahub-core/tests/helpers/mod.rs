//! Test Helper Utilities
//!
//! Shared fixtures for metahub-core integration tests

#![allow(dead_code)]

pub mod log_capture;
pub mod recording;

pub use log_capture::LogCapture;
pub use recording::RecordingAccessor;

use chrono::{NaiveDate, NaiveDateTime};
use metahub_core::collaborators::{sidecar_path, MetadataDocument};
use metahub_core::types::LocalizedTextMap;
use metahub_core::{MemoryRecord, TagId, TagLookup, TagTree};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Tag tree used across tests
pub fn tag_tree() -> Arc<TagTree> {
    Arc::new(TagTree::from_paths([
        "People/Alice",
        "People/Bob",
        "People/Carol",
        "Places/Paris",
    ]))
}

/// Id of `path` in `tree`; panics if unknown
pub fn tag(tree: &TagTree, path: &str) -> TagId {
    tree.tag_for_path(path)
        .unwrap_or_else(|| panic!("tag {} not in tree", path))
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .unwrap()
}

/// Fully populated record
pub fn record(tags: &[TagId], rating: i32) -> MemoryRecord {
    MemoryRecord {
        date_time: Some(date(2021, 6, 1)),
        titles: LocalizedTextMap::with_default("Harbour"),
        comments: LocalizedTextMap::with_default("Boats at dusk"),
        pick_label: 1,
        color_label: 2,
        ..MemoryRecord::new()
            .with_tags(tags.iter().copied())
            .with_rating(rating)
    }
}

/// Write a sidecar document for `name` in `dir`, returning the image path
pub fn write_sidecar(dir: &Path, name: &str, document: &MetadataDocument) -> PathBuf {
    let image = dir.join(name);
    std::fs::write(&image, b"image bytes").unwrap();
    std::fs::write(sidecar_path(&image), document.to_json().unwrap()).unwrap();
    image
}

/// Read back the sidecar document of `image`
pub fn read_sidecar(image: &Path) -> MetadataDocument {
    let bytes = std::fs::read(sidecar_path(image)).unwrap();
    MetadataDocument::from_json(&bytes).unwrap()
}
