//! Integration tests for merging sources into a hub

mod helpers;

use helpers::*;
use metahub_core::collaborators::{sidecar_path, DocumentMetadata, MetadataDocument};
use metahub_core::types::{Dimensions, FaceRegion, LocalizedTextMap, PixelRect};
use metahub_core::{
    MemoryRecord, MergeStatus, MetadataHub, SidecarOpener, TagMode, TagStatus, UNSET_VALUE,
};
use tempfile::TempDir;
use tracing::Level;

fn statuses(hub: &MetadataHub) -> Vec<MergeStatus> {
    vec![
        hub.date_time().status(),
        hub.titles().status(),
        hub.comments().status(),
        hub.pick_label().status(),
        hub.color_label().status(),
        hub.rating().status(),
        hub.template().status(),
    ]
}

#[test]
fn test_fresh_hub_is_invalid_everywhere() {
    let hub = MetadataHub::with_tag_lookup(tag_tree());
    assert!(statuses(&hub).iter().all(|s| *s == MergeStatus::Invalid));
    assert_eq!(hub.load_count(), 0);
    assert!(hub.tag_entries().is_empty());
}

#[test]
fn test_single_load_is_never_disjoint() {
    let tree = tag_tree();
    let alice = tag(&tree, "People/Alice");
    let bob = tag(&tree, "People/Bob");

    let mut hub = MetadataHub::with_tag_lookup(tree);
    hub.load_record(&record(&[alice, bob], 4));

    assert!(statuses(&hub).iter().all(|s| *s == MergeStatus::Available));
    assert!(hub
        .tag_entries()
        .values()
        .all(|s| *s == TagStatus::available(true)));
    assert_eq!(hub.load_count(), 1);
}

#[test]
fn test_status_never_moves_backwards() {
    let mut hub = MetadataHub::path_keyed();
    let ratings = [2, 2, 5, 2, 5, 3];
    let mut previous = MergeStatus::Invalid;

    for rating in ratings {
        hub.load_record(&record(&[], rating));
        let status = hub.rating().status();
        let rank = |s: MergeStatus| match s {
            MergeStatus::Invalid => 0,
            MergeStatus::Available => 1,
            MergeStatus::Disjoint => 2,
        };
        assert!(rank(status) >= rank(previous), "{:?} -> {:?}", previous, status);
        previous = status;
    }

    assert_eq!(hub.rating().interval(), Some((&2, &5)));
    // shared fields stay agreed
    assert_eq!(hub.comments().status(), MergeStatus::Available);
}

#[test]
fn test_rating_interval_from_three_sources() {
    let mut hub = MetadataHub::path_keyed();
    for rating in [3, 7, 5] {
        hub.load_record(&record(&[], rating));
    }

    assert_eq!(hub.rating().status(), MergeStatus::Disjoint);
    assert_eq!(hub.rating().value(), Some(&3));
    assert_eq!(hub.rating().interval(), Some((&3, &7)));
}

#[test]
fn test_date_interval_tracks_earliest_and_latest() {
    let mut hub = MetadataHub::path_keyed();
    for day in [10, 3, 20] {
        hub.load_record(&MemoryRecord {
            date_time: Some(date(2022, 1, day)),
            ..MemoryRecord::new()
        });
    }

    assert_eq!(
        hub.date_time().interval(),
        Some((&date(2022, 1, 3), &date(2022, 1, 20)))
    );
}

#[test]
fn test_first_comment_wins_when_disjoint() {
    let mut hub = MetadataHub::path_keyed();
    for text in ["first", "second"] {
        hub.load_record(&MemoryRecord {
            comments: LocalizedTextMap::with_default(text),
            ..MemoryRecord::new()
        });
    }

    assert_eq!(hub.comments().status(), MergeStatus::Disjoint);
    assert_eq!(
        hub.comments().value().and_then(|c| c.default_text()),
        Some("first")
    );
}

#[test]
fn test_partially_present_tags_become_disjoint() {
    let tree = tag_tree();
    let (t1, t2, t3) = (
        tag(&tree, "People/Alice"),
        tag(&tree, "People/Bob"),
        tag(&tree, "People/Carol"),
    );

    let mut hub = MetadataHub::with_tag_lookup(tree);
    hub.load_record(&record(&[t1, t2], 1));
    hub.load_record(&record(&[t2, t3], 1));

    assert_eq!(hub.tag_status(t1), TagStatus::disjoint());
    assert_eq!(hub.tag_status(t2), TagStatus::available(true));
    assert_eq!(hub.tag_status(t3), TagStatus::disjoint());
    assert_eq!(hub.keyword_ids(), vec![t2]);
    assert_eq!(hub.keywords(), vec!["People/Bob".to_string()]);
}

#[test]
fn test_tag_absent_everywhere_is_never_inserted() {
    let tree = tag_tree();
    let alice = tag(&tree, "People/Alice");
    let paris = tag(&tree, "Places/Paris");

    let mut hub = MetadataHub::with_tag_lookup(tree);
    hub.load_record(&record(&[alice], 1));
    hub.load_record(&record(&[alice], 1));

    assert_eq!(hub.tag_status(paris), TagStatus::INVALID);
    assert_eq!(hub.tag_entries().len(), 1);
}

#[test]
fn test_path_mode_keeps_only_the_intersection() {
    let mut hub = MetadataHub::path_keyed();
    for keywords in [vec!["A", "B", "C"], vec!["C", "A"]] {
        let doc = MetadataDocument {
            keywords: keywords.into_iter().map(String::from).collect(),
            ..MetadataDocument::default()
        };
        hub.load_metadata(&DocumentMetadata::in_memory(None, doc));
    }

    assert_eq!(hub.keywords(), vec!["A".to_string(), "C".to_string()]);
    // no disjoint state in path mode
    assert_eq!(hub.tag_status_for_path("B"), TagStatus::INVALID);
    assert_eq!(hub.tag_status_for_path("A"), TagStatus::available(true));
}

#[test]
fn test_reset_then_load_matches_fresh_hub() {
    let tree = tag_tree();
    let alice = tag(&tree, "People/Alice");
    let source = record(&[alice], 4);

    let mut reused = MetadataHub::with_tag_lookup(tree.clone());
    reused.load_record(&record(&[], 1));
    reused.set_comments(LocalizedTextMap::with_default("edited"), MergeStatus::Available);
    reused.set_tag(alice, false, MergeStatus::Available);
    reused.reset();
    reused.load_record(&source);

    let mut fresh = MetadataHub::with_tag_lookup(tree);
    fresh.load_record(&source);

    assert_eq!(reused, fresh);
    assert!(!reused.comments().is_changed());
    assert!(!reused.tags().is_changed());
}

#[test]
fn test_clone_is_independent() {
    let mut original = MetadataHub::path_keyed();
    original.load_record(&record(&[], 2));

    let mut copy = original.clone();
    copy.set_rating(5, MergeStatus::Available);

    assert_eq!(original.rating().value(), Some(&2));
    assert!(!original.rating().is_changed());
    assert_eq!(copy.rating().value(), Some(&5));
}

#[test]
fn test_reset_changed_keeps_values() {
    let mut hub = MetadataHub::path_keyed();
    hub.load_record(&record(&[], 2));
    hub.set_rating(5, MergeStatus::Available);
    hub.reset_changed();

    assert!(!hub.rating().is_changed());
    assert_eq!(hub.rating().available_value(), Some(&5));
}

#[test]
fn test_unreadable_file_counts_as_empty_load() {
    let dir = TempDir::new().unwrap();
    let good = write_sidecar(
        dir.path(),
        "good.jpg",
        &MetadataDocument {
            rating: Some(3),
            ..MetadataDocument::default()
        },
    );
    let broken = dir.path().join("broken.jpg");
    std::fs::write(&broken, b"image").unwrap();
    std::fs::write(sidecar_path(&broken), b"{").unwrap();

    let mut hub = MetadataHub::path_keyed();
    assert!(hub.load_file(&good, &SidecarOpener));
    assert!(!hub.load_file(&broken, &SidecarOpener));

    assert_eq!(hub.load_count(), 2);
    // the empty load carried an unset rating
    assert_eq!(hub.rating().status(), MergeStatus::Disjoint);
    assert_eq!(hub.rating().interval(), Some((&UNSET_VALUE, &3)));
}

#[test]
fn test_missing_date_falls_back_to_file_time() {
    let dir = TempDir::new().unwrap();
    let image = write_sidecar(dir.path(), "a.jpg", &MetadataDocument::default());

    let mut hub = MetadataHub::path_keyed();
    assert!(hub.load_file(&image, &SidecarOpener));

    assert_eq!(hub.date_time().status(), MergeStatus::Available);
    assert_eq!(
        hub.date_time().value().copied(),
        metahub_common::time::file_modified(&image)
    );
}

#[test]
fn test_unknown_keyword_is_skipped_with_warning() {
    let tree = tag_tree();
    let alice = tag(&tree, "People/Alice");
    let doc = MetadataDocument {
        keywords: vec!["People/Alice".into(), "Nobody/Knows".into()],
        ..MetadataDocument::default()
    };

    let (hub, logs) = LogCapture::scoped(|| {
        let mut hub = MetadataHub::new(TagMode::IdKeyed, tree);
        hub.load_metadata(&DocumentMetadata::in_memory(None, doc));
        hub
    });

    assert_eq!(hub.keyword_ids(), vec![alice]);
    assert_eq!(hub.rating().status(), MergeStatus::Available);
    assert_eq!(logs.matching(Level::WARN, "not known to tag authority").len(), 1);
    assert_eq!(logs.count_at(Level::ERROR), 0);
}

#[test]
fn test_face_tags_use_supplied_dimensions() {
    let tree = tag_tree();
    let carol = tag(&tree, "People/Carol");
    let source = MemoryRecord {
        // stale cached size
        dimensions: Some(Dimensions::new(10, 10)),
        faces: vec![FaceRegion {
            tag_id: carol,
            region: PixelRect::new(0, 0, 400, 300),
        }],
        ..MemoryRecord::new()
    };

    let mut hub = MetadataHub::with_tag_lookup(tree);
    hub.load_face_tags(&source, Dimensions::new(800, 600));

    let faces = hub.face_tags().value().unwrap();
    assert_eq!(faces[0].name, "Carol");
    assert_eq!(faces[0].region.width, 0.5);
    assert_eq!(faces[0].region.height, 0.5);
}
