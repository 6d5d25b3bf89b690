//! Subcommand implementations
//!
//! Both commands load every file into one hub keyed by tag id. The tag
//! authority is built from the keywords the sidecars already carry, so no
//! external database is needed.

use std::fmt::{Display, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use metahub_common::{FileChangeObserver, MetadataSettings};
use metahub_core::merge::FieldMerge;
use metahub_core::types::LocalizedTextMap;
use metahub_core::{
    BatchReport, DocumentMetadata, FileSink, MergeStatus, MetadataAccessor, MetadataHub,
    SidecarOpener, TagLookup, TagTree, WriteMode,
};
use tracing::{debug, info, warn};

/// Explicit edits requested on the command line
#[derive(Debug, Clone, Default)]
pub struct Edit {
    pub rating: Option<i32>,
    pub pick_label: Option<i32>,
    pub color_label: Option<i32>,
    pub comment: Option<String>,
    pub add_tags: Vec<String>,
    pub remove_tags: Vec<String>,
}

impl Edit {
    pub fn is_empty(&self) -> bool {
        self.rating.is_none()
            && self.pick_label.is_none()
            && self.color_label.is_none()
            && self.comment.is_none()
            && self.add_tags.is_empty()
            && self.remove_tags.is_empty()
    }

    /// Apply the edits as agreed values
    fn apply(&self, hub: &mut MetadataHub, tree: &TagTree) {
        if let Some(rating) = self.rating {
            hub.set_rating(rating, MergeStatus::Available);
        }
        if let Some(pick) = self.pick_label {
            hub.set_pick_label(pick, MergeStatus::Available);
        }
        if let Some(color) = self.color_label {
            hub.set_color_label(color, MergeStatus::Available);
        }
        if let Some(comment) = &self.comment {
            hub.set_comments(
                LocalizedTextMap::with_default(comment.as_str()),
                MergeStatus::Available,
            );
        }
        for path in &self.add_tags {
            match tree.create_path(path) {
                Some(id) => {
                    hub.set_tag(id, true, MergeStatus::Available);
                }
                None => warn!(tag = %path, "Invalid tag path, not added"),
            }
        }
        for path in &self.remove_tags {
            match tree.tag_for_path(path) {
                Some(id) => {
                    hub.set_tag(id, false, MergeStatus::Available);
                }
                None => debug!(tag = %path, "Tag not present on any file"),
            }
        }
    }
}

/// Logs each committed file
struct LogObserver;

impl FileChangeObserver for LogObserver {
    fn file_metadata_changed(&self, path: &Path) {
        info!(path = ?path, "Metadata written");
    }
}

/// Merged view of `files`
pub fn show(files: &[PathBuf]) -> String {
    let (hub, tree) = load_hub(files);
    render_hub(&hub, &tree)
}

/// Load `files`, apply `edit` and write the result back to each file
pub fn set(
    edit: &Edit,
    files: &[PathBuf],
    mode: WriteMode,
    settings: &MetadataSettings,
) -> BatchReport {
    if edit.is_empty() {
        warn!("No edits given");
    }

    let (mut hub, tree) = load_hub(files);
    edit.apply(&mut hub, &tree);

    if !hub.will_write(mode, settings) {
        info!(mode = %mode, "Nothing to write");
    }

    let sink = FileSink::new(SidecarOpener).with_observer(LogObserver);
    sink.write_files(&hub, files, mode, settings)
}

/// Hub over `files` with a tag tree holding every keyword they carry
fn load_hub(files: &[PathBuf]) -> (MetadataHub, Arc<TagTree>) {
    let tree = Arc::new(TagTree::new());
    for file in files {
        // unreadable sidecars are reported by the hub load below
        if let Ok(metadata) = DocumentMetadata::open_sidecar(file) {
            for keyword in metadata.tag_paths() {
                tree.create_path(&keyword);
            }
        }
    }

    let mut hub = MetadataHub::with_tag_lookup(tree.clone());
    for file in files {
        hub.load_file(file, &SidecarOpener);
    }
    debug!(files = files.len(), tags = tree.len(), "Loaded files");
    (hub, tree)
}

fn render_hub(hub: &MetadataHub, tree: &TagTree) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<12} {}", "files", hub.load_count());

    field_line(&mut out, "date", hub.date_time(), |d| d.to_string());
    field_line(&mut out, "title", hub.titles(), default_text);
    field_line(&mut out, "comment", hub.comments(), default_text);
    field_line(&mut out, "pick", hub.pick_label(), i32::to_string);
    field_line(&mut out, "color", hub.color_label(), i32::to_string);
    field_line(&mut out, "rating", hub.rating(), i32::to_string);
    field_line(&mut out, "template", hub.template(), |t| t.title.clone());

    let _ = writeln!(out, "keywords");
    for (id, status) in hub.tag_entries() {
        let Some(path) = tree.tag_path(id) else {
            continue;
        };
        let state = match (status.status, status.has_tag) {
            (MergeStatus::Available, true) => "all files",
            (MergeStatus::Available, false) => "removed",
            (MergeStatus::Disjoint, _) => "some files",
            (MergeStatus::Invalid, _) => continue,
        };
        let _ = writeln!(out, "  {:<30} {}", path, state);
    }
    out
}

fn field_line<T, F>(out: &mut String, name: &str, field: &FieldMerge<T>, show: F)
where
    F: Fn(&T) -> String,
{
    let status = format!("{:?}", field.status());
    let value = match field.interval() {
        None => "-".to_string(),
        Some((low, high)) if field.status() == MergeStatus::Disjoint => {
            let (low, high) = (show(low), show(high));
            if low == high {
                format!("{} (differs)", low)
            } else {
                format!("{} .. {}", low, high)
            }
        }
        Some((value, _)) => show(value),
    };
    let _ = writeln!(out, "{:<12} {:<10} {}", name, status, value);
}

fn default_text(text: &LocalizedTextMap) -> String {
    text.default_text().unwrap_or("").to_string()
}

/// One line per file plus a summary
pub fn render_report(report: &BatchReport) -> String {
    let mut out = String::new();
    push_paths(&mut out, "written", &report.written);
    push_paths(&mut out, "queued", &report.queued);
    push_paths(&mut out, "unchanged", &report.skipped);
    for (path, reason) in &report.failed {
        let _ = writeln!(out, "failed     {}: {}", path.display(), reason);
    }
    let _ = writeln!(
        out,
        "{} written, {} queued, {} unchanged, {} failed",
        report.written.len(),
        report.queued.len(),
        report.skipped.len(),
        report.failed.len()
    );
    out
}

fn push_paths(out: &mut String, label: impl Display, paths: &[PathBuf]) {
    for path in paths {
        let _ = writeln!(out, "{:<10} {}", label, path.display());
    }
}
