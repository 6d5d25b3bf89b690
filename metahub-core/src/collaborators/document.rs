//! JSON metadata document and its sidecar accessor
//!
//! A [`MetadataDocument`] is the structured metadata of one image. It is
//! stored either as a sidecar file next to the image (`<file>.meta.json`) or
//! as the XMP blob of an [`ImageBuffer`](super::ImageBuffer). The document is
//! not an EXIF/IPTC/XMP codec; it carries the fields the hub reconciles.

use super::{MetadataAccessor, MetadataOpener};
use crate::types::{
    FaceTag, GeoPosition, LocalizedTextMap, MetadataTemplate, UNSET_VALUE,
};
use chrono::NaiveDateTime;
use metahub_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Extension appended to the image file name to form its sidecar path
pub const SIDECAR_EXTENSION: &str = "meta.json";

/// Structured metadata of one image
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataDocument {
    #[serde(skip_serializing_if = "LocalizedTextMap::is_empty")]
    pub titles: LocalizedTextMap,
    #[serde(skip_serializing_if = "LocalizedTextMap::is_empty")]
    pub comments: LocalizedTextMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<NaiveDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pick_label: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color_label: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<MetadataTemplate>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photographer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub faces: Vec<FaceTag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gps: Option<GeoPosition>,
}

impl MetadataDocument {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }
}

/// Sidecar path of `image`: `photo.jpg` -> `photo.jpg.meta.json`
pub fn sidecar_path(image: &Path) -> PathBuf {
    let mut name = image.as_os_str().to_owned();
    name.push(".");
    name.push(SIDECAR_EXTENSION);
    PathBuf::from(name)
}

/// Where [`DocumentMetadata::apply_changes`] commits to
#[derive(Debug, Clone, PartialEq, Eq)]
enum Backing {
    /// JSON sidecar file
    Sidecar(PathBuf),
    /// Caller collects the document (image buffers)
    Memory,
}

/// [`MetadataAccessor`] over a [`MetadataDocument`]
#[derive(Debug, Clone)]
pub struct DocumentMetadata {
    file_path: Option<PathBuf>,
    document: MetadataDocument,
    backing: Backing,
}

impl DocumentMetadata {
    /// Accessor committing to the sidecar of `image`
    pub fn sidecar(image: &Path, document: MetadataDocument) -> Self {
        Self {
            file_path: Some(image.to_path_buf()),
            document,
            backing: Backing::Sidecar(sidecar_path(image)),
        }
    }

    /// Accessor whose commits stay in memory
    pub fn in_memory(file_path: Option<PathBuf>, document: MetadataDocument) -> Self {
        Self {
            file_path,
            document,
            backing: Backing::Memory,
        }
    }

    /// Read the sidecar of `image`; a missing sidecar is an empty document
    pub fn open_sidecar(image: &Path) -> Result<Self> {
        let sidecar = sidecar_path(image);
        let document = match std::fs::read(&sidecar) {
            Ok(bytes) => MetadataDocument::from_json(&bytes).map_err(|e| {
                Error::Codec(format!("{}: {}", sidecar.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = ?sidecar, "No sidecar, starting from empty metadata");
                MetadataDocument::default()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self::sidecar(image, document))
    }

    pub fn document(&self) -> &MetadataDocument {
        &self.document
    }

    pub fn into_document(self) -> MetadataDocument {
        self.document
    }
}

/// Replace `slot` with `value`; true if it changed
fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

fn label(value: Option<i32>) -> i32 {
    value.unwrap_or(UNSET_VALUE)
}

fn stored_label(value: i32) -> Option<i32> {
    (value != UNSET_VALUE).then_some(value)
}

impl MetadataAccessor for DocumentMetadata {
    fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    fn titles(&self) -> LocalizedTextMap {
        self.document.titles.clone()
    }

    fn comments(&self) -> LocalizedTextMap {
        self.document.comments.clone()
    }

    fn date_time(&self) -> Option<NaiveDateTime> {
        self.document.date_time
    }

    fn pick_label(&self) -> i32 {
        label(self.document.pick_label)
    }

    fn color_label(&self) -> i32 {
        label(self.document.color_label)
    }

    fn rating(&self) -> i32 {
        label(self.document.rating)
    }

    fn template(&self) -> MetadataTemplate {
        self.document.template.clone().unwrap_or_default()
    }

    fn tag_paths(&self) -> Vec<String> {
        self.document.keywords.clone()
    }

    fn gps(&self) -> Option<GeoPosition> {
        self.document.gps
    }

    fn face_tags(&self) -> Vec<FaceTag> {
        self.document.faces.clone()
    }

    fn set_titles(&mut self, titles: &LocalizedTextMap) -> bool {
        replace(&mut self.document.titles, titles.clone())
    }

    fn set_comments(&mut self, comments: &LocalizedTextMap) -> bool {
        replace(&mut self.document.comments, comments.clone())
    }

    fn set_date_time(&mut self, date_time: NaiveDateTime) -> bool {
        replace(&mut self.document.date_time, Some(date_time))
    }

    fn set_pick_label(&mut self, value: i32) -> bool {
        replace(&mut self.document.pick_label, stored_label(value))
    }

    fn set_color_label(&mut self, value: i32) -> bool {
        replace(&mut self.document.color_label, stored_label(value))
    }

    fn set_rating(&mut self, value: i32) -> bool {
        replace(&mut self.document.rating, stored_label(value))
    }

    fn set_template(&mut self, template: &MetadataTemplate) -> bool {
        replace(&mut self.document.template, Some(template.clone()))
    }

    fn remove_template(&mut self) -> bool {
        self.document.template.take().is_some()
    }

    fn set_credits(
        &mut self,
        photographer: Option<&str>,
        credit: Option<&str>,
        copyright: Option<&str>,
    ) -> bool {
        let doc = &mut self.document;
        let mut dirty = false;
        if let Some(value) = photographer {
            dirty |= replace(&mut doc.photographer, Some(value.to_string()));
        }
        if let Some(value) = credit {
            dirty |= replace(&mut doc.credit, Some(value.to_string()));
        }
        if let Some(value) = copyright {
            dirty |= replace(&mut doc.copyright, Some(value.to_string()));
        }
        dirty
    }

    fn set_keywords(&mut self, to_remove: &[String], to_add: &[String]) -> bool {
        let before = self.document.keywords.clone();
        let keywords = &mut self.document.keywords;
        keywords.retain(|k| !to_remove.contains(k));
        for keyword in to_add {
            if !keywords.contains(keyword) {
                keywords.push(keyword.clone());
            }
        }
        *keywords != before
    }

    fn set_face_tags(&mut self, faces: &[FaceTag]) -> bool {
        replace(&mut self.document.faces, faces.to_vec())
    }

    fn apply_changes(&mut self) -> Result<()> {
        let Backing::Sidecar(target) = &self.backing else {
            return Ok(());
        };

        let content = self.document.to_json()?;
        let temp = target.with_extension("json.tmp");
        std::fs::write(&temp, content)?;
        std::fs::rename(&temp, target)?;
        debug!(path = ?target, "Committed sidecar metadata");
        Ok(())
    }
}

/// Opens [`DocumentMetadata`] sidecars for image paths
#[derive(Debug, Clone, Copy, Default)]
pub struct SidecarOpener;

impl MetadataOpener for SidecarOpener {
    type Accessor = DocumentMetadata;

    fn open(&self, path: &Path) -> Result<DocumentMetadata> {
        DocumentMetadata::open_sidecar(path)
    }

    fn empty(&self, path: &Path) -> DocumentMetadata {
        DocumentMetadata::sidecar(path, MetadataDocument::default())
    }
}
