//! In-memory image with embedded metadata blobs
//!
//! Mirrors how a decoded image keeps its metadata: a few opaque blobs keyed
//! by kind. The structured document lives in the XMP blob as JSON. The
//! JFIF comment blob mirrors the default-language comment. EXIF and IPTC
//! blobs are carried through untouched.

use super::document::{DocumentMetadata, MetadataDocument};
use super::MetadataAccessor;
use crate::types::LocalizedTextMap;
use metahub_common::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Kind of an embedded metadata blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BlobKind {
    /// JFIF comment section
    Comments,
    Exif,
    Iptc,
    Xmp,
}

/// Decoded image held in memory, with its metadata blobs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageBuffer {
    original_file_path: Option<PathBuf>,
    last_saved_file_path: Option<PathBuf>,
    blobs: BTreeMap<BlobKind, Vec<u8>>,
}

impl ImageBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer decoded from the file at `path`
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            original_file_path: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn set_last_saved_file_path(&mut self, path: impl Into<PathBuf>) {
        self.last_saved_file_path = Some(path.into());
    }

    /// Original path, or the last saved one for images created in memory
    pub fn file_path(&self) -> Option<&Path> {
        self.original_file_path
            .as_deref()
            .or(self.last_saved_file_path.as_deref())
    }

    pub fn blob(&self, kind: BlobKind) -> Option<&[u8]> {
        self.blobs.get(&kind).map(Vec::as_slice)
    }

    pub fn set_blob(&mut self, kind: BlobKind, data: Vec<u8>) {
        self.blobs.insert(kind, data);
    }

    /// Accessor over the buffer's metadata
    ///
    /// A caption found only in the JFIF comment blob is read into the
    /// document. Fails if the XMP blob holds no valid document.
    pub fn metadata(&self) -> Result<DocumentMetadata> {
        let mut document = match self.blob(BlobKind::Xmp) {
            Some(bytes) if !bytes.is_empty() => MetadataDocument::from_json(bytes)?,
            _ => MetadataDocument::default(),
        };
        if document.comments.is_empty() {
            if let Some(comment) = self.blob(BlobKind::Comments).filter(|b| !b.is_empty()) {
                document.comments =
                    LocalizedTextMap::with_default(String::from_utf8_lossy(comment));
            }
        }
        Ok(DocumentMetadata::in_memory(
            self.file_path().map(Path::to_path_buf),
            document,
        ))
    }

    /// Store the accessor's blobs back into the buffer
    ///
    /// Only the XMP and comment blobs are produced; EXIF and IPTC are never
    /// touched. An empty comment blob removes the stored one. Returns the
    /// kinds whose stored content changed.
    pub fn store_metadata(&mut self, metadata: &DocumentMetadata) -> Result<Vec<BlobKind>> {
        let mut stored = Vec::new();
        for (kind, data) in encode_blobs(metadata)? {
            let changed = if data.is_empty() {
                self.blobs.remove(&kind).is_some()
            } else if self.blob(kind) == Some(data.as_slice()) {
                false
            } else {
                self.blobs.insert(kind, data);
                true
            };
            if changed {
                stored.push(kind);
            }
        }
        Ok(stored)
    }
}

/// XMP always carries the full document, `{}` when it is empty
fn encode_blobs(metadata: &DocumentMetadata) -> Result<Vec<(BlobKind, Vec<u8>)>> {
    let xmp = metadata.document().to_json()?;
    let comment = metadata
        .comments()
        .default_text()
        .map(|text| text.as_bytes().to_vec())
        .unwrap_or_default();

    Ok(vec![(BlobKind::Comments, comment), (BlobKind::Xmp, xmp)])
}
