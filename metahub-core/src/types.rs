//! Core value types shared by the hub, its collaborators and its sinks
//!
//! Merge status, tag status, localized text maps, metadata templates and
//! face regions.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Merge Status
// ============================================================================

/// Identifier of a tag in the tag authority
pub type TagId = i64;

/// Sentinel for labels and ratings a source does not carry
///
/// Merged like any other value, so an unrated item and a rated one make the
/// rating disjoint instead of silently agreeing on the rated value.
pub const UNSET_VALUE: i32 = -1;

/// Tri-state status of a merged field or tag
///
/// Only ever moves `Invalid -> Available -> Disjoint` while loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MergeStatus {
    /// No source contributed a value yet
    #[default]
    Invalid,
    /// One source contributed, or all contributing sources agree
    Available,
    /// At least two contributing sources disagree
    Disjoint,
}

impl MergeStatus {
    pub fn is_available(self) -> bool {
        self == MergeStatus::Available
    }
}

/// Status of one tag across all loaded sources
///
/// `Disjoint` always carries `has_tag == true`: partial presence is the only
/// way a boolean can disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TagStatus {
    pub status: MergeStatus,
    pub has_tag: bool,
}

impl TagStatus {
    pub const INVALID: TagStatus = TagStatus {
        status: MergeStatus::Invalid,
        has_tag: false,
    };

    pub fn new(status: MergeStatus, has_tag: bool) -> Self {
        Self { status, has_tag }
    }

    pub fn available(has_tag: bool) -> Self {
        Self::new(MergeStatus::Available, has_tag)
    }

    pub fn disjoint() -> Self {
        Self::new(MergeStatus::Disjoint, true)
    }

    /// Everyone agreed this tag is present
    pub fn is_agreed_present(&self) -> bool {
        self.status == MergeStatus::Available && self.has_tag
    }
}

// ============================================================================
// Localized Text
// ============================================================================

/// Language code used when a caption has no explicit language
pub const DEFAULT_LANGUAGE: &str = "x-default";

/// One caption or title in one language
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDateTime>,
}

impl LocalizedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            author: None,
            date: None,
        }
    }
}

/// Language code to caption map (titles, comments, template rights)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedTextMap(BTreeMap<String, LocalizedText>);

impl LocalizedTextMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Map holding a single default-language entry
    pub fn with_default(text: impl Into<String>) -> Self {
        let mut map = Self::new();
        map.insert(DEFAULT_LANGUAGE, LocalizedText::new(text));
        map
    }

    pub fn insert(&mut self, language: impl Into<String>, text: LocalizedText) {
        self.0.insert(language.into(), text);
    }

    pub fn get(&self, language: &str) -> Option<&LocalizedText> {
        self.0.get(language)
    }

    /// Text of the default-language entry, if any
    pub fn default_text(&self) -> Option<&str> {
        self.0.get(DEFAULT_LANGUAGE).map(|t| t.text.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &LocalizedText)> {
        self.0.iter()
    }
}

// ============================================================================
// Metadata Template
// ============================================================================

/// Template title that requests removal of the template from the sink
pub const REMOVE_TEMPLATE_TITLE: &str = "_REMOVE_TEMPLATE_";

/// Rights and authorship template applied to items
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetadataTemplate {
    pub title: String,
    pub authors: Vec<String>,
    pub authors_position: String,
    pub credit: String,
    pub copyright: LocalizedTextMap,
    pub rights_usage_terms: LocalizedTextMap,
    pub source: String,
    pub instructions: String,
}

impl MetadataTemplate {
    /// Template whose only purpose is to remove any template from the sink
    pub fn removal() -> Self {
        Self {
            title: REMOVE_TEMPLATE_TITLE.to_string(),
            ..Self::default()
        }
    }

    pub fn is_removal(&self) -> bool {
        self.title == REMOVE_TEMPLATE_TITLE
    }
}

// ============================================================================
// Face Regions
// ============================================================================

/// Pixel dimensions of an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Rectangle in pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Express the rectangle as fractions of `size`
    ///
    /// Returns `None` for empty dimensions.
    pub fn to_relative(&self, size: Dimensions) -> Option<RelativeRect> {
        if !size.is_valid() {
            return None;
        }
        let w = f64::from(size.width);
        let h = f64::from(size.height);
        Some(RelativeRect {
            x: f64::from(self.x) / w,
            y: f64::from(self.y) / h,
            width: f64::from(self.width) / w,
            height: f64::from(self.height) / h,
        })
    }
}

/// Rectangle as fractions (0.0-1.0) of the image dimensions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelativeRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Confirmed face region stored on a record, referencing a person tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceRegion {
    pub tag_id: TagId,
    pub region: PixelRect,
}

/// Named face rectangle as written to metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaceTag {
    pub name: String,
    pub region: RelativeRect,
}

// ============================================================================
// Geolocation
// ============================================================================

/// GPS position read from metadata; informational, never merged
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
}
