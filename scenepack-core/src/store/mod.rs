//! Asset and character stores
//!
//! The packer and unpacker talk to user-generated-content storage through
//! the [`AssetStore`] and [`CharStore`] traits; [`disk`] provides the
//! folder-plus-JSON-database implementation the tools run against.
//!
//! Metadata records double as the UGC manifest: packing renders each
//! referenced asset's record into an XML fragment inside `ugc.xml`, and
//! unpacking turns those fragments back into records.

pub mod disk;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::document::{Element, SceneDocument};

pub use disk::{DiskAssetStore, DiskCharStore};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("asset `{0}` does not exist")]
    NotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("metadata database: {0}")]
    Metadata(#[from] serde_json::Error),
}

/// Broad asset category, matching the manifest fragment tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Bg,
    Prop,
    Char,
    Sound,
}

impl AssetKind {
    /// Tag name used for this kind inside `ugc.xml`.
    pub fn manifest_tag(self) -> &'static str {
        match self {
            AssetKind::Bg => "background",
            AssetKind::Prop => "prop",
            AssetKind::Char => "char",
            AssetKind::Sound => "sound",
        }
    }
}

/// Metadata record for a stored UGC asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMetadata {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AssetKind,
    #[serde(default)]
    pub subtype: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    /// Play type for non-video props: wearable, holdable, or placeable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ptype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_id: Option<String>,
}

impl AssetMetadata {
    pub fn new(id: impl Into<String>, kind: AssetKind) -> Self {
        Self {
            id: id.into(),
            kind,
            subtype: String::new(),
            title: String::new(),
            width: None,
            height: None,
            duration: None,
            ptype: None,
            theme_id: None,
        }
    }

    /// Render this record as a manifest fragment for `ugc.xml`.
    pub fn to_manifest_fragment(&self) -> Element {
        let mut fragment = Element::new(self.kind.manifest_tag());
        fragment.set_attr("id", &self.id);
        fragment.set_attr("name", &self.title);
        match self.kind {
            AssetKind::Bg | AssetKind::Char => {}
            AssetKind::Prop => {
                fragment.set_attr("subtype", &self.subtype);
                if let Some(width) = self.width {
                    fragment.set_attr("width", width.to_string());
                }
                if let Some(height) = self.height {
                    fragment.set_attr("height", height.to_string());
                }
                fragment.set_attr(
                    "wearable",
                    if self.ptype.as_deref() == Some("wearable") { "1" } else { "0" },
                );
                fragment.set_attr(
                    "holdable",
                    if self.ptype.as_deref() == Some("holdable") { "1" } else { "0" },
                );
            }
            AssetKind::Sound => {
                if let Some(duration) = self.duration {
                    fragment.set_attr("duration", duration.to_string());
                }
                fragment.set_attr("subtype", &self.subtype);
            }
        }
        fragment
    }
}

/// User-generated binary asset storage.
pub trait AssetStore {
    /// Load an asset's payload by id. Fails on unknown ids.
    fn load(&self, id: &str) -> Result<Vec<u8>, StoreError>;

    fn exists(&self, id: &str) -> bool;

    /// Persist a payload together with its metadata record.
    fn save(&mut self, bytes: &[u8], meta: AssetMetadata) -> Result<(), StoreError>;

    /// Metadata record for an id, if one exists.
    fn metadata(&self, id: &str) -> Option<AssetMetadata>;

    /// Write a bare file into the store folder without a metadata record
    /// (video prop thumbnails live beside their asset this way).
    fn write_raw(&mut self, file_name: &str, bytes: &[u8]) -> Result<(), StoreError>;

    /// Folder holding the payload files.
    fn folder(&self) -> &Path;
}

/// User-generated character storage. Characters are XML definition
/// documents keyed by id.
pub trait CharStore {
    fn exists(&self, id: &str) -> bool;

    /// Load a character's definition document.
    fn load_xml(&self, id: &str) -> Result<Vec<u8>, StoreError>;

    fn save(&mut self, xml: &[u8], meta: AssetMetadata) -> Result<(), StoreError>;
}

/// Read the owning theme id out of a character definition document.
///
/// The definition root carries `cc_theme_id` (older documents use
/// `themeId`); characters without either belong to the custom theme.
pub fn derive_theme_id(char_xml: &[u8]) -> String {
    let Ok(doc) = SceneDocument::parse(char_xml) else {
        return "custom".to_string();
    };
    doc.root
        .attr("cc_theme_id")
        .or_else(|| doc.root.attr("themeId"))
        .unwrap_or("custom")
        .to_string()
}
