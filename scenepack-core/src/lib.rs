//! Scenepack Core Library
//!
//! This crate provides the core functionality for Scenepack:
//! - Scene document model (XML tree with in-place rewriting)
//! - Asset reference parsing and the legacy path quirks
//! - Bundle packing (scene document + assets -> portable archive)
//! - Bundle unpacking (archive -> local asset stores)
//! - Audio timing extraction for renderers
//! - Disk-backed asset and character stores

pub mod archive;
pub mod audio;
pub mod config;
pub mod document;
pub mod fonts;
pub mod packer;
pub mod reference;
pub mod store;
pub mod unpacker;

// Re-export commonly used types
pub use archive::{ArchiveError, ArchiveReader, ArchiveWriter};
pub use audio::{extract_audio_times, AudioTiming, FadeEnvelope};
pub use config::{ConfigError, Directories};
pub use document::{DocumentError, Element, SceneDocument, XML_HEADER};
pub use fonts::font_asset_file;
pub use packer::{PackError, Packer, ThemeSet};
pub use reference::{
    head_asset_location, video_thumbnail_id, AssetReference, ReferenceError, UGC_THEME,
};
pub use store::{
    derive_theme_id, AssetKind, AssetMetadata, AssetStore, CharStore, DiskAssetStore,
    DiskCharStore, StoreError,
};
pub use unpacker::{UnpackError, Unpacker};
