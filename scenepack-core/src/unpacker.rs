//! Bundle unpacker
//!
//! Reads a bundle's `ugc.xml` manifest and imports every declared asset
//! that is not already present in the local stores. Import is idempotent:
//! existing ids are never overwritten, missing payload entries are skipped
//! silently, and unrecognized manifest tags are ignored so newer bundles
//! still import what this build understands.

use crate::archive::{ArchiveError, ArchiveReader};
use crate::document::{DocumentError, Element, SceneDocument};
use crate::reference::video_thumbnail_id;
use crate::store::{derive_theme_id, AssetKind, AssetMetadata, AssetStore, CharStore, StoreError};

/// Sound subtypes the store accepts; anything else in a manifest is a
/// foreign category and the whole entry is ignored.
const SOUND_SUBTYPES: [&str; 4] = ["bgmusic", "soundeffect", "voiceover", "tts"];

#[derive(Debug, thiserror::Error)]
pub enum UnpackError {
    #[error("bundle has no ugc.xml manifest")]
    MissingManifest,

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Imports bundles into local asset storage.
pub struct Unpacker<'a> {
    assets: &'a mut dyn AssetStore,
    chars: &'a mut dyn CharStore,
}

impl<'a> Unpacker<'a> {
    pub fn new(assets: &'a mut dyn AssetStore, chars: &'a mut dyn CharStore) -> Self {
        Self { assets, chars }
    }

    /// Import a bundle's UGC assets, returning the recovered scene
    /// document and thumbnail buffers (empty when absent) for the caller
    /// to persist.
    pub fn unpack(&mut self, bundle: &[u8]) -> Result<(Vec<u8>, Vec<u8>), UnpackError> {
        let mut archive = ArchiveReader::open(bundle)?;
        let manifest_xml = archive
            .read_entry("ugc.xml")
            .ok_or(UnpackError::MissingManifest)?;
        let manifest = SceneDocument::parse(&manifest_xml)?;

        for entry in &manifest.root.children {
            match entry.name.as_str() {
                "background" => self.import_background(&mut archive, entry)?,
                "prop" => self.import_prop(&mut archive, entry)?,
                "char" => self.import_char(&mut archive, entry)?,
                "sound" => self.import_sound(&mut archive, entry)?,
                other => {
                    tracing::debug!(tag = %other, "ignoring unknown manifest entry type");
                }
            }
        }

        let movie = archive.read_entry("movie.xml").unwrap_or_default();
        let thumbnail = archive.read_entry("thumbnail.png").unwrap_or_default();
        Ok((movie, thumbnail))
    }

    fn import_background(
        &mut self,
        archive: &mut ArchiveReader,
        entry: &Element,
    ) -> Result<(), UnpackError> {
        let Some(id) = entry.attr("id") else { return Ok(()) };
        if self.assets.exists(id) {
            return Ok(());
        }
        let Some(bytes) = archive.read_entry(&format!("ugc.bg.{id}")) else {
            return Ok(());
        };
        let mut meta = AssetMetadata::new(id, AssetKind::Bg);
        meta.subtype = "0".to_string();
        meta.title = entry.attr("name").unwrap_or_default().to_string();
        self.assets.save(&bytes, meta)?;
        Ok(())
    }

    fn import_prop(
        &mut self,
        archive: &mut ArchiveReader,
        entry: &Element,
    ) -> Result<(), UnpackError> {
        let Some(id) = entry.attr("id") else { return Ok(()) };
        if self.assets.exists(id) {
            return Ok(());
        }
        let Some(bytes) = archive.read_entry(&format!("ugc.prop.{id}")) else {
            return Ok(());
        };

        let mut meta = AssetMetadata::new(id, AssetKind::Prop);
        meta.title = entry.attr("name").unwrap_or_default().to_string();

        if entry.attr("subtype") == Some("video") {
            meta.subtype = "video".to_string();
            meta.width = entry.attr("width").and_then(|v| v.parse().ok());
            meta.height = entry.attr("height").and_then(|v| v.parse().ok());
            self.assets.save(&bytes, meta)?;

            // the bundle carries the video's poster frame beside it
            let thumbnail_id = video_thumbnail_id(id);
            if let Some(thumbnail) = archive.read_entry(&format!("ugc.prop.{thumbnail_id}")) {
                self.assets.write_raw(&thumbnail_id, &thumbnail)?;
            }
        } else {
            meta.subtype = "0".to_string();
            meta.ptype = Some(play_type(entry).to_string());
            self.assets.save(&bytes, meta)?;
        }
        Ok(())
    }

    fn import_char(
        &mut self,
        archive: &mut ArchiveReader,
        entry: &Element,
    ) -> Result<(), UnpackError> {
        let Some(id) = entry.attr("id") else { return Ok(()) };
        if self.chars.exists(id) {
            return Ok(());
        }
        let Some(bytes) = archive.read_entry(&format!("ugc.char.{id}.xml")) else {
            return Ok(());
        };
        let mut meta = AssetMetadata::new(id, AssetKind::Char);
        meta.subtype = "0".to_string();
        meta.title = entry.attr("name").unwrap_or_default().to_string();
        meta.theme_id = Some(derive_theme_id(&bytes));
        self.chars.save(&bytes, meta)?;
        Ok(())
    }

    fn import_sound(
        &mut self,
        archive: &mut ArchiveReader,
        entry: &Element,
    ) -> Result<(), UnpackError> {
        let subtype = entry.attr("subtype").unwrap_or_default();
        if !SOUND_SUBTYPES.contains(&subtype) {
            tracing::debug!(subtype = %subtype, "ignoring sound entry with foreign subtype");
            return Ok(());
        }
        let Some(id) = entry.attr("id") else { return Ok(()) };
        if self.assets.exists(id) {
            return Ok(());
        }
        let Some(bytes) = archive.read_entry(&format!("ugc.sound.{id}")) else {
            return Ok(());
        };
        let mut meta = AssetMetadata::new(id, AssetKind::Sound);
        meta.subtype = subtype.to_string();
        meta.title = entry.attr("name").unwrap_or_default().to_string();
        meta.duration = entry.attr("duration").and_then(|v| v.parse().ok());
        self.assets.save(&bytes, meta)?;
        Ok(())
    }
}

/// Non-video props carry boolean-like flags; the first set flag wins,
/// everything else is placeable.
fn play_type(entry: &Element) -> &'static str {
    if entry.attr("wearable") == Some("1") {
        "wearable"
    } else if entry.attr("holdable") == Some("1") {
        "holdable"
    } else {
        "placeable"
    }
}
