//! Audio timing extraction
//!
//! A renderer needs to know, for every sound in a movie, where its file
//! lives and how it is placed on the timeline. This walk shares the
//! document model and the UGC/static path rule with the packer but only
//! resolves paths; no bytes are copied.

use std::path::PathBuf;

use serde::Serialize;

use crate::config::Directories;
use crate::document::{DocumentError, Element, SceneDocument};
use crate::reference::AssetReference;

/// Volume ramp at one end of a sound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FadeEnvelope {
    pub duration: f64,
    pub vol: f64,
}

/// Timeline placement of one sound element, in document order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioTiming {
    pub filepath: PathBuf,
    pub start: f64,
    pub stop: f64,
    pub trim_start: f64,
    pub trim_end: f64,
    pub fade_in: FadeEnvelope,
    pub fade_out: FadeEnvelope,
}

/// Collect timing descriptors for every top-level `sound` element, in
/// document order (not time-sorted). Sounds without an `sfile` reference
/// are skipped; missing numeric fields read as zero.
pub fn extract_audio_times(
    movie_xml: &[u8],
    dirs: &Directories,
) -> Result<Vec<AudioTiming>, DocumentError> {
    let doc = SceneDocument::parse(movie_xml)?;
    let mut timings = Vec::new();

    for elem in &doc.root.children {
        if elem.name != "sound" {
            continue;
        }
        let Some(file) = elem.child_text("sfile") else {
            continue;
        };
        let Ok(reference) = AssetReference::parse(file, "sound") else {
            continue;
        };

        let filepath = if reference.is_ugc() {
            dirs.asset_dir.join(reference.file_name())
        } else {
            reference.theme_path(&dirs.theme_root)
        };

        timings.push(AudioTiming {
            filepath,
            start: child_number(elem, "start"),
            stop: child_number(elem, "stop"),
            trim_start: child_number(elem, "trimStart"),
            trim_end: child_number(elem, "trimEnd"),
            fade_in: envelope(elem, "fadein"),
            fade_out: envelope(elem, "fadeout"),
        });
    }

    Ok(timings)
}

fn child_number(elem: &Element, name: &str) -> f64 {
    elem.child_text(name)
        .and_then(|v| v.parse().ok())
        .unwrap_or(0.0)
}

fn envelope(elem: &Element, name: &str) -> FadeEnvelope {
    let attr_number = |attr: &str| {
        elem.child_named(name)
            .and_then(|c| c.attr(attr))
            .and_then(|v| v.parse().ok())
            .unwrap_or(0.0)
    };
    FadeEnvelope {
        duration: attr_number("duration"),
        vol: attr_number("vol"),
    }
}
