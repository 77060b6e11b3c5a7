//! Speech-bubble font mapping
//!
//! Bubble text nodes carry a font family name; the installation ships the
//! matching font as a fixed `FontFile*.swf` asset. The table below covers
//! the families the player actually bundles. Unknown families fall back to
//! `FontFile` plus the family name with whitespace stripped, which is how
//! later font drops were named.

/// Map a font family name to its asset file stem (no extension).
///
/// Returns `None` for an empty family name; `Arial` is handled by the
/// caller (it is built into the player and never bundled).
pub fn font_asset_file(family: &str) -> Option<String> {
    if family.is_empty() {
        return None;
    }
    let stem = match family {
        "Blambot Casual" => "FontFileCasual",
        "BadaBoom BB" => "FontFileBoom",
        "Entrails BB" => "FontFileEntrails",
        "Tokyo Robot Intl BB" => "FontFileTokyo",
        "Accidental Presidency" => "FontFileAccidental",
        "Budmo Jiggler" => "FontFileBJiggler",
        "Budmo Jigglish" => "FontFileBJigglish",
        "Existence Light" => "FontFileExistence",
        "HeartlandRegular" => "FontFileHeartland",
        "Honey Script" => "FontFileHoney",
        "I hate Comic Sans" => "FontFileIHate",
        "loco tv" => "FontFileLocotv",
        "Mail Ray Stuff" => "FontFileMailRay",
        "Mia's Scribblings ~" => "FontFileMia",
        "Coming Soon" => "FontFileCSoon",
        "Lilita One" => "FontFileLOne",
        "Telex Regular" => "FontFileTelex",
        other => return Some(fallback_font_file(other)),
    };
    Some(stem.to_string())
}

/// Fallback transform for families missing from the table.
fn fallback_font_file(family: &str) -> String {
    let stripped: String = family.chars().filter(|c| !c.is_whitespace()).collect();
    format!("FontFile{stripped}")
}
