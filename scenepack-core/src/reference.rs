//! Asset reference parsing and path building
//!
//! References in a scene document are dot-separated strings of the form
//! `themeId.<id-or-name>.ext`. Parsing normalizes them into the segment
//! list used both for archive entry names (joined with `.`) and for
//! filesystem paths under the theme library (joined with `/`), with the
//! target category re-inserted as the second segment.
//!
//! The legacy format quirks live here as named transforms so they can be
//! tested on their own: the head-asset char/prop domain bridge, the UGC
//! character action-segment drop, and the video thumbnail id derivation.

use std::path::{Path, PathBuf};

/// Theme id marking the user-generated-content domain.
pub const UGC_THEME: &str = "ugc";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("asset reference `{0}` is not of the form themeId.name.ext")]
    Malformed(String),
}

/// A normalized asset reference: `[themeId, category, ..., filename.ext]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetReference {
    segments: Vec<String>,
}

impl AssetReference {
    /// Split a raw reference and re-insert `category` as the second
    /// segment. The extension is folded back onto the final segment, so
    /// `theme.song.mp3` with category `sound` becomes
    /// `[theme, sound, song.mp3]`.
    pub fn parse(raw: &str, category: &str) -> Result<Self, ReferenceError> {
        let mut segments: Vec<String> = raw.split('.').map(str::to_string).collect();
        if segments.len() < 3 || segments[0].is_empty() {
            return Err(ReferenceError::Malformed(raw.to_string()));
        }
        let ext = segments.pop().unwrap();
        let last = segments.last_mut().unwrap();
        last.push('.');
        last.push_str(&ext);
        segments.insert(1, category.to_string());
        Ok(Self { segments })
    }

    pub fn theme_id(&self) -> &str {
        &self.segments[0]
    }

    pub fn is_ugc(&self) -> bool {
        self.theme_id() == UGC_THEME
    }

    pub fn category(&self) -> &str {
        &self.segments[1]
    }

    /// The opaque asset id for UGC references (extension included).
    pub fn asset_id(&self) -> &str {
        &self.segments[2]
    }

    /// Final segment: the physical file name, extension included.
    pub fn file_name(&self) -> &str {
        self.segments.last().map(String::as_str).unwrap_or("")
    }

    /// Archive entry name: segments joined with `.`.
    pub fn entry_name(&self) -> String {
        self.segments.join(".")
    }

    /// Filesystem location under the static theme library root.
    pub fn theme_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for segment in &self.segments {
            path.push(segment);
        }
        path
    }

    /// Like [`theme_path`](Self::theme_path), but with the category
    /// segment bridged to the char domain. Head props are stored under the
    /// character's theme directory even though the bundle consumes them as
    /// props.
    pub fn char_domain_path(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        path.push(&self.segments[0]);
        path.push("char");
        for segment in &self.segments[2..] {
            path.push(segment);
        }
        path
    }

    /// Whether any segment carries the legacy `head` marker.
    pub fn has_head_marker(&self) -> bool {
        self.segments.iter().any(|s| s == "head")
    }

    /// Drop the action-name segment from a UGC character reference. UGC
    /// filenames embed an action token the store never uses, so
    /// `[ugc, char, id, action.ext]` collapses to `[ugc, char, id]`.
    pub fn drop_action_segment(&mut self) {
        if self.segments.len() > 3 {
            self.segments.remove(3);
        }
    }

    /// Companion thumbnail reference for a video prop: same location, with
    /// the asset id's trailing three characters replaced by `png`.
    pub fn thumbnail_sibling(&self) -> AssetReference {
        let mut segments = self.segments.clone();
        segments[2] = video_thumbnail_id(&segments[2]);
        Self { segments }
    }
}

/// Replace a video asset id's trailing three characters with `png`
/// (`abc1234.mp4` becomes `abc1234.png`).
pub fn video_thumbnail_id(id: &str) -> String {
    let cut = id.len().saturating_sub(3);
    format!("{}png", &id[..cut])
}

/// Location of a static head asset, bridging the char/prop naming
/// mismatch. The raw reference loses its extension, the file lives under
/// the char domain with `.swf` appended, and the archive entry is named
/// under the prop domain.
///
/// Returns `(theme_id, path, entry_name)`, or `None` for references too
/// short to carry a theme id.
pub fn head_asset_location(raw: &str, root: &Path) -> Option<(String, PathBuf, String)> {
    let mut segments: Vec<String> = raw.split('.').map(str::to_string).collect();
    if segments.len() < 2 || segments[0].is_empty() {
        return None;
    }
    segments.pop();
    let theme_id = segments[0].clone();

    let mut path = root.join(&theme_id);
    path.push("char");
    for segment in &segments[1..] {
        path.push(segment);
    }
    let file_name = format!("{}.swf", path.file_name()?.to_string_lossy());
    path.set_file_name(file_name);

    segments.insert(1, "prop".to_string());
    let entry_name = format!("{}.swf", segments.join("."));

    Some((theme_id, path, entry_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_static_reference() {
        let reference = AssetReference::parse("comedy.explosion.swf", "prop").unwrap();
        assert_eq!(reference.theme_id(), "comedy");
        assert_eq!(reference.category(), "prop");
        assert!(!reference.is_ugc());
        assert_eq!(reference.entry_name(), "comedy.prop.explosion.swf");
        assert_eq!(
            reference.theme_path(Path::new("/store")),
            PathBuf::from("/store/comedy/prop/explosion.swf")
        );
    }

    #[test]
    fn test_parse_ugc_reference() {
        let reference = AssetReference::parse("ugc.0cj2bs1s8m28.mp3", "sound").unwrap();
        assert!(reference.is_ugc());
        assert_eq!(reference.asset_id(), "0cj2bs1s8m28.mp3");
        assert_eq!(reference.entry_name(), "ugc.sound.0cj2bs1s8m28.mp3");
    }

    #[test]
    fn test_parse_rejects_short_or_anonymous_references() {
        assert!(AssetReference::parse("two.segments", "prop").is_err());
        assert!(AssetReference::parse(".missing.theme", "prop").is_err());
        assert!(AssetReference::parse("", "prop").is_err());
    }

    #[test]
    fn test_char_domain_path_bridges_head_props() {
        let reference = AssetReference::parse("comedy.head.crown.swf", "prop").unwrap();
        assert!(reference.has_head_marker());
        // the entry keeps the prop domain, the path moves to char
        assert_eq!(reference.entry_name(), "comedy.prop.head.crown.swf");
        assert_eq!(
            reference.char_domain_path(Path::new("/store")),
            PathBuf::from("/store/comedy/char/head/crown.swf")
        );
    }

    #[test]
    fn test_drop_action_segment() {
        let mut reference = AssetReference::parse("ugc.c9xz.sitting.swf", "char").unwrap();
        assert_eq!(reference.entry_name(), "ugc.char.c9xz.sitting.swf");
        reference.drop_action_segment();
        assert_eq!(reference.entry_name(), "ugc.char.c9xz");
        assert_eq!(reference.asset_id(), "c9xz");
        // dropping twice is a no-op
        reference.drop_action_segment();
        assert_eq!(reference.entry_name(), "ugc.char.c9xz");
    }

    #[test]
    fn test_video_thumbnail_id() {
        assert_eq!(video_thumbnail_id("abc1234.mp4"), "abc1234.png");
        assert_eq!(video_thumbnail_id("xy"), "png");
    }

    #[test]
    fn test_thumbnail_sibling() {
        let reference = AssetReference::parse("ugc.abc1234.mp4", "prop").unwrap();
        let thumbnail = reference.thumbnail_sibling();
        assert_eq!(thumbnail.asset_id(), "abc1234.png");
        assert_eq!(thumbnail.entry_name(), "ugc.prop.abc1234.png");
    }

    #[test]
    fn test_head_asset_location() {
        let (theme, path, entry) =
            head_asset_location("anime.head.spike.swf", Path::new("/store")).unwrap();
        assert_eq!(theme, "anime");
        assert_eq!(path, PathBuf::from("/store/anime/char/head/spike.swf"));
        assert_eq!(entry, "anime.prop.head.spike.swf");
    }

    #[test]
    fn test_head_asset_location_rejects_bare_names() {
        assert!(head_asset_location("justone", Path::new("/store")).is_none());
        assert!(head_asset_location(".anon.swf", Path::new("/store")).is_none());
    }
}
