//! Bundle packer
//!
//! Walks a scene document, resolves every asset reference against the
//! static theme library or the UGC store, and builds the portable bundle:
//! `movie.xml`, `themelist.xml`, `ugc.xml`, the per-theme manifests, an
//! optional thumbnail, and one payload entry per resolved asset.
//!
//! Partial failure is the contract here. A reference that cannot be
//! resolved never aborts the pack: the owning element is rewritten to an
//! inert placeholder, the failure is logged, and the walk moves on. Only
//! an empty input document, an unreadable theme manifest, or an archive
//! write failure abort the whole operation.

use std::fs;
use std::path::PathBuf;

use crate::archive::{ArchiveError, ArchiveWriter};
use crate::config::Directories;
use crate::document::{DocumentError, Element, SceneDocument, XML_HEADER};
use crate::fonts::font_asset_file;
use crate::reference::{head_asset_location, AssetReference, UGC_THEME};
use crate::store::{derive_theme_id, AssetKind, AssetMetadata, AssetStore, CharStore};

#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("scene document is empty")]
    EmptyDocument,

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("theme manifest `{path}` for theme `{theme}` is unreadable: {source}")]
    ThemeManifest {
        theme: String,
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Theme ids touched during one pack call, in first-touch order so bundle
/// contents stay deterministic for a given document.
#[derive(Debug, Default)]
pub struct ThemeSet {
    ids: Vec<String>,
}

impl ThemeSet {
    pub fn insert(&mut self, id: &str) {
        if !self.contains(id) {
            self.ids.push(id.to_string());
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|t| t == id)
    }

    /// Rewrite legacy theme ids to their modern names: `family` shipped
    /// renamed as `custom`, `cc2` as `action`.
    pub fn apply_aliases(&mut self) {
        self.alias("family", "custom");
        self.alias("cc2", "action");
    }

    fn alias(&mut self, from: &str, to: &str) {
        if let Some(pos) = self.ids.iter().position(|t| t == from) {
            self.ids.remove(pos);
            self.insert(to);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.ids.iter().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Packs scene documents into bundles against a fixed storage layout.
pub struct Packer<'a> {
    dirs: &'a Directories,
    assets: &'a dyn AssetStore,
    chars: &'a dyn CharStore,
}

impl<'a> Packer<'a> {
    pub fn new(dirs: &'a Directories, assets: &'a dyn AssetStore, chars: &'a dyn CharStore) -> Self {
        Self { dirs, assets, chars }
    }

    /// Pack a scene document and an optional thumbnail into a bundle
    /// buffer. The input buffer must be non-empty.
    pub fn pack(&self, movie_xml: &[u8], thumbnail: Option<&[u8]>) -> Result<Vec<u8>, PackError> {
        if movie_xml.is_empty() {
            return Err(PackError::EmptyDocument);
        }
        let mut doc = SceneDocument::parse(movie_xml)?;

        let mut walk = Walk {
            dirs: self.dirs,
            assets: self.assets,
            chars: self.chars,
            archive: ArchiveWriter::new(),
            themes: ThemeSet::default(),
            fragments: String::new(),
            changed: false,
        };

        for elem in doc.root.children.iter_mut() {
            match TopTag::classify(&elem.name) {
                TopTag::Sound => walk.visit_sound(elem)?,
                TopTag::Scene => walk.visit_scene(elem)?,
                // other top-level tags carry no asset references
                TopTag::Other => {}
            }
        }

        let Walk {
            mut archive,
            mut themes,
            fragments,
            changed,
            ..
        } = walk;

        themes.apply_aliases();

        for theme in themes.iter().map(str::to_string).collect::<Vec<_>>() {
            if theme == UGC_THEME {
                continue;
            }
            let path = self.dirs.theme_root.join(&theme).join("theme.xml");
            let bytes = fs::read(&path).map_err(|source| PackError::ThemeManifest {
                theme: theme.clone(),
                path: path.clone(),
                source,
            })?;
            archive.add_entry(&format!("{theme}.xml"), &bytes)?;
        }

        let theme_index: String = themes
            .iter()
            .map(|t| format!("<theme>{t}</theme>"))
            .collect();
        archive.add_entry(
            "themelist.xml",
            format!("{XML_HEADER}<themes>{theme_index}</themes>").as_bytes(),
        )?;
        archive.add_entry(
            "ugc.xml",
            format!(r#"{XML_HEADER}<theme id="ugc" name="ugc">{fragments}</theme>"#).as_bytes(),
        )?;
        if let Some(thumbnail) = thumbnail {
            archive.add_entry("thumbnail.png", thumbnail)?;
        }

        // untouched documents pass through byte for byte
        if changed {
            archive.add_entry("movie.xml", &doc.serialize())?;
        } else {
            archive.add_entry("movie.xml", movie_xml)?;
        }

        Ok(archive.finalize()?)
    }
}

/// Top-level document tags the walk cares about.
enum TopTag {
    Sound,
    Scene,
    Other,
}

impl TopTag {
    fn classify(name: &str) -> Self {
        match name {
            "sound" => TopTag::Sound,
            "scene" => TopTag::Scene,
            _ => TopTag::Other,
        }
    }
}

/// Scene child tags, each with its own resolution rule. `effectAsset` is
/// the legacy spelling of `effect`.
enum SceneTag {
    Bg,
    Effect,
    Prop,
    Char,
    Bubble,
    Duration,
    Trans,
    Other,
}

impl SceneTag {
    fn classify(name: &str) -> Self {
        match name {
            "bg" => SceneTag::Bg,
            "effect" | "effectAsset" => SceneTag::Effect,
            "prop" => SceneTag::Prop,
            "char" => SceneTag::Char,
            "bubbleAsset" => SceneTag::Bubble,
            "durationSetting" => SceneTag::Duration,
            "trans" => SceneTag::Trans,
            _ => SceneTag::Other,
        }
    }

    /// Category segment used when resolving this tag's reference.
    fn category(&self) -> &'static str {
        match self {
            SceneTag::Bg => "bg",
            SceneTag::Effect => "effect",
            SceneTag::Prop => "prop",
            _ => "",
        }
    }
}

/// Call-scoped walk state: the archive under construction, the themes
/// touched so far, the accumulated UGC manifest, and whether any node was
/// rewritten.
struct Walk<'a> {
    dirs: &'a Directories,
    assets: &'a dyn AssetStore,
    chars: &'a dyn CharStore,
    archive: ArchiveWriter,
    themes: ThemeSet,
    fragments: String,
    changed: bool,
}

impl Walk<'_> {
    fn visit_sound(&mut self, elem: &mut Element) -> Result<(), PackError> {
        let Some(file) = elem.child_text("sfile").map(str::to_string) else {
            return Ok(());
        };
        if file.is_empty() {
            return Ok(());
        }
        if !self.resolve_basic(&file, "sound", None)? {
            elem.make_inert();
            self.changed = true;
        }
        Ok(())
    }

    fn visit_scene(&mut self, scene: &mut Element) -> Result<(), PackError> {
        for child in scene.children.iter_mut() {
            match SceneTag::classify(&child.name) {
                // settings nodes, nothing to resolve
                SceneTag::Duration | SceneTag::Trans => {}
                tag @ (SceneTag::Bg | SceneTag::Effect | SceneTag::Prop) => {
                    let Some(file) = child.child_text("file").map(str::to_string) else {
                        continue;
                    };
                    if file.is_empty() {
                        continue;
                    }
                    let subtype = child.attr("subtype").map(str::to_string);
                    if !self.resolve_basic(&file, tag.category(), subtype.as_deref())? {
                        child.make_inert();
                        self.changed = true;
                    }
                }
                SceneTag::Char => self.visit_char(child)?,
                SceneTag::Bubble => self.visit_bubble(child)?,
                // unrecognized scene children carry no asset references
                SceneTag::Other => {}
            }
        }
        Ok(())
    }

    /// A character resolves its `action` reference (the definition
    /// document for UGC characters, a static theme file otherwise), then
    /// each worn or held item. Once the character itself fails it goes
    /// inert and its items are not traversed.
    fn visit_char(&mut self, char_el: &mut Element) -> Result<(), PackError> {
        let Some(action) = char_el.child_text("action").map(str::to_string) else {
            return Ok(());
        };
        if action.is_empty() {
            return Ok(());
        }

        let mut reference = match AssetReference::parse(&action, "char") {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(reference = %action, error = %e, "char reference is malformed, dropping element");
                char_el.make_inert();
                self.changed = true;
                return Ok(());
            }
        };

        if reference.is_ugc() {
            // the UGC filename embeds an action token the store never uses
            reference.drop_action_segment();
            let id = reference.asset_id().to_string();
            match self.chars.load_xml(&id) {
                Ok(char_xml) => {
                    let mut meta = AssetMetadata::new(&id, AssetKind::Char);
                    meta.theme_id = Some(derive_theme_id(&char_xml));
                    self.push_fragment(&meta);
                    self.archive
                        .add_entry(&format!("{}.xml", reference.entry_name()), &char_xml)?;
                    self.themes.insert(reference.theme_id());
                }
                Err(e) => {
                    tracing::warn!(char_id = %id, error = %e, "char failed to load, dropping element");
                    char_el.make_inert();
                    self.changed = true;
                    return Ok(());
                }
            }
        } else {
            let path = reference.theme_path(&self.dirs.theme_root);
            match fs::read(&path) {
                Ok(bytes) => {
                    self.archive.add_entry(&reference.entry_name(), &bytes)?;
                    self.themes.insert(reference.theme_id());
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "char action failed to load, dropping element");
                    char_el.make_inert();
                    self.changed = true;
                    return Ok(());
                }
            }
        }

        for item in char_el.children.iter_mut() {
            if item.children.is_empty() {
                continue;
            }
            let Some(file) = item.child_text("file").map(str::to_string) else {
                continue;
            };
            if file.is_empty() {
                continue;
            }
            if item.name != "head" {
                if !self.resolve_basic(&file, "prop", None)? {
                    item.make_inert();
                    self.changed = true;
                }
            } else {
                // heads are stored under the char theme but consumed as props
                if file.split('.').next() == Some(UGC_THEME) {
                    continue;
                }
                match head_asset_location(&file, &self.dirs.theme_root) {
                    Some((theme, path, entry)) => match fs::read(&path) {
                        Ok(bytes) => {
                            self.archive.add_entry(&entry, &bytes)?;
                            self.themes.insert(&theme);
                        }
                        Err(e) => {
                            tracing::warn!(path = %path.display(), error = %e, "head asset failed to load, dropping element");
                            item.make_inert();
                            self.changed = true;
                        }
                    },
                    None => {
                        tracing::warn!(reference = %file, "head reference is malformed, dropping element");
                        item.make_inert();
                        self.changed = true;
                    }
                }
            }
        }

        Ok(())
    }

    /// Bubble text in a non-built-in font needs that font bundled from the
    /// installation's font directory. A missing font file keeps the bubble
    /// (the player falls back to Arial) so it is logged and skipped.
    fn visit_bubble(&mut self, bubble_el: &mut Element) -> Result<(), PackError> {
        let font = bubble_el
            .child_named("bubble")
            .and_then(|b| b.child_named("text"))
            .and_then(|t| t.attr("font"))
            .unwrap_or("");
        if font.is_empty() || font == "Arial" {
            return Ok(());
        }
        let Some(stem) = font_asset_file(font) else {
            return Ok(());
        };
        let file_name = format!("{stem}.swf");
        let path = self.dirs.font_dir.join(&file_name);
        match fs::read(&path) {
            Ok(bytes) => self.archive.add_entry(&file_name, &bytes)?,
            Err(e) => {
                tracing::warn!(font = %font, path = %path.display(), error = %e, "bubble font failed to load, skipping");
            }
        }
        Ok(())
    }

    /// Resolve one reference and add its payload to the bundle. Returns
    /// `Ok(false)` when the asset cannot be resolved — the caller rewrites
    /// the owning node. Only archive write failures propagate.
    fn resolve_basic(
        &mut self,
        raw: &str,
        category: &str,
        subtype: Option<&str>,
    ) -> Result<bool, PackError> {
        let reference = match AssetReference::parse(raw, category) {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(reference = %raw, error = %e, "asset reference is malformed, dropping element");
                return Ok(false);
            }
        };

        let bytes = if reference.is_ugc() {
            let id = reference.asset_id();
            let bytes = match self.assets.load(id) {
                Ok(b) => b,
                Err(e) => {
                    tracing::warn!(asset_id = %id, error = %e, "asset failed to load, dropping element");
                    return Ok(false);
                }
            };
            let Some(meta) = self.assets.metadata(id) else {
                tracing::warn!(asset_id = %id, "asset is referenced but has no metadata record, dropping element");
                return Ok(false);
            };
            self.push_fragment(&meta);

            if category == "prop" && subtype == Some("video") {
                let thumb = reference.thumbnail_sibling();
                match self.assets.load(thumb.asset_id()) {
                    Ok(thumb_bytes) => {
                        self.archive.add_entry(&thumb.entry_name(), &thumb_bytes)?;
                    }
                    Err(e) => {
                        tracing::warn!(asset_id = %thumb.asset_id(), error = %e, "video thumbnail failed to load, dropping element");
                        return Ok(false);
                    }
                }
            }
            bytes
        } else {
            let path = if category == "prop" && reference.has_head_marker() {
                reference.char_domain_path(&self.dirs.theme_root)
            } else {
                reference.theme_path(&self.dirs.theme_root)
            };
            match fs::read(&path) {
                Ok(b) => b,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "asset failed to load, dropping element");
                    return Ok(false);
                }
            }
        };

        self.archive.add_entry(&reference.entry_name(), &bytes)?;
        self.themes.insert(reference.theme_id());
        Ok(true)
    }

    fn push_fragment(&mut self, meta: &AssetMetadata) {
        self.fragments.push_str(&meta.to_manifest_fragment().to_fragment());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ArchiveReader;
    use crate::store::{DiskAssetStore, DiskCharStore};
    use std::path::Path;
    use tempfile::TempDir;

    struct Fixture {
        _dir: TempDir,
        dirs: Directories,
        assets: DiskAssetStore,
        chars: DiskCharStore,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            let dirs = Directories::under_root(dir.path());
            std::fs::create_dir_all(&dirs.theme_root).unwrap();
            std::fs::create_dir_all(&dirs.font_dir).unwrap();
            let assets = DiskAssetStore::open(&dirs.asset_dir).unwrap();
            let chars = DiskCharStore::open(&dirs.char_dir).unwrap();
            Self { _dir: dir, dirs, assets, chars }
        }

        fn add_theme_file(&self, theme: &str, relative: &str, bytes: &[u8]) {
            let path = self
                .dirs
                .theme_root
                .join(theme)
                .join(Path::new(relative));
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, bytes).unwrap();
        }

        fn add_theme_manifest(&self, theme: &str) {
            self.add_theme_file(theme, "theme.xml", format!("<theme id=\"{theme}\"/>").as_bytes());
        }

        fn pack(&self, xml: &[u8], thumbnail: Option<&[u8]>) -> Result<Vec<u8>, PackError> {
            Packer::new(&self.dirs, &self.assets, &self.chars).pack(xml, thumbnail)
        }
    }

    fn entry(bundle: &[u8], name: &str) -> Option<Vec<u8>> {
        ArchiveReader::open(bundle).unwrap().read_entry(name)
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let fixture = Fixture::new();
        assert!(matches!(fixture.pack(b"", None), Err(PackError::EmptyDocument)));
    }

    #[test]
    fn test_malformed_input_is_rejected() {
        let fixture = Fixture::new();
        assert!(matches!(
            fixture.pack(b"<film><scene>", None),
            Err(PackError::Document(_))
        ));
    }

    #[test]
    fn test_pack_without_references() {
        let fixture = Fixture::new();
        let xml = b"<film><scene><durationSetting>2</durationSetting></scene></film>";
        let bundle = fixture.pack(xml, None).unwrap();

        let mut reader = ArchiveReader::open(&bundle).unwrap();
        assert_eq!(
            reader.entry_names(),
            vec!["themelist.xml", "ugc.xml", "movie.xml"]
        );
        assert_eq!(
            reader.read_entry("themelist.xml").unwrap(),
            format!("{XML_HEADER}<themes></themes>").as_bytes()
        );
        assert_eq!(
            reader.read_entry("ugc.xml").unwrap(),
            format!(r#"{XML_HEADER}<theme id="ugc" name="ugc"></theme>"#).as_bytes()
        );
        // untouched document passes through byte for byte
        assert_eq!(reader.read_entry("movie.xml").unwrap(), xml);
    }

    #[test]
    fn test_missing_sound_goes_inert() {
        let fixture = Fixture::new();
        let xml = br#"<film><sound loop="1"><sfile>comedy.missing.mp3</sfile></sound></film>"#;
        let bundle = fixture.pack(xml, None).unwrap();

        let movie = entry(&bundle, "movie.xml").unwrap();
        let doc = SceneDocument::parse(&movie).unwrap();
        assert_eq!(doc.root.children[0].name, "ELEMENT");
        assert!(doc.root.children[0].attributes.is_empty());
        // failed resolution never touches the theme set
        assert_eq!(
            entry(&bundle, "themelist.xml").unwrap(),
            format!("{XML_HEADER}<themes></themes>").as_bytes()
        );
    }

    #[test]
    fn test_static_sound_is_bundled() {
        let fixture = Fixture::new();
        fixture.add_theme_file("comedy", "sound/laugh.mp3", b"mp3");
        fixture.add_theme_manifest("comedy");

        let xml = b"<film><sound><sfile>comedy.laugh.mp3</sfile></sound></film>";
        let bundle = fixture.pack(xml, None).unwrap();

        assert_eq!(entry(&bundle, "comedy.sound.laugh.mp3").unwrap(), b"mp3");
        assert_eq!(
            entry(&bundle, "comedy.xml").unwrap(),
            br#"<theme id="comedy"/>"#
        );
        assert_eq!(
            entry(&bundle, "themelist.xml").unwrap(),
            format!("{XML_HEADER}<themes><theme>comedy</theme></themes>").as_bytes()
        );
        // nothing rewritten, original bytes kept
        assert_eq!(entry(&bundle, "movie.xml").unwrap(), xml);
    }

    #[test]
    fn test_theme_aliasing() {
        let fixture = Fixture::new();
        fixture.add_theme_file("family", "bg/house.swf", b"swf");
        fixture.add_theme_manifest("custom");

        let xml = b"<film><scene><bg><file>family.house.swf</file></bg></scene></film>";
        let bundle = fixture.pack(xml, None).unwrap();

        let themelist = String::from_utf8(entry(&bundle, "themelist.xml").unwrap()).unwrap();
        assert!(themelist.contains("<theme>custom</theme>"));
        assert!(!themelist.contains("family"));
        assert!(entry(&bundle, "custom.xml").is_some());

        // payload entries keep the reference's own theme id
        assert_eq!(entry(&bundle, "family.bg.house.swf").unwrap(), b"swf");
    }

    #[test]
    fn test_cc2_aliases_to_action() {
        let fixture = Fixture::new();
        fixture.add_theme_file("cc2", "effect/zap.swf", b"swf");
        fixture.add_theme_manifest("action");

        let xml = b"<film><scene><effectAsset><file>cc2.zap.swf</file></effectAsset></scene></film>";
        let bundle = fixture.pack(xml, None).unwrap();

        let themelist = String::from_utf8(entry(&bundle, "themelist.xml").unwrap()).unwrap();
        assert!(themelist.contains("<theme>action</theme>"));
        assert!(!themelist.contains("cc2"));
        assert_eq!(entry(&bundle, "cc2.effect.zap.swf").unwrap(), b"swf");
    }

    #[test]
    fn test_ugc_video_prop_bundles_thumbnail() {
        let mut fixture = Fixture::new();
        let mut meta = AssetMetadata::new("abc1234.mp4", AssetKind::Prop);
        meta.subtype = "video".to_string();
        meta.title = "Clip".to_string();
        meta.width = Some(320);
        meta.height = Some(240);
        fixture.assets.save(b"video-bytes", meta).unwrap();
        fixture
            .assets
            .save(b"png-bytes", AssetMetadata::new("abc1234.png", AssetKind::Prop))
            .unwrap();

        let xml = br#"<film><scene><prop subtype="video"><file>ugc.abc1234.mp4</file></prop></scene></film>"#;
        let bundle = fixture.pack(xml, None).unwrap();

        assert_eq!(entry(&bundle, "ugc.prop.abc1234.mp4").unwrap(), b"video-bytes");
        assert_eq!(entry(&bundle, "ugc.prop.abc1234.png").unwrap(), b"png-bytes");

        let ugc = String::from_utf8(entry(&bundle, "ugc.xml").unwrap()).unwrap();
        assert!(ugc.contains(r#"<prop id="abc1234.mp4" name="Clip" subtype="video" width="320" height="240""#));
        // original document untouched
        assert_eq!(entry(&bundle, "movie.xml").unwrap(), xml);
    }

    #[test]
    fn test_ugc_sound_without_metadata_goes_inert() {
        let mut fixture = Fixture::new();
        // payload exists on disk but the database has no record for it
        fixture.assets.write_raw("ghost.mp3", b"mp3").unwrap();

        let xml = b"<film><sound><sfile>ugc.ghost.mp3</sfile></sound></film>";
        let bundle = fixture.pack(xml, None).unwrap();

        let movie = entry(&bundle, "movie.xml").unwrap();
        let doc = SceneDocument::parse(&movie).unwrap();
        assert!(doc.root.children[0].is_inert());
        assert_eq!(entry(&bundle, "ugc.sound.ghost.mp3"), None);
    }

    #[test]
    fn test_ugc_char_drops_action_segment() {
        let mut fixture = Fixture::new();
        let char_xml = br#"<cc_char cc_theme_id="anime"/>"#;
        fixture
            .chars
            .save(char_xml, AssetMetadata::new("c9xz", AssetKind::Char))
            .unwrap();

        let xml = b"<film><scene><char><action>ugc.c9xz.sitting.swf</action></char></scene></film>";
        let bundle = fixture.pack(xml, None).unwrap();

        assert_eq!(entry(&bundle, "ugc.char.c9xz.xml").unwrap(), char_xml.as_slice());
        let ugc = String::from_utf8(entry(&bundle, "ugc.xml").unwrap()).unwrap();
        assert!(ugc.contains(r#"<char id="c9xz" name=""/>"#));
        // ugc never gets its own per-theme manifest entry
        assert_eq!(entry(&bundle, "ugc.xml.xml"), None);
    }

    #[test]
    fn test_static_char_with_head_and_prop_items() {
        let fixture = Fixture::new();
        fixture.add_theme_file("anime", "char/spike/walk.swf", b"walk");
        fixture.add_theme_file("anime", "char/head/spike.swf", b"head");
        fixture.add_theme_file("anime", "prop/katana.swf", b"katana");
        fixture.add_theme_manifest("anime");

        let xml = b"<film><scene><char>\
            <action>anime.spike.walk.swf</action>\
            <head><file>anime.head.spike.swf</file></head>\
            <held><file>anime.katana.swf</file></held>\
            </char></scene></film>";
        let bundle = fixture.pack(xml, None).unwrap();

        assert_eq!(entry(&bundle, "anime.char.spike.walk.swf").unwrap(), b"walk");
        // head: stored under char, bundled as prop
        assert_eq!(entry(&bundle, "anime.prop.head.spike.swf").unwrap(), b"head");
        assert_eq!(entry(&bundle, "anime.prop.katana.swf").unwrap(), b"katana");
        assert_eq!(entry(&bundle, "movie.xml").unwrap(), xml);
    }

    #[test]
    fn test_char_failure_skips_items() {
        let fixture = Fixture::new();
        // katana exists, but the char action does not
        fixture.add_theme_file("anime", "prop/katana.swf", b"katana");

        let xml = b"<film><scene><char>\
            <action>anime.spike.missing.swf</action>\
            <held><file>anime.katana.swf</file></held>\
            </char></scene></film>";
        let bundle = fixture.pack(xml, None).unwrap();

        let movie = entry(&bundle, "movie.xml").unwrap();
        let doc = SceneDocument::parse(&movie).unwrap();
        assert!(doc.root.children[0].children[0].is_inert());
        // items of an inert char are not bundled
        assert_eq!(entry(&bundle, "anime.prop.katana.swf"), None);
    }

    #[test]
    fn test_bubble_font_is_bundled() {
        let fixture = Fixture::new();
        std::fs::write(fixture.dirs.font_dir.join("FontFileBoom.swf"), b"font").unwrap();

        let xml = br#"<film><scene><bubbleAsset><bubble><text font="BadaBoom BB">POW</text></bubble></bubbleAsset></scene></film>"#;
        let bundle = fixture.pack(xml, None).unwrap();

        assert_eq!(entry(&bundle, "FontFileBoom.swf").unwrap(), b"font");
    }

    #[test]
    fn test_arial_bubble_is_skipped() {
        let fixture = Fixture::new();
        let xml = br#"<film><scene><bubbleAsset><bubble><text font="Arial">hi</text></bubble></bubbleAsset></scene></film>"#;
        let bundle = fixture.pack(xml, None).unwrap();

        let mut reader = ArchiveReader::open(&bundle).unwrap();
        assert_eq!(
            reader.entry_names(),
            vec!["themelist.xml", "ugc.xml", "movie.xml"]
        );
    }

    #[test]
    fn test_thumbnail_entry() {
        let fixture = Fixture::new();
        let bundle = fixture.pack(b"<film/>", Some(b"png-bytes")).unwrap();
        assert_eq!(entry(&bundle, "thumbnail.png").unwrap(), b"png-bytes");
    }

    #[test]
    fn test_missing_theme_manifest_aborts() {
        let fixture = Fixture::new();
        fixture.add_theme_file("comedy", "sound/laugh.mp3", b"mp3");
        // no theme.xml for comedy

        let xml = b"<film><sound><sfile>comedy.laugh.mp3</sfile></sound></film>";
        assert!(matches!(
            fixture.pack(xml, None),
            Err(PackError::ThemeManifest { .. })
        ));
    }

    #[test]
    fn test_theme_set_aliases() {
        let mut themes = ThemeSet::default();
        themes.insert("family");
        themes.insert("comedy");
        themes.insert("cc2");
        themes.insert("family");
        themes.apply_aliases();
        assert_eq!(
            themes.iter().collect::<Vec<_>>(),
            vec!["comedy", "custom", "action"]
        );
    }
}
