//! Storage layout configuration
//!
//! Defines the `scenepack.json` layout file: where the static theme
//! library, the bundled fonts, and the UGC store folders live. Every field
//! has a default so a bare file (or none at all) still yields a usable
//! layout rooted in the working directory.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read layout file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse layout file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Filesystem roots the archive engine resolves against.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Directories {
    /// Static theme library: `<themeRoot>/<themeId>/<category>/<file>`.
    #[serde(default = "default_theme_root")]
    pub theme_root: PathBuf,

    /// Installation font directory holding the `FontFile*.swf` assets.
    #[serde(default = "default_font_dir")]
    pub font_dir: PathBuf,

    /// UGC asset store folder (payloads + metadata database).
    #[serde(default = "default_asset_dir")]
    pub asset_dir: PathBuf,

    /// UGC character store folder (definition documents + database).
    #[serde(default = "default_char_dir")]
    pub char_dir: PathBuf,
}

fn default_theme_root() -> PathBuf {
    PathBuf::from("./static/store")
}

fn default_font_dir() -> PathBuf {
    PathBuf::from("./static/client/go/font")
}

fn default_asset_dir() -> PathBuf {
    PathBuf::from("./data/assets")
}

fn default_char_dir() -> PathBuf {
    PathBuf::from("./data/chars")
}

impl Default for Directories {
    fn default() -> Self {
        Self {
            theme_root: default_theme_root(),
            font_dir: default_font_dir(),
            asset_dir: default_asset_dir(),
            char_dir: default_char_dir(),
        }
    }
}

impl Directories {
    /// Load a layout file, tolerating absent optional fields.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Layout with every folder under one root, the shape `scenepack init`
    /// and the tests use.
    pub fn under_root(root: &Path) -> Self {
        Self {
            theme_root: root.join("store"),
            font_dir: root.join("client").join("go").join("font"),
            asset_dir: root.join("assets"),
            char_dir: root.join("chars"),
        }
    }
}
