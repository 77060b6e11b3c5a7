//! Disk-backed stores
//!
//! Payload files live in a flat folder keyed by asset id; metadata records
//! live in a single JSON database file inside that folder. The database is
//! rewritten on every save, which keeps imports crash-safe enough for a
//! single-writer tool (unpack skips existing ids, so a replay never
//! clobbers records).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{AssetMetadata, AssetStore, CharStore, StoreError};

const ASSET_DB_FILE: &str = "assets.json";
const CHAR_DB_FILE: &str = "chars.json";

/// Shared folder + JSON database plumbing for both stores.
#[derive(Debug)]
struct DiskStore {
    folder: PathBuf,
    db_path: PathBuf,
    records: BTreeMap<String, AssetMetadata>,
}

impl DiskStore {
    fn open(folder: &Path, db_file: &str) -> Result<Self, StoreError> {
        fs::create_dir_all(folder)?;
        let db_path = folder.join(db_file);
        let records = if db_path.exists() {
            serde_json::from_str(&fs::read_to_string(&db_path)?)?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            folder: folder.to_path_buf(),
            db_path,
            records,
        })
    }

    fn flush(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.records)?;
        fs::write(&self.db_path, json)?;
        Ok(())
    }

    fn read_payload(&self, file_name: &str) -> Result<Vec<u8>, StoreError> {
        match fs::read(self.folder.join(file_name)) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(file_name.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write_payload(&self, file_name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        fs::write(self.folder.join(file_name), bytes)?;
        Ok(())
    }
}

/// Folder-backed [`AssetStore`].
#[derive(Debug)]
pub struct DiskAssetStore {
    inner: DiskStore,
}

impl DiskAssetStore {
    pub fn open(folder: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            inner: DiskStore::open(folder, ASSET_DB_FILE)?,
        })
    }
}

impl AssetStore for DiskAssetStore {
    fn load(&self, id: &str) -> Result<Vec<u8>, StoreError> {
        if !self.inner.records.contains_key(id) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.inner.read_payload(id)
    }

    fn exists(&self, id: &str) -> bool {
        self.inner.records.contains_key(id)
    }

    fn save(&mut self, bytes: &[u8], meta: AssetMetadata) -> Result<(), StoreError> {
        self.inner.write_payload(&meta.id, bytes)?;
        self.inner.records.insert(meta.id.clone(), meta);
        self.inner.flush()
    }

    fn metadata(&self, id: &str) -> Option<AssetMetadata> {
        self.inner.records.get(id).cloned()
    }

    fn write_raw(&mut self, file_name: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.inner.write_payload(file_name, bytes)
    }

    fn folder(&self) -> &Path {
        &self.inner.folder
    }
}

/// Folder-backed [`CharStore`]. Definition documents are stored as
/// `<id>.xml`.
#[derive(Debug)]
pub struct DiskCharStore {
    inner: DiskStore,
}

impl DiskCharStore {
    pub fn open(folder: &Path) -> Result<Self, StoreError> {
        Ok(Self {
            inner: DiskStore::open(folder, CHAR_DB_FILE)?,
        })
    }
}

impl CharStore for DiskCharStore {
    fn exists(&self, id: &str) -> bool {
        self.inner.records.contains_key(id)
    }

    fn load_xml(&self, id: &str) -> Result<Vec<u8>, StoreError> {
        if !self.inner.records.contains_key(id) {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.inner.read_payload(&format!("{id}.xml"))
    }

    fn save(&mut self, xml: &[u8], meta: AssetMetadata) -> Result<(), StoreError> {
        self.inner.write_payload(&format!("{}.xml", meta.id), xml)?;
        self.inner.records.insert(meta.id.clone(), meta);
        self.inner.flush()
    }
}
