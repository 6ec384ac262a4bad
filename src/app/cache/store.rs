//! Durable cache record with wholesale load and atomic save
//!
//! The record is a single JSON object mapping `"{dataset_type}_{year}"` to the
//! validators captured when that dataset was last stored. It is read in full
//! at the start of a fetch and replaced in full after a successful transfer.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::errors::{CacheError, CacheResult};

/// Identity of one dataset/year pair in the cache table
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    dataset_type: String,
    year: u16,
}

impl CacheKey {
    pub fn new(dataset_type: impl Into<String>, year: u16) -> Self {
        Self {
            dataset_type: dataset_type.into(),
            year,
        }
    }

    pub fn dataset_type(&self) -> &str {
        &self.dataset_type
    }

    pub fn year(&self) -> u16 {
        self.year
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.dataset_type, self.year)
    }
}

/// Validators recorded for a stored dataset
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Strong validator
    #[serde(rename = "ETag", default)]
    pub etag: Option<String>,
    /// Weak validator
    #[serde(rename = "Last-Modified", default)]
    pub last_modified: Option<String>,
    /// Stored artifact, relative to the destination base path when possible
    #[serde(rename = "file_path", default)]
    pub file_path: Option<String>,
}

impl CacheEntry {
    /// Strong validator, treating an empty string as absent
    pub fn etag(&self) -> Option<&str> {
        self.etag.as_deref().filter(|v| !v.is_empty())
    }

    /// Weak validator, treating an empty string as absent
    pub fn last_modified(&self) -> Option<&str> {
        self.last_modified.as_deref().filter(|v| !v.is_empty())
    }
}

/// Whole cache table, keyed by the serialized cache key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheTable {
    entries: BTreeMap<String, CacheEntry>,
}

impl CacheTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.entries.get(&key.to_string())
    }

    /// Insert or overwrite the entry for `key`
    pub fn insert(&mut self, key: &CacheKey, entry: CacheEntry) -> Option<CacheEntry> {
        self.entries.insert(key.to_string(), entry)
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(&key.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CacheEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// What `load` found on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// Record parsed successfully
    Loaded { entries: usize },
    /// No record exists yet
    NotFound,
    /// Record exists but could not be read
    Unreadable { reason: String },
    /// Record was read but is not a valid cache table
    Malformed { reason: String },
}

impl LoadStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, LoadStatus::Loaded { .. })
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadStatus::Loaded { entries } => write!(f, "loaded ({} entries)", entries),
            LoadStatus::NotFound => write!(f, "not found"),
            LoadStatus::Unreadable { reason } => write!(f, "unreadable: {}", reason),
            LoadStatus::Malformed { reason } => write!(f, "malformed: {}", reason),
        }
    }
}

/// File-backed cache table
#[derive(Debug, Clone)]
pub struct CacheStore {
    path: PathBuf,
}

impl CacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the cache record
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the table, falling back to an empty one on any problem
    pub async fn load(&self) -> CacheTable {
        self.load_with_status().await.0
    }

    /// Load the table and report what was found
    ///
    /// Never fails: a missing, unreadable or malformed record yields an empty
    /// table, and the returned status tells the cases apart.
    pub async fn load_with_status(&self) -> (CacheTable, LoadStatus) {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Cache record not found: {}", self.path.display());
                return (CacheTable::new(), LoadStatus::NotFound);
            }
            Err(e) => {
                error!(
                    "Failed to read cache record {}: {}",
                    self.path.display(),
                    e
                );
                return (
                    CacheTable::new(),
                    LoadStatus::Unreadable {
                        reason: e.to_string(),
                    },
                );
            }
        };

        match serde_json::from_str::<CacheTable>(&content) {
            Ok(table) => {
                debug!("Cache record loaded: {} entries", table.len());
                let entries = table.len();
                (table, LoadStatus::Loaded { entries })
            }
            Err(e) => {
                warn!(
                    "Cache record {} is malformed: {}. Starting with an empty table",
                    self.path.display(),
                    e
                );
                (
                    CacheTable::new(),
                    LoadStatus::Malformed {
                        reason: e.to_string(),
                    },
                )
            }
        }
    }

    /// Replace the record with `table`
    ///
    /// Writes to a temporary file beside the record and renames it into
    /// place, so readers see either the old or the new table in full.
    ///
    /// # Errors
    ///
    /// Returns `CacheError` if the directory cannot be created or the write
    /// or rename fails.
    pub async fn save(&self, table: &CacheTable) -> CacheResult<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        fs::create_dir_all(&parent).await.map_err(|e| {
            error!("Failed to create cache directory: {}", e);
            CacheError::DirectoryNotAccessible {
                path: parent.clone(),
            }
        })?;

        let content = serde_json::to_string_pretty(table)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || write_atomic(&parent, &path, content.as_bytes()))
            .await
            .map_err(|e| CacheError::Task {
                reason: e.to_string(),
            })??;

        info!(
            "Cache record saved: {} ({} entries)",
            self.path.display(),
            table.len()
        );
        Ok(())
    }
}

fn write_atomic(dir: &Path, path: &Path, content: &[u8]) -> CacheResult<()> {
    let io_err = |source: std::io::Error| CacheError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut temp = tempfile::Builder::new()
        .prefix(".cache_metadata")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(io_err)?;
    temp.write_all(content).map_err(io_err)?;
    temp.as_file().sync_all().map_err(io_err)?;
    temp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_table() -> CacheTable {
        let mut table = CacheTable::new();
        table.insert(
            &CacheKey::new("cand", 2022),
            CacheEntry {
                etag: Some("\"abc123\"".to_string()),
                last_modified: Some("Wed, 21 Oct 2020 07:28:00 GMT".to_string()),
                file_path: Some(
                    "candidatos/2022/consulta_cand_2022_BRASIL_20251123.csv".to_string(),
                ),
            },
        );
        table.insert(
            &CacheKey::new("bens", 2018),
            CacheEntry {
                etag: None,
                last_modified: Some("Mon, 01 Jan 2024 00:00:00 GMT".to_string()),
                file_path: None,
            },
        );
        table
    }

    #[test]
    fn test_cache_key_format() {
        let key = CacheKey::new("vot_partido", 2020);
        assert_eq!(key.to_string(), "vot_partido_2020");
        assert_eq!(key.dataset_type(), "vot_partido");
        assert_eq!(key.year(), 2020);
    }

    #[test]
    fn test_entry_json_field_names() {
        let entry = CacheEntry {
            etag: Some("\"v1\"".to_string()),
            last_modified: None,
            file_path: Some("a/b.csv".to_string()),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["ETag"], "\"v1\"");
        assert!(json["Last-Modified"].is_null());
        assert_eq!(json["file_path"], "a/b.csv");
    }

    #[test]
    fn test_entry_missing_fields_default_to_none() {
        let table: CacheTable =
            serde_json::from_str(r#"{"cand_2022": {"ETag": "x"}}"#).unwrap();
        let entry = table.get(&CacheKey::new("cand", 2022)).unwrap();
        assert_eq!(entry.etag(), Some("x"));
        assert_eq!(entry.last_modified, None);
        assert_eq!(entry.file_path, None);
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(temp_dir.path().join("nested/dir/cache.json"));
        let table = sample_table();

        store.save(&table).await.unwrap();
        let (loaded, status) = store.load_with_status().await;

        assert_eq!(loaded, table);
        assert_eq!(status, LoadStatus::Loaded { entries: 2 });
    }

    #[tokio::test]
    async fn test_load_missing_record() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(temp_dir.path().join("absent.json"));

        let (table, status) = store.load_with_status().await;
        assert!(table.is_empty());
        assert_eq!(status, LoadStatus::NotFound);
    }

    #[tokio::test]
    async fn test_load_malformed_record() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("cache.json");
        std::fs::write(&path, "{ not json").unwrap();

        let store = CacheStore::new(&path);
        let (table, status) = store.load_with_status().await;
        assert!(table.is_empty());
        assert!(matches!(status, LoadStatus::Malformed { .. }));

        // Valid JSON of the wrong shape is malformed too
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        let (table, status) = store.load_with_status().await;
        assert!(table.is_empty());
        assert!(matches!(status, LoadStatus::Malformed { .. }));
    }

    #[tokio::test]
    async fn test_load_unreadable_record() {
        let temp_dir = TempDir::new().unwrap();
        // A directory in place of the record cannot be read as a file
        let path = temp_dir.path().join("cache.json");
        std::fs::create_dir(&path).unwrap();

        let store = CacheStore::new(&path);
        let (table, status) = store.load_with_status().await;
        assert!(table.is_empty());
        assert!(matches!(status, LoadStatus::Unreadable { .. }));
    }

    #[tokio::test]
    async fn test_save_overwrites_whole_table() {
        let temp_dir = TempDir::new().unwrap();
        let store = CacheStore::new(temp_dir.path().join("cache.json"));

        store.save(&sample_table()).await.unwrap();

        let mut replacement = CacheTable::new();
        replacement.insert(&CacheKey::new("cassacao", 2016), CacheEntry::default());
        store.save(&replacement).await.unwrap();

        let loaded = store.load().await;
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains(&CacheKey::new("cassacao", 2016)));
        assert!(!loaded.contains(&CacheKey::new("cand", 2022)));

        // No temporary files left beside the record
        let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn test_save_fails_when_parent_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        std::fs::write(&blocker, "file").unwrap();

        let store = CacheStore::new(blocker.join("cache.json"));
        let result = store.save(&sample_table()).await;
        assert!(result.is_err());
    }
}
