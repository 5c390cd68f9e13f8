//! Local fallback cache of the editor's latest record.
//!
//! One JSON file per owner:
//! ```text
//! <cache_dir>/
//!   <url-encoded owner>.json
//! ```
//!
//! Writes are synchronous and atomic (unique temp file + rename) so the most
//! recent edit survives a reload even when the remote write never happened.
//! Callers serialize writes for one owner.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::models::WeddingDetails;

/// Errors that can occur reading or writing the cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("I/O error for {}: {1}", .0.display())]
    Io(PathBuf, #[source] io::Error),
    #[error("failed to parse cache entry {}: {1}", .0.display())]
    Parse(PathBuf, #[source] serde_json::Error),
    #[error("invalid owner for cache key: {0:?}")]
    InvalidOwner(String),
}

/// The last known state of one owner's record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub owner: String,
    /// False while edits exist that the remote store has not acknowledged.
    pub synced: bool,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub shareable_id: Option<String>,
    pub details: WeddingDetails,
}

#[derive(Debug, Clone)]
pub struct LocalCache {
    dir: PathBuf,
}

impl LocalCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the entry for `owner`.
    pub fn path(&self, owner: &str) -> Result<PathBuf, CacheError> {
        if owner.trim().is_empty() {
            return Err(CacheError::InvalidOwner(owner.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", urlencoding::encode(owner))))
    }

    /// Loads the entry for `owner`, `Ok(None)` if there is none.
    pub fn load(&self, owner: &str) -> Result<Option<CacheEntry>, CacheError> {
        let path = self.path(owner)?;

        match fs::read(&path) {
            Ok(bytes) => {
                let entry: CacheEntry = serde_json::from_slice(&bytes)
                    .map_err(|e| CacheError::Parse(path, e))?;
                Ok(Some(entry))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::Io(path, e)),
        }
    }

    /// Replaces the entry for `entry.owner`.
    pub fn save(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        let path = self.path(&entry.owner)?;

        fs::create_dir_all(&self.dir).map_err(|e| CacheError::Io(self.dir.clone(), e))?;

        let bytes = serde_json::to_vec_pretty(entry).map_err(|e| CacheError::Parse(path.clone(), e))?;

        let mut temp =
            NamedTempFile::new_in(&self.dir).map_err(|e| CacheError::Io(self.dir.clone(), e))?;
        temp.write_all(&bytes)
            .map_err(|e| CacheError::Io(temp.path().to_path_buf(), e))?;
        temp.persist(&path).map_err(|e| CacheError::Io(path, e.error))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WeddingPatch;
    use tempfile::TempDir;

    fn setup() -> (LocalCache, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let cache = LocalCache::new(temp_dir.path().join("cache"));
        (cache, temp_dir)
    }

    fn entry(owner: &str, name: &str) -> CacheEntry {
        CacheEntry {
            owner: owner.to_string(),
            synced: false,
            saved_at: Utc::now(),
            id: None,
            shareable_id: None,
            details: WeddingDetails::default().with_patch(&WeddingPatch::new().couple_name_1(name)),
        }
    }

    #[test]
    fn test_load_missing_returns_none() {
        let (cache, _temp) = setup();
        assert!(cache.load("owner-1").unwrap().is_none());
    }

    #[test]
    fn test_save_creates_directory_and_roundtrips() {
        let (cache, _temp) = setup();
        let saved = entry("owner-1", "Ana");

        cache.save(&saved).unwrap();

        assert!(cache.dir().exists());
        assert_eq!(cache.load("owner-1").unwrap(), Some(saved));
    }

    #[test]
    fn test_owners_are_isolated() {
        let (cache, _temp) = setup();
        cache.save(&entry("owner-a", "A")).unwrap();
        cache.save(&entry("owner-b", "B")).unwrap();

        let a = cache.load("owner-a").unwrap().unwrap();
        let b = cache.load("owner-b").unwrap().unwrap();
        assert_eq!(a.details.couple_name_1, "A");
        assert_eq!(b.details.couple_name_1, "B");
    }

    #[test]
    fn test_owner_is_encoded_in_file_name() {
        let (cache, _temp) = setup();
        let path = cache.path("../evil/owner").unwrap();

        assert_eq!(path.parent(), Some(cache.dir()));
        assert!(!path.file_name().unwrap().to_string_lossy().contains('/'));
    }

    #[test]
    fn test_empty_owner_rejected() {
        let (cache, _temp) = setup();
        assert!(matches!(cache.load(" "), Err(CacheError::InvalidOwner(_))));
    }

    #[test]
    fn test_overwrite_keeps_latest() {
        let (cache, _temp) = setup();
        cache.save(&entry("owner-1", "First")).unwrap();
        cache.save(&entry("owner-1", "Second")).unwrap();

        let loaded = cache.load("owner-1").unwrap().unwrap();
        assert_eq!(loaded.details.couple_name_1, "Second");
    }

    #[test]
    fn test_concurrent_saves_do_not_collide() {
        let (cache, _temp) = setup();

        std::thread::scope(|s| {
            for t in 0..4 {
                let cache = &cache;
                s.spawn(move || {
                    for i in 0..25 {
                        cache.save(&entry("owner-1", &format!("t{}-{}", t, i))).unwrap();
                    }
                });
            }
        });

        let loaded = cache.load("owner-1").unwrap().unwrap();
        assert!(loaded.details.couple_name_1.starts_with('t'));
        let leftovers = fs::read_dir(cache.dir()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_corrupt_entry_is_parse_error() {
        let (cache, _temp) = setup();
        fs::create_dir_all(cache.dir()).unwrap();
        fs::write(cache.path("owner-1").unwrap(), b"not json").unwrap();

        assert!(matches!(cache.load("owner-1"), Err(CacheError::Parse(_, _))));
    }
}
