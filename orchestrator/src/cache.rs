use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use specs::CacheKey;
use tempfile::NamedTempFile;

use crate::{OrchestratorError, Result};

/// Generated meshes stored as `<dir>/<key>.glb`.
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    /// Opens the cache at `dir`, creating the directory if needed.
    pub fn open<P: Into<PathBuf>>(dir: P) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Reads the entry for `key`.
    ///
    /// # Returns
    /// `None` when there is no entry.
    ///
    /// # Errors
    /// `OrchestratorError::Cache` when an entry exists but can't be read.
    pub fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(OrchestratorError::Cache { path, source }),
        }
    }

    /// Stores `bytes` under `key`.
    ///
    /// The bytes go to a temporary file in the cache directory which is then renamed over
    /// the entry, so readers never see a partial file. Concurrent writers of the same key
    /// race and the last rename wins.
    pub fn put(&self, key: &CacheKey, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path(key);
        let cache_err = |source| OrchestratorError::Cache {
            path: path.clone(),
            source,
        };

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(cache_err)?;
        tmp.write_all(bytes).map_err(cache_err)?;
        tmp.as_file().sync_all().map_err(cache_err)?;
        tmp.persist(&path).map_err(|e| cache_err(e.error))?;

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use specs::{BodyVariant, MeasurementSet};

    use super::*;

    fn key() -> CacheKey {
        let set = MeasurementSet::new([175.0, 95.0, 80.0, 98.0, 45.0, 60.0, 78.0, 38.0]);
        CacheKey::new(&set, BodyVariant::Neutral).unwrap()
    }

    #[test]
    fn miss_then_hit() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::open(dir.path().join("cache")).unwrap();
        let key = key();

        assert_eq!(cache.get(&key).unwrap(), None);
        let path = cache.put(&key, b"glTF").unwrap();
        assert_eq!(path, cache.path(&key));
        assert_eq!(cache.get(&key).unwrap().as_deref(), Some(&b"glTF"[..]));

        cache.put(&key, b"again").unwrap();
        assert_eq!(cache.get(&key).unwrap().as_deref(), Some(&b"again"[..]));
        assert_eq!(fs::read_dir(cache.dir()).unwrap().count(), 1);
    }

    #[test]
    fn unreadable_entry_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::open(dir.path()).unwrap();
        let key = key();

        fs::create_dir(cache.path(&key)).unwrap();
        assert!(matches!(cache.get(&key), Err(OrchestratorError::Cache { .. })));
    }
}
