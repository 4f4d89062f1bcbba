use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::Result;

/// What a cached load was keyed on. A change in either field means the file
/// was rewritten since it was loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: Option<SystemTime>,
    len: u64,
}

impl FileStamp {
    fn read(path: &Path) -> Result<Self> {
        let meta = std::fs::metadata(path)?;
        Ok(Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

struct Entry<T> {
    stamp: FileStamp,
    value: Arc<T>,
}

/// Caller-owned cache of parsed files, keyed by path and file stamp.
pub struct FileCache<T> {
    entries: HashMap<PathBuf, Entry<T>>,
}

impl<T> Default for FileCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> FileCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached value for `path`, running `load` only when the file
    /// is new to the cache or its stamp changed.
    pub fn get_or_load<F>(&mut self, path: &Path, load: F) -> Result<Arc<T>>
    where
        F: FnOnce(&Path) -> Result<T>,
    {
        let stamp = FileStamp::read(path)?;
        if let Some(entry) = self.entries.get(path) {
            if entry.stamp == stamp {
                tracing::trace!(path = %path.display(), "cache hit");
                return Ok(Arc::clone(&entry.value));
            }
            tracing::debug!(path = %path.display(), "file changed, reloading");
        }

        let value = Arc::new(load(path)?);
        self.entries.insert(
            path.to_path_buf(),
            Entry {
                stamp,
                value: Arc::clone(&value),
            },
        );
        Ok(value)
    }

    /// Drop the entry for `path`. Returns whether one was cached.
    pub fn invalidate(&mut self, path: &Path) -> bool {
        self.entries.remove(path).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn read_counting(calls: &Cell<usize>) -> impl Fn(&Path) -> Result<String> + '_ {
        move |p: &Path| {
            calls.set(calls.get() + 1);
            Ok(std::fs::read_to_string(p)?)
        }
    }

    #[test]
    fn test_second_load_hits_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.csv");
        std::fs::write(&path, "x").unwrap();
        let calls = Cell::new(0);
        let mut cache = FileCache::new();

        let first = cache.get_or_load(&path, read_counting(&calls)).unwrap();
        let second = cache.get_or_load(&path, read_counting(&calls)).unwrap();
        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_reloads_after_file_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.csv");
        std::fs::write(&path, "x").unwrap();
        let calls = Cell::new(0);
        let mut cache = FileCache::new();

        cache.get_or_load(&path, read_counting(&calls)).unwrap();
        std::fs::write(&path, "longer contents").unwrap();
        let value = cache.get_or_load(&path, read_counting(&calls)).unwrap();
        assert_eq!(calls.get(), 2);
        assert_eq!(value.as_str(), "longer contents");
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.csv");
        std::fs::write(&path, "x").unwrap();
        let calls = Cell::new(0);
        let mut cache = FileCache::new();

        cache.get_or_load(&path, read_counting(&calls)).unwrap();
        assert!(cache.invalidate(&path));
        assert!(!cache.invalidate(&path));
        cache.get_or_load(&path, read_counting(&calls)).unwrap();
        assert_eq!(calls.get(), 2);

        cache.clear();
        assert!(!cache.invalidate(&path));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache: FileCache<String> = FileCache::new();
        let calls = Cell::new(0);
        assert!(cache
            .get_or_load(&dir.path().join("nope.csv"), read_counting(&calls))
            .is_err());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.csv");
        std::fs::write(&path, "x").unwrap();
        let mut cache: FileCache<String> = FileCache::new();
        let failed = cache.get_or_load(&path, |_| {
            Err(crate::error::SalesError::Other("boom".into()))
        });
        assert!(failed.is_err());
        assert!(!cache.invalidate(&path));
    }
}
