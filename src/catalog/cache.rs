//! Time-boxed memoization of directory scans.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use super::scan::scan_directory;

/// How long a listing stays fresh unless a refresh is forced.
pub const DEFAULT_CACHE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug)]
struct CacheEntry {
    files: Vec<String>,
    scanned_at: Instant,
}

/// Caches [`scan_directory`] results per directory.
///
/// Entries are only replaced wholesale, either after `timeout` has elapsed or
/// when a caller forces a refresh. There is no filesystem-event invalidation.
#[derive(Debug)]
pub struct ListingCache {
    timeout: Duration,
    entries: Mutex<HashMap<PathBuf, CacheEntry>>,
}

impl Default for ListingCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TIMEOUT)
    }
}

impl ListingCache {
    /// Create an empty cache whose entries expire after `timeout`.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Configured entry lifetime.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Image filenames in `directory`, served from the cache while fresh.
    ///
    /// The lock is held across the scan so a directory is never scanned
    /// twice concurrently and no reader sees a half-written entry.
    pub fn get(&self, directory: &Path, force_refresh: bool) -> Vec<String> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if !force_refresh {
            if let Some(entry) = entries.get(directory) {
                if entry.scanned_at.elapsed() < self.timeout {
                    tracing::debug!("Listing cache hit for {}", directory.display());
                    return entry.files.clone();
                }
            }
        }

        tracing::debug!(
            "Scanning {} (forced: {force_refresh})",
            directory.display()
        );
        let files = scan_directory(directory);
        entries.insert(
            directory.to_path_buf(),
            CacheEntry {
                files: files.clone(),
                scanned_at: Instant::now(),
            },
        );

        files
    }

    /// Number of directories with a stored listing, fresh or stale.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no directory has been scanned yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_fresh_entry_skips_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.png"), b"").unwrap();
        let cache = ListingCache::new(Duration::from_secs(60));

        let first = cache.get(dir.path(), false);
        // Not visible until the entry expires.
        fs::write(dir.path().join("b.png"), b"").unwrap();
        let second = cache.get(dir.path(), false);

        assert_eq!(first, vec!["a.png"]);
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_forced_refresh_rescans() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.png"), b"").unwrap();
        let cache = ListingCache::new(Duration::from_secs(60));

        cache.get(dir.path(), false);
        fs::write(dir.path().join("b.png"), b"").unwrap();

        assert_eq!(cache.get(dir.path(), true), vec!["a.png", "b.png"]);
        assert_eq!(cache.get(dir.path(), false), vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_expired_entry_rescans() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.png"), b"").unwrap();
        let cache = ListingCache::new(Duration::ZERO);

        cache.get(dir.path(), false);
        fs::write(dir.path().join("b.png"), b"").unwrap();

        assert_eq!(cache.get(dir.path(), false), vec!["a.png", "b.png"]);
    }

    #[test]
    fn test_entries_are_per_directory() {
        let one = tempfile::tempdir().unwrap();
        let two = tempfile::tempdir().unwrap();
        fs::write(one.path().join("x.png"), b"").unwrap();
        fs::write(two.path().join("y.jpg"), b"").unwrap();
        let cache = ListingCache::default();

        assert!(cache.is_empty());
        assert_eq!(cache.get(one.path(), false), vec!["x.png"]);
        assert_eq!(cache.get(two.path(), false), vec!["y.jpg"]);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.timeout(), DEFAULT_CACHE_TIMEOUT);
    }

    #[test]
    fn test_missing_directory_is_cached_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("later");
        let cache = ListingCache::new(Duration::from_secs(60));

        assert!(cache.get(&missing, false).is_empty());
        fs::create_dir(&missing).unwrap();
        fs::write(missing.join("a.png"), b"").unwrap();

        assert!(cache.get(&missing, false).is_empty());
        assert_eq!(cache.get(&missing, true), vec!["a.png"]);
    }
}
