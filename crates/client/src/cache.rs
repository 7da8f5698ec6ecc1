//! Disk-backed, age-bounded memoization of idempotent remote reads.
//!
//! Responsibilities:
//! - Key a cached value by a caller-supplied fingerprint digest.
//! - Serve a stored value while it is younger than the caller's maxage.
//! - Persist recomputed values atomically (write temp file, rename).
//!
//! Does NOT handle:
//! - Deciding what belongs in the fingerprint; that is the caller's
//!   responsibility (include everything that affects the result, exclude
//!   noise that would fragment the cache).
//! - Deduplicating in-flight computation across racing processes; duplicate
//!   recomputation is acceptable, the last atomic rename wins.
//!
//! Invariants:
//! - A missing, unreadable, or corrupt cache file is a miss, never an error.
//! - A failed computation caches nothing.
//! - Readers never observe a partially written entry.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

use crate::error::Result;

/// A deterministic digest of exactly the inputs that affect a cached
/// computation's result.
#[derive(Debug, Clone)]
pub struct Fingerprint {
    hasher: Sha256,
}

impl Fingerprint {
    pub fn new(namespace: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(namespace.as_bytes());
        hasher.update([0]);
        Self { hasher }
    }

    /// Mix in one labeled part. Labels keep adjacent parts from colliding
    /// when values shift position.
    pub fn part(mut self, label: &str, value: &str) -> Self {
        self.hasher.update(label.as_bytes());
        self.hasher.update([0x1f]);
        self.hasher.update(value.as_bytes());
        self.hasher.update([0]);
        self
    }

    fn hex(&self) -> String {
        let digest = self.hasher.clone().finalize();
        digest.iter().map(|b| format!("{b:02x}")).collect()
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct Entry<T> {
    created_at: i64,
    value: T,
}

/// Purpose-built single-key, single-value, TTL-bound memoization of remote
/// reads, persisted as one JSON file per fingerprint.
#[derive(Debug, Clone)]
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The platform cache directory for a given subsystem, if resolvable.
    pub fn user_cache_dir(subdir: &str) -> Option<Self> {
        directories::ProjectDirs::from("", "", qcloud_config::constants::APP_DIR_NAME)
            .map(|dirs| Self::new(dirs.cache_dir().join(subdir)))
    }

    /// Return the cached value for `fingerprint` if one exists and is no
    /// older than `maxage`; otherwise run `compute`, persist its result, and
    /// return it. `force_refresh` skips the lookup entirely.
    pub async fn memoize<T, F, Fut>(
        &self,
        fingerprint: &Fingerprint,
        maxage: Duration,
        force_refresh: bool,
        compute: F,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let key = fingerprint.hex();
        let path = self.dir.join(format!("{key}.json"));

        if !force_refresh
            && let Some(value) = self.read_fresh(&path, maxage)
        {
            tracing::debug!(key, "cache hit");
            return Ok(value);
        }

        let value = compute().await?;
        self.store(&key, &value);
        Ok(value)
    }

    /// Read an entry, absorbing every failure as a miss.
    fn read_fresh<T: DeserializeOwned>(&self, path: &std::path::Path, maxage: Duration) -> Option<T> {
        let bytes = std::fs::read(path).ok()?;
        let entry: Entry<T> = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "corrupt cache entry, treating as miss");
                return None;
            }
        };
        let age = chrono::Utc::now().timestamp().saturating_sub(entry.created_at);
        if age < 0 || age as u64 > maxage.as_secs() {
            tracing::debug!(path = %path.display(), age, "cache entry expired");
            return None;
        }
        Some(entry.value)
    }

    /// Persist a freshly computed value. Write failures are absorbed (the
    /// value is still returned to the caller); partial writes are impossible
    /// because the temp file is renamed into place.
    fn store<T: Serialize>(&self, key: &str, value: &T) {
        let entry = Entry {
            created_at: chrono::Utc::now().timestamp(),
            value,
        };
        let result = (|| -> std::io::Result<()> {
            std::fs::create_dir_all(&self.dir)?;
            let tmp = self.dir.join(format!("{key}.{}.tmp", std::process::id()));
            let bytes = serde_json::to_vec(&entry)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            std::fs::write(&tmp, bytes)?;
            std::fs::rename(&tmp, self.dir.join(format!("{key}.json")))
        })();
        if let Err(e) = result {
            tracing::warn!(key, error = %e, "failed to persist cache entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache() -> (tempfile::TempDir, DiskCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = DiskCache::new(dir.path());
        (dir, cache)
    }

    fn fp(name: &str) -> Fingerprint {
        Fingerprint::new("test").part("name", name)
    }

    #[tokio::test]
    async fn second_call_is_served_from_disk() {
        let (_dir, cache) = cache();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value: u32 = cache
                .memoize(&fp("a"), Duration::from_secs(60), false, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .await
                .unwrap();
            assert_eq!(value, 42);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn force_refresh_recomputes_and_replaces() {
        let (_dir, cache) = cache();

        let first: u32 = cache
            .memoize(&fp("a"), Duration::from_secs(60), false, || async { Ok(1) })
            .await
            .unwrap();
        assert_eq!(first, 1);

        let second: u32 = cache
            .memoize(&fp("a"), Duration::from_secs(60), true, || async { Ok(2) })
            .await
            .unwrap();
        assert_eq!(second, 2);

        // The replacement is what later reads see, not an accumulation.
        let third: u32 = cache
            .memoize(&fp("a"), Duration::from_secs(60), false, || async {
                Err(ClientError::NotFound("should not recompute".to_string()))
            })
            .await
            .unwrap();
        assert_eq!(third, 2);
    }

    #[tokio::test]
    async fn entry_older_than_maxage_recomputes_and_repairs() {
        let (dir, cache) = cache();
        let maxage = Duration::from_secs(3600);

        let first: u32 = cache
            .memoize(&fp("a"), maxage, false, || async { Ok(1) })
            .await
            .unwrap();
        assert_eq!(first, 1);

        // Age the stored entry two hours into the past.
        let path = dir.path().join(format!("{}.json", fp("a").hex()));
        let mut entry: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        entry["created_at"] = serde_json::json!(chrono::Utc::now().timestamp() - 7200);
        std::fs::write(&path, serde_json::to_vec(&entry).unwrap()).unwrap();

        let second: u32 = cache
            .memoize(&fp("a"), maxage, false, || async { Ok(2) })
            .await
            .unwrap();
        assert_eq!(second, 2);

        // The recompute rewrote the entry with a fresh timestamp, so the
        // next call is a hit again.
        let third: u32 = cache
            .memoize(&fp("a"), maxage, false, || async {
                Err(ClientError::NotFound("should be served from cache".to_string()))
            })
            .await
            .unwrap();
        assert_eq!(third, 2);
    }

    #[tokio::test]
    async fn corrupt_entry_is_a_miss_and_gets_repaired() {
        let (dir, cache) = cache();
        let key_path = {
            // Seed a valid entry, then corrupt it in place.
            let _: u32 = cache
                .memoize(&fp("a"), Duration::from_secs(60), false, || async { Ok(1) })
                .await
                .unwrap();
            let entry = std::fs::read_dir(dir.path())
                .unwrap()
                .next()
                .unwrap()
                .unwrap()
                .path();
            std::fs::write(&entry, b"{ not json").unwrap();
            entry
        };

        let value: u32 = cache
            .memoize(&fp("a"), Duration::from_secs(60), false, || async { Ok(9) })
            .await
            .unwrap();
        assert_eq!(value, 9);

        // Repaired on the successful recompute.
        let bytes = std::fs::read(key_path).unwrap();
        assert!(serde_json::from_slice::<serde_json::Value>(&bytes).is_ok());
    }

    #[tokio::test]
    async fn compute_failure_propagates_and_caches_nothing() {
        let (dir, cache) = cache();

        let result: Result<u32> = cache
            .memoize(&fp("a"), Duration::from_secs(60), false, || async {
                Err(ClientError::NotFound("nope".to_string()))
            })
            .await;
        assert!(result.is_err());
        assert!(std::fs::read_dir(dir.path()).map(|mut d| d.next().is_none()).unwrap_or(true));
    }

    #[test]
    fn distinct_fingerprints_produce_distinct_keys() {
        assert_ne!(fp("a").hex(), fp("b").hex());
        // Label boundaries matter: ("ab","c") != ("a","bc").
        let left = Fingerprint::new("t").part("ab", "c");
        let right = Fingerprint::new("t").part("a", "bc");
        assert_ne!(left.hex(), right.hex());
    }
}
