use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Default, Clone, Copy)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub sets: u64,
    pub deletes: u64,
    pub memory_entries: usize,
    pub file_bytes: u64,
}

struct MemEntry {
    timestamp: SystemTime,
    ttl: Duration,
    blob: Vec<u8>,
}

#[derive(serde::Serialize, serde::Deserialize)]
struct FileEntry {
    timestamp: f64,
    ttl_secs: f64,
    value: serde_json::Value,
}

/// Two-tier (memory + on-disk) TTL cache with size-bounded eviction,
/// grounded on `utils/cache_manager.py::CacheManager`. Reads check
/// memory, then disk, then miss; writes always update both tiers.
/// Filenames are MD5 hashes of the key, matching the original's
/// `<cache_dir>/<md5(key)>.cache` layout exactly (spec.md §6). The
/// caller's closure (if any) is never invoked under the internal lock.
pub struct CacheManager {
    cache_dir: PathBuf,
    default_ttl: Duration,
    max_bytes: u64,
    memory: Mutex<HashMap<String, MemEntry>>,
    stats: Mutex<CacheStats>,
}

impl CacheManager {
    pub fn new(cache_dir: impl AsRef<Path>, default_ttl: Duration, max_bytes: u64) -> std::io::Result<Self> {
        let cache_dir = cache_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&cache_dir)?;
        Ok(Self {
            cache_dir,
            default_ttl,
            max_bytes,
            memory: Mutex::new(HashMap::new()),
            stats: Mutex::new(CacheStats::default()),
        })
    }

    fn file_for(&self, key: &str) -> PathBuf {
        let digest = md5::compute(key.as_bytes());
        self.cache_dir.join(format!("{digest:x}.cache"))
    }

    pub fn get<T: DeserializeOwned>(&self, key: &str, ttl: Option<Duration>) -> Option<T> {
        let ttl = ttl.unwrap_or(self.default_ttl);

        {
            let mut memory = self.memory.lock().unwrap();
            if let Some(entry) = memory.get(key) {
                if entry.timestamp.elapsed().unwrap_or(Duration::MAX) <= ttl {
                    self.stats.lock().unwrap().hits += 1;
                    return serde_json::from_slice(&entry.blob).ok();
                }
                memory.remove(key);
            }
        }

        let path = self.file_for(key);
        if let Ok(bytes) = std::fs::read(&path) {
            if let Ok(file_entry) = serde_json::from_slice::<FileEntry>(&bytes) {
                let age = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or_default()
                    .as_secs_f64()
                    - file_entry.timestamp;
                if age <= ttl.as_secs_f64() {
                    let blob = serde_json::to_vec(&file_entry.value).unwrap_or_default();
                    self.memory.lock().unwrap().insert(
                        key.to_string(),
                        MemEntry {
                            timestamp: UNIX_EPOCH + Duration::from_secs_f64(file_entry.timestamp),
                            ttl,
                            blob: blob.clone(),
                        },
                    );
                    self.stats.lock().unwrap().hits += 1;
                    return serde_json::from_slice(&blob).ok();
                }
                let _ = std::fs::remove_file(&path);
                self.stats.lock().unwrap().deletes += 1;
            }
        }

        self.stats.lock().unwrap().misses += 1;
        None
    }

    pub fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let Ok(blob) = serde_json::to_vec(value) else {
            return;
        };
        let now = SystemTime::now();

        self.memory.lock().unwrap().insert(
            key.to_string(),
            MemEntry {
                timestamp: now,
                ttl,
                blob: blob.clone(),
            },
        );

        let file_entry = FileEntry {
            timestamp: now.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs_f64(),
            ttl_secs: ttl.as_secs_f64(),
            value: serde_json::from_slice(&blob).unwrap_or(serde_json::Value::Null),
        };
        if let Ok(bytes) = serde_json::to_vec(&file_entry) {
            if std::fs::write(self.file_for(key), bytes).is_ok() {
                self.stats.lock().unwrap().sets += 1;
            }
        }

        self.cleanup_if_needed();
    }

    pub fn delete(&self, key: &str) {
        self.memory.lock().unwrap().remove(key);
        if std::fs::remove_file(self.file_for(key)).is_ok() {
            self.stats.lock().unwrap().deletes += 1;
        }
    }

    /// Deletes oldest-mtime files first once the directory exceeds
    /// `max_bytes`, until usage drops to 80% of the cap.
    fn cleanup_if_needed(&self) {
        let Ok(entries) = std::fs::read_dir(&self.cache_dir) else {
            return;
        };
        let mut files: Vec<(PathBuf, u64, SystemTime)> = entries
            .filter_map(|e| e.ok())
            .filter_map(|e| {
                let meta = e.metadata().ok()?;
                Some((e.path(), meta.len(), meta.modified().ok()?))
            })
            .collect();

        let mut total: u64 = files.iter().map(|(_, size, _)| size).sum();
        if total <= self.max_bytes {
            return;
        }

        files.sort_by_key(|(_, _, mtime)| *mtime);
        let target = (self.max_bytes as f64 * 0.8) as u64;
        for (path, size, _) in files {
            if total <= target {
                break;
            }
            if std::fs::remove_file(&path).is_ok() {
                total = total.saturating_sub(size);
                self.stats.lock().unwrap().deletes += 1;
            }
        }
    }

    pub fn stats(&self) -> CacheStats {
        let mut stats = *self.stats.lock().unwrap();
        stats.memory_entries = self.memory.lock().unwrap().len();
        stats.file_bytes = std::fs::read_dir(&self.cache_dir)
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter_map(|e| e.metadata().ok())
                    .map(|m| m.len())
                    .sum()
            })
            .unwrap_or(0);
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_within_ttl_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path(), Duration::from_secs(60), 1024 * 1024).unwrap();
        cache.set("stock_names", &"贵州茅台".to_string(), None);
        let value: Option<String> = cache.get("stock_names", None);
        assert_eq!(value.as_deref(), Some("贵州茅台"));
    }

    #[test]
    fn expired_entry_is_evicted_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path(), Duration::from_secs(60), 1024 * 1024).unwrap();
        cache.set("k", &42i32, Some(Duration::from_millis(1)));
        std::thread::sleep(Duration::from_millis(10));
        let value: Option<i32> = cache.get("k", Some(Duration::from_millis(1)));
        assert_eq!(value, None);
        assert!(!cache.file_for("k").exists());
    }

    #[test]
    fn miss_returns_none_without_panicking() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path(), Duration::from_secs(60), 1024 * 1024).unwrap();
        let value: Option<i32> = cache.get("missing", None);
        assert_eq!(value, None);
    }
}
