use crate::source::{applies_to, NameSource};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::PathBuf;

const SAVE_EVERY: usize = 100;

/// Multi-tier stock name lookup: realtime name (if usable) -> in-memory
/// map (pre-seeded from the persisted JSON cache at construction) ->
/// ordered external sources -> placeholder `股票{code}`.
///
/// Built as an explicit, constructible struct rather than the
/// original's process-wide singleton, per the dependency-injection
/// redesign — callers hold one instance and share it via `Arc` instead
/// of reaching for a global.
pub struct StockNameResolver {
    cache_file: PathBuf,
    cache: RwLock<HashMap<String, String>>,
    sources: Vec<Box<dyn NameSource>>,
}

impl StockNameResolver {
    /// Loads the persisted cache from `cache_file` if it exists;
    /// a missing or corrupt file starts from an empty map rather than
    /// failing construction.
    pub fn new(cache_file: PathBuf, sources: Vec<Box<dyn NameSource>>) -> Self {
        let loaded = std::fs::read_to_string(&cache_file)
            .ok()
            .and_then(|body| serde_json::from_str::<HashMap<String, String>>(&body).ok())
            .unwrap_or_default();
        if !loaded.is_empty() {
            tracing::info!(count = loaded.len(), "loaded persisted stock name cache");
        }
        Self { cache_file, cache: RwLock::new(loaded), sources }
    }

    pub async fn get_stock_name(&self, code: &str, realtime_name: Option<&str>) -> String {
        if let Some(name) = realtime_name {
            let trimmed = name.trim();
            if !trimmed.is_empty() && !trimmed.starts_with("股票") {
                self.add_to_cache(code, trimmed);
                return trimmed.to_string();
            }
        }

        if let Some(name) = self.cache.read().get(code).cloned() {
            return name;
        }

        for source in &self.sources {
            if !applies_to(source.as_ref(), code) {
                continue;
            }
            if let Some(name) = source.lookup(code).await {
                self.add_to_cache(code, &name);
                return name;
            }
        }

        tracing::warn!(code, "no name resolved from any source, using placeholder");
        format!("股票{code}")
    }

    fn add_to_cache(&self, code: &str, name: &str) {
        let len = {
            let mut cache = self.cache.write();
            cache.insert(code.to_string(), name.to_string());
            cache.len()
        };
        if len % SAVE_EVERY == 0 {
            self.save_persistent_cache();
        }
    }

    fn save_persistent_cache(&self) {
        let snapshot = self.cache.read().clone();
        if let Some(parent) = self.cache_file.parent() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                tracing::error!("could not create cache dir: {err}");
                return;
            }
        }
        match serde_json::to_string_pretty(&snapshot) {
            Ok(body) => {
                if let Err(err) = std::fs::write(&self.cache_file, body) {
                    tracing::error!("could not write stock name cache: {err}");
                }
            }
            Err(err) => tracing::error!("could not serialize stock name cache: {err}"),
        }
    }

    /// Bulk-seeds the in-memory map from a full directory listing in
    /// one call (e.g. an A-share symbol/name dump), then force-saves.
    pub fn preload(&self, entries: impl IntoIterator<Item = (String, String)>) {
        {
            let mut cache = self.cache.write();
            for (code, name) in entries {
                cache.insert(code, name);
            }
        }
        self.save_persistent_cache();
    }

    pub fn cached_count(&self) -> usize {
        self.cache.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StubSource {
        name: &'static str,
        hk_only: bool,
        response: Option<&'static str>,
    }

    #[async_trait]
    impl NameSource for StubSource {
        fn name(&self) -> &str {
            self.name
        }

        fn hk_only(&self) -> bool {
            self.hk_only
        }

        async fn lookup(&self, _code: &str) -> Option<String> {
            self.response.map(|s| s.to_string())
        }
    }

    #[tokio::test]
    async fn realtime_name_is_preferred_and_cached() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = StockNameResolver::new(dir.path().join("names.json"), vec![]);
        let name = resolver.get_stock_name("600519", Some("贵州茅台")).await;
        assert_eq!(name, "贵州茅台");
        assert_eq!(resolver.cached_count(), 1);
    }

    #[tokio::test]
    async fn placeholder_realtime_name_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = StockNameResolver::new(
            dir.path().join("names.json"),
            vec![Box::new(StubSource { name: "a", hk_only: false, response: Some("真实名称") })],
        );
        let name = resolver.get_stock_name("600519", Some("股票600519")).await;
        assert_eq!(name, "真实名称");
    }

    #[tokio::test]
    async fn falls_back_to_placeholder_when_no_source_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = StockNameResolver::new(dir.path().join("names.json"), vec![]);
        let name = resolver.get_stock_name("600519", None).await;
        assert_eq!(name, "股票600519");
    }

    #[tokio::test]
    async fn hk_only_source_skipped_for_a_share_codes() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = StockNameResolver::new(
            dir.path().join("names.json"),
            vec![Box::new(StubSource { name: "hk-source", hk_only: true, response: Some("不应命中") })],
        );
        let name = resolver.get_stock_name("600519", None).await;
        assert_eq!(name, "股票600519");
    }

    #[tokio::test]
    async fn persists_to_disk_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.json");
        let resolver = StockNameResolver::new(path.clone(), vec![]);
        resolver.preload(vec![("600519".to_string(), "贵州茅台".to_string())]);

        let reloaded = StockNameResolver::new(path, vec![]);
        let name = reloaded.get_stock_name("600519", None).await;
        assert_eq!(name, "贵州茅台");
    }
}
