//! Process-local cache mirror.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use super::CacheMirror;

/// In-process mirror keyed by `"namespace:key"`.
#[derive(Debug, Clone, Default)]
pub struct LocalCacheMirror {
    entries: Arc<DashMap<String, Vec<u8>>>,
}

impl LocalCacheMirror {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of mirrored entries across all namespaces.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn entry_key(namespace: &str, key: &str) -> String {
        format!("{namespace}:{key}")
    }
}

#[async_trait]
impl CacheMirror for LocalCacheMirror {
    async fn put(&self, namespace: &str, key: &str, value: &[u8]) {
        tracing::debug!(namespace, key, "cache put");
        self.entries
            .insert(Self::entry_key(namespace, key), value.to_vec());
    }

    async fn get(&self, namespace: &str, key: &str) -> Option<Vec<u8>> {
        let found = self
            .entries
            .get(&Self::entry_key(namespace, key))
            .map(|entry| entry.value().clone());

        if found.is_some() {
            tracing::debug!(namespace, key, "cache hit");
            crate::metrics::record_cache_hit(self.mode());
        } else {
            tracing::debug!(namespace, key, "cache miss");
            crate::metrics::record_cache_miss(self.mode());
        }
        found
    }

    async fn evict(&self, namespace: &str, key: &str) {
        tracing::debug!(namespace, key, "cache evict");
        self.entries.remove(&Self::entry_key(namespace, key));
    }

    fn mode(&self) -> &'static str {
        "local"
    }
}
