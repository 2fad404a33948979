//! Cache mirror: a best-effort copy of recently written records.
//!
//! Entries are addressed by `(namespace, key)` where the namespace is the
//! resource's table name and the key is the record's primary key. Nothing
//! expires; entries change only when a resource service puts or evicts them,
//! so the mirror can drift from the record store. Failures are logged and
//! swallowed, never surfaced to the caller.
//!
//! ## Modes
//!
//! - **Local**: one `DashMap` per process
//! - **Redis**: one Redis hash per namespace (`HSET region EU <json>`)

mod local;
mod redis;

pub use self::local::LocalCacheMirror;
pub use self::redis::RedisCacheMirror;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::RedisConfig;

#[async_trait]
pub trait CacheMirror: Send + Sync {
    /// Stores `value` under `(namespace, key)`, replacing any previous entry.
    async fn put(&self, namespace: &str, key: &str, value: &[u8]);

    /// Returns the stored entry, if any.
    async fn get(&self, namespace: &str, key: &str) -> Option<Vec<u8>>;

    /// Removes the entry. Missing entries are not an error.
    async fn evict(&self, namespace: &str, key: &str);

    /// `"local"` or `"redis"`, for logs and metric labels.
    fn mode(&self) -> &'static str;
}

pub type DynCache = Arc<dyn CacheMirror>;

/// Create a cache mirror based on configuration.
///
/// - **Redis disabled**: returns the local mirror
/// - **Redis enabled**: connects to Redis, falls back to local on failure
pub async fn create_cache_mirror(config: &RedisConfig) -> DynCache {
    if !config.enabled {
        tracing::info!("Redis disabled, using local cache mirror");
        return Arc::new(LocalCacheMirror::new());
    }

    tracing::info!(url = %config.url, "Connecting to Redis");

    let mut redis_config = deadpool_redis::Config::from_url(&config.url);
    let timeout = Duration::from_millis(config.timeout_ms);
    let mut pool_config = deadpool_redis::PoolConfig::new(config.pool_size);
    pool_config.timeouts.wait = Some(timeout);
    pool_config.timeouts.create = Some(timeout);
    pool_config.timeouts.recycle = Some(timeout);
    redis_config.pool = Some(pool_config);

    let pool = match redis_config.create_pool(Some(deadpool_redis::Runtime::Tokio1)) {
        Ok(pool) => pool,
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Failed to create Redis pool. Falling back to local cache mirror."
            );
            return Arc::new(LocalCacheMirror::new());
        }
    };

    match pool.get().await {
        Ok(_) => {
            tracing::info!("Connected to Redis");
            Arc::new(RedisCacheMirror::new(pool))
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Failed to connect to Redis. Falling back to local cache mirror."
            );
            Arc::new(LocalCacheMirror::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_redis_uses_local_mirror() {
        let cache = create_cache_mirror(&RedisConfig::default()).await;
        assert_eq!(cache.mode(), "local");
    }

    #[tokio::test]
    async fn unreachable_redis_falls_back_to_local() {
        let config = RedisConfig {
            enabled: true,
            url: "redis://127.0.0.1:1".into(),
            timeout_ms: 200,
            ..Default::default()
        };
        let cache = create_cache_mirror(&config).await;
        assert_eq!(cache.mode(), "local");
    }
}
