//! Redis-backed cache mirror: one hash per namespace, one field per record.

use async_trait::async_trait;
use deadpool_redis::Pool;
use redis::AsyncCommands;

use super::CacheMirror;

#[derive(Clone)]
pub struct RedisCacheMirror {
    pool: Pool,
}

impl RedisCacheMirror {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CacheMirror for RedisCacheMirror {
    async fn put(&self, namespace: &str, key: &str, value: &[u8]) {
        match self.pool.get().await {
            Ok(mut conn) => {
                match conn.hset::<_, _, _, ()>(namespace, key, value).await {
                    Ok(()) => tracing::debug!(namespace, key, "cache put"),
                    Err(e) => tracing::warn!(namespace, key, error = %e, "Redis HSET error"),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to get Redis connection for HSET");
            }
        }
    }

    async fn get(&self, namespace: &str, key: &str) -> Option<Vec<u8>> {
        let found = match self.pool.get().await {
            Ok(mut conn) => match conn.hget::<_, _, Option<Vec<u8>>>(namespace, key).await {
                Ok(found) => found,
                Err(e) => {
                    tracing::warn!(namespace, key, error = %e, "Redis HGET error");
                    None
                }
            },
            Err(e) => {
                tracing::warn!(error = %e, "Failed to get Redis connection for HGET");
                None
            }
        };

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
        match self.pool.get().await {
            Ok(mut conn) => match conn.hdel::<_, _, ()>(namespace, key).await {
                Ok(()) => tracing::debug!(namespace, key, "cache evict"),
                Err(e) => tracing::warn!(namespace, key, error = %e, "Redis HDEL error"),
            },
            Err(e) => {
                tracing::warn!(error = %e, "Failed to get Redis connection for HDEL");
            }
        }
    }

    fn mode(&self) -> &'static str {
        "redis"
    }
}
