//! The durable key-value map backing response-id persistence.
//!
//! Entries are namespaced under `response_id:` to avoid collision with any
//! other cached value a future extension might store through the same
//! backend. The default backend is an in-process `moka` TTL cache; an
//! optional `redis`-backed store is available behind the `redis-cache`
//! feature for multi-process sharing of the response-id map (the rate
//! limiter itself stays single-process-authoritative regardless, per §1).

use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;

const NAMESPACE: &str = "response_id:";

#[async_trait]
pub trait ResponseIdStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, response_id: String);
    async fn remove(&self, key: &str);
}

fn namespaced(key: &str) -> String {
    format!("{NAMESPACE}{key}")
}

/// In-process TTL cache, the default backend.
pub struct MokaResponseIdStore {
    cache: Cache<String, String>,
}

impl MokaResponseIdStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder().time_to_live(ttl).build(),
        }
    }
}

impl Default for MokaResponseIdStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(24 * 60 * 60))
    }
}

#[async_trait]
impl ResponseIdStore for MokaResponseIdStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.cache.get(&namespaced(key)).await
    }

    async fn set(&self, key: &str, response_id: String) {
        self.cache.insert(namespaced(key), response_id).await;
    }

    async fn remove(&self, key: &str) {
        self.cache.invalidate(&namespaced(key)).await;
    }
}

#[cfg(feature = "redis-cache")]
pub mod redis_store {
    use super::{namespaced, ResponseIdStore};
    use async_trait::async_trait;
    use redis::AsyncCommands;
    use std::time::Duration;

    /// Multi-process response-id store backed by Redis. Follows the
    /// reference gateway's optional-`redis`-feature convention: the
    /// default build never links `redis` at all.
    pub struct RedisResponseIdStore {
        manager: redis::aio::ConnectionManager,
        ttl: Duration,
    }

    impl RedisResponseIdStore {
        pub async fn connect(url: &str, ttl: Duration) -> redis::RedisResult<Self> {
            let client = redis::Client::open(url)?;
            let manager = client.get_connection_manager().await?;
            Ok(Self { manager, ttl })
        }
    }

    #[async_trait]
    impl ResponseIdStore for RedisResponseIdStore {
        async fn get(&self, key: &str) -> Option<String> {
            let mut conn = self.manager.clone();
            conn.get(namespaced(key)).await.ok()
        }

        async fn set(&self, key: &str, response_id: String) {
            let mut conn = self.manager.clone();
            let _: Result<(), _> = conn
                .set_ex(namespaced(key), response_id, self.ttl.as_secs())
                .await;
        }

        async fn remove(&self, key: &str) {
            let mut conn = self.manager.clone();
            let _: Result<(), _> = conn.del(namespaced(key)).await;
        }
    }
}
