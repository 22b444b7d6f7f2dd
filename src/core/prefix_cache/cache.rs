//! The per-request prefix-cache handle. Holds no state of its own beyond an
//! `enabled` flag and a clone of the process-wide store `Arc`; this is the
//! "per-request object only reads/writes through [the store]" lifecycle
//! rule from §3.

use super::key::{compute_key, KeyInput, PrefixCacheKey};
use super::store::ResponseIdStore;
use crate::core::errors::Result;
use std::sync::Arc;

#[derive(Clone)]
pub struct PrefixCache {
    store: Arc<dyn ResponseIdStore>,
    enabled: bool,
}

impl PrefixCache {
    pub fn new(store: Arc<dyn ResponseIdStore>) -> Self {
        Self { store, enabled: true }
    }

    pub fn disabled() -> Self {
        Self { store: Arc::new(super::store::MokaResponseIdStore::default()), enabled: false }
    }

    pub fn compute_key(&self, input: &KeyInput) -> Result<PrefixCacheKey> {
        compute_key(input)
    }

    /// `get`/`set` are no-ops when the cache is disabled, per §4.5.
    pub async fn get(&self, key: &PrefixCacheKey) -> Option<String> {
        if !self.enabled {
            return None;
        }
        self.store.get(key).await
    }

    pub async fn set(&self, key: &PrefixCacheKey, response_id: String) {
        if !self.enabled {
            return;
        }
        self.store.set(key, response_id).await;
    }

    /// Eviction-on-bad-id policy (§4.5, §9 open question 5): called when a
    /// non-retriable provider error comes back from a call that carried a
    /// `previous_response_id` sourced from this cache, so the next call
    /// with the same prefix starts fresh instead of repeating a doomed id.
    pub async fn evict(&self, key: &PrefixCacheKey) {
        if !self.enabled {
            return;
        }
        self.store.remove(key).await;
    }
}
