//! Prefix-cache anchor: deterministic prompt fingerprinting plus
//! provider-response-id persistence for provider-side context reuse (§4.5).

mod cache;
mod key;
mod store;

pub use cache::PrefixCache;
pub use key::{compute_key, normalize_for_cache_key, KeyInput, PrefixCacheKey};
pub use store::{MokaResponseIdStore, ResponseIdStore};

#[cfg(feature = "redis-cache")]
pub use store::redis_store::RedisResponseIdStore;
