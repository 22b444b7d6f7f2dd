//! Global rate limiter: per-key token-bucket + fixed-window admission
//! (§4.6).

mod limiter;
mod types;


pub use limiter::RateLimiter;
pub use types::{KeyConfig, RateLimitStrategy};

/// Default bucket key template, per §6: `"{provider}:{model}"`, optionally
/// extended with a tenant/custom dimension supplied by the caller.
pub fn bucket_key(provider: &str, model: &str, extra: Option<&str>) -> String {
    match extra {
        Some(extra) => format!("{provider}:{model}:{extra}"),
        None => format!("{provider}:{model}"),
    }
}
