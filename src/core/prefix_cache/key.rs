//! Deterministic fingerprinting of a prompt prefix (§4.5).

use crate::core::errors::{GatewayError, Result};
use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// The tuple a prefix-cache key is derived over. `params` is typically the
/// caller's `llm_params` plus sampling knobs; any JSON-serializable value
/// works.
#[derive(Debug, Serialize)]
pub struct KeyInput<'a> {
    pub provider: &'a str,
    pub model: &'a str,
    pub system: &'a str,
    pub knowledge: Option<&'a str>,
    pub history: &'a Value,
    pub params: &'a Value,
}

/// A 256-bit digest over the normalized, key-sorted key input, rendered as
/// a lowercase hex string.
pub type PrefixCacheKey = String;

/// Recursively normalizes a JSON value for cache-key purposes:
/// - scalars pass through unchanged;
/// - objects/arrays recurse;
/// - an object entry keyed `"image_url"` or `"url"` whose value (or nested
///   `.url`) starts with `"data:image"` is replaced by a fixed-length
///   `image_hash:` sentinel, bounding key size for large base64 blobs while
///   keeping the key deterministic over the image bytes;
/// - anything else is stringified.
///
/// Idempotent: normalizing an already-normalized tree is a no-op, since the
/// sentinel string itself doesn't match any of the recursion rules above.
pub fn normalize_for_cache_key(value: &Value) -> Value {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) => value.clone(),
        Value::String(s) => Value::String(s.clone()),
        Value::Array(items) => {
            Value::Array(items.iter().map(normalize_for_cache_key).collect())
        }
        Value::Object(map) => {
            let mut out = serde_json::Map::new();
            for (key, val) in map {
                let is_image_field = key == "image_url" || key == "url";
                let image_data_url = extract_data_image_url(val);
                if is_image_field && image_data_url.is_some() {
                    out.insert(key.clone(), image_hash_sentinel(image_data_url.unwrap()));
                } else {
                    out.insert(key.clone(), normalize_for_cache_key(val));
                }
            }
            Value::Object(out)
        }
    }
}

/// Finds the actual `data:image` URL string behind a value that may be the
/// string itself or an object with a nested `.url`.
fn extract_data_image_url(value: &Value) -> Option<&str> {
    let as_str = match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(map) => map.get("url").and_then(|u| u.as_str()),
        _ => None,
    };
    as_str.filter(|s| s.starts_with("data:image"))
}

fn image_hash_sentinel(url: &str) -> Value {
    let digest = Sha256::digest(url.as_bytes());
    let hex = hex::encode(digest);
    Value::String(format!("image_hash:{}", &hex[..16]))
}

/// Computes the prefix-cache key: SHA-256 over the JSON-serialized,
/// key-sorted, normalized key input.
///
/// `serde_json::Map` is a `BTreeMap` in this crate's configuration (the
/// `preserve_order` feature is never enabled), so serialization is
/// sorted-by-key for free; this function only has to guarantee the
/// normalization pass above runs before serialization.
pub fn compute_key(input: &KeyInput) -> Result<PrefixCacheKey> {
    let history = normalize_for_cache_key(input.history);
    let params = normalize_for_cache_key(input.params);
    let normalized = serde_json::json!({
        "provider": input.provider,
        "model": input.model,
        "system": input.system,
        "knowledge": input.knowledge,
        "history": history,
        "params": params,
    });
    let bytes = serde_json::to_vec(&normalized).map_err(GatewayError::Serialization)?;
    let digest = Sha256::digest(&bytes);
    Ok(hex::encode(digest))
}
