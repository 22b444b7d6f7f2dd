//! The reasoning orchestration core.
//!
//! Layering mirrors the reference gateway: [`types`] and [`errors`] are the
//! shared vocabulary, [`providers`] is the uniform backend contract,
//! [`prefix_cache`], [`rate_limiter`] and [`token_meter`] are the
//! cross-cutting infrastructure the engines depend on, and [`verifier`] plus
//! [`engines`] are the orchestration logic itself.

pub mod engines;
pub mod errors;
pub mod prefix_cache;
pub mod providers;
pub mod rate_limiter;
pub mod token_meter;
pub mod types;
pub mod verifier;

pub use errors::{GatewayError, Result};
