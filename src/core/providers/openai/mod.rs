//! OpenAI-style reference adapter.
//!
//! Exercises the `supports_responses = true` path end to end: structured
//! verifier output and provider-side prefix caching both go through
//! `POST /v1/responses` with `previous_response_id`. `chat`/`chat_stream`
//! target the plain `POST /v1/chat/completions` surface for stages that
//! don't need either feature.

mod client;
mod transform;

pub use client::{OpenAiConfig, OpenAiProvider};
