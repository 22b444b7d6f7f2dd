//! Benchmarks for the two pieces of the hot path that run on every engine
//! call regardless of which provider answers: prefix-cache key computation
//! (hashing + JSON normalization over the request history) and rate-limiter
//! admission (lock + bucket/window arithmetic).

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use reasoning_gateway::core::prefix_cache::{compute_key, KeyInput};
use reasoning_gateway::core::rate_limiter::{KeyConfig, RateLimitStrategy, RateLimiter};
use serde_json::json;
use std::sync::Arc;

fn history_of(turns: usize) -> serde_json::Value {
    let messages: Vec<_> = (0..turns)
        .map(|i| json!({"role": if i % 2 == 0 { "user" } else { "assistant" }, "content": format!("turn {i}")}))
        .collect();
    json!(messages)
}

fn bench_compute_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("prefix_cache_compute_key");
    for turns in [1usize, 10, 50] {
        let history = history_of(turns);
        let params = json!({"temperature": 0.2, "top_p": 0.9});
        group.bench_with_input(BenchmarkId::from_parameter(turns), &turns, |b, _| {
            b.iter(|| {
                let input = KeyInput {
                    provider: "openai",
                    model: "gpt-5",
                    system: "You are a careful reasoning assistant.",
                    knowledge: Some("the problem domain is competition mathematics"),
                    history: &history,
                    params: &params,
                };
                black_box(compute_key(&input).unwrap());
            });
        });
    }
    group.finish();
}

fn bench_compute_key_with_image_url(c: &mut Criterion) {
    let data_url = format!("data:image/png;base64,{}", "A".repeat(20_000));
    let history = json!([{"role": "user", "content": [{"type": "image_url", "image_url": {"url": data_url}}]}]);
    let params = json!({});
    c.bench_function("prefix_cache_compute_key_large_image", |b| {
        b.iter(|| {
            let input = KeyInput {
                provider: "openai",
                model: "gpt-5",
                system: "system",
                knowledge: None,
                history: &history,
                params: &params,
            };
            black_box(compute_key(&input).unwrap());
        });
    });
}

fn bench_rate_limiter_acquire_uncontended(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let limiter = Arc::new(RateLimiter::new());
    limiter.configure(
        "bench:uncontended",
        KeyConfig { qps: Some(1_000_000.0), burst: Some(1_000_000.0), window_limit: None, window_seconds: None },
    );

    c.bench_function("rate_limiter_acquire_uncontended", |b| {
        b.iter(|| {
            rt.block_on(async {
                limiter
                    .acquire("bench:uncontended", 1.0, RateLimitStrategy::Wait, None)
                    .await
                    .unwrap();
            })
        });
    });
}

fn bench_rate_limiter_configure_is_idempotent(c: &mut Criterion) {
    let limiter = RateLimiter::new();
    c.bench_function("rate_limiter_configure_repeated_key", |b| {
        b.iter(|| {
            limiter.configure(
                "bench:repeated",
                KeyConfig { qps: Some(5.0), burst: Some(5.0), window_limit: None, window_seconds: None },
            );
        });
    });
}

criterion_group!(
    benches,
    bench_compute_key,
    bench_compute_key_with_image_url,
    bench_rate_limiter_acquire_uncontended,
    bench_rate_limiter_configure_is_idempotent,
);
criterion_main!(benches);
