//! Process-wide provider registry.
//!
//! Per §3's lifecycle rules, provider instances are created lazily per
//! `providerName` and then shared across every subsequent request. The
//! registry is an explicitly-injected handle everywhere testable (§9
//! re-architecture note: "shared mutable global" becomes a constructor
//! argument); only the process entry point (`main.rs`) builds the one
//! instance that lives for the process's lifetime.

use super::traits::Provider;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

/// Holds every provider instance the process has constructed so far, keyed
/// by provider name. Construction of a given provider happens at most once;
/// after that, `get` hands back the shared `Arc`.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Mutex<HashMap<String, Arc<dyn Provider>>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self { providers: Mutex::new(HashMap::new()) }
    }

    /// Eagerly registers a fully-constructed provider, overwriting any
    /// earlier registration under the same name. Used at process startup
    /// once adapters have been built from `RuntimeConfig` credentials.
    pub fn register(&self, provider: Arc<dyn Provider>) {
        let mut providers = self.providers.lock();
        providers.insert(provider.name().to_string(), provider);
    }

    /// Looks up an already-registered provider by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Provider>> {
        self.providers.lock().get(name).cloned()
    }

    /// Lazily initializes a provider the first time it's needed, using
    /// `init` to construct it. The lock is held only across the
    /// HashMap lookup/insert, never across `init` itself in the already-
    /// present case, and `init` runs fallibly before anything is stored so a
    /// failed construction never poisons the slot for the next caller.
    pub fn get_or_try_init<F>(&self, name: &str, init: F) -> anyhow::Result<Arc<dyn Provider>>
    where
        F: FnOnce() -> anyhow::Result<Arc<dyn Provider>>,
    {
        if let Some(existing) = self.get(name) {
            return Ok(existing);
        }
        let provider = init()?;
        let mut providers = self.providers.lock();
        Ok(providers.entry(name.to_string()).or_insert(provider).clone())
    }

    pub fn names(&self) -> Vec<String> {
        self.providers.lock().keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::providers::capabilities::ProviderCapabilities;
    use crate::core::providers::error::ProviderError;
    use crate::core::types::{Message, ProviderCallResult, StreamChunk};
    use async_trait::async_trait;
    use futures::stream::BoxStream;

    struct StubProvider(&'static str);

    #[async_trait]
    impl Provider for StubProvider {
        fn name(&self) -> &str {
            self.0
        }
        fn capabilities(&self) -> ProviderCapabilities {
            ProviderCapabilities::NONE
        }
        async fn chat(
            &self,
            _model: &str,
            _messages: &[Message],
            _params: super::super::traits::ChatParams,
        ) -> Result<ProviderCallResult, ProviderError> {
            unimplemented!()
        }
        async fn chat_stream(
            &self,
            _model: &str,
            _messages: &[Message],
            _params: super::super::traits::ChatParams,
        ) -> Result<BoxStream<'static, Result<StreamChunk, ProviderError>>, ProviderError>
        {
            unimplemented!()
        }
    }

    #[test]
    fn register_then_get_returns_same_instance() {
        let registry = ProviderRegistry::new();
        registry.register(Arc::new(StubProvider("stub")));
        assert!(registry.get("stub").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn get_or_try_init_only_constructs_once() {
        let registry = ProviderRegistry::new();
        let calls = Arc::new(Mutex::new(0));
        for _ in 0..3 {
            let calls = calls.clone();
            registry
                .get_or_try_init("stub", move || {
                    *calls.lock() += 1;
                    Ok(Arc::new(StubProvider("stub")) as Arc<dyn Provider>)
                })
                .unwrap();
        }
        assert_eq!(*calls.lock(), 1);
    }
}
