//! Builds the one [`RuntimeConfig`] the process runs with from a config
//! file, environment variables and CLI flags, in that order of increasing
//! precedence — the layering the `config` crate calls "sources", applied
//! via `dotenvy` for `.env` loading and `clap` for the final CLI override
//! (§1's Ambient Stack, §6's "the adapter layer builds this view once").
//!
//! This intentionally does not mirror the reference gateway's
//! `serde_yaml`-plus-hand-rolled-env-var loader: that crate isn't part of
//! this project's dependency set, and the `config` crate already gives
//! file/env/CLI layering for free.

use super::runtime::RuntimeConfig;
use crate::core::errors::{GatewayError, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(name = "reasoning-gateway", about = "Reasoning orchestration service")]
pub struct Cli {
    /// Path to a config file (TOML/YAML/JSON, detected by extension).
    #[arg(long, env = "GATEWAY_CONFIG", default_value = "config/default.toml")]
    pub config_path: PathBuf,

    /// Overrides `bind_address` from the config file.
    #[arg(long, env = "GATEWAY_BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// Overrides `log_level` from the config file.
    #[arg(long, env = "GATEWAY_LOG_LEVEL")]
    pub log_level: Option<String>,
}

/// Loads `.env` (if present), parses CLI flags, layers `config_path` under
/// environment variables prefixed `GATEWAY__` (double-underscore nested
/// separator, e.g. `GATEWAY__RATE_LIMIT_DEFAULTS__QPS`) and finally applies
/// any CLI overrides, then deserializes the result into a [`RuntimeConfig`].
pub fn load() -> Result<RuntimeConfig> {
    match dotenvy::dotenv() {
        Ok(path) => debug!(?path, "loaded .env file"),
        Err(e) if e.not_found() => debug!("no .env file found, continuing with process environment"),
        Err(e) => return Err(GatewayError::Config(format!("failed to parse .env file: {e}"))),
    }

    let cli = Cli::parse();
    load_from(&cli)
}

/// Testable entry point taking an already-parsed [`Cli`], so tests can
/// exercise the layering without touching `std::env::args`.
pub fn load_from(cli: &Cli) -> Result<RuntimeConfig> {
    let mut builder = config::Config::builder();

    if cli.config_path.exists() {
        info!(path = %cli.config_path.display(), "loading config file");
        builder = builder.add_source(config::File::from(cli.config_path.as_path()));
    } else {
        debug!(path = %cli.config_path.display(), "config file not found, relying on environment and defaults");
    }

    builder = builder.add_source(
        config::Environment::with_prefix("GATEWAY")
            .separator("__")
            .try_parsing(true),
    );

    let built = builder
        .build()
        .map_err(|e| GatewayError::Config(format!("failed to build configuration: {e}")))?;

    let mut runtime: RuntimeConfig = built
        .try_deserialize()
        .map_err(|e| GatewayError::Config(format!("failed to parse configuration: {e}")))?;

    if let Some(bind_address) = &cli.bind_address {
        runtime.bind_address = bind_address.clone();
    }
    if let Some(log_level) = &cli.log_level {
        runtime.log_level = log_level.clone();
    }

    Ok(runtime)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    const MINIMAL: &str = r#"
bind_address = "127.0.0.1:8080"
log_level = "info"
log_format = "pretty"

[providers.openai]
kind = "openai"
api_key = "test-key"

[models.fast]
provider = "openai"
backend_model = "gpt-5-mini"
"#;

    #[test]
    fn loads_a_minimal_config_file() {
        let file = write_config(MINIMAL);
        let cli = Cli {
            config_path: file.path().to_path_buf(),
            bind_address: None,
            log_level: None,
        };
        let runtime = load_from(&cli).unwrap();
        assert_eq!(runtime.bind_address, "127.0.0.1:8080");
        assert!(runtime.resolve_model("fast").is_some());
        assert_eq!(runtime.resolve_model("fast").unwrap().backend_model, "gpt-5-mini");
    }

    #[test]
    fn cli_flag_overrides_file_bind_address() {
        let file = write_config(MINIMAL);
        let cli = Cli {
            config_path: file.path().to_path_buf(),
            bind_address: Some("0.0.0.0:9000".to_string()),
            log_level: None,
        };
        let runtime = load_from(&cli).unwrap();
        assert_eq!(runtime.bind_address, "0.0.0.0:9000");
    }

    #[test]
    fn missing_model_route_resolves_to_none() {
        let file = write_config(MINIMAL);
        let cli = Cli {
            config_path: file.path().to_path_buf(),
            bind_address: None,
            log_level: None,
        };
        let runtime = load_from(&cli).unwrap();
        assert!(runtime.resolve_model("does-not-exist").is_none());
    }
}
