//! Process entry point: loads configuration, wires up the provider registry
//! and shared infrastructure, and runs the HTTP server.

use reasoning_gateway::config;
use reasoning_gateway::server;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let runtime_config = match config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&runtime_config);
    info!(bind_address = %runtime_config.bind_address, "configuration loaded");

    match server::run(runtime_config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("server error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(runtime_config: &config::RuntimeConfig) {
    let filter = EnvFilter::try_new(&runtime_config.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    match runtime_config.log_format {
        config::LogFormat::Json => subscriber.json().init(),
        config::LogFormat::Pretty => subscriber.init(),
    }
}
