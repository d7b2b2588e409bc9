//! betledger API Server Binary
//!
//! Standalone HTTP API for the wallet ledger and bet-settlement engine.

use betledger::api::server::{ApiConfig, ApiServer};
use betledger::{Engine, EngineConfig};
use clap::Parser;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "betledger")]
#[command(about = "Wallet ledger & bet-settlement engine", long_about = None)]
struct Args {
    /// API server host
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// API server port
    #[arg(long, default_value = "8080")]
    port: u16,

    /// Engine configuration file (TOML); defaults apply when omitted
    #[arg(long)]
    config: Option<String>,

    /// Allowed CORS origins (comma-separated, use * for all)
    #[arg(long, default_value = "*")]
    cors_origins: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout: u64,

    /// Operator key required on /admin routes (falls back to the
    /// BETLEDGER_ADMIN_KEY variable; unset leaves admin routes open)
    #[arg(long)]
    admin_key: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let engine_config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let engine = Arc::new(Engine::new(engine_config)?);

    let allowed_origins: Vec<String> = args
        .cors_origins
        .split(',')
        .map(|s| s.trim().to_string())
        .collect();

    let admin_key = args
        .admin_key
        .or_else(|| std::env::var("BETLEDGER_ADMIN_KEY").ok());

    let api_config = ApiConfig {
        host: args.host,
        port: args.port,
        allowed_origins,
        request_timeout_secs: args.timeout,
        admin_key,
        ..Default::default()
    };

    ApiServer::new(api_config, engine).run().await
}
