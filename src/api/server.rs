//! API Server
//!
//! Server setup with the standard middleware stack and graceful shutdown.

use super::{
    handlers::AppState,
    middleware::{create_cors_layer, request_id_middleware},
    routes::create_router,
};
use crate::engine::Engine;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub request_timeout_secs: u64,
    pub version: String,
    /// Operator key for admin routes; unset leaves them open (dev mode)
    pub admin_key: Option<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            allowed_origins: vec!["*".to_string()],
            request_timeout_secs: 30,
            version: env!("CARGO_PKG_VERSION").to_string(),
            admin_key: None,
        }
    }
}

/// HTTP binding for the ledger engine
pub struct ApiServer {
    config: ApiConfig,
    engine: Arc<Engine>,
}

impl ApiServer {
    pub fn new(config: ApiConfig, engine: Arc<Engine>) -> Self {
        Self { config, engine }
    }

    /// Start the API server
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "betledger=info,tower_http=info".into()),
            )
            .init();

        let app = self.create_app();
        let addr = self.get_socket_addr()?;

        info!("Starting betledger API server");
        info!("   Listen: http://{}", addr);
        self.log_server_info();

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("API server running");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("API server stopped gracefully");
        Ok(())
    }

    /// Create the application with the middleware stack
    fn create_app(&self) -> axum::Router {
        let state = Arc::new(AppState {
            engine: self.engine.clone(),
            admin_key: self.config.admin_key.clone(),
        });

        create_router(state)
            // Request ID middleware (first for tracing)
            .layer(axum::middleware::from_fn(request_id_middleware))
            // CORS layer (before timeout to handle preflight)
            .layer(create_cors_layer(self.config.allowed_origins.clone()))
            // Timeout layer
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.config.request_timeout_secs,
            )))
            // Tracing layer (last for complete request tracing)
            .layer(TraceLayer::new_for_http())
    }

    /// Get socket address from config
    fn get_socket_addr(&self) -> Result<SocketAddr, Box<dyn std::error::Error>> {
        Ok(SocketAddr::from((
            self.config.host.parse::<std::net::IpAddr>()?,
            self.config.port,
        )))
    }

    /// Log server information
    fn log_server_info(&self) {
        info!("Server configuration:");
        info!("   Version: {}", self.config.version);
        info!("   CORS: {:?}", self.config.allowed_origins);
        info!("   Request timeout: {}s", self.config.request_timeout_secs);
        info!(
            "   Admin routes: {}",
            if self.config.admin_key.is_some() {
                "key-gated"
            } else {
                "open (no admin key configured)"
            }
        );

        info!("Available endpoints:");
        info!("   GET  /health                  - Health check");
        info!("   POST /register                - Register user");
        info!("   GET  /balance                 - Wallet pools");
        info!("   POST /place-bet               - Place a bet");
        info!("   GET  /my-bets                 - Bet history");
        info!("   POST /withdraw                - Submit withdrawal");
        info!("   POST /deposit-requests        - Submit deposit claim");
        info!("   GET  /transactions            - Audit history");
        info!("   GET  /user/referrals          - Referral earnings");
        info!("   POST /admin/declare-result    - Declare winning number");
        info!("   GET  /admin/deposit-requests  - Pending deposits");
        info!("   POST /admin/deposit-action    - Act on deposit");
        info!("   GET  /admin/withdraw-requests - Pending withdrawals");
        info!("   POST /admin/withdraw-action   - Act on withdrawal");
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
