//! Bookfair reservation backend.
//!
//! Thin HTTP adapter over the `bookfair-core-rs` engine. All invariants
//! live in the engine; this binary wires configuration, the sandbox
//! gateway, logging and the route table.

mod config;
mod error;
mod handlers;
mod routes;
mod state;

use bookfair_core_rs::passes::{LoggingNotifier, PlainTextRenderer};
use bookfair_core_rs::{Engine, EngineConfig, ProviderRegistry, SandboxProvider};
use config::ServerConfig;
use state::AppState;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env();

    let mut providers = ProviderRegistry::new();
    providers.register(Arc::new(SandboxProvider::new(config.gateway_mode)));

    let engine = Arc::new(Engine::new(
        EngineConfig::default(),
        providers,
        Arc::new(PlainTextRenderer),
        Arc::new(LoggingNotifier),
    ));

    let app = routes::router(AppState::new(engine));

    tracing::info!(bind = %config.bind_addr, gateway = ?config.gateway_mode, "starting bookfair server");

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {e}", config.bind_addr));

    axum::serve(listener, app)
        .await
        .expect("server terminated unexpectedly");
}
