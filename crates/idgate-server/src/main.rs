//! Identity gate server — application entry point.

mod routes;

use std::sync::Arc;

use idgate_auth::{AppSettings, IdentityService};
use idgate_store::{MemoryIdentityStore, StoreConfig};
use tracing_subscriber::EnvFilter;

const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:5001";

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("idgate=info"));
    tracing_subscriber::fmt().with_env_filter(filter).json().init();

    tracing::info!("Starting identity gate server...");

    let settings = match AppSettings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let store = MemoryIdentityStore::new(StoreConfig::default());
    let service = match IdentityService::new(store, settings) {
        Ok(service) => Arc::new(service),
        Err(e) => {
            tracing::error!(error = %e, "failed to build identity service");
            std::process::exit(1);
        }
    };

    let addr = std::env::var("IDGATE_LISTEN_ADDR").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.into());
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(%addr, error = %e, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(%addr, "listening");
    if let Err(e) = axum::serve(listener, routes::router(service)).await {
        tracing::error!(error = %e, "server error");
    }

    tracing::info!("Identity gate server stopped.");
}
