//! dmatrix server - asynchronous distance-matrix computation service.

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dmatrix_server::config::Config;
use dmatrix_server::state::AppState;
use dmatrix_server::{api, loops};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("dmatrix_server=debug".parse()?),
        )
        .init();

    tracing::info!("Starting dmatrix server...");

    let config = Config::from_env();
    let port = config.server_port;
    let sweep_interval = config.expiry_sweep_interval;
    let state = Arc::new(AppState::new(config));

    // Start background maintenance
    tokio::spawn(loops::expiry_loop::run_expiry_loop(
        Arc::clone(state.store()),
        sweep_interval,
    ));

    // Build the app
    let app = api::routes()
        .with_state(state)
        .layer(CorsLayer::permissive());

    // Run server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
