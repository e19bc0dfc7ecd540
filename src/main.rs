//! bidhall server entry point.

use std::sync::Arc;

use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use bidhall::adapters::auth::InMemoryIdentity;
use bidhall::adapters::catalog::InMemoryProductCatalog;
use bidhall::adapters::ledger::InMemoryBidLedger;
use bidhall::adapters::websocket::{websocket_router, AuctionLobby, WebSocketState};
use bidhall::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level)),
        )
        .init();

    tracing::info!(environment = ?config.server.environment, "starting bidhall");

    let ledger = Arc::new(InMemoryBidLedger::new());
    let catalog = Arc::new(InMemoryProductCatalog::new());
    let identity = Arc::new(InMemoryIdentity::new());

    let lobby = Arc::new(AuctionLobby::new(ledger, config.websocket.clone()));
    let state = WebSocketState::new(lobby, catalog, identity);

    let app = websocket_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app).await?;
    Ok(())
}
