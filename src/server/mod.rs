//! HTTP API server
//!
//! Two endpoints: one turns a build identifier into an updated feed entry,
//! the other reports latest package versions across the configured
//! registries.

pub mod error;
pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::feed::aggregator::FeedAggregator;
use crate::registry::probe::RegistryProbe;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub aggregator: Arc<FeedAggregator>,
    pub probe: Arc<RegistryProbe>,
}

pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = routes::router(state).layer(TraceLayer::new_for_http());

    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
