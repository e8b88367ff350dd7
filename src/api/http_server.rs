// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::{future::Future, net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::{embed_handler, health::health_handler};
use crate::embeddings::TextEmbedder;

/// Shared handler state. The model handle is created once at startup and
/// only read afterwards.
#[derive(Clone, Default)]
pub struct AppState {
    pub embedder: Option<Arc<dyn TextEmbedder>>,
}

impl AppState {
    pub fn new(embedder: Arc<dyn TextEmbedder>) -> Self {
        Self {
            embedder: Some(embedder),
        }
    }

    /// State with no model installed; /embed answers 503
    pub fn without_model() -> Self {
        Self::default()
    }
}

/// Builds the router. Methods other than POST on /embed get 405 from the
/// method router. Request bodies are not size-capped; the tokenizer
/// truncates long text.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/embed", post(embed_handler))
        .route("/health", get(health_handler))
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves on an already bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_app(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Binds `addr` and serves until Ctrl-C
pub async fn start_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("API server listening on {}", listener.local_addr()?);

    serve(listener, state, shutdown_signal()).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
