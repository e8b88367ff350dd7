// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use sentence_embedder::{
    api::{start_server, AppState},
    config::ServiceConfig,
    embeddings::{resolve_model_files, OnnxEmbeddingModel, TextEmbedder},
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ServiceConfig::parse();

    // No degraded mode: a model that fails to load stops the process
    if let Err(e) = run(config).await {
        error!("❌ {:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: ServiceConfig) -> Result<()> {
    info!("🚀 Starting sentence-embedder v{}", env!("CARGO_PKG_VERSION"));

    let source = config.model_source();
    let files = resolve_model_files(&source)
        .await
        .context("Error loading embedding model")?;

    let model_name = source.model_name();
    let options = config.model_options();
    let model = tokio::task::spawn_blocking(move || {
        OnnxEmbeddingModel::new(model_name, files.model_path, files.tokenizer_path, options)
    })
    .await
    .context("Model loading task failed")?
    .context("Error loading embedding model")?;

    info!(
        "✅ Model {} ready ({} dimensions)",
        model.model_name(),
        model.dimension()
    );
    info!("  Embed:  POST http://{}/embed", config.bind_addr());
    info!("  Health: GET  http://{}/health", config.bind_addr());

    let state = AppState::new(Arc::new(model));
    start_server(config.bind_addr(), state).await
}
