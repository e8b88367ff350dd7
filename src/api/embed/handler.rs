// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embed HTTP handler

use axum::{
    extract::{FromRequest, Request, State},
    Json,
};
use tracing::{debug, error, warn};

use crate::api::embed::{EmbedRequest, EmbedResponse};
use crate::api::http_server::AppState;
use crate::api::ApiError;

/// POST /embed handler
///
/// # Request Body
/// ```json
/// { "text": "This is a test sentence." }
/// ```
///
/// # Response Body
/// ```json
/// { "embedding": { "vectors": [0.1, 0.2, ...], "dimensions": 768 } }
/// ```
///
/// # Errors
/// - 503 Service Unavailable: no model installed (checked first)
/// - 400 Bad Request: not JSON, missing `text`, `text` not a string
/// - 500 Internal Server Error: inference failed (cause is logged only)
pub async fn embed_handler(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<EmbedResponse>, ApiError> {
    let embedder = state.embedder.clone().ok_or_else(|| {
        warn!("Embed request rejected: model is not loaded");
        ApiError::model_not_loaded()
    })?;

    let EmbedRequest { text } = EmbedRequest::from_request(request, &state)
        .await
        .inspect_err(|e| warn!("Embed request rejected: {}", e))?;

    debug!("Embedding text ({} bytes)", text.len());

    let dimensions = embedder.dimension();
    let vectors = tokio::task::spawn_blocking(move || embedder.embed(&text))
        .await
        .map_err(|e| {
            error!("Embedding task failed to complete: {}", e);
            ApiError::embedding_failed()
        })?
        .map_err(|e| {
            error!("Error during encoding: {:#}", e);
            ApiError::embedding_failed()
        })?;

    if vectors.len() != dimensions {
        error!(
            "Model returned {} values, expected {}",
            vectors.len(),
            dimensions
        );
        return Err(ApiError::embedding_failed());
    }

    Ok(Json(EmbedResponse::from(vectors)))
}
