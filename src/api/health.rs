// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

use crate::api::http_server::AppState;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub model: Option<String>,
    pub dimensions: Option<usize>,
}

/// GET /health: 200 with model info when a model is installed, 503 otherwise
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    match &state.embedder {
        Some(embedder) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                model: Some(embedder.model_name().to_string()),
                dimensions: Some(embedder.dimension()),
            }),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "unavailable".to_string(),
                model: None,
                dimensions: None,
            }),
        ),
    }
}
