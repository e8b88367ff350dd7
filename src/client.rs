// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! HTTP client for the embedding service
//!
//! Used by services that need vectors for their own records (product search,
//! semantic lookups). Validates the response shape instead of trusting it.

use reqwest::StatusCode;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::api::Embedding;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Text must be provided to generate an embedding")]
    EmptyText,

    #[error("Failed to reach embedding service at {url}: {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Embedding service responded with HTTP {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Embedding service returned an invalid response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    http: reqwest::Client,
    base_url: String,
}

impl EmbeddingClient {
    /// Client with the default 10 second timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ClientError::Unreachable {
                url: base_url.clone(),
                source,
            })?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST /embed for one text
    pub async fn embed(&self, text: &str) -> Result<Embedding, ClientError> {
        if text.trim().is_empty() {
            return Err(ClientError::EmptyText);
        }

        let response = self
            .http
            .post(format!("{}/embed", self.base_url))
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|source| ClientError::Unreachable {
                url: self.base_url.clone(),
                source,
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<Value>(&body)
                .ok()
                .and_then(|payload| payload.get("error")?.as_str().map(str::to_string))
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown error").to_string());
            return Err(ClientError::Status { status, message });
        }

        let payload: Value = serde_json::from_slice(&body)
            .map_err(|_| ClientError::InvalidResponse("body is not JSON".to_string()))?;

        parse_embedding(&payload)
    }
}

/// Extracts `embedding.vectors` / `embedding.dimensions`; `dimensions` falls
/// back to the vector length when absent.
pub fn parse_embedding(payload: &Value) -> Result<Embedding, ClientError> {
    let embedding = payload
        .get("embedding")
        .and_then(Value::as_object)
        .ok_or_else(|| ClientError::InvalidResponse("missing 'embedding' object".to_string()))?;

    let vectors = embedding
        .get("vectors")
        .and_then(Value::as_array)
        .ok_or_else(|| ClientError::InvalidResponse("missing 'vectors' array".to_string()))?
        .iter()
        .map(|value| value.as_f64().map(|v| v as f32))
        .collect::<Option<Vec<f32>>>()
        .ok_or_else(|| ClientError::InvalidResponse("non-numeric value in 'vectors'".to_string()))?;

    let dimensions = embedding
        .get("dimensions")
        .and_then(Value::as_u64)
        .map(|d| d as usize)
        .unwrap_or(vectors.len());

    Ok(Embedding {
        vectors,
        dimensions,
    })
}
