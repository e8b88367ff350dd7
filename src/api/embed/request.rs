// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbedRequest type for POST /embed
//!
//! Validation is done by hand rather than through `Json<T>` so that each
//! failure maps to its own client message, checked in this order:
//! 1. content type is JSON
//! 2. body parses as JSON
//! 3. `text` key is present
//! 4. `text` is a string

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, HeaderMap},
};
use serde_json::Value;

use crate::api::ApiError;

/// Validated body of POST /embed
///
/// # Example
/// ```json
/// { "text": "This is a test sentence." }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EmbedRequest {
    pub text: String,
}

impl EmbedRequest {
    /// Validates a decoded JSON payload. Values other than objects have no
    /// keys, so they report a missing `text`. Extra keys are ignored.
    pub fn from_json_value(payload: &Value) -> Result<Self, ApiError> {
        let text = payload
            .as_object()
            .and_then(|object| object.get("text"))
            .ok_or_else(ApiError::missing_text)?;

        match text {
            Value::String(text) => Ok(Self { text: text.clone() }),
            _ => Err(ApiError::text_not_string()),
        }
    }

    /// Parses and validates a raw JSON body
    pub fn from_slice(body: &[u8]) -> Result<Self, ApiError> {
        let payload: Value = serde_json::from_slice(body).map_err(|_| ApiError::malformed_json())?;
        Self::from_json_value(&payload)
    }
}

/// `application/json` or any `application/*+json`, parameters ignored
pub fn is_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };

    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match mime.split_once('/') {
        Some(("application", "json")) => true,
        Some(("application", subtype)) => subtype.ends_with("+json"),
        _ => false,
    }
}

#[async_trait]
impl<S> FromRequest<S> for EmbedRequest
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_json_content_type(req.headers()) {
            return Err(ApiError::not_json());
        }

        let body = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::Rejected(rejection.status(), rejection.body_text()))?;

        Self::from_slice(&body)
    }
}
