// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MSG_NOT_JSON: &str = "Request must be JSON";
pub const MSG_MALFORMED_JSON: &str = "Request body is not valid JSON";
pub const MSG_MISSING_TEXT: &str = "Missing 'text' key in JSON payload";
pub const MSG_TEXT_NOT_STRING: &str = "'text' value must be a string";
pub const MSG_MODEL_NOT_LOADED: &str = "Model is not loaded";
pub const MSG_EMBEDDING_FAILED: &str = "An error occurred during embedding";

/// Body of every error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub error: String,
}

/// Client-facing failures. The message is what the caller sees, so it must
/// never carry internal detail.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    ServiceUnavailable(String),
    #[error("{0}")]
    InternalError(String),
    /// Body could not be read; keeps the status axum chose
    #[error("{1}")]
    Rejected(StatusCode, String),
}

impl ApiError {
    pub fn not_json() -> Self {
        ApiError::BadRequest(MSG_NOT_JSON.to_string())
    }

    pub fn malformed_json() -> Self {
        ApiError::BadRequest(MSG_MALFORMED_JSON.to_string())
    }

    pub fn missing_text() -> Self {
        ApiError::BadRequest(MSG_MISSING_TEXT.to_string())
    }

    pub fn text_not_string() -> Self {
        ApiError::BadRequest(MSG_TEXT_NOT_STRING.to_string())
    }

    pub fn model_not_loaded() -> Self {
        ApiError::ServiceUnavailable(MSG_MODEL_NOT_LOADED.to_string())
    }

    pub fn embedding_failed() -> Self {
        ApiError::InternalError(MSG_EMBEDDING_FAILED.to_string())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Rejected(status, _) => *status,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_response())).into_response()
    }
}
