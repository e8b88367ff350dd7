// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod client;
pub mod config;
pub mod embeddings;

pub use api::{create_app, AppState, ApiError, EmbedResponse, Embedding};
pub use client::{ClientError, EmbeddingClient};
pub use config::ServiceConfig;
pub use embeddings::{OnnxEmbeddingModel, TextEmbedder};
