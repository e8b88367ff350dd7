// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Sentence embedding backends
//!
//! The HTTP layer only talks to [`TextEmbedder`]; the production backend is
//! [`OnnxEmbeddingModel`], loaded once at startup from files resolved by
//! [`loader::resolve_model_files`].

pub mod loader;
pub mod onnx_model;
pub mod similarity;

pub use loader::{resolve_model_files, ModelFiles, ModelSource};
pub use onnx_model::{OnnxEmbeddingModel, OnnxModelOptions};
pub use similarity::{cosine_distance, cosine_similarity};

use anyhow::Result;

/// A loaded model that turns text into a fixed-length vector.
///
/// Implementations must be deterministic for identical input and must always
/// return exactly [`dimension`](TextEmbedder::dimension) values. `embed` is
/// blocking; async callers should run it on the blocking pool.
pub trait TextEmbedder: Send + Sync {
    /// Name the model was loaded under (e.g. "all-mpnet-base-v2")
    fn model_name(&self) -> &str;

    /// Output dimensionality, fixed for the lifetime of the model
    fn dimension(&self) -> usize;

    /// Embeds a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
