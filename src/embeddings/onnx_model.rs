// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX Embedding Model Wrapper
//!
//! Runs a sentence-transformer exported to ONNX (all-mpnet-base-v2 by
//! default, any BERT-family export works) through ONNX Runtime.
//!
//! Pipeline per text:
//! - tokenization with the model's own `tokenizer.json` (no padding,
//!   truncation to `max_length`)
//! - one ONNX forward pass producing `[1, seq_len, hidden]` token embeddings
//! - attention-masked mean pooling
//! - optional L2 normalization (on by default, as the sentence-transformers
//!   pipeline of the default model does)
//!
//! The output dimensionality is not configured; it is read from the model by
//! a probe inference at load time.

use anyhow::{anyhow, Context, Result};
use ndarray::{Array2, ArrayView2, Axis, Ix2};
use ort::execution_providers::{CPUExecutionProvider, ExecutionProviderDispatch};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info};

use super::similarity::l2_normalize;
use super::TextEmbedder;

const PROBE_TEXT: &str = "validation test";

/// Load-time knobs for [`OnnxEmbeddingModel`]
#[derive(Debug, Clone, PartialEq)]
pub struct OnnxModelOptions {
    /// Token limit; longer inputs are truncated
    pub max_length: usize,
    /// ONNX Runtime intra-op thread count
    pub intra_threads: usize,
    /// Scale pooled vectors to unit length
    pub normalize: bool,
}

impl Default for OnnxModelOptions {
    fn default() -> Self {
        Self {
            max_length: 384,
            intra_threads: 4,
            normalize: true,
        }
    }
}

/// ONNX-based sentence embedding model
///
/// # Thread Safety
/// ONNX Runtime needs exclusive access to run a session, so runs are
/// serialized behind a mutex. Cloning is cheap (Arc).
#[derive(Clone)]
pub struct OnnxEmbeddingModel {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    model_name: String,
    dimension: usize,
    /// BERT/MiniLM graphs take `token_type_ids`, MPNet graphs don't
    uses_token_type_ids: bool,
    options: OnnxModelOptions,
}

impl std::fmt::Debug for OnnxEmbeddingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEmbeddingModel")
            .field("model_name", &self.model_name)
            .field("dimension", &self.dimension)
            .field("uses_token_type_ids", &self.uses_token_type_ids)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl OnnxEmbeddingModel {
    /// Loads the model and tokenizer from disk and probes the output shape.
    ///
    /// # Errors
    /// Returns error if:
    /// - model or tokenizer file is missing or invalid
    /// - ONNX Runtime initialization fails
    /// - the model does not output `[batch, seq_len, hidden]` token embeddings
    ///
    /// # Example
    /// ```ignore
    /// let model = OnnxEmbeddingModel::new(
    ///     "all-mpnet-base-v2",
    ///     "/models/all-mpnet-base-v2/onnx/model.onnx",
    ///     "/models/all-mpnet-base-v2/tokenizer.json",
    ///     OnnxModelOptions::default(),
    /// )?;
    /// assert_eq!(model.dimension(), 768);
    /// ```
    pub fn new<P: AsRef<Path>>(
        model_name: impl Into<String>,
        model_path: P,
        tokenizer_path: P,
        options: OnnxModelOptions,
    ) -> Result<Self> {
        let model_name = model_name.into();
        let model_path = model_path.as_ref();
        let tokenizer_path = tokenizer_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("ONNX model file not found: {}", model_path.display());
        }
        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }
        if options.max_length == 0 {
            anyhow::bail!("max_length must be greater than 0");
        }

        info!(
            "Loading ONNX embedding model {} from {}",
            model_name,
            model_path.display()
        );
        let mut session = build_session(model_path, options.intra_threads)?;

        let uses_token_type_ids = session
            .inputs
            .iter()
            .any(|input| input.name == "token_type_ids");

        let mut tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: options.max_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;

        // Hidden size comes from the model itself
        let probe = forward_pooled(&mut session, &tokenizer, uses_token_type_ids, PROBE_TEXT)
            .context("Probe inference failed")?;
        let dimension = probe.len();
        if dimension == 0 {
            anyhow::bail!("Model produced an empty embedding during probe inference");
        }

        info!(
            "✅ Embedding model {} loaded ({} dimensions, token_type_ids: {})",
            model_name, dimension, uses_token_type_ids
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            model_name,
            dimension,
            uses_token_type_ids,
            options,
        })
    }

    /// Counts tokens (special tokens included, after truncation)
    pub fn count_tokens(&self, text: &str) -> Result<usize> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| anyhow!("Tokenization failed: {}", e))?;

        Ok(encoding.get_attention_mask().iter().map(|&m| m as usize).sum())
    }

    pub fn options(&self) -> &OnnxModelOptions {
        &self.options
    }
}

impl TextEmbedder for OnnxEmbeddingModel {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut embedding = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| anyhow!("ONNX session lock poisoned"))?;
            forward_pooled(&mut session, &self.tokenizer, self.uses_token_type_ids, text)?
        };

        if embedding.len() != self.dimension {
            anyhow::bail!(
                "Unexpected embedding dimension: {} (expected {})",
                embedding.len(),
                self.dimension
            );
        }

        if self.options.normalize {
            l2_normalize(&mut embedding);
        }

        Ok(embedding)
    }
}

/// Builds the ONNX Runtime session, trying CUDA first when compiled with the
/// `cuda` feature.
fn build_session(model_path: &Path, intra_threads: usize) -> Result<Session> {
    #[cfg(feature = "cuda")]
    {
        use ort::execution_providers::CUDAExecutionProvider;
        use tracing::warn;

        info!("Attempting CUDA execution provider...");
        match commit_session(
            model_path,
            CUDAExecutionProvider::default().build(),
            intra_threads,
        ) {
            Ok(session) => {
                info!("✅ CUDA execution provider initialized");
                return Ok(session);
            }
            Err(e) => {
                warn!("⚠️  CUDA execution provider failed: {}", e);
                warn!("   Falling back to CPU execution provider");
            }
        }
    }

    commit_session(
        model_path,
        CPUExecutionProvider::default().build(),
        intra_threads,
    )
}

fn commit_session(
    model_path: &Path,
    provider: ExecutionProviderDispatch,
    intra_threads: usize,
) -> Result<Session> {
    Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers([provider])
        .context("Failed to set execution provider")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(intra_threads)
        .context("Failed to set intra threads")?
        .commit_from_file(model_path)
        .with_context(|| format!("Failed to load ONNX model from {}", model_path.display()))
}

/// Tokenizes `text`, runs one forward pass and mean-pools the token
/// embeddings. The result is not normalized.
fn forward_pooled(
    session: &mut Session,
    tokenizer: &Tokenizer,
    uses_token_type_ids: bool,
    text: &str,
) -> Result<Vec<f32>> {
    let encoding = tokenizer
        .encode(text, true)
        .map_err(|e| anyhow!("Tokenization failed: {}", e))?;

    let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
    let attention_mask: Vec<i64> = encoding
        .get_attention_mask()
        .iter()
        .map(|&m| m as i64)
        .collect();
    let seq_len = input_ids.len();
    debug!("Tokenized input into {} tokens", seq_len);

    let input_ids_array = Array2::from_shape_vec((1, seq_len), input_ids)
        .context("Failed to create input_ids array")?;
    let attention_mask_array = Array2::from_shape_vec((1, seq_len), attention_mask.clone())
        .context("Failed to create attention_mask array")?;

    let outputs = if uses_token_type_ids {
        let token_type_ids_array = Array2::<i64>::zeros((1, seq_len));
        session.run(ort::inputs![
            "input_ids" => Value::from_array(input_ids_array)?,
            "attention_mask" => Value::from_array(attention_mask_array)?,
            "token_type_ids" => Value::from_array(token_type_ids_array)?
        ])?
    } else {
        session.run(ort::inputs![
            "input_ids" => Value::from_array(input_ids_array)?,
            "attention_mask" => Value::from_array(attention_mask_array)?
        ])?
    };

    // Index [0]: output names differ between exports
    let output = outputs[0]
        .try_extract_array::<f32>()
        .context("Failed to extract output tensor")?;

    if output.ndim() != 3 {
        anyhow::bail!(
            "Model outputs unexpected dimensions: {:?} (expected [batch, seq_len, hidden])",
            output.shape()
        );
    }

    let token_embeddings = output
        .index_axis(Axis(0), 0)
        .into_dimensionality::<Ix2>()
        .context("Failed to view token embeddings as [seq_len, hidden]")?;

    Ok(mean_pool(token_embeddings, &attention_mask))
}

/// Attention-masked mean over the sequence axis of `[seq_len, hidden]`.
fn mean_pool(token_embeddings: ArrayView2<f32>, attention_mask: &[i64]) -> Vec<f32> {
    let mut pooled = vec![0.0f32; token_embeddings.ncols()];
    let mut sum_mask = 0.0f32;

    for (i, row) in token_embeddings.outer_iter().enumerate() {
        let mask_value = attention_mask.get(i).copied().unwrap_or(0) as f32;
        if mask_value == 0.0 {
            continue;
        }
        sum_mask += mask_value;
        for (acc, &value) in pooled.iter_mut().zip(row.iter()) {
            *acc += value * mask_value;
        }
    }

    for value in &mut pooled {
        *value /= sum_mask.max(1e-9);
    }

    pooled
}
