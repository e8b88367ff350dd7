// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Model file resolution
//!
//! A model is an ONNX graph plus its `tokenizer.json`. They come either from a
//! local directory laid out like a Hugging Face snapshot, or straight from the
//! Hub (downloaded once into the hf-hub cache).

use anyhow::{Context, Result};
use hf_hub::api::tokio::ApiBuilder;
use std::path::{Path, PathBuf};
use tracing::info;

pub const TOKENIZER_FILE: &str = "tokenizer.json";

/// Where to find the model files
#[derive(Debug, Clone, PartialEq)]
pub enum ModelSource {
    /// Snapshot directory containing `<onnx_file>` and `tokenizer.json`
    LocalDir { dir: PathBuf, onnx_file: String },
    /// Hugging Face Hub repository (e.g. "sentence-transformers/all-mpnet-base-v2")
    Hub {
        repo_id: String,
        onnx_file: String,
        cache_dir: Option<PathBuf>,
    },
}

impl ModelSource {
    /// Short model name used in logs and `/health`: the last path segment of
    /// the repo id or the directory name.
    pub fn model_name(&self) -> String {
        match self {
            ModelSource::LocalDir { dir, .. } => dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| dir.display().to_string()),
            ModelSource::Hub { repo_id, .. } => repo_id
                .rsplit('/')
                .next()
                .unwrap_or(repo_id.as_str())
                .to_string(),
        }
    }
}

/// Resolved on-disk paths
#[derive(Debug, Clone, PartialEq)]
pub struct ModelFiles {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
}

/// Resolves (and downloads if needed) the files for `source`.
pub async fn resolve_model_files(source: &ModelSource) -> Result<ModelFiles> {
    match source {
        ModelSource::LocalDir { dir, onnx_file } => local_files(dir, onnx_file),
        ModelSource::Hub {
            repo_id,
            onnx_file,
            cache_dir,
        } => {
            let mut builder = ApiBuilder::new().with_progress(false);
            if let Some(cache_dir) = cache_dir {
                builder = builder.with_cache_dir(cache_dir.clone());
            }
            let api = builder.build().context("Failed to initialize Hugging Face Hub client")?;
            let repo = api.model(repo_id.clone());

            info!("Fetching {} from Hugging Face Hub: {}", onnx_file, repo_id);
            let model_path = repo
                .get(onnx_file)
                .await
                .with_context(|| format!("Failed to fetch {} from {}", onnx_file, repo_id))?;

            info!("Fetching {} from Hugging Face Hub: {}", TOKENIZER_FILE, repo_id);
            let tokenizer_path = repo
                .get(TOKENIZER_FILE)
                .await
                .with_context(|| format!("Failed to fetch {} from {}", TOKENIZER_FILE, repo_id))?;

            Ok(ModelFiles {
                model_path,
                tokenizer_path,
            })
        }
    }
}

fn local_files(dir: &Path, onnx_file: &str) -> Result<ModelFiles> {
    if !dir.is_dir() {
        anyhow::bail!("Model directory not found: {}", dir.display());
    }

    let files = ModelFiles {
        model_path: dir.join(onnx_file),
        tokenizer_path: dir.join(TOKENIZER_FILE),
    };

    if !files.model_path.is_file() {
        anyhow::bail!("ONNX model file not found: {}", files.model_path.display());
    }
    if !files.tokenizer_path.is_file() {
        anyhow::bail!(
            "Tokenizer file not found: {}",
            files.tokenizer_path.display()
        );
    }

    Ok(files)
}
