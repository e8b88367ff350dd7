// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Service configuration
//!
//! Every setting can come from a flag, an `EMBEDDER_*` environment variable or
//! a `.env` file. With nothing set the service listens on `0.0.0.0:1337` and
//! serves `sentence-transformers/all-mpnet-base-v2` from the Hub.

use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::embeddings::{ModelSource, OnnxModelOptions};

pub const DEFAULT_PORT: u16 = 1337;
pub const DEFAULT_MODEL_ID: &str = "sentence-transformers/all-mpnet-base-v2";
pub const DEFAULT_ONNX_FILE: &str = "onnx/model.onnx";

/// Sentence embedding HTTP service
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "sentence-embedder")]
#[command(version)]
#[command(about = "Serves sentence embeddings over HTTP (POST /embed)", long_about = None)]
pub struct ServiceConfig {
    /// Address to bind
    #[arg(long, env = "EMBEDDER_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "EMBEDDER_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Hugging Face Hub repository of the model
    #[arg(long, env = "EMBEDDER_MODEL_ID", default_value = DEFAULT_MODEL_ID)]
    pub model_id: String,

    /// Local snapshot directory; skips the Hub download when set
    #[arg(long, env = "EMBEDDER_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// ONNX graph path inside the repository or directory
    #[arg(long, env = "EMBEDDER_ONNX_FILE", default_value = DEFAULT_ONNX_FILE)]
    pub onnx_file: String,

    /// hf-hub cache directory (defaults to the hf-hub default)
    #[arg(long, env = "EMBEDDER_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Maximum tokens per input; longer text is truncated
    #[arg(long, env = "EMBEDDER_MAX_LENGTH", default_value_t = 384)]
    pub max_length: usize,

    /// ONNX Runtime intra-op threads
    #[arg(long, env = "EMBEDDER_INTRA_THREADS", default_value_t = 4)]
    pub intra_threads: usize,

    /// Return raw mean-pooled vectors instead of unit-length ones
    #[arg(long, env = "EMBEDDER_NO_NORMALIZE")]
    pub no_normalize: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            model_id: DEFAULT_MODEL_ID.to_string(),
            model_dir: None,
            onnx_file: DEFAULT_ONNX_FILE.to_string(),
            cache_dir: None,
            max_length: 384,
            intra_threads: 4,
            no_normalize: false,
        }
    }
}

impl ServiceConfig {
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn model_source(&self) -> ModelSource {
        match &self.model_dir {
            Some(dir) => ModelSource::LocalDir {
                dir: dir.clone(),
                onnx_file: self.onnx_file.clone(),
            },
            None => ModelSource::Hub {
                repo_id: self.model_id.clone(),
                onnx_file: self.onnx_file.clone(),
                cache_dir: self.cache_dir.clone(),
            },
        }
    }

    pub fn model_options(&self) -> OnnxModelOptions {
        OnnxModelOptions {
            max_length: self.max_length,
            intra_threads: self.intra_threads,
            normalize: !self.no_normalize,
        }
    }
}
