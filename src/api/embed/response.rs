// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbedResponse and Embedding types

use serde::{Deserialize, Serialize};

/// One embedding vector and its length
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Embedding {
    pub vectors: Vec<f32>,
    pub dimensions: usize,
}

impl Embedding {
    pub fn new(vectors: Vec<f32>) -> Self {
        let dimensions = vectors.len();
        Self {
            vectors,
            dimensions,
        }
    }
}

/// Success body of POST /embed
///
/// # Example
/// ```json
/// { "embedding": { "vectors": [0.01, -0.12, ...], "dimensions": 768 } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmbedResponse {
    pub embedding: Embedding,
}

impl From<Vec<f32>> for EmbedResponse {
    fn from(vectors: Vec<f32>) -> Self {
        Self {
            embedding: Embedding::new(vectors),
        }
    }
}
