// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Shared test helpers: deterministic embedders and request builders
#![allow(dead_code)]

use anyhow::Result;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use mockall::mock;
use sentence_embedder::embeddings::TextEmbedder;
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tower::ServiceExt; // for `oneshot`

pub const TEST_DIMENSIONS: usize = 32;

/// Bag-of-words hashing embedder: deterministic, unit length, and texts
/// sharing words land close together.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    pub dimension: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self {
            dimension: TEST_DIMENSIONS,
        }
    }
}

impl TextEmbedder for HashEmbedder {
    fn model_name(&self) -> &str {
        "hash-embedder"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];
        for word in text.split_whitespace() {
            let mut hasher = DefaultHasher::new();
            word.to_lowercase().hash(&mut hasher);
            let bucket = (hasher.finish() % self.dimension as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        Ok(vector)
    }
}

/// Always fails with an error whose text must never reach a client
#[derive(Debug, Clone, Default)]
pub struct FailingEmbedder;

pub const SECRET_FAILURE: &str = "onnxruntime: CUDA out of memory at /opt/secret/model.onnx";

impl TextEmbedder for FailingEmbedder {
    fn model_name(&self) -> &str {
        "failing-embedder"
    }

    fn dimension(&self) -> usize {
        TEST_DIMENSIONS
    }

    fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        anyhow::bail!(SECRET_FAILURE)
    }
}

mock! {
    pub Embedder {}

    impl TextEmbedder for Embedder {
        fn model_name(&self) -> &str;
        fn dimension(&self) -> usize;
        fn embed(&self, text: &str) -> Result<Vec<f32>>;
    }
}

pub fn post_json(body: &Value) -> Request<Body> {
    post_raw(&body.to_string(), Some("application/json"))
}

pub fn post_raw(body: &str, content_type: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("POST").uri("/embed");
    if let Some(content_type) = content_type {
        builder = builder.header("content-type", content_type);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Runs one request through the router; a body that is not JSON comes back
/// as `Value::Null`.
pub async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

pub fn vectors_of(body: &Value) -> Vec<f64> {
    body["embedding"]["vectors"]
        .as_array()
        .expect("vectors array")
        .iter()
        .map(|v| v.as_f64().expect("float"))
        .collect()
}
