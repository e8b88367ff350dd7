// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX model tests against the real sentence-transformers model
//!
//! Needs the model files: either network access to the Hugging Face Hub or
//! `EMBEDDER_MODEL_DIR` pointing at a local snapshot. Run with
//! `cargo test --test embeddings_tests -- --ignored`.

use axum::http::StatusCode;
use clap::Parser;
use sentence_embedder::{
    api::{create_app, AppState},
    config::ServiceConfig,
    embeddings::{cosine_distance, resolve_model_files, OnnxEmbeddingModel, TextEmbedder},
};
use serde_json::json;
use std::sync::Arc;

use crate::common::{post_json, send, vectors_of};

const MPNET_DIMENSIONS: usize = 768;

/// Loads the model the binary would load with the current environment
async fn load_model() -> OnnxEmbeddingModel {
    let config = ServiceConfig::try_parse_from(["sentence-embedder"]).unwrap();
    let source = config.model_source();
    let files = resolve_model_files(&source)
        .await
        .expect("Failed to resolve model files");

    OnnxEmbeddingModel::new(
        source.model_name(),
        files.model_path,
        files.tokenizer_path,
        config.model_options(),
    )
    .expect("Failed to load model")
}

fn norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

#[tokio::test]
#[ignore]
async fn test_model_loads_with_probed_dimension() {
    let model = load_model().await;

    assert_eq!(model.model_name(), "all-mpnet-base-v2");
    assert_eq!(model.dimension(), MPNET_DIMENSIONS);
}

#[tokio::test]
#[ignore]
async fn test_embed_returns_unit_vector() {
    let model = load_model().await;

    let embedding = model.embed("This is a test sentence.").unwrap();

    assert_eq!(embedding.len(), MPNET_DIMENSIONS);
    assert!((norm(&embedding) - 1.0).abs() < 1e-3, "norm: {}", norm(&embedding));
    assert!(embedding.iter().all(|v| v.is_finite()));
}

#[tokio::test]
#[ignore]
async fn test_embed_is_deterministic() {
    let model = load_model().await;

    let first = model.embed("Hello, world!").unwrap();
    let second = model.embed("Hello, world!").unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
#[ignore]
async fn test_empty_and_long_text() {
    let model = load_model().await;

    let empty = model.embed("").unwrap();
    assert_eq!(empty.len(), MPNET_DIMENSIONS);

    // Truncated to max_length tokens
    let long = model.embed(&"word ".repeat(5_000)).unwrap();
    assert_eq!(long.len(), MPNET_DIMENSIONS);
    assert!(model.count_tokens(&"word ".repeat(5_000)).unwrap() <= model.options().max_length);
}

#[tokio::test]
#[ignore]
async fn test_product_texts_cluster_by_topic() {
    let model = load_model().await;

    let laptop = model
        .embed(
            "High-Performance Laptop A powerful computer with 32GB RAM and a 1TB SSD. \
             Ideal for programming and gaming.",
        )
        .unwrap();
    let smartphone = model
        .embed(
            "Modern Smartphone The latest mobile device with a 5G chip and a stunning \
             120Hz display. Send messages and browse.",
        )
        .unwrap();
    let roses = model
        .embed(
            "Red Rose Bouquet A beautiful arrangement of one dozen fresh flowers, \
             perfect for anniversaries or home decor.",
        )
        .unwrap();

    let tech_tech = cosine_distance(&laptop, &smartphone);
    let tech_roses = cosine_distance(&laptop, &roses);

    assert!(
        tech_tech < tech_roses,
        "laptop/smartphone {} should be closer than laptop/roses {}",
        tech_tech,
        tech_roses
    );
}

#[tokio::test]
#[ignore]
async fn test_http_round_trip_with_real_model() {
    let model = load_model().await;
    let app = create_app(AppState::new(Arc::new(model)));

    let (status, body) = send(app, post_json(&json!({"text": "This is a test sentence."}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["embedding"]["dimensions"], MPNET_DIMENSIONS);
    assert_eq!(vectors_of(&body).len(), MPNET_DIMENSIONS);
}
