// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding API Module
//!
//! This module provides the POST /embed endpoint.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::embed_handler;
pub use request::{is_json_content_type, EmbedRequest};
pub use response::{EmbedResponse, Embedding};
