// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Embedding backend contract.
//!
//! Computing embeddings (model choice, batching, GPU/CPU placement) is out
//! of scope for the daemon core; this module only specifies the interface
//! the session ingestor and search path call through to turn text into
//! vectors.

mod noop;

pub use noop::NoOpEmbeddingBackend;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{EmbeddingCall, FakeEmbeddingBackend};

use async_trait::async_trait;
use atlas_core::HealthState;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("embedding failed: {0}")]
    Failed(String),
}

/// Turns chunk text into vectors. Implementations must return one vector
/// per input string, in the same order.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync + 'static {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Dimensionality of vectors this backend produces.
    fn dimensions(&self) -> usize;

    /// Probe connectivity/configuration without embedding real text.
    async fn health(&self) -> HealthState;
}
