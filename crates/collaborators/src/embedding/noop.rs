// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op embedding backend: reports itself unconfigured rather than panicking.

use super::{EmbeddingBackend, EmbeddingError};
use async_trait::async_trait;
use atlas_core::HealthState;

#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEmbeddingBackend;

impl NoOpEmbeddingBackend {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EmbeddingBackend for NoOpEmbeddingBackend {
    async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        Err(EmbeddingError::BackendUnavailable(
            "no embedding backend configured".to_string(),
        ))
    }

    fn dimensions(&self) -> usize {
        0
    }

    async fn health(&self) -> HealthState {
        HealthState::Degraded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_backend_refuses_to_embed() {
        let backend = NoOpEmbeddingBackend::new();
        assert!(backend.embed(&["hello".to_string()]).await.is_err());
        assert_eq!(backend.dimensions(), 0);
    }

    #[tokio::test]
    async fn noop_backend_reports_degraded_health() {
        let backend = NoOpEmbeddingBackend::new();
        assert_eq!(backend.health().await, HealthState::Degraded);
    }
}
