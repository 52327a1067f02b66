// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic fake embedding backend for daemon tests.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{EmbeddingBackend, EmbeddingError};
use async_trait::async_trait;
use atlas_core::HealthState;
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct EmbeddingCall {
    pub text_count: usize,
}

struct FakeState {
    calls: Vec<EmbeddingCall>,
}

/// Produces a stable, low-dimensional vector from a hash of the input text
/// so that identical text always embeds identically and distinct text
/// (almost always) diverges — good enough to drive duplicate-detection and
/// search-ranking tests without a real model.
#[derive(Clone)]
pub struct FakeEmbeddingBackend {
    dimensions: usize,
    inner: Arc<Mutex<FakeState>>,
}

impl FakeEmbeddingBackend {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            inner: Arc::new(Mutex::new(FakeState { calls: Vec::new() })),
        }
    }

    pub fn calls(&self) -> Vec<EmbeddingCall> {
        self.inner.lock().calls.clone()
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut hash: u64 = 1469598103934665603;
        for byte in text.as_bytes() {
            hash ^= *byte as u64;
            hash = hash.wrapping_mul(1099511628211);
        }
        (0..self.dimensions)
            .map(|i| {
                let shifted = hash.rotate_left((i as u32) * 7);
                (shifted % 1000) as f32 / 1000.0
            })
            .collect()
    }
}

impl Default for FakeEmbeddingBackend {
    fn default() -> Self {
        Self::new(8)
    }
}

#[async_trait]
impl EmbeddingBackend for FakeEmbeddingBackend {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.inner.lock().calls.push(EmbeddingCall {
            text_count: texts.len(),
        });
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn health(&self) -> HealthState {
        HealthState::Healthy
    }
}
