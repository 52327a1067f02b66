// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! No-op LLM runner: reports itself unconfigured rather than panicking.

use super::{LlmError, LlmRunner, PromptSpec};
use async_trait::async_trait;
use atlas_core::HealthState;

#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpLlmRunner;

impl NoOpLlmRunner {
    pub fn new() -> Self {
        Self
    }

    fn unavailable() -> LlmError {
        LlmError::BackendUnavailable("no LLM runtime configured".to_string())
    }
}

#[async_trait]
impl LlmRunner for NoOpLlmRunner {
    async fn register_prompt(&self, _spec: PromptSpec) -> Result<(), LlmError> {
        Err(Self::unavailable())
    }

    async fn run_prompt(&self, _name: &str, _input: &str) -> Result<String, LlmError> {
        Err(Self::unavailable())
    }

    async fn generate_qntm_tags(&self, _text: &str) -> Result<Vec<String>, LlmError> {
        Err(Self::unavailable())
    }

    async fn health(&self) -> HealthState {
        HealthState::Degraded
    }
}
