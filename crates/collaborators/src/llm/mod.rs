// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! LLM prompt runner contract.
//!
//! The prompt library itself (templates, model selection, retries) is out
//! of scope for the daemon core; this module specifies the interface the
//! QNTM lane and session ingestor call through: register a named prompt
//! once at startup, then run it against arbitrary input text.

mod noop;

pub use noop::NoOpLlmRunner;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeLlmRunner, LlmCall};

use async_trait::async_trait;
use atlas_core::HealthState;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("unknown prompt: {0}")]
    UnknownPrompt(String),
    #[error("generation failed: {0}")]
    GenerationFailed(String),
}

/// A named, reusable prompt template registered once at startup.
#[derive(Debug, Clone)]
pub struct PromptSpec {
    pub name: String,
    pub template: String,
}

/// Interface the core calls into the LLM prompt library through.
#[async_trait]
pub trait LlmRunner: Send + Sync + 'static {
    /// Register a prompt template under a stable name; called during
    /// daemon startup before any `run_prompt` / `generate_qntm_tags` call.
    async fn register_prompt(&self, spec: PromptSpec) -> Result<(), LlmError>;

    /// Run a previously registered prompt against `input`, returning the
    /// raw completion text.
    async fn run_prompt(&self, name: &str, input: &str) -> Result<String, LlmError>;

    /// Synthesize short QNTM tags summarizing `text`.
    async fn generate_qntm_tags(&self, text: &str) -> Result<Vec<String>, LlmError>;

    /// Probe connectivity/configuration without running a real prompt.
    async fn health(&self) -> HealthState;
}
