// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic fake LLM runner for daemon tests.
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{LlmError, LlmRunner, PromptSpec};
use async_trait::async_trait;
use atlas_core::HealthState;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub enum LlmCall {
    RegisterPrompt { name: String },
    RunPrompt { name: String, input: String },
    GenerateQntmTags { text: String },
}

struct FakeState {
    prompts: HashMap<String, PromptSpec>,
    calls: Vec<LlmCall>,
}

/// Registers prompts in memory and "runs" them by echoing the input back
/// through the template, so tests can assert on what was asked without a
/// real model. QNTM tags are derived from the input's own words.
#[derive(Clone)]
pub struct FakeLlmRunner {
    inner: Arc<Mutex<FakeState>>,
}

impl Default for FakeLlmRunner {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeState {
                prompts: HashMap::new(),
                calls: Vec::new(),
            })),
        }
    }
}

impl FakeLlmRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<LlmCall> {
        self.inner.lock().calls.clone()
    }
}

#[async_trait]
impl LlmRunner for FakeLlmRunner {
    async fn register_prompt(&self, spec: PromptSpec) -> Result<(), LlmError> {
        let mut inner = self.inner.lock();
        inner.calls.push(LlmCall::RegisterPrompt {
            name: spec.name.clone(),
        });
        inner.prompts.insert(spec.name.clone(), spec);
        Ok(())
    }

    async fn run_prompt(&self, name: &str, input: &str) -> Result<String, LlmError> {
        let mut inner = self.inner.lock();
        inner.calls.push(LlmCall::RunPrompt {
            name: name.to_string(),
            input: input.to_string(),
        });
        let spec = inner
            .prompts
            .get(name)
            .ok_or_else(|| LlmError::UnknownPrompt(name.to_string()))?;
        Ok(spec.template.replace("{{text}}", input))
    }

    async fn generate_qntm_tags(&self, text: &str) -> Result<Vec<String>, LlmError> {
        self.inner.lock().calls.push(LlmCall::GenerateQntmTags {
            text: text.to_string(),
        });
        let mut tags: Vec<String> = text
            .split_whitespace()
            .filter(|w| w.len() > 3)
            .take(3)
            .map(|w| w.to_lowercase())
            .collect();
        tags.sort();
        tags.dedup();
        Ok(tags)
    }

    async fn health(&self) -> HealthState {
        HealthState::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_prompt_fails_before_registration() {
        let runner = FakeLlmRunner::new();
        let err = runner.run_prompt("summarize", "hello").await.unwrap_err();
        assert!(matches!(err, LlmError::UnknownPrompt(_)));
    }

    #[tokio::test]
    async fn run_prompt_substitutes_template() {
        let runner = FakeLlmRunner::new();
        runner
            .register_prompt(PromptSpec {
                name: "echo".into(),
                template: "echo: {{text}}".into(),
            })
            .await
            .unwrap();
        let out = runner.run_prompt("echo", "hello").await.unwrap();
        assert_eq!(out, "echo: hello");
    }

    #[tokio::test]
    async fn generate_qntm_tags_extracts_significant_words() {
        let runner = FakeLlmRunner::new();
        let tags = runner
            .generate_qntm_tags("the async router handles requests")
            .await
            .unwrap();
        assert!(tags.contains(&"async".to_string()));
        assert!(!tags.contains(&"the".to_string()));
    }
}
