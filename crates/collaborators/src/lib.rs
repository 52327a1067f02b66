// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Collaborator contracts for external I/O the daemon core delegates to:
//! the vector store, the embedding backend, the LLM prompt runner, and
//! the filesystem watcher. Each module defines a trait, a `NoOp`
//! implementation used when no backend is configured, and (behind
//! `test-support`) a `Fake` implementation that records calls in memory.

pub mod agent_coordinator;
pub mod embedding;
pub mod llm;
pub mod vector_store;
pub mod watcher;

pub use agent_coordinator::{AgentCoordinator, AgentCoordinatorError, NoOpAgentCoordinator};
pub use embedding::{EmbeddingBackend, EmbeddingError, NoOpEmbeddingBackend};
pub use llm::{LlmError, LlmRunner, NoOpLlmRunner, PromptSpec};
pub use vector_store::{ChunkRecord, DuplicateGroup, NoOpVectorStore, VectorStoreClient, VectorStoreError};
pub use watcher::{ChangeKind, FileWatcher, NoOpFileWatcher, WatchEvent, WatcherError};

#[cfg(any(test, feature = "test-support"))]
pub use agent_coordinator::{AgentCoordinatorCall, FakeAgentCoordinator};
#[cfg(any(test, feature = "test-support"))]
pub use embedding::{EmbeddingCall, FakeEmbeddingBackend};
#[cfg(any(test, feature = "test-support"))]
pub use llm::{FakeLlmRunner, LlmCall};
#[cfg(any(test, feature = "test-support"))]
pub use vector_store::{FakeVectorStore, VectorStoreCall};
#[cfg(any(test, feature = "test-support"))]
pub use watcher::{FakeFileWatcher, WatcherCall};
