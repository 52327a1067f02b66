// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! QNTM lane: `atlas.qntm.generate` synthesizes short semantic tags for a
//! piece of text via the LLM collaborator.

use atlas_core::LaneKind;
use atlas_collaborators::LlmError;

use crate::service::AppContext;

pub async fn generate_tags(ctx: &AppContext, text: &str) -> Result<Vec<String>, LlmError> {
    let _permit = ctx.concurrency.acquire(LaneKind::Consolidate).await;
    ctx.llm.generate_qntm_tags(text).await
}
