// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Search/timeline result shapes shared between the router and the
//! application service facade. Field naming follows camelCase at the
//! protocol boundary even though storage may use snake_case internally;
//! that one-shot renaming happens here, at the type definition, rather
//! than scattered across handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub since: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qntm_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consolidation_level: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub rerank: bool,
    #[serde(default)]
    pub expand_query: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub text: String,
    pub file_path: String,
    pub chunk_index: u32,
    pub score: f32,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qntm_key: Option<String>,
}
