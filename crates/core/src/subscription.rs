// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subscription pattern grammar and matching.
//!
//! Grammar: `segment ('.' segment)*` where `segment` is a literal identifier
//! or the wildcard `*`. The pattern `*` alone matches every event type,
//! crossing segment boundaries. Any other pattern is anchored: it matches
//! only event types with the same number of dot-separated segments, with
//! each `*` segment matching exactly one corresponding segment. So
//! `ingest.*` matches `ingest.started` but not `ingest.file.complete`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single subscription pattern, validated at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionPattern(String);

impl SubscriptionPattern {
    /// Wrap a client-supplied string as a pattern. Patterns are pure strings;
    /// construction never fails and never mutates after this point.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this pattern matches the given dotted event type.
    pub fn matches(&self, event_type: &str) -> bool {
        if self.0 == "*" {
            return true;
        }

        let pat_segs: Vec<&str> = self.0.split('.').collect();
        let ev_segs: Vec<&str> = event_type.split('.').collect();
        if pat_segs.len() != ev_segs.len() {
            return false;
        }
        pat_segs
            .iter()
            .zip(ev_segs.iter())
            .all(|(p, e)| *p == "*" || p == e)
    }
}

impl From<String> for SubscriptionPattern {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SubscriptionPattern {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

/// The set of patterns a single client has registered.
///
/// Subscriptions are additive: `union` merges new patterns in,
/// `remove` drops the exact strings provided.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionSet {
    patterns: HashSet<SubscriptionPattern>,
}

impl SubscriptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn union(&mut self, patterns: impl IntoIterator<Item = SubscriptionPattern>) {
        self.patterns.extend(patterns);
    }

    pub fn remove(&mut self, patterns: &[SubscriptionPattern]) {
        for p in patterns {
            self.patterns.remove(p);
        }
    }

    /// Whether any registered pattern matches `event_type`.
    pub fn matches(&self, event_type: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(event_type))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &SubscriptionPattern> {
        self.patterns.iter()
    }
}
