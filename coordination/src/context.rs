//! Per-agent memory split into a shared (broadcast) and an individual
//! (private) segment.
//!
//! Both segments are append-only for the lifetime of a session. There is no
//! truncation, deduplication or rollback: a fragment, once appended, is part
//! of every prompt the owning agent renders afterwards.

use serde::{Deserialize, Serialize};

/// Ordered, append-only text fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextSegment {
    fragments: Vec<String>,
}

impl ContextSegment {
    pub fn push(&mut self, fragment: impl Into<String>) {
        self.fragments.push(fragment.into());
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Fragments joined by newlines, in append order.
    pub fn render(&self) -> String {
        self.fragments.join("\n")
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.fragments.iter().any(|f| f.contains(needle))
    }
}

/// Shared plus individual context owned by exactly one agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextStore {
    shared: ContextSegment,
    individual: ContextSegment,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fragment to the shared segment.
    pub fn update_shared(&mut self, text: impl Into<String>) {
        self.shared.push(text);
    }

    /// Append a fragment to the individual segment.
    pub fn update_individual(&mut self, text: impl Into<String>) {
        self.individual.push(text);
    }

    pub fn shared(&self) -> &ContextSegment {
        &self.shared
    }

    pub fn individual(&self) -> &ContextSegment {
        &self.individual
    }

    /// Total number of fragments across both segments.
    pub fn len(&self) -> usize {
        self.shared.len() + self.individual.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.is_empty() && self.individual.is_empty()
    }
}
