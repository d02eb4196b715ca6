//! Write targets for transcripts and artifacts.
//!
//! Sinks are keyed by a name derived from the session (topic, agent name,
//! artifact kind). `write` replaces whatever the name held before; `append`
//! adds to it. Dialogue transcripts are written once at the end of a session,
//! refinement iterations are appended one at a time.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::CoordinationError;

#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Replace the contents stored under `name`.
    async fn write(&self, name: &str, content: &str) -> Result<(), CoordinationError>;

    /// Add `content` after whatever is stored under `name`.
    async fn append(&self, name: &str, content: &str) -> Result<(), CoordinationError>;
}

/// In-memory sink, mostly for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    artifacts: Mutex<BTreeMap<String, String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<String> {
        self.lock().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        // A poisoned map still holds valid strings.
        self.artifacts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ArtifactSink for MemorySink {
    async fn write(&self, name: &str, content: &str) -> Result<(), CoordinationError> {
        self.lock().insert(name.to_string(), content.to_string());
        Ok(())
    }

    async fn append(&self, name: &str, content: &str) -> Result<(), CoordinationError> {
        self.lock()
            .entry(name.to_string())
            .or_default()
            .push_str(content);
        Ok(())
    }
}
