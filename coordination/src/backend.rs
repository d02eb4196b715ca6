//! The single operation this crate needs from a text-generation service.
//!
//! Implementations may be slow and may fail; callers await each call before
//! issuing the next, so no implementation is ever asked to serve two prompts
//! from the same session at once.

use async_trait::async_trait;
use thiserror::Error;

/// Failure reported by a [`Generator`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Transport or server-side error.
    #[error("backend error: {0}")]
    Backend(String),
    /// The backend answered with no usable text.
    #[error("backend returned an empty response")]
    EmptyResponse,
    /// The call did not finish within the configured limit.
    #[error("backend call timed out after {0}s")]
    Timeout(u64),
}

/// Stateless `generate(model, prompt) -> text` backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError>;
}
