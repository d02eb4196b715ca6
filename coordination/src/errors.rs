//! Error taxonomy for the turn-taking and refinement protocols.
//!
//! Every error raised by this crate is a [`CoordinationError`]. The core never
//! retries anything itself; callers that want a retry policy can query
//! [`CoordinationError::retry_category`] instead of matching on messages.
//!
//! | Variant                    | Category     | Raised before any generation call? |
//! |----------------------------|--------------|------------------------------------|
//! | `GenerationFailure`        | Transient    | no                                 |
//! | `InsufficientParticipants` | Precondition | yes                                |
//! | `MissingCapability`        | Precondition | yes                                |
//! | `Sink`                     | Io           | n/a                                |
//! | `Configuration`            | Precondition | yes                                |

use std::fmt;

use thiserror::Error;

use crate::agent::Capability;

/// Coarse classification used by callers deciding whether to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryCategory {
    /// Backend error or unusable output; the same call may succeed later.
    Transient,
    /// The session was set up wrong (roster, config); retrying cannot help.
    Precondition,
    /// Writing an artifact failed.
    Io,
}

impl RetryCategory {
    pub fn is_retriable(self) -> bool {
        matches!(self, Self::Transient | Self::Io)
    }
}

impl fmt::Display for RetryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transient => write!(f, "transient"),
            Self::Precondition => write!(f, "precondition"),
            Self::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for agents, dialogue sessions and refinement loops.
#[derive(Debug, Error)]
pub enum CoordinationError {
    /// The backend errored or returned nothing usable for this agent's prompt.
    #[error("Generation failure for {agent}: {reason}")]
    GenerationFailure { agent: String, reason: String },

    /// Not enough writer-capable agents to hold a dialogue.
    #[error("Insufficient participants: need at least {required} writers, found {found}")]
    InsufficientParticipants { required: usize, found: usize },

    /// An operation needs an agent with a capability the roster does not have.
    #[error("Missing capability: no agent can act as {0}")]
    MissingCapability(Capability),

    /// An artifact sink rejected a write.
    #[error("Sink failure [{name}]: {reason}")]
    Sink { name: String, reason: String },

    /// Session parameters are invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoordinationError {
    pub fn retry_category(&self) -> RetryCategory {
        match self {
            Self::GenerationFailure { .. } => RetryCategory::Transient,
            Self::InsufficientParticipants { .. }
            | Self::MissingCapability(_)
            | Self::Configuration(_) => RetryCategory::Precondition,
            Self::Sink { .. } => RetryCategory::Io,
        }
    }

    pub fn is_retriable(&self) -> bool {
        self.retry_category().is_retriable()
    }

    /// Build a `GenerationFailure` conveniently.
    pub fn generation(agent: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::GenerationFailure {
            agent: agent.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a `Sink` failure conveniently.
    pub fn sink(name: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::Sink {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}
