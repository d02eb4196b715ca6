//! Bounded critique/refine cycle between a producer and a critic.
//!
//! ```text
//! iteration 0: producer.summarize(seed)               → artifact₀
//! for k in 1..=max_iterations
//!     critic.critique(artifactₖ₋₁)                      → critique
//!     critique ∋ acceptance phrase (case-insensitive)?  → accepted, stop
//!     producer.refine(seed, artifactₖ₋₁, critique)      → artifactₖ
//! ```
//!
//! Running out of iterations is not an error: the last artifact produced is
//! the final one. Acceptance is a literal substring test against free-form
//! critic output and nothing smarter.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::agent::{Agent, Capability};
use crate::errors::CoordinationError;
use crate::observer::{SilentObserver, TurnObserver};
use crate::sink::ArtifactSink;

pub const DEFAULT_MAX_ITERATIONS: u32 = 3;
pub const DEFAULT_ACCEPTANCE_PHRASE: &str = "This summary looks good now!";

/// Text under refinement, tagged with the iteration that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub content: String,
    /// 0 for the initial production.
    pub iteration: u32,
}

/// Critic output for one iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Critique {
    pub iteration: u32,
    pub text: String,
    pub accepted: bool,
}

/// Forward-only loop state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinementState {
    pub current_artifact: String,
    pub iteration: u32,
    pub accepted: bool,
}

impl RefinementState {
    fn new(initial: String) -> Self {
        Self {
            current_artifact: initial,
            iteration: 0,
            accepted: false,
        }
    }

    fn advance(&mut self, artifact: String) {
        self.current_artifact = artifact;
        self.iteration += 1;
    }

    fn accept(&mut self) {
        self.accepted = true;
    }

    pub fn is_terminal(&self, max_iterations: u32) -> bool {
        self.accepted || self.iteration >= max_iterations
    }
}

/// Result of a completed loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinementOutcome {
    /// The artifact the loop settled on.
    pub final_artifact: Artifact,
    /// Every artifact produced, initial one first.
    pub artifacts: Vec<Artifact>,
    pub critiques: Vec<Critique>,
    /// `true` only when the critic used the acceptance phrase.
    pub accepted: bool,
}

impl RefinementOutcome {
    /// Number of refinement calls performed.
    pub fn refinements(&self) -> usize {
        self.artifacts.len().saturating_sub(1)
    }
}

/// Case-insensitive substring test used to end the loop early.
pub fn contains_acceptance(critique: &str, phrase: &str) -> bool {
    critique.to_lowercase().contains(&phrase.to_lowercase())
}

pub struct RefinementLoop {
    max_iterations: u32,
    acceptance_phrase: String,
    observer: Arc<dyn TurnObserver>,
    iteration_log: Option<(Arc<dyn ArtifactSink>, String)>,
}

impl Default for RefinementLoop {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITERATIONS, DEFAULT_ACCEPTANCE_PHRASE)
    }
}

impl RefinementLoop {
    pub fn new(max_iterations: u32, acceptance_phrase: impl Into<String>) -> Self {
        Self {
            max_iterations,
            acceptance_phrase: acceptance_phrase.into(),
            observer: Arc::new(SilentObserver),
            iteration_log: None,
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn TurnObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Record every iteration under `name`: the initial artifact overwrites,
    /// each refinement appends.
    pub fn with_iteration_log(mut self, sink: Arc<dyn ArtifactSink>, name: impl Into<String>) -> Self {
        self.iteration_log = Some((sink, name.into()));
        self
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn acceptance_phrase(&self) -> &str {
        &self.acceptance_phrase
    }

    pub async fn run(
        &self,
        producer: &Agent,
        critic: &Agent,
        seed: &str,
    ) -> Result<RefinementOutcome, CoordinationError> {
        if self.acceptance_phrase.trim().is_empty() {
            return Err(CoordinationError::Configuration(
                "acceptance phrase must not be empty".to_string(),
            ));
        }
        if producer.capability() != Capability::Summarizer {
            return Err(CoordinationError::MissingCapability(Capability::Summarizer));
        }
        if critic.capability() != Capability::Critic {
            return Err(CoordinationError::MissingCapability(Capability::Critic));
        }

        info!(
            producer = %producer.name(),
            critic = %critic.name(),
            max_iterations = self.max_iterations,
            "refinement starting"
        );

        let initial = producer.summarize(seed).await?;
        self.observer.on_response(producer.name(), &initial);
        self.log_iteration(0, &initial, true).await?;

        let mut state = RefinementState::new(initial.clone());
        let mut artifacts = vec![Artifact {
            content: initial,
            iteration: 0,
        }];
        let mut critiques = Vec::new();

        while !state.is_terminal(self.max_iterations) {
            let iteration = state.iteration + 1;

            let text = critic.critique(&state.current_artifact).await?;
            self.observer.on_response(critic.name(), &text);
            let accepted = contains_acceptance(&text, &self.acceptance_phrase);
            critiques.push(Critique {
                iteration,
                text: text.clone(),
                accepted,
            });

            if accepted {
                info!(iteration, "critique accepted the artifact");
                state.accept();
                break;
            }
            debug!(iteration, "refining");

            let refined = producer
                .refine(seed, &state.current_artifact, &text)
                .await?;
            self.observer.on_response(producer.name(), &refined);
            self.log_iteration(iteration, &refined, false).await?;

            state.advance(refined.clone());
            artifacts.push(Artifact {
                content: refined,
                iteration,
            });
        }

        if !state.accepted {
            info!(
                iterations = state.iteration,
                "iteration cap reached; keeping last artifact"
            );
        }

        let final_artifact = Artifact {
            content: state.current_artifact,
            iteration: state.iteration,
        };
        Ok(RefinementOutcome {
            final_artifact,
            artifacts,
            critiques,
            accepted: state.accepted,
        })
    }

    async fn log_iteration(
        &self,
        iteration: u32,
        artifact: &str,
        first: bool,
    ) -> Result<(), CoordinationError> {
        let Some((sink, name)) = &self.iteration_log else {
            return Ok(());
        };
        let line = format!("Iteration {iteration}: {artifact}\n");
        if first {
            sink.write(name, &line).await
        } else {
            sink.append(name, &line).await
        }
    }
}
