//! Named, roled actors that turn a task instruction into generated text.
//!
//! An [`Agent`] owns its [`ContextStore`] and a handle to the backend. The
//! capability tag decides which task-specific operations it accepts; all of
//! them funnel through [`Agent::respond`], which never mutates context.
//! Callers decide what (if anything) is appended afterwards. The one
//! exception is [`Agent::reflect`], which records its own reflection.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::Generator;
use crate::context::ContextStore;
use crate::errors::CoordinationError;
use crate::prompts;

/// What an agent is able to do beyond plain `respond`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Gathers information on a topic.
    Researcher,
    /// Takes part in dialogues, reflects, writes articles.
    Writer,
    /// Produces and refines summaries in the refinement loop.
    Summarizer,
    /// Evaluates artifacts in the refinement loop.
    Critic,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Researcher => write!(f, "researcher"),
            Self::Writer => write!(f, "writer"),
            Self::Summarizer => write!(f, "summarizer"),
            Self::Critic => write!(f, "critic"),
        }
    }
}

pub struct Agent {
    name: String,
    role: String,
    capability: Capability,
    model: String,
    context: ContextStore,
    backend: Arc<dyn Generator>,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("capability", &self.capability)
            .field("model", &self.model)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl Agent {
    /// Create an agent with empty context.
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        capability: Capability,
        model: impl Into<String>,
        backend: Arc<dyn Generator>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            capability,
            model: model.into(),
            context: ContextStore::new(),
            backend,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn capability(&self) -> Capability {
        self.capability
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn context(&self) -> &ContextStore {
        &self.context
    }

    pub fn update_shared(&mut self, text: impl Into<String>) {
        self.context.update_shared(text);
    }

    pub fn update_individual(&mut self, text: impl Into<String>) {
        self.context.update_individual(text);
    }

    /// The exact prompt `respond` would send for `task`.
    pub fn render_prompt(&self, task: &str) -> String {
        prompts::render_prompt(
            &self.role,
            &self.context.shared().render(),
            &self.context.individual().render(),
            task,
        )
    }

    /// Render the prompt and call the backend once. No retries, no context writes.
    pub async fn respond(&self, task: &str) -> Result<String, CoordinationError> {
        let prompt = self.render_prompt(task);
        debug!(
            agent = %self.name,
            model = %self.model,
            prompt_chars = prompt.len(),
            "generating"
        );

        let text = self
            .backend
            .generate(&self.model, &prompt)
            .await
            .map_err(|e| CoordinationError::generation(&self.name, e))?;

        if text.trim().is_empty() {
            return Err(CoordinationError::generation(
                &self.name,
                "backend returned an empty response",
            ));
        }

        debug!(agent = %self.name, response_chars = text.len(), "generated");
        Ok(text)
    }

    fn require(&self, capability: Capability) -> Result<(), CoordinationError> {
        if self.capability == capability {
            Ok(())
        } else {
            Err(CoordinationError::MissingCapability(capability))
        }
    }

    // ── Researcher ───────────────────────────────────────────────────────

    pub async fn find_information(&self, topic: &str) -> Result<String, CoordinationError> {
        self.require(Capability::Researcher)?;
        self.respond(&prompts::research(topic)).await
    }

    /// Long-form research used to seed a refinement loop.
    pub async fn research_in_depth(&self, topic: &str) -> Result<String, CoordinationError> {
        self.require(Capability::Researcher)?;
        self.respond(&prompts::rigorous_research(topic)).await
    }

    // ── Writer ───────────────────────────────────────────────────────────

    /// Reflect on the dialogue and keep the reflection in individual context.
    pub async fn reflect(&mut self, topic: &str) -> Result<String, CoordinationError> {
        self.require(Capability::Writer)?;
        let reflection = self
            .respond(&prompts::reflection(topic, &self.role))
            .await?;
        self.update_individual(prompts::reflection_note(&reflection));
        Ok(reflection)
    }

    pub async fn write_article(&self, topic: &str) -> Result<String, CoordinationError> {
        self.require(Capability::Writer)?;
        self.respond(&prompts::article(topic, &self.role)).await
    }

    // ── Summarizer ───────────────────────────────────────────────────────

    pub async fn summarize(&self, data: &str) -> Result<String, CoordinationError> {
        self.require(Capability::Summarizer)?;
        self.respond(&prompts::summarize(data)).await
    }

    pub async fn refine(
        &self,
        research_data: &str,
        summary: &str,
        critique: &str,
    ) -> Result<String, CoordinationError> {
        self.require(Capability::Summarizer)?;
        self.respond(&prompts::refine(research_data, summary, critique))
            .await
    }

    // ── Critic ───────────────────────────────────────────────────────────

    pub async fn critique(&self, artifact: &str) -> Result<String, CoordinationError> {
        self.require(Capability::Critic)?;
        self.respond(&prompts::critique(artifact)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{GenerationError, MockGenerator};

    fn agent_with(mock: MockGenerator, capability: Capability) -> Agent {
        Agent::new(
            "Scientific Writer",
            "Science Perspective",
            capability,
            "llama3.2:3b",
            Arc::new(mock),
        )
    }

    #[tokio::test]
    async fn respond_renders_role_shared_individual_task_in_order() {
        let mut mock = MockGenerator::new();
        mock.expect_generate()
            .withf(|model, prompt| {
                model == "llama3.2:3b"
                    && prompt
                        == "Science Perspective\n\nShared Context:\nResearch on tides:\nmoon\n\n\
                            Individual Context:\nMy answer: gravity\n\nPrompt: go\n\nResponse:"
            })
            .times(1)
            .returning(|_, _| Ok("ok".to_string()));

        let mut agent = agent_with(mock, Capability::Writer);
        agent.update_shared("Research on tides:\nmoon");
        agent.update_individual("My answer: gravity");

        let out = agent.respond("go").await.unwrap();
        assert_eq!(out, "ok");
    }

    #[tokio::test]
    async fn respond_does_not_touch_context() {
        let mut mock = MockGenerator::new();
        mock.expect_generate()
            .returning(|_, _| Ok("text".to_string()));
        let agent = agent_with(mock, Capability::Writer);

        agent.respond("a").await.unwrap();
        assert!(agent.context().is_empty());
    }

    #[tokio::test]
    async fn backend_error_becomes_generation_failure() {
        let mut mock = MockGenerator::new();
        mock.expect_generate()
            .times(1)
            .returning(|_, _| Err(GenerationError::Backend("503".into())));
        let agent = agent_with(mock, Capability::Writer);

        let err = agent.respond("a").await.unwrap_err();
        match err {
            CoordinationError::GenerationFailure { agent, reason } => {
                assert_eq!(agent, "Scientific Writer");
                assert!(reason.contains("503"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn blank_response_is_rejected() {
        let mut mock = MockGenerator::new();
        mock.expect_generate()
            .returning(|_, _| Ok("  \n ".to_string()));
        let agent = agent_with(mock, Capability::Writer);

        assert!(matches!(
            agent.respond("a").await,
            Err(CoordinationError::GenerationFailure { .. })
        ));
    }

    #[tokio::test]
    async fn reflect_appends_to_own_individual_context() {
        let mut mock = MockGenerator::new();
        mock.expect_generate()
            .returning(|_, _| Ok("I learned a lot".to_string()));
        let mut agent = agent_with(mock, Capability::Writer);

        let reflection = agent.reflect("tides").await.unwrap();
        assert_eq!(reflection, "I learned a lot");
        assert_eq!(
            agent.context().individual().fragments(),
            &["Reflection on the debate:\nI learned a lot"]
        );
    }

    #[tokio::test]
    async fn write_article_does_not_self_mutate() {
        let mut mock = MockGenerator::new();
        mock.expect_generate()
            .returning(|_, _| Ok("article".to_string()));
        let agent = agent_with(mock, Capability::Writer);

        agent.write_article("tides").await.unwrap();
        assert!(agent.context().individual().is_empty());
    }

    #[tokio::test]
    async fn wrong_capability_fails_without_calling_backend() {
        let mut mock = MockGenerator::new();
        mock.expect_generate().times(0);
        let agent = agent_with(mock, Capability::Writer);

        let err = agent.find_information("tides").await.unwrap_err();
        assert!(matches!(
            err,
            CoordinationError::MissingCapability(Capability::Researcher)
        ));
    }
}
