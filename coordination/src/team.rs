//! A roster plus the session-level operations run on it: research,
//! broadcast, dialogue, reflection and article writing.

use std::sync::Arc;

use tracing::info;

use crate::agent::Capability;
use crate::dialogue::{DialogueCoordinator, DialogueStyle};
use crate::errors::CoordinationError;
use crate::observer::{SilentObserver, TurnObserver};
use crate::prompts;
use crate::roster::Roster;
use crate::transcript::DialogueTranscript;

pub struct ResearchTeam {
    roster: Roster,
    observer: Arc<dyn TurnObserver>,
}

impl ResearchTeam {
    pub fn new(roster: Roster) -> Self {
        Self {
            roster,
            observer: Arc::new(SilentObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn TurnObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// Broadcast `context` into every agent's shared context.
    pub fn share_context(&mut self, context: &str) {
        self.roster.broadcast(context);
    }

    /// Ask the first researcher for a summary of `topic`.
    pub async fn conduct_research(&self, topic: &str) -> Result<String, CoordinationError> {
        let researcher = self.roster.first_with(Capability::Researcher)?;
        info!(agent = %researcher.name(), topic, "researching");
        let info = researcher.find_information(topic).await?;
        self.observer.on_response(researcher.name(), &info);
        Ok(info)
    }

    /// Research `topic` and broadcast the result as `"Research on {topic}:\n…"`.
    pub async fn research_and_share(&mut self, topic: &str) -> Result<String, CoordinationError> {
        let info = self.conduct_research(topic).await?;
        self.share_context(&prompts::research_broadcast(topic, &info));
        Ok(info)
    }

    pub async fn interactive_dialogue(
        &mut self,
        topic: &str,
        questions_per_writer: usize,
        style: DialogueStyle,
    ) -> Result<DialogueTranscript, CoordinationError> {
        DialogueCoordinator::new(style, questions_per_writer)
            .with_observer(self.observer.clone())
            .run(&mut self.roster, topic)
            .await
    }

    /// Every writer reflects, in roster order.
    pub async fn reflect_on_debate(
        &mut self,
        topic: &str,
    ) -> Result<Vec<(String, String)>, CoordinationError> {
        let mut reflections = Vec::new();
        for agent in self.roster.agents_mut() {
            if agent.capability() != Capability::Writer {
                continue;
            }
            let reflection = agent.reflect(topic).await?;
            self.observer.on_response(agent.name(), &reflection);
            reflections.push((agent.name().to_string(), reflection));
        }
        Ok(reflections)
    }

    /// Every writer writes an article, in roster order.
    pub async fn write_articles(
        &self,
        topic: &str,
    ) -> Result<Vec<(String, String)>, CoordinationError> {
        let mut articles = Vec::new();
        for agent in self.roster.writers() {
            let article = agent.write_article(topic).await?;
            self.observer.on_response(agent.name(), &article);
            articles.push((agent.name().to_string(), article));
        }
        Ok(articles)
    }
}

/// Reflections file body: header plus one block per writer.
pub fn reflections_document(topic: &str, reflections: &[(String, String)]) -> String {
    let body = reflections
        .iter()
        .map(|(name, text)| format!("{name}'s Reflection:\n{text}"))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("Reflections on the debate about: {topic}\n\n{body}")
}

/// File name for a writer's article, e.g. `scientific_writer_article.txt`.
pub fn article_file_name(agent_name: &str) -> String {
    format!("{}_article.txt", agent_name.to_lowercase().replace(' ', "_"))
}
