//! End-to-end pipelines behind `roundtable debate` and `roundtable summarize`.
//!
//! Both pipelines abort on the first failure. Artifacts of stages that
//! finished before the failure stay written; the failed stage writes nothing.

use std::path::Path;
use std::sync::Arc;

use coordination::team::{article_file_name, reflections_document};
use coordination::{
    Agent, ArtifactSink, Capability, CoordinationError, DialogueTranscript, Generator,
    RefinementLoop, RefinementOutcome, ResearchTeam, Roster, TurnObserver,
};
use tracing::info;

use crate::config::RoundtableConfig;

pub const DIALOGUE_FILE: &str = "interactive_dialogue.txt";
pub const DIALOGUE_JSON_FILE: &str = "interactive_dialogue.json";
pub const REFLECTIONS_FILE: &str = "debate_reflections.txt";
pub const RESEARCH_FILE: &str = "research_output.txt";
pub const ITERATIONS_FILE: &str = "summary_iterations.txt";
pub const FINAL_SUMMARY_FILE: &str = "final_summary.txt";
pub const CRITIQUES_FILE: &str = "critique_output.txt";

/// Researcher followed by three writers with distinct perspectives.
pub fn debate_roster(model: &str, backend: Arc<dyn Generator>) -> Result<Roster, CoordinationError> {
    let mut roster = Roster::default();
    roster.push(Agent::new(
        "Researcher",
        "Information Gatherer",
        Capability::Researcher,
        model,
        backend.clone(),
    ))?;
    for (name, role) in [
        ("Scientific Writer", "Science Perspective"),
        ("Religious Writer", "Religious Perspective"),
        ("Philosophical Writer", "Philosophical Perspective"),
    ] {
        roster.push(Agent::new(
            name,
            role,
            Capability::Writer,
            model,
            backend.clone(),
        ))?;
    }
    Ok(roster)
}

/// The three agents of a summarize session.
pub struct SummaryAgents {
    pub researcher: Agent,
    pub summarizer: Agent,
    pub critic: Agent,
}

impl SummaryAgents {
    pub fn new(model: &str, acceptance_phrase: &str, backend: Arc<dyn Generator>) -> Self {
        Self {
            researcher: Agent::new(
                "Agent A (Researcher)",
                "Researcher",
                Capability::Researcher,
                model,
                backend.clone(),
            ),
            summarizer: Agent::new(
                "Agent B (Summarizer)",
                "Summarizer",
                Capability::Summarizer,
                model,
                backend.clone(),
            ),
            critic: Agent::new(
                "Agent C (Critic)",
                critic_role(acceptance_phrase),
                Capability::Critic,
                model,
                backend,
            ),
        }
    }
}

/// The critic has to know the exact phrase that ends the loop.
fn critic_role(acceptance_phrase: &str) -> String {
    format!(
        "Critic. When a summary needs no further improvement, say exactly: \"{acceptance_phrase}\""
    )
}

#[derive(Debug)]
pub struct DebateReport {
    pub research: String,
    pub transcript: DialogueTranscript,
    pub reflections: Vec<(String, String)>,
    /// `(agent name, file name, article)` in roster order.
    pub articles: Vec<(String, String, String)>,
}

/// Research, broadcast, dialogue, reflection and articles for `topic`.
pub async fn run_debate(
    config: &RoundtableConfig,
    roster: Roster,
    topic: &str,
    sink: Arc<dyn ArtifactSink>,
    observer: Arc<dyn TurnObserver>,
) -> Result<DebateReport, CoordinationError> {
    let mut team = ResearchTeam::new(roster).with_observer(observer);

    info!(topic, "Researcher is gathering information");
    let research = team.research_and_share(topic).await?;

    info!(
        rounds = config.dialogue.questions_per_writer,
        style = %config.dialogue.style,
        "Starting interactive dialogue"
    );
    let transcript = team
        .interactive_dialogue(
            topic,
            config.dialogue.questions_per_writer,
            config.dialogue.style,
        )
        .await?;
    sink.write(DIALOGUE_FILE, &transcript.to_document()).await?;
    let json = serde_json::to_string_pretty(&transcript)
        .map_err(|e| CoordinationError::sink(DIALOGUE_JSON_FILE, e))?;
    sink.write(DIALOGUE_JSON_FILE, &json).await?;

    info!("Writers are reflecting on the debate");
    let reflections = team.reflect_on_debate(topic).await?;
    sink.write(REFLECTIONS_FILE, &reflections_document(topic, &reflections))
        .await?;

    info!("Writers are composing articles");
    let mut articles = Vec::new();
    for (name, article) in team.write_articles(topic).await? {
        let file = article_file_name(&name);
        sink.write(&file, &article).await?;
        info!(agent = %name, file = %file, "article saved");
        articles.push((name, file, article));
    }

    Ok(DebateReport {
        research,
        transcript,
        reflections,
        articles,
    })
}

#[derive(Debug)]
pub struct SummaryReport {
    pub research: String,
    /// `true` when the research came from an existing file.
    pub research_reused: bool,
    pub outcome: RefinementOutcome,
}

/// Research `topic` (or reuse `research_file`), then refine a summary of it.
pub async fn run_summarize(
    config: &RoundtableConfig,
    agents: &SummaryAgents,
    topic: &str,
    research_file: Option<&Path>,
    sink: Arc<dyn ArtifactSink>,
    observer: Arc<dyn TurnObserver>,
) -> Result<SummaryReport, CoordinationError> {
    let (research, research_reused) = match read_existing(research_file).await? {
        Some(text) => {
            info!(path = ?research_file, "reusing existing research");
            (text, true)
        }
        None => {
            info!(topic, agent = %agents.researcher.name(), "researching");
            let text = agents.researcher.research_in_depth(topic).await?;
            observer.on_response(agents.researcher.name(), &text);
            sink.write(RESEARCH_FILE, &text).await?;
            (text, false)
        }
    };

    let outcome = RefinementLoop::new(
        config.refinement.max_iterations,
        config.refinement.acceptance_phrase.clone(),
    )
    .with_observer(observer)
    .with_iteration_log(sink.clone(), ITERATIONS_FILE)
    .run(&agents.summarizer, &agents.critic, &research)
    .await?;

    sink.write(FINAL_SUMMARY_FILE, &outcome.final_artifact.content)
        .await?;
    sink.write(CRITIQUES_FILE, &critiques_document(&outcome))
        .await?;
    info!(
        accepted = outcome.accepted,
        refinements = outcome.refinements(),
        "summary finalized"
    );

    Ok(SummaryReport {
        research,
        research_reused,
        outcome,
    })
}

/// One `"Critique {n}: {text}\n"` line per critique, in iteration order.
fn critiques_document(outcome: &RefinementOutcome) -> String {
    outcome
        .critiques
        .iter()
        .map(|c| format!("Critique {}: {}\n", c.iteration, c.text))
        .collect()
}

async fn read_existing(path: Option<&Path>) -> Result<Option<String>, CoordinationError> {
    let Some(path) = path else {
        return Ok(None);
    };
    match tokio::fs::read_to_string(path).await {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(CoordinationError::sink(path.display().to_string(), e)),
    }
}
