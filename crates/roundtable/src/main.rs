//! Roundtable: multi-agent debate and summary refinement over a local LLM.
//!
//! # Usage
//!
//! ```bash
//! # Panel debate, responses printed as they arrive
//! roundtable debate "the ethics of gene editing" --display
//!
//! # Two-party exchange with five rounds
//! roundtable debate "free will" --style exchange --rounds 5
//!
//! # Critique/refine a summary, reusing cached research when present
//! roundtable summarize "the impact of climate change on biodiversity" \
//!     --research-file research_data.txt --max-iterations 4
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use coordination::{ArtifactSink, DialogueStyle, Generator, SilentObserver, TurnObserver};
use roundtable::backend::{build_generator, check_endpoint};
use roundtable::config::RoundtableConfig;
use roundtable::display::TypewriterObserver;
use roundtable::session::{self, SummaryAgents};
use roundtable::sink::FileSink;
use tracing::{info, warn};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print each response with a typewriter effect
    #[arg(long, global = true, default_value_t = false)]
    display: bool,

    /// Directory for transcripts and artifacts (overrides ROUNDTABLE_OUTPUT_DIR)
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,

    /// Model name sent to the backend (overrides ROUNDTABLE_MODEL)
    #[arg(long, global = true)]
    model: Option<String>,

    /// OpenAI-compatible base URL (overrides ROUNDTABLE_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Research a topic, hold a dialogue, then reflect and write articles
    Debate {
        topic: String,

        /// Rounds of questioning (overrides ROUNDTABLE_QUESTIONS)
        #[arg(long)]
        rounds: Option<usize>,

        #[arg(long, value_enum)]
        style: Option<StyleArg>,
    },
    /// Research a topic, then refine a summary until the critic accepts it
    Summarize {
        topic: String,

        /// Reuse this research if the file exists
        #[arg(long)]
        research_file: Option<PathBuf>,

        /// Critique/refine cycles (overrides ROUNDTABLE_MAX_ITERATIONS)
        #[arg(long)]
        max_iterations: Option<u32>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StyleArg {
    Panel,
    Exchange,
}

impl From<StyleArg> for DialogueStyle {
    fn from(arg: StyleArg) -> Self {
        match arg {
            StyleArg::Panel => DialogueStyle::Panel,
            StyleArg::Exchange => DialogueStyle::Exchange,
        }
    }
}

impl Args {
    fn apply(&self, config: &mut RoundtableConfig) {
        if self.display {
            config.display = true;
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(model) = &self.model {
            config.backend.model = model.clone();
        }
        if let Some(url) = &self.base_url {
            config.backend.base_url = url.clone();
        }
        match &self.command {
            Command::Debate { rounds, style, .. } => {
                if let Some(r) = rounds {
                    config.dialogue.questions_per_writer = *r;
                }
                if let Some(s) = style {
                    config.dialogue.style = (*s).into();
                }
            }
            Command::Summarize { max_iterations, .. } => {
                if let Some(m) = max_iterations {
                    config.refinement.max_iterations = *m;
                }
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let mut config = RoundtableConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;

    info!(
        base_url = %config.backend.base_url,
        model = %config.backend.model,
        output_dir = %config.output_dir.display(),
        "Roundtable starting"
    );
    if !check_endpoint(&config.backend.base_url).await {
        warn!(
            url = %config.backend.base_url,
            "Inference endpoint not reachable; generation calls will likely fail"
        );
    }

    let backend: Arc<dyn Generator> = Arc::new(build_generator(&config.backend)?);
    let sink: Arc<dyn ArtifactSink> = Arc::new(FileSink::new(&config.output_dir));
    let observer: Arc<dyn TurnObserver> = if config.display {
        Arc::new(TypewriterObserver::new(Duration::from_millis(
            config.display_delay_ms,
        )))
    } else {
        Arc::new(SilentObserver)
    };

    match &args.command {
        Command::Debate { topic, .. } => {
            let roster = session::debate_roster(&config.backend.model, backend)?;
            let report = session::run_debate(&config, roster, topic, sink, observer)
                .await
                .context("Debate session failed")?;
            info!(
                turns = report.transcript.turn_count(),
                reflections = report.reflections.len(),
                articles = report.articles.len(),
                "Debate complete"
            );
        }
        Command::Summarize {
            topic,
            research_file,
            ..
        } => {
            let agents = SummaryAgents::new(
                &config.backend.model,
                &config.refinement.acceptance_phrase,
                backend,
            );
            let report = session::run_summarize(
                &config,
                &agents,
                topic,
                research_file.as_deref(),
                sink,
                observer,
            )
            .await
            .context("Summarize session failed")?;
            info!(
                accepted = report.outcome.accepted,
                iterations = report.outcome.final_artifact.iteration,
                research_reused = report.research_reused,
                "Summary complete"
            );
            println!("Final Summary:\n{}", report.outcome.final_artifact.content);
        }
    }

    Ok(())
}
