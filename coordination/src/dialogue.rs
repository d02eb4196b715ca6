//! Turn-taking protocol for multi-agent dialogues.
//!
//! ```text
//! Panel (W writers, R rounds):
//!   for round in 0..R
//!     for questioner in writers (roster order)
//!       questioner asks                      → transcript
//!       for respondent in writers (roster order, questioner included)
//!         respondent answers                 → transcript
//!         others   += "{respondent}'s answer: …"
//!         respondent += "My answer: …"
//!       separator                            → transcript
//!
//! Exchange (first two writers A, B, R rounds):
//!   for round in 0..R
//!     A opens              A += "My question/statement: …"    B += "A's question/statement: …"
//!     B answers + counters B += "My response and question: …" A += "B's response and question: …"
//!     separator
//! ```
//!
//! Every call is awaited before the next one is issued, so an agent's context
//! always reflects all earlier turns when it speaks. Turn order is the roster
//! order; nothing is shuffled.
//!
//! ## Failure policy
//!
//! Participant checks run before any generation call. A generation failure in
//! the middle of a round aborts the whole session: the error propagates, the
//! partial transcript is dropped, and context fragments already appended stay
//! where they are.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::agent::{Agent, Capability};
use crate::errors::CoordinationError;
use crate::observer::{SilentObserver, TurnObserver};
use crate::prompts;
use crate::roster::Roster;
use crate::transcript::{DialogueTranscript, TurnKind};

/// Minimum number of writer-capable agents for any dialogue.
pub const MIN_PARTICIPANTS: usize = 2;

/// Which turn-taking pattern the coordinator runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueStyle {
    /// Every writer asks once per round; every writer answers every question.
    #[default]
    Panel,
    /// Two writers alternate opening statement and rejoinder.
    Exchange,
}

impl std::fmt::Display for DialogueStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Panel => write!(f, "panel"),
            Self::Exchange => write!(f, "exchange"),
        }
    }
}

/// Drives a fixed number of rounds across the writers of a roster.
pub struct DialogueCoordinator {
    style: DialogueStyle,
    rounds: usize,
    observer: Arc<dyn TurnObserver>,
}

impl DialogueCoordinator {
    pub fn new(style: DialogueStyle, rounds: usize) -> Self {
        Self {
            style,
            rounds,
            observer: Arc::new(SilentObserver),
        }
    }

    pub fn with_observer(mut self, observer: Arc<dyn TurnObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn style(&self) -> DialogueStyle {
        self.style
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Run the dialogue to completion, mutating the writers' individual context.
    pub async fn run(
        &self,
        roster: &mut Roster,
        topic: &str,
    ) -> Result<DialogueTranscript, CoordinationError> {
        let writers = roster.indices_with(Capability::Writer);
        if writers.len() < MIN_PARTICIPANTS {
            return Err(CoordinationError::InsufficientParticipants {
                required: MIN_PARTICIPANTS,
                found: writers.len(),
            });
        }

        info!(
            style = %self.style,
            rounds = self.rounds,
            writers = writers.len(),
            topic,
            "dialogue starting"
        );

        let mut transcript = DialogueTranscript::new(topic);
        match self.style {
            DialogueStyle::Panel => {
                self.run_panel(roster.agents_mut(), &writers, topic, &mut transcript)
                    .await?
            }
            DialogueStyle::Exchange => {
                if writers.len() > MIN_PARTICIPANTS {
                    warn!(
                        writers = writers.len(),
                        "exchange dialogue uses only the first two writers"
                    );
                }
                let pair = [writers[0], writers[1]];
                self.run_exchange(roster.agents_mut(), pair, topic, &mut transcript)
                    .await?
            }
        }

        info!(
            turns = transcript.turn_count(),
            separators = transcript.separator_count(),
            "dialogue complete"
        );
        Ok(transcript)
    }

    async fn run_panel(
        &self,
        agents: &mut [Agent],
        writers: &[usize],
        topic: &str,
        transcript: &mut DialogueTranscript,
    ) -> Result<(), CoordinationError> {
        for round in 0..self.rounds {
            for &qi in writers {
                let questioner = &agents[qi];
                let question = questioner
                    .respond(&prompts::panel_question(round, questioner.role(), topic))
                    .await?;
                debug!(round, agent = %questioner.name(), "question asked");
                self.observer.on_response(questioner.name(), &question);
                transcript.record(round, questioner.name(), TurnKind::Question, &question);

                for &ri in writers {
                    let respondent = &agents[ri];
                    let answer = respondent
                        .respond(&prompts::panel_answer(respondent.role(), topic, &question))
                        .await?;
                    let name = respondent.name().to_string();
                    debug!(round, agent = %name, "question answered");
                    self.observer.on_response(&name, &answer);
                    transcript.record(round, &name, TurnKind::Answer, &answer);

                    fan_out(
                        agents,
                        writers,
                        ri,
                        &prompts::peer_answer(&name, &answer),
                        prompts::own_answer(&answer),
                    );
                }

                transcript.separator();
            }
        }
        Ok(())
    }

    async fn run_exchange(
        &self,
        agents: &mut [Agent],
        pair: [usize; 2],
        topic: &str,
        transcript: &mut DialogueTranscript,
    ) -> Result<(), CoordinationError> {
        let [a, b] = pair;
        let opener = agents[a].name().to_string();
        let partner = agents[b].name().to_string();

        for round in 0..self.rounds {
            let opening = agents[a]
                .respond(&prompts::exchange_opening(round, topic, &partner))
                .await?;
            debug!(round, agent = %opener, "opening statement");
            self.observer.on_response(&opener, &opening);
            transcript.record(round, &opener, TurnKind::Question, &opening);
            fan_out(
                agents,
                &pair,
                a,
                &prompts::peer_opening(&opener, &opening),
                prompts::own_opening(&opening),
            );

            let rejoinder = agents[b]
                .respond(&prompts::exchange_rejoinder(round, topic, &opener, &opening))
                .await?;
            debug!(round, agent = %partner, "rejoinder");
            self.observer.on_response(&partner, &rejoinder);
            transcript.record(round, &partner, TurnKind::Rejoinder, &rejoinder);
            fan_out(
                agents,
                &pair,
                b,
                &prompts::peer_rejoinder(&partner, &rejoinder),
                prompts::own_rejoinder(&rejoinder),
            );

            transcript.separator();
        }
        Ok(())
    }
}

/// Third-person note to every other participant, first-person note to the speaker.
fn fan_out(
    agents: &mut [Agent],
    participants: &[usize],
    speaker: usize,
    peer_note: &str,
    own_note: String,
) {
    for &i in participants.iter().filter(|&&i| i != speaker) {
        agents[i].update_individual(peer_note);
    }
    agents[speaker].update_individual(own_note);
}
