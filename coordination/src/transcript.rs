//! Append-only log of a dialogue session.
//!
//! The transcript is derived output. Agents never read it; what they know
//! about earlier turns comes from their individual context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a turn contributed to the dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    /// A question (panel) or opening statement (exchange).
    Question,
    /// An answer to the current question.
    Answer,
    /// Answer plus counter-question in a two-party exchange.
    Rejoinder,
}

impl TurnKind {
    fn verb(self) -> &'static str {
        match self {
            Self::Question => "asks",
            Self::Answer => "answers",
            Self::Rejoinder => "responds",
        }
    }
}

/// One transcript line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "entry")]
pub enum TranscriptEntry {
    Turn {
        /// Round index (0-based).
        round: usize,
        speaker: String,
        kind: TurnKind,
        text: String,
    },
    /// Cosmetic blank line closing a question cycle.
    Separator,
}

impl TranscriptEntry {
    pub fn speaker(&self) -> Option<&str> {
        match self {
            Self::Turn { speaker, .. } => Some(speaker),
            Self::Separator => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Turn { text, .. } => Some(text),
            Self::Separator => None,
        }
    }

    fn render(&self) -> String {
        match self {
            Self::Turn {
                speaker,
                kind,
                text,
                ..
            } => format!("{speaker} {}: {text}", kind.verb()),
            Self::Separator => String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueTranscript {
    pub topic: String,
    pub started_at: DateTime<Utc>,
    entries: Vec<TranscriptEntry>,
}

impl DialogueTranscript {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            started_at: Utc::now(),
            entries: Vec::new(),
        }
    }

    pub fn record(
        &mut self,
        round: usize,
        speaker: impl Into<String>,
        kind: TurnKind,
        text: impl Into<String>,
    ) {
        self.entries.push(TranscriptEntry::Turn {
            round,
            speaker: speaker.into(),
            kind,
            text: text.into(),
        });
    }

    pub fn separator(&mut self) {
        self.entries.push(TranscriptEntry::Separator);
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Number of question/answer entries, separators excluded.
    pub fn turn_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, TranscriptEntry::Turn { .. }))
            .count()
    }

    pub fn separator_count(&self) -> usize {
        self.entries.len() - self.turn_count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lines joined by `\n`; separators render as empty lines.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(TranscriptEntry::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Rendered transcript under its file header.
    pub fn to_document(&self) -> String {
        format!(
            "Interactive Dialogue on the topic: {}\n\n{}",
            self.topic,
            self.render()
        )
    }
}
