//! Runtime configuration: backend endpoint, dialogue and refinement settings.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (applied by `main`)
//! 2. `ROUNDTABLE_*` environment variables
//! 3. TOML file passed with `--config`
//! 4. Built-in defaults (Ollama's OpenAI-compatible endpoint, `llama3.2:3b`)
//!
//! ## Environment variables
//!
//! | Variable                        | Field                              |
//! |---------------------------------|------------------------------------|
//! | `ROUNDTABLE_BASE_URL`           | `backend.base_url`                 |
//! | `ROUNDTABLE_API_KEY`            | `backend.api_key`                  |
//! | `ROUNDTABLE_MODEL`              | `backend.model`                    |
//! | `ROUNDTABLE_TIMEOUT_SECS`       | `backend.request_timeout_secs`     |
//! | `ROUNDTABLE_MAX_RETRIES`        | `backend.max_retries`              |
//! | `ROUNDTABLE_QUESTIONS`          | `dialogue.questions_per_writer`    |
//! | `ROUNDTABLE_MAX_ITERATIONS`     | `refinement.max_iterations`        |
//! | `ROUNDTABLE_ACCEPTANCE_PHRASE`  | `refinement.acceptance_phrase`     |
//! | `ROUNDTABLE_OUTPUT_DIR`         | `output_dir`                       |

use std::path::{Path, PathBuf};

use coordination::{DialogueStyle, DEFAULT_ACCEPTANCE_PHRASE, DEFAULT_MAX_ITERATIONS};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ollama serves an OpenAI-compatible API under `/v1`.
const DEFAULT_BASE_URL: &str = "http://localhost:11434/v1";
const DEFAULT_MODEL: &str = "llama3.2:3b";
const DEFAULT_QUESTIONS_PER_WRITER: usize = 3;
const DEFAULT_TEMPERATURE: f64 = 0.7;
const DEFAULT_DISPLAY_DELAY_MS: u64 = 10;

const ENV_BASE_URL: &str = "ROUNDTABLE_BASE_URL";
const ENV_API_KEY: &str = "ROUNDTABLE_API_KEY";
const ENV_MODEL: &str = "ROUNDTABLE_MODEL";
const ENV_TIMEOUT_SECS: &str = "ROUNDTABLE_TIMEOUT_SECS";
const ENV_MAX_RETRIES: &str = "ROUNDTABLE_MAX_RETRIES";
const ENV_QUESTIONS: &str = "ROUNDTABLE_QUESTIONS";
const ENV_MAX_ITERATIONS: &str = "ROUNDTABLE_MAX_ITERATIONS";
const ENV_ACCEPTANCE_PHRASE: &str = "ROUNDTABLE_ACCEPTANCE_PHRASE";
const ENV_OUTPUT_DIR: &str = "ROUNDTABLE_OUTPUT_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// OpenAI-compatible generation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,
    /// Local servers accept any non-empty key.
    pub api_key: String,
    pub model: String,
    pub temperature: f64,
    /// Per-call limit; `None` waits indefinitely.
    pub request_timeout_secs: Option<u64>,
    /// Caller-side retries for transient failures. 0 disables retrying.
    pub max_retries: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: "ollama".to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            request_timeout_secs: None,
            max_retries: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogueConfig {
    /// Rounds; in a panel every writer asks once per round.
    pub questions_per_writer: usize,
    pub style: DialogueStyle,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            questions_per_writer: DEFAULT_QUESTIONS_PER_WRITER,
            style: DialogueStyle::Panel,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RefinementConfig {
    pub max_iterations: u32,
    pub acceptance_phrase: String,
}

impl Default for RefinementConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            acceptance_phrase: DEFAULT_ACCEPTANCE_PHRASE.to_string(),
        }
    }
}

/// Top-level configuration for a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundtableConfig {
    pub backend: BackendConfig,
    pub dialogue: DialogueConfig,
    pub refinement: RefinementConfig,
    /// Directory transcripts and artifacts are written to.
    pub output_dir: PathBuf,
    /// Print responses as they arrive.
    pub display: bool,
    /// Per-character delay for live display.
    pub display_delay_ms: u64,
}

impl Default for RoundtableConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            dialogue: DialogueConfig::default(),
            refinement: RefinementConfig::default(),
            output_dir: PathBuf::from("."),
            display: false,
            display_delay_ms: DEFAULT_DISPLAY_DELAY_MS,
        }
    }
}

impl RoundtableConfig {
    /// Load from an optional TOML file, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply_env_with(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override fields from `lookup`, which maps variable names to values.
    ///
    /// Unparseable numbers are ignored.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup(ENV_BASE_URL) {
            self.backend.base_url = v;
        }
        if let Some(v) = lookup(ENV_API_KEY) {
            self.backend.api_key = v;
        }
        if let Some(v) = lookup(ENV_MODEL) {
            self.backend.model = v;
        }
        if let Some(v) = lookup(ENV_TIMEOUT_SECS).and_then(|v| v.parse().ok()) {
            self.backend.request_timeout_secs = Some(v);
        }
        if let Some(v) = lookup(ENV_MAX_RETRIES).and_then(|v| v.parse().ok()) {
            self.backend.max_retries = v;
        }
        if let Some(v) = lookup(ENV_QUESTIONS).and_then(|v| v.parse().ok()) {
            self.dialogue.questions_per_writer = v;
        }
        if let Some(v) = lookup(ENV_MAX_ITERATIONS).and_then(|v| v.parse().ok()) {
            self.refinement.max_iterations = v;
        }
        if let Some(v) = lookup(ENV_ACCEPTANCE_PHRASE) {
            self.refinement.acceptance_phrase = v;
        }
        if let Some(v) = lookup(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(v);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend.model.trim().is_empty() {
            return Err(ConfigError::Invalid("backend.model must not be empty".into()));
        }
        if self.backend.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "backend.base_url must not be empty".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.backend.temperature) {
            return Err(ConfigError::Invalid(format!(
                "backend.temperature must be in [0, 2], got {}",
                self.backend.temperature
            )));
        }
        if self.backend.request_timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "backend.request_timeout_secs must be > 0".into(),
            ));
        }
        if self.refinement.acceptance_phrase.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "refinement.acceptance_phrase must not be empty".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    #[test]
    fn default_config_validates() {
        let cfg = RoundtableConfig::default();
        cfg.validate().expect("default config should be valid");
        assert_eq!(cfg.backend.model, "llama3.2:3b");
        assert_eq!(cfg.dialogue.questions_per_writer, 3);
        assert_eq!(cfg.refinement.max_iterations, 3);
        assert_eq!(
            cfg.refinement.acceptance_phrase,
            "This summary looks good now!"
        );
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = [
            ("ROUNDTABLE_MODEL", "qwen2.5:7b"),
            ("ROUNDTABLE_QUESTIONS", "5"),
            ("ROUNDTABLE_MAX_RETRIES", "not-a-number"),
            ("ROUNDTABLE_TIMEOUT_SECS", "90"),
        ]
        .into_iter()
        .collect();
        let mut cfg = RoundtableConfig::default();
        cfg.apply_env_with(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.backend.model, "qwen2.5:7b");
        assert_eq!(cfg.dialogue.questions_per_writer, 5);
        assert_eq!(cfg.backend.max_retries, 0);
        assert_eq!(cfg.backend.request_timeout_secs, Some(90));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "display = true\n\n[dialogue]\nstyle = \"exchange\"\n\n[refinement]\nmax_iterations = 5"
        )
        .unwrap();

        let cfg = RoundtableConfig::from_toml_file(file.path()).unwrap();
        assert!(cfg.display);
        assert_eq!(cfg.dialogue.style, DialogueStyle::Exchange);
        assert_eq!(cfg.dialogue.questions_per_writer, 3);
        assert_eq!(cfg.refinement.max_iterations, 5);
        assert_eq!(cfg.backend.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[dialogue\nstyle = ").unwrap();
        assert!(matches!(
            RoundtableConfig::from_toml_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn empty_acceptance_phrase_rejected() {
        let mut cfg = RoundtableConfig::default();
        cfg.refinement.acceptance_phrase = "   ".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn out_of_range_temperature_rejected() {
        let mut cfg = RoundtableConfig::default();
        cfg.backend.temperature = 3.5;
        assert!(cfg.validate().is_err());
    }
}
