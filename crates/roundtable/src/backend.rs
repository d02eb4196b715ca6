//! rig-backed [`Generator`] for OpenAI-compatible servers (Ollama, llama.cpp,
//! vLLM) plus a caller-side retry wrapper.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use coordination::{GenerationError, Generator};
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::openai;
use tracing::{debug, warn};

use crate::config::BackendConfig;

/// One-shot completions against a single endpoint.
///
/// Every call builds a fresh rig agent; the prompt already carries the role
/// and both contexts, so no preamble or history is attached.
pub struct RigGenerator {
    client: openai::CompletionsClient,
    temperature: f64,
    timeout: Option<Duration>,
}

impl RigGenerator {
    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        let client = openai::CompletionsClient::builder()
            .api_key(&config.api_key)
            .base_url(&config.base_url)
            .build()
            .with_context(|| format!("Failed to build completions client for {}", config.base_url))?;
        Ok(Self {
            client,
            temperature: config.temperature,
            timeout: config.request_timeout_secs.map(Duration::from_secs),
        })
    }
}

#[async_trait]
impl Generator for RigGenerator {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        let agent = self.client.agent(model).temperature(self.temperature).build();

        let response = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, agent.prompt(prompt))
                .await
                .map_err(|_| GenerationError::Timeout(limit.as_secs()))?,
            None => agent.prompt(prompt).await,
        }
        .map_err(|e| GenerationError::Backend(e.to_string()))?;

        if response.trim().is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        debug!(model, chars = response.len(), "completion received");
        Ok(response)
    }
}

/// Retries transient failures of an inner generator.
///
/// `Backend` and `Timeout` errors are retried up to `max_retries` times,
/// sleeping `backoff * attempt` between tries. Empty responses are returned
/// as-is. With `max_retries == 0` this is a pass-through.
pub struct RetryingGenerator<G> {
    inner: G,
    max_retries: u32,
    backoff: Duration,
}

impl<G: Generator> RetryingGenerator<G> {
    pub fn new(inner: G, max_retries: u32) -> Self {
        Self {
            inner,
            max_retries,
            backoff: Duration::from_secs(2),
        }
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }
}

fn is_transient(err: &GenerationError) -> bool {
    matches!(err, GenerationError::Backend(_) | GenerationError::Timeout(_))
}

#[async_trait]
impl<G: Generator> Generator for RetryingGenerator<G> {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        let mut attempt = 0u32;
        loop {
            match self.inner.generate(model, prompt).await {
                Ok(text) => return Ok(text),
                Err(e) if is_transient(&e) && attempt < self.max_retries => {
                    attempt += 1;
                    let backoff = self.backoff * attempt;
                    warn!(
                        attempt,
                        max_retries = self.max_retries,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %e,
                        "Transient generation error, retrying"
                    );
                    tokio::time::sleep(backoff).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Build the generator stack described by `config`.
pub fn build_generator(config: &BackendConfig) -> Result<RetryingGenerator<RigGenerator>> {
    Ok(RetryingGenerator::new(
        RigGenerator::from_config(config)?,
        config.max_retries,
    ))
}

/// Check if an inference endpoint is reachable (GET `{url}/models`).
pub async fn check_endpoint(url: &str) -> bool {
    let models_url = format!("{}/models", url.trim_end_matches('/'));
    match reqwest::Client::new()
        .get(&models_url)
        .timeout(Duration::from_secs(5))
        .send()
        .await
    {
        Ok(resp) => resp.status().is_success(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    mockall::mock! {
        Backend {}
        #[async_trait]
        impl Generator for Backend {
            async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError>;
        }
    }

    fn failing_then_ok(failures: u32, err: GenerationError) -> (MockBackend, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let mut mock = MockBackend::new();
        mock.expect_generate().returning(move |_, _| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            if n < failures {
                Err(err.clone())
            } else {
                Ok("ok".to_string())
            }
        });
        (mock, calls)
    }

    #[tokio::test(start_paused = true)]
    async fn transient_errors_are_retried() {
        let (mock, calls) = failing_then_ok(2, GenerationError::Backend("503".into()));
        let gen = RetryingGenerator::new(mock, 3);

        assert_eq!(gen.generate("m", "p").await.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_stop_at_the_limit() {
        let (mock, calls) = failing_then_ok(10, GenerationError::Timeout(30));
        let gen = RetryingGenerator::new(mock, 2);

        assert_eq!(
            gen.generate("m", "p").await.unwrap_err(),
            GenerationError::Timeout(30)
        );
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_retries_is_a_pass_through() {
        let mut mock = MockBackend::new();
        mock.expect_generate()
            .withf(|model, prompt| model == "llama3.2:3b" && prompt == "hello")
            .times(1)
            .returning(|_, _| Err(GenerationError::Backend("refused".into())));
        let gen = RetryingGenerator::new(mock, 0);

        assert!(gen.generate("llama3.2:3b", "hello").await.is_err());
    }

    #[tokio::test]
    async fn empty_responses_are_not_retried() {
        let mut mock = MockBackend::new();
        mock.expect_generate()
            .times(1)
            .returning(|_, _| Err(GenerationError::EmptyResponse));
        let gen = RetryingGenerator::new(mock, 5);

        assert_eq!(
            gen.generate("m", "p").await.unwrap_err(),
            GenerationError::EmptyResponse
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_reports_false() {
        assert!(!check_endpoint("http://127.0.0.1:1/v1").await);
    }
}
