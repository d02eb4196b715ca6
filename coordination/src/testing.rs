//! Deterministic backend doubles for tests.
//!
//! [`ScriptedGenerator`] records every prompt it receives and answers from a
//! script, so dialogue and refinement runs can be asserted end-to-end without
//! an inference server.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::backend::{GenerationError, Generator};

type Responder = Box<dyn Fn(usize, &str) -> Result<String, GenerationError> + Send + Sync>;

/// A generator driven by a closure over `(call_number, prompt)`.
///
/// Call numbers start at 1.
pub struct ScriptedGenerator {
    responder: Responder,
    queued: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(usize, &str) -> Result<String, GenerationError> + Send + Sync + 'static,
    {
        Self {
            responder: Box::new(f),
            queued: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Answers `"response {n}"` for the n-th call.
    pub fn echo() -> Self {
        Self::from_fn(|n, _| Ok(format!("response {n}")))
    }

    /// Replays `responses` in order, then falls back to `echo` behaviour.
    pub fn sequence<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let gen = Self::echo();
        *lock(&gen.queued) =
            responses.into_iter().map(Into::into).collect();
        gen
    }

    /// Echoes, except that call `n` fails with a backend error.
    pub fn failing_at(n: usize) -> Self {
        Self::from_fn(move |call, _| {
            if call == n {
                Err(GenerationError::Backend(format!("injected failure on call {call}")))
            } else {
                Ok(format!("response {call}"))
            }
        })
    }

    /// Every prompt received so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Number of prompts containing `needle`.
    pub fn calls_containing(&self, needle: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|p| p.contains(needle))
            .count()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, _model: &str, prompt: &str) -> Result<String, GenerationError> {
        let call = {
            let mut calls = lock(&self.calls);
            calls.push(prompt.to_string());
            calls.len()
        };
        if let Some(next) = lock(&self.queued).pop_front() {
            return Ok(next);
        }
        (self.responder)(call, prompt)
    }
}
