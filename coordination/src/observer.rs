//! Hook invoked after every successful generation, for live display.

/// Receives each response as soon as its agent has produced it.
///
/// Observers see text only; they cannot touch agent context.
pub trait TurnObserver: Send + Sync {
    fn on_response(&self, agent: &str, text: &str);
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl TurnObserver for SilentObserver {
    fn on_response(&self, _agent: &str, _text: &str) {}
}
