//! Live console output for `--display`.

use std::io::Write;
use std::time::Duration;

use coordination::TurnObserver;
use tokio::runtime::{Handle, RuntimeFlavor};

/// Prints each response one character at a time.
///
/// The per-character sleep blocks. On a multi-thread runtime the print runs
/// under `block_in_place`, so the worker's other tasks move elsewhere.
#[derive(Debug, Clone)]
pub struct TypewriterObserver {
    delay: Duration,
}

impl TypewriterObserver {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    /// Write the banner and `text` to `out`, sleeping `delay` per character.
    pub fn render_to(&self, out: &mut impl Write, agent: &str, text: &str) -> std::io::Result<()> {
        writeln!(out, "\n{agent} is responding:")?;
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            out.write_all(ch.encode_utf8(&mut buf).as_bytes())?;
            out.flush()?;
            if !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }
        }
        writeln!(out)?;
        out.flush()
    }
}

impl Default for TypewriterObserver {
    fn default() -> Self {
        Self::new(Duration::from_millis(10))
    }
}

impl TurnObserver for TypewriterObserver {
    fn on_response(&self, agent: &str, text: &str) {
        let print = || {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            self.render_to(&mut lock, agent, text)
        };
        let result = match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                tokio::task::block_in_place(print)
            }
            _ => print(),
        };
        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to display response");
        }
    }
}
