//! I/O boundary.
//!
//! Input is a queue of card tokens consumed front to back by INP. When the
//! queue runs dry the machine asks a host-supplied [`LineProvider`] for one
//! more line. Output is a sequence of printed words, flushed as one
//! newline-joined string when a run halts.

use std::collections::VecDeque;

/// Maximum token width taken from an interactive line.
pub const PROMPT_WIDTH: usize = 3;

/// Source of input lines once the deck is exhausted.
pub trait LineProvider {
    /// Produce one line, or `None` if no more input is available.
    fn request_line(&mut self) -> Option<String>;
}

impl<F> LineProvider for F
where
    F: FnMut() -> Option<String>,
{
    fn request_line(&mut self) -> Option<String> {
        self()
    }
}

/// Input queue, output sequence and the interactive fallback.
#[derive(Default)]
pub struct IoBoundary {
    input: VecDeque<String>,
    output: Vec<String>,
    provider: Option<Box<dyn LineProvider>>,
}

impl IoBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the input queue with a deck of tokens.
    pub fn load_deck<I, S>(&mut self, tokens: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input = tokens.into_iter().map(Into::into).collect();
    }

    /// Append one token to the end of the input queue.
    pub fn push_input(&mut self, token: impl Into<String>) {
        self.input.push_back(token.into());
    }

    /// Tokens still waiting in the queue.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.input.iter().map(String::as_str)
    }

    /// Number of tokens still waiting in the queue.
    pub fn pending_len(&self) -> usize {
        self.input.len()
    }

    /// Install the interactive fallback.
    pub fn set_provider(&mut self, provider: Box<dyn LineProvider>) {
        self.provider = Some(provider);
    }

    /// Remove the interactive fallback.
    pub fn clear_provider(&mut self) {
        self.provider = None;
    }

    /// Whether an interactive fallback is installed.
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Take the next input token.
    ///
    /// Pops the queue first; if it is empty, asks the provider and keeps at
    /// most [`PROMPT_WIDTH`] characters of its trimmed line.
    pub fn next_token(&mut self) -> Option<String> {
        if let Some(token) = self.input.pop_front() {
            return Some(token);
        }

        let line = self.provider.as_mut()?.request_line()?;
        let token: String = line.trim().chars().take(PROMPT_WIDTH).collect();
        tracing::debug!(%token, "read token from line provider");
        Some(token)
    }

    /// Append one printed word.
    pub fn emit(&mut self, text: impl Into<String>) {
        self.output.push(text.into());
    }

    /// Output printed so far in this run.
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Join the output with newlines and clear it.
    pub fn take_output(&mut self) -> String {
        let joined = self.output.join("\n");
        self.output.clear();
        joined
    }

    /// Drop queued input and printed output. The provider stays installed.
    pub fn clear(&mut self) {
        self.input.clear();
        self.output.clear();
    }
}

impl std::fmt::Debug for IoBoundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IoBoundary")
            .field("pending_input", &self.input.len())
            .field("output", &self.output)
            .field("provider", &self.provider.is_some())
            .finish()
    }
}
