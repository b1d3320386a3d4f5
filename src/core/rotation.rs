//! # Rotations
//!
//! Time-driven message cycling without ambient timers.
//!
//! A `Rotation` records when it was started; the current index is derived
//! from the elapsed time whenever the UI asks for it. Starting it again
//! restarts from index 0, stopping it freezes it at index 0.
//!
//! ```text
//!  start(t0)         t0+step        t0+2*step
//!     │── index 0 ──│── index 1 ──│── index 2 ── ...
//! ```

use std::time::{Duration, Instant};

/// Interval between placeholder messages while a query is in flight.
pub const PLACEHOLDER_STEP: Duration = Duration::from_millis(3000);

/// Status lines shown in the pending reply bubble while the backend works.
pub const PLACEHOLDER_MESSAGES: &[&str] = &[
    "Warming up the local brain 🧠",
    "Fetching the repo from GitHub... 🚀",
    "Unpacking the code treasures 🗃️",
    "LLM is reading every line carefully 📖",
    "Summoning the AI wisdom... ✨",
    "Cross-referencing files for accuracy 🔍",
    "Analyzing repo structure... 🏗️",
    "Compiling insights... 🔧",
    "Almost there! Aligning neurons ⚡",
    "Finishing touches and polishing the answer 🎨",
    "Preparing your answer with extra clarity 📝",
    "Patience, the AI is thinking deeply... 🤔",
    "Initializing local environment... 🖥️",
    "Syncing branches and commits 🌿",
    "Parsing functions and dependencies 🔩",
    "Extracting logic from spaghetti 🍝",
    "Checking for missing semicolons 😬",
    "Decoding developer thoughts 💭",
    "Peeking inside nested loops 🌀",
    "Collecting context from README 🧾",
    "Examining import statements 📦",
    "Letting the LLM stretch its neurons 🧘‍♂️",
    "Looking for the main character: index.js 🎯",
    "Inspecting suspicious TODOs 👀",
    "Sweeping through modules like a detective 🕵️‍♂️",
    "Buffering a few extra IQ points 🤓",
    "Waiting for git pull to finish... still waiting... ⏳",
    "Skimming commit history for gossip 🗞️",
    "De-minifying minified files 😵‍💫",
    "Sanitizing variable names 🧼",
    "Running code through mental linters ✅",
    "Building dependency graph 🕸️",
    "Assembling context puzzle pieces 🧩",
    "Untangling async functions ⏱️",
    "Converting caffeine to computation ☕",
    "Refactoring in its mind... just because 🧠",
    "Verifying logic against the README promises 📚",
    "Resolving merge conflicts of existence 🧨",
    "Loading too much code... regretting life choices 😅",
    "Sniffing out hidden bugs 🐛",
    "Thinking in binary, dreaming in JSON 💭",
    "Hashing thoughts for version control 🪄",
    "Re-indexing its memory cache 🧮",
    "Reconfirming with the local LLM overlord 🤖",
    "Spinning up a few more neurons for safety 🧬",
    "Counting closing brackets for peace of mind 🧩",
    "Chasing missing dependencies 🐾",
    "One more check... because AI paranoia 😐",
    "Almost done! Packaging insights 🎁",
    "Finalizing the masterpiece... 🪶",
    "CodeLens is ready to respond 💡",
];

/// What happens after the last message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtEnd {
    /// Start over at index 0.
    Wrap,
    /// Stay on the last message.
    Hold,
}

#[derive(Debug, Clone)]
pub struct Rotation {
    len: usize,
    step: Duration,
    at_end: AtEnd,
    started_at: Option<Instant>,
}

impl Rotation {
    pub const fn new(len: usize, step: Duration, at_end: AtEnd) -> Self {
        Self {
            len,
            step,
            at_end,
            started_at: None,
        }
    }

    /// Rotation over [`PLACEHOLDER_MESSAGES`], 3 s per message, wrapping.
    pub const fn placeholder() -> Self {
        Self::new(PLACEHOLDER_MESSAGES.len(), PLACEHOLDER_STEP, AtEnd::Wrap)
    }

    /// (Re)start from index 0 at `now`.
    pub fn start(&mut self, now: Instant) {
        self.started_at = Some(now);
    }

    pub fn stop(&mut self) {
        self.started_at = None;
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Number of whole steps elapsed since `start`.
    fn steps_at(&self, now: Instant) -> u128 {
        match self.started_at {
            Some(started) if !self.step.is_zero() => {
                now.saturating_duration_since(started).as_millis() / self.step.as_millis()
            }
            _ => 0,
        }
    }

    /// Index of the message to show at `now`. Always 0 while stopped.
    pub fn index_at(&self, now: Instant) -> usize {
        if self.len == 0 {
            return 0;
        }
        let steps = self.steps_at(now);
        let len = self.len as u128;
        let index = match self.at_end {
            AtEnd::Wrap => steps % len,
            AtEnd::Hold => steps.min(len - 1),
        };
        index as usize
    }

    /// Whether a `Hold` rotation has reached its final message.
    pub fn is_at_end(&self, now: Instant) -> bool {
        self.at_end == AtEnd::Hold && self.len > 0 && self.index_at(now) == self.len - 1
    }

    /// Time spent on the current message so far.
    pub fn phase_at(&self, now: Instant) -> Duration {
        match self.started_at {
            Some(started) if !self.step.is_zero() => {
                let elapsed = now.saturating_duration_since(started).as_millis();
                let phase = elapsed % self.step.as_millis();
                Duration::from_millis(phase as u64)
            }
            _ => Duration::ZERO,
        }
    }
}
