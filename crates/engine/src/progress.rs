//! Progress reporting seam between the executor and whatever renders status.
//!
//! The executor drives a [`ProgressReporter`] through `reset → update* →
//! complete` once for the setup calls and once for the polling phase.
//! [`StatusBar`] is the reference implementation: it keeps the current label
//! and message and measures elapsed time.

use std::time::{Duration, Instant};

/// Receives progress notifications from the executor.
pub trait ProgressReporter: Send {
    /// Start a new phase: replace label and message and restart the clock.
    fn reset(&mut self, label: &str, message: &str);
    /// Replace the message while the clock keeps running.
    fn update(&mut self, message: &str);
    /// Replace the message and stop the clock.
    fn complete(&mut self, message: &str);
}

/// Status of a running process: a label, a free-form message, and the time
/// spent so far.
#[derive(Debug, Clone, Default)]
pub struct StatusBar {
    completed: bool,
    label: String,
    message: String,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
}

impl StatusBar {
    /// Create a bar with a label whose clock starts now.
    pub fn with_label(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            started_at: Some(Instant::now()),
            ..Default::default()
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Elapsed time truncated to whole seconds.
    ///
    /// `now - start` while running, `finish - start` once completed, and zero
    /// if the clock never started.
    pub fn runtime(&self) -> Duration {
        self.runtime_at(Instant::now())
    }

    fn runtime_at(&self, now: Instant) -> Duration {
        let Some(started_at) = self.started_at else {
            return Duration::ZERO;
        };
        let end = self.finished_at.unwrap_or(now);
        truncate_to_seconds(end.saturating_duration_since(started_at))
    }
}

impl ProgressReporter for StatusBar {
    fn reset(&mut self, label: &str, message: &str) {
        self.completed = false;
        self.label = label.to_string();
        self.message = message.to_string();
        self.started_at = Some(Instant::now());
        self.finished_at = None;
    }

    fn update(&mut self, message: &str) {
        self.message = message.to_string();
    }

    fn complete(&mut self, message: &str) {
        self.completed = true;
        self.message = message.to_string();
        self.finished_at = Some(Instant::now());
    }
}

fn truncate_to_seconds(duration: Duration) -> Duration {
    Duration::from_secs(duration.as_secs())
}
