//! Poll policy: cadence, bounds, and which resolution states end the wait.

use std::time::Duration;

use srcbatch_types::ResolutionState;
use srcbatch_util::{ConfigError, PollSettings};

/// Delay between resolution polls unless configured otherwise.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
/// Overall deadline for the polling phase unless configured otherwise.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(30 * 60);
/// Floor applied to the interval so a zero setting cannot spin.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How a single resolution snapshot is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionOutcome {
    Pending,
    Succeeded,
    Failed,
}

/// Resolution states that end polling, split by outcome. States in neither set
/// keep the poller waiting, including labels the remote adds later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalStates {
    pub success: Vec<ResolutionState>,
    pub failure: Vec<ResolutionState>,
}

impl Default for TerminalStates {
    fn default() -> Self {
        Self {
            success: vec![ResolutionState::Completed],
            failure: vec![ResolutionState::Failed, ResolutionState::Errored],
        }
    }
}

impl TerminalStates {
    /// Build from remote labels. An empty side keeps its default.
    pub fn from_labels<S, F>(success: S, failure: F) -> Self
    where
        S: IntoIterator,
        S::Item: AsRef<str>,
        F: IntoIterator,
        F::Item: AsRef<str>,
    {
        let defaults = Self::default();
        let success: Vec<ResolutionState> = success
            .into_iter()
            .map(|label| ResolutionState::from_label(label.as_ref()))
            .collect();
        let failure: Vec<ResolutionState> = failure
            .into_iter()
            .map(|label| ResolutionState::from_label(label.as_ref()))
            .collect();
        Self {
            success: if success.is_empty() { defaults.success } else { success },
            failure: if failure.is_empty() { defaults.failure } else { failure },
        }
    }

    /// Failure wins when a state is listed on both sides.
    pub fn classify(&self, state: &ResolutionState) -> ResolutionOutcome {
        if self.failure.contains(state) {
            ResolutionOutcome::Failed
        } else if self.success.contains(state) {
            ResolutionOutcome::Succeeded
        } else {
            ResolutionOutcome::Pending
        }
    }
}

/// Bounds and cadence for the resolution poller.
///
/// Reaching either `timeout` or `max_attempts` ends the wait with
/// `BatchError::TimedOut`; `None` disables that bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Option<Duration>,
    pub max_attempts: Option<u32>,
    pub terminal_states: TerminalStates,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            timeout: Some(DEFAULT_POLL_TIMEOUT),
            max_attempts: None,
            terminal_states: TerminalStates::default(),
        }
    }
}

impl PollPolicy {
    /// Defaults overridden by whatever the settings specify.
    pub fn from_settings(settings: &PollSettings) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            interval: settings.interval()?.unwrap_or(defaults.interval),
            timeout: settings.timeout()?.or(defaults.timeout),
            max_attempts: settings.max_attempts.filter(|max| *max > 0).or(defaults.max_attempts),
            terminal_states: TerminalStates::from_labels(&settings.success_states, &settings.failure_states),
        })
    }

    /// Interval actually slept between polls.
    pub fn effective_interval(&self) -> Duration {
        self.interval.max(MIN_POLL_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_terminal_states_classify_known_labels() {
        let states = TerminalStates::default();
        assert_eq!(states.classify(&ResolutionState::Completed), ResolutionOutcome::Succeeded);
        assert_eq!(states.classify(&ResolutionState::Failed), ResolutionOutcome::Failed);
        assert_eq!(states.classify(&ResolutionState::Errored), ResolutionOutcome::Failed);
        assert_eq!(states.classify(&ResolutionState::Queued), ResolutionOutcome::Pending);
        assert_eq!(states.classify(&ResolutionState::Processing), ResolutionOutcome::Pending);
    }

    #[test]
    fn unknown_labels_keep_waiting() {
        let states = TerminalStates::default();
        assert_eq!(
            states.classify(&ResolutionState::from_label("PARTIALLY_RESOLVED")),
            ResolutionOutcome::Pending
        );
    }

    #[test]
    fn configured_labels_replace_one_side_only() {
        let states = TerminalStates::from_labels(Vec::<String>::new(), ["failed", "canceled"]);
        assert_eq!(states.success, vec![ResolutionState::Completed]);
        assert_eq!(states.classify(&ResolutionState::Canceled), ResolutionOutcome::Failed);
        assert_eq!(states.classify(&ResolutionState::Errored), ResolutionOutcome::Pending);
    }

    #[test]
    fn failure_wins_over_success() {
        let states = TerminalStates::from_labels(["COMPLETED"], ["COMPLETED"]);
        assert_eq!(states.classify(&ResolutionState::Completed), ResolutionOutcome::Failed);
    }

    #[test]
    fn settings_override_defaults() {
        let settings = PollSettings {
            interval: Some("2s".into()),
            max_attempts: Some(12),
            success_states: vec!["COMPLETED".into(), "CANCELED".into()],
            ..Default::default()
        };

        let policy = PollPolicy::from_settings(&settings).unwrap();

        assert_eq!(policy.interval, Duration::from_secs(2));
        assert_eq!(policy.timeout, Some(DEFAULT_POLL_TIMEOUT));
        assert_eq!(policy.max_attempts, Some(12));
        assert_eq!(
            policy.terminal_states.classify(&ResolutionState::Canceled),
            ResolutionOutcome::Succeeded
        );
    }

    #[test]
    fn invalid_settings_are_reported() {
        let settings = PollSettings {
            interval: Some("soon".into()),
            ..Default::default()
        };
        assert!(PollPolicy::from_settings(&settings).is_err());
    }

    #[test]
    fn zero_interval_is_floored() {
        let policy = PollPolicy {
            interval: Duration::ZERO,
            ..Default::default()
        };
        assert_eq!(policy.effective_interval(), MIN_POLL_INTERVAL);
    }
}
