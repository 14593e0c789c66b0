//! Command line arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use srcbatch_engine::{PollPolicy, TerminalStates};
use srcbatch_types::BatchSpecFlags;
use srcbatch_util::{ConfigError, PollSettings, parse_duration};

#[derive(Parser, Debug)]
#[command(
    name = "srcbatch",
    version,
    about = "Run Sourcegraph batch specs on the server instead of locally",
    after_help = "Environment:\n  SRC_ENDPOINT          Sourcegraph instance URL (default https://sourcegraph.com)\n  SRC_ACCESS_TOKEN      Access token sent as `Authorization: token ...`\n  SRC_ALLOW_INSECURE    Set to 1 to allow http for non-local hosts\n  SRCBATCH_CONFIG_PATH  Config file overriding ~/.config/srcbatch/config.json",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit a batch spec, execute it server-side, and wait for workspace resolution
    Remote(RemoteArgs),
}

#[derive(Args, Debug)]
pub struct RemoteArgs {
    /// Name of the batch change to create or reuse
    #[arg(long, value_name = "NAME")]
    pub name: String,

    /// GraphQL ID of the owning user or organization
    #[arg(long, value_name = "ID")]
    pub namespace: String,

    /// Batch spec file, or `-` for stdin
    #[arg(long, short = 'f', value_name = "PATH")]
    pub file: PathBuf,

    /// Include repositories excluded by .batchignore
    #[arg(long)]
    pub allow_ignored: bool,

    /// Include repositories on unsupported code hosts
    #[arg(long)]
    pub allow_unsupported: bool,

    /// Ignore cached step results
    #[arg(long)]
    pub no_cache: bool,

    /// Delay between workspace resolution polls, e.g. 5s
    #[arg(long, value_name = "DURATION", value_parser = duration_arg)]
    pub poll_interval: Option<Duration>,

    /// Stop waiting after this long, e.g. 30m
    #[arg(long, value_name = "DURATION", value_parser = duration_arg)]
    pub timeout: Option<Duration>,

    /// Stop waiting after this many polls
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub max_attempts: Option<u32>,

    /// Resolution state treated as success (repeatable)
    #[arg(long = "success-state", value_name = "STATE")]
    pub success_states: Vec<String>,

    /// Resolution state treated as failure (repeatable)
    #[arg(long = "failure-state", value_name = "STATE")]
    pub failure_states: Vec<String>,
}

impl RemoteArgs {
    pub fn flags(&self) -> BatchSpecFlags {
        BatchSpecFlags {
            allow_ignored: self.allow_ignored,
            allow_unsupported: self.allow_unsupported,
            no_cache: self.no_cache,
        }
    }

    /// Poll policy from built-in defaults, then the config file, then flags.
    pub fn poll_policy(&self, settings: &PollSettings) -> Result<PollPolicy, ConfigError> {
        let mut policy = PollPolicy::from_settings(settings)?;
        if let Some(interval) = self.poll_interval {
            policy.interval = interval;
        }
        if let Some(timeout) = self.timeout {
            policy.timeout = Some(timeout);
        }
        if let Some(max_attempts) = self.max_attempts {
            policy.max_attempts = Some(max_attempts);
        }
        if !self.success_states.is_empty() || !self.failure_states.is_empty() {
            let success = if self.success_states.is_empty() {
                &settings.success_states
            } else {
                &self.success_states
            };
            let failure = if self.failure_states.is_empty() {
                &settings.failure_states
            } else {
                &self.failure_states
            };
            policy.terminal_states = TerminalStates::from_labels(success, failure);
        }
        Ok(policy)
    }
}

fn duration_arg(raw: &str) -> Result<Duration, String> {
    parse_duration(raw).ok_or_else(|| format!("invalid duration '{raw}' (expected e.g. 500ms, 5s, 2m, 1h)"))
}
