//! Utility helpers shared by the srcbatch crates: configuration loading,
//! duration parsing, and secret redaction for logs and error text.

pub mod config;
pub mod duration;

pub use config::{ConfigError, ConfigFile, PollSettings, default_config_path, load_config};
pub use duration::parse_duration;

use once_cell::sync::Lazy;
use regex::Regex;

static REDACTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)(authorization:\s*)([^\r\n]+)",
        r"(?i)([A-Z0-9_]*?(KEY|TOKEN|SECRET|PASSWORD)=)([^\s]+)",
        r"(sgp_)([A-Za-z0-9_]+)",
    ]
    .iter()
    .filter_map(|pattern| Regex::new(pattern).ok())
    .collect()
});

/// Redacts values that look like secrets in a string.
pub fn redact_sensitive(input: &str) -> String {
    let mut redacted = input.to_string();
    for pattern in REDACTION_PATTERNS.iter() {
        redacted = pattern
            .replace_all(&redacted, |caps: &regex::Captures| {
                let prefix = caps.get(1).map(|m| m.as_str()).unwrap_or("");
                format!("{}<redacted>", prefix)
            })
            .to_string();
    }
    redacted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_authorization_headers() {
        let redacted = redact_sensitive("Authorization: token abc123\nAccept: application/json");
        assert_eq!(redacted, "Authorization: <redacted>\nAccept: application/json");
    }

    #[test]
    fn redacts_env_assignments_and_access_tokens() {
        let redacted = redact_sensitive("SRC_ACCESS_TOKEN=secret-value rejected sgp_0123abcd");
        assert!(!redacted.contains("secret-value"));
        assert!(!redacted.contains("0123abcd"));
        assert!(redacted.contains("SRC_ACCESS_TOKEN=<redacted>"));
        assert!(redacted.contains("sgp_<redacted>"));
    }

    #[test]
    fn leaves_plain_text_alone() {
        assert_eq!(redact_sensitive("workspace resolution failed"), "workspace resolution failed");
    }
}
