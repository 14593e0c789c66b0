//! Human-friendly duration parsing for poll intervals and timeouts.

use std::time::Duration;

/// Parse a duration such as `5s`, `2m`, `1h`, `250ms`, or bare seconds (`10`).
///
/// Returns `None` for empty, negative, or otherwise malformed input so callers
/// can decide between a default and an error.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(number) = trimmed.strip_suffix("ms") {
        let value: u64 = number.trim().parse().ok()?;
        return Some(Duration::from_millis(value));
    }
    let last_character = trimmed.chars().last()?;
    if last_character.is_ascii_alphabetic() {
        let number = trimmed[..trimmed.len() - 1].trim();
        let value: u64 = number.parse().ok()?;
        return match last_character {
            's' | 'S' => Some(Duration::from_secs(value)),
            'm' | 'M' => value.checked_mul(60).map(Duration::from_secs),
            'h' | 'H' => value.checked_mul(60 * 60).map(Duration::from_secs),
            _ => None,
        };
    }
    let value: u64 = trimmed.parse().ok()?;
    Some(Duration::from_secs(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_suffixed_values() {
        assert_eq!(parse_duration("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_duration("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_duration("1H"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_duration("250ms"), Some(Duration::from_millis(250)));
    }

    #[test]
    fn bare_numbers_are_seconds() {
        assert_eq!(parse_duration(" 10 "), Some(Duration::from_secs(10)));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("soon"), None);
        assert_eq!(parse_duration("5d"), None);
        assert_eq!(parse_duration("-5s"), None);
    }

    #[test]
    fn rejects_values_that_overflow() {
        assert_eq!(parse_duration("5124095576030432h"), None);
        assert_eq!(parse_duration("307445734561825861m"), None);
        assert_eq!(parse_duration("18446744073709551615s"), Some(Duration::from_secs(u64::MAX)));
    }
}
