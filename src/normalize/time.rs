//! Clock time cleaning and duration computation.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDateTime};
use regex::Regex;
use serde_json::Value;

static CLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}):(\d{2})").expect("valid regex"));

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// First `H:MM`/`HH:MM` in the text, hour zero-padded. Empty if none.
pub fn clean_time(text: &str) -> String {
    CLOCK_RE
        .captures(text)
        .map(|c| format!("{:0>2}:{}", &c[1], &c[2]))
        .unwrap_or_default()
}

/// [`clean_time`] over a raw field value.
pub fn clean_time_value(value: &Value) -> String {
    match value {
        Value::String(s) => clean_time(s),
        _ => String::new(),
    }
}

/// Parse a full date-time. Bare clock times return None.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
}

/// Minutes between two full date-times; None unless both carry a date.
pub fn duration_minutes(departure: &Value, arrival: &Value) -> Option<i64> {
    let departure = parse_datetime(departure.as_str()?)?;
    let arrival = parse_datetime(arrival.as_str()?)?;
    let minutes = (arrival - departure).num_minutes();
    if minutes >= 0 {
        Some(minutes)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clean_time_pads_hour() {
        assert_eq!(clean_time("8:05"), "08:05");
        assert_eq!(clean_time("23:59"), "23:59");
    }

    #[test]
    fn test_clean_time_in_noisy_text() {
        assert_eq!(clean_time("Sale a las 7:30 hs"), "07:30");
        assert_eq!(clean_time("2025-01-10T21:45:00-03:00"), "21:45");
        assert_eq!(clean_time("salida 06:10 / llegada 18:00"), "06:10");
    }

    #[test]
    fn test_clean_time_no_match() {
        assert_eq!(clean_time(""), "");
        assert_eq!(clean_time("a confirmar"), "");
        assert_eq!(clean_time("7.30"), "");
        assert_eq!(clean_time_value(&json!(730)), "");
        assert_eq!(clean_time_value(&Value::Null), "");
    }

    #[test]
    fn test_parse_datetime() {
        assert!(parse_datetime("2025-01-10T08:00:00").is_some());
        assert!(parse_datetime("2025-01-10 08:00").is_some());
        assert!(parse_datetime("2025-01-10T08:00:00-03:00").is_some());
        assert!(parse_datetime("10/01/2025 08:00").is_some());
        assert!(parse_datetime("08:00").is_none());
    }

    #[test]
    fn test_duration_across_midnight() {
        let dep = json!("2025-01-10T22:30:00");
        let arr = json!("2025-01-11T08:15:00");
        assert_eq!(duration_minutes(&dep, &arr), Some(585));
    }

    #[test]
    fn test_duration_with_offsets() {
        let dep = json!("2025-01-10T22:30:00-03:00");
        let arr = json!("2025-01-11T01:30:00Z");
        assert_eq!(duration_minutes(&dep, &arr), Some(0));
    }

    #[test]
    fn test_duration_bare_clock_times_not_guessed() {
        assert_eq!(duration_minutes(&json!("22:30"), &json!("08:15")), None);
        assert_eq!(
            duration_minutes(&json!("2025-01-10T22:30:00"), &json!("08:15")),
            None
        );
    }
}
