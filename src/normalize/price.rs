//! Price parsing, unit policy and display formatting.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default threshold above which a price is taken to be in centavos.
pub const DEFAULT_MINOR_UNIT_THRESHOLD: f64 = 1000.0;

/// How to read prices that may be in minor currency units.
///
/// Some backends report centavos instead of pesos with no unit marker. The
/// heuristic divides any value strictly greater than the threshold by 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricePolicy {
    pub minor_unit_heuristic: bool,
    pub minor_unit_threshold: f64,
}

impl Default for PricePolicy {
    fn default() -> Self {
        Self {
            minor_unit_heuristic: true,
            minor_unit_threshold: DEFAULT_MINOR_UNIT_THRESHOLD,
        }
    }
}

impl PricePolicy {
    /// Policy that never converts.
    pub fn major_units() -> Self {
        Self {
            minor_unit_heuristic: false,
            ..Self::default()
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        if self.minor_unit_heuristic && value > self.minor_unit_threshold {
            value / 100.0
        } else {
            value
        }
    }
}

/// Parse a price from a number or numeric string. Negative values are rejected.
pub fn parse_price(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => parse_amount(s)?,
        _ => return None,
    };
    if amount.is_finite() && amount >= 0.0 {
        Some(amount)
    } else {
        None
    }
}

/// Parse `"$ 12.500,50"`, `"12500.50"` or `"12.500"` into a number.
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .trim_start_matches("ARS")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '$')
        .collect();
    if cleaned.is_empty() {
        return None;
    }

    let normalized = if cleaned.contains(',') {
        // Local format: dots group thousands, comma marks decimals
        cleaned.replace('.', "").replacen(',', ".", 1)
    } else if is_dot_grouped(&cleaned) {
        cleaned.replace('.', "")
    } else {
        cleaned
    };
    normalized.parse().ok()
}

/// `1.234` or `12.345.678`: dots every three digits.
fn is_dot_grouped(text: &str) -> bool {
    let mut groups = text.split('.');
    let Some(head) = groups.next() else {
        return false;
    };
    let tail: Vec<&str> = groups.collect();
    !tail.is_empty()
        && (1..=3).contains(&head.len())
        && head.chars().all(|c| c.is_ascii_digit())
        && tail
            .iter()
            .all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()))
}

/// Format as Argentine pesos: `$12.500`, `$58.500,5`.
///
/// Up to three decimals, trailing zeros dropped.
pub fn format_ars(value: f64) -> String {
    let negative = value < 0.0;
    let scaled = (value.abs() * 1000.0).round() as u64;
    let integer = scaled / 1000;
    let fraction = scaled % 1000;

    let digits = integer.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let mut out = String::from("$");
    if negative && scaled > 0 {
        out.push('-');
    }
    out.push_str(&grouped);
    if fraction > 0 {
        let decimals = format!("{:03}", fraction);
        out.push(',');
        out.push_str(decimals.trim_end_matches('0'));
    }
    out
}
