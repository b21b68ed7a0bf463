//! Regex fallbacks for pages without a usable embedded JSON document.
//!
//! Both strategies are permissive: missing optional fragments (duration,
//! seat count, operator) simply leave the field out of the record.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{json, Map, Value};

use super::ExtractError;

static FRAGMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""hora_salida"\s*:\s*"([^"]+)"[^}]*"precio"\s*:\s*(\d+(?:\.\d+)?)"#)
        .expect("valid regex")
});

static ITEM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<div class="r-item[^"]*">(.*?)</div>\s*</div>\s*</div>"#)
        .expect("valid regex")
});
static ALT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"alt="([^"]+)""#).expect("valid regex"));
static LOGO_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img[^>]*\ssrc="([^"]+)""#).expect("valid regex"));
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<div class="h[^"]*">(\d{2}:\d{2})"#).expect("valid regex"));
static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Duraci[oó]n:\s*(\d+)\s*h\s*(\d+)\s*min").expect("valid regex")
});
static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$</span>([0-9.,]+)</span>").expect("valid regex"));
static CATS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?s)<div class="cats">.*?</div>"#).expect("valid regex"));
static TEXT_NODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">([^<]+)<").expect("valid regex"));

/// JSON-ish `"hora_salida": "...", ..., "precio": N` fragments anywhere in text.
pub fn inline_fragments(text: &str) -> Result<Vec<Value>, ExtractError> {
    Ok(FRAGMENT_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let price: f64 = caps[2].parse().ok()?;
            Some(json!({ "hora_salida": &caps[1], "precio": price }))
        })
        .collect())
}

/// Result listing markup: one `r-item` block per service, one record per
/// category/price pair inside it.
pub fn listing_markup(html: &str) -> Result<Vec<Value>, ExtractError> {
    let mut records = Vec::new();

    for item in ITEM_RE.captures_iter(html) {
        let item = &item[1];

        let times: Vec<&str> = TIME_RE
            .captures_iter(item)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();
        if times.len() < 2 {
            continue;
        }
        let (departure, arrival) = (times[0], times[1]);

        let operator = ALT_RE.captures(item).map(|c| c[1].to_string());
        let logo = LOGO_RE.captures(item).map(|c| c[1].to_string());
        let duration = DURATION_RE.captures(item).and_then(|c| {
            let hours: i64 = c[1].parse().ok()?;
            let minutes: i64 = c[2].parse().ok()?;
            Some(hours * 60 + minutes)
        });

        let prices: Vec<f64> = PRICE_RE
            .captures_iter(item)
            .filter_map(|c| parse_local_amount(&c[1]))
            .collect();
        let categories = category_names(item);

        let count = categories.len().max(prices.len());
        for i in 0..count {
            let category = categories.get(i).map(String::as_str).unwrap_or("Servicio");
            let price = prices
                .get(i)
                .or(prices.first())
                .copied()
                .unwrap_or(0.0);
            if price == 0.0 {
                continue;
            }

            let mut record = Map::new();
            let id = match &operator {
                Some(op) => format!("{}-{}-{}", op, departure, category),
                None => format!("{}-{}", departure, category),
            };
            record.insert("id".into(), json!(id));
            if let Some(op) = &operator {
                record.insert("empresa".into(), json!(op));
            }
            if let Some(logo) = &logo {
                record.insert("logo".into(), json!(logo));
            }
            record.insert("hora_salida".into(), json!(departure));
            record.insert("hora_llegada".into(), json!(arrival));
            if let Some(minutes) = duration {
                record.insert("duracion_min".into(), json!(minutes));
            }
            record.insert("servicio".into(), json!(category));
            record.insert("precio".into(), json!(price));
            records.push(Value::Object(record));
        }
    }

    Ok(records)
}

/// Category labels inside the item's `cats` block.
fn category_names(item: &str) -> Vec<String> {
    let Some(block) = CATS_RE.find(item) else {
        return Vec::new();
    };
    TEXT_NODE_RE
        .captures_iter(block.as_str())
        .map(|c| c[1].trim().to_string())
        .filter(|name| name.chars().count() > 3 && !name.contains("div") && !name.contains("from"))
        .collect()
}

/// Parse an es-AR amount: `.` groups thousands, `,` marks decimals.
fn parse_local_amount(text: &str) -> Option<f64> {
    text.replace('.', "").replacen(',', ".", 1).parse().ok()
}
