//! Bounded recursive search for a trip list inside an unknown JSON shape.

use serde_json::Value;

use crate::normalize::fields;

/// Default depth budget for [`find_trip_list`].
pub const DEFAULT_DEPTH: usize = 5;

/// Keys checked before any other when descending into an object.
pub const PREFERRED_KEYS: &[&str] = &[
    "departures",
    "trips",
    "results",
    "data",
    "services",
    "viajes",
    "servicios",
];

/// Whether a value looks like a single trip record.
///
/// A trip has a departure-time-like field or an operator-identifying field.
pub fn looks_like_trip(value: &Value) -> bool {
    value.is_object()
        && (fields::has_any(value, fields::DEPARTURE)
            || fields::has_any(value, fields::OPERATOR)
            || fields::has_any(value, fields::OPERATOR_ID))
}

/// Find the first list of trip-like records within `depth` levels.
///
/// Arrays are accepted when their first element looks like a trip. Objects
/// are searched through [`PREFERRED_KEYS`] first, then through every other
/// nested object or array. Returns empty once the budget is exhausted.
pub fn find_trip_list(value: &Value, depth: usize) -> Vec<Value> {
    if depth == 0 {
        return Vec::new();
    }

    match value {
        Value::Array(items) => {
            if items.first().is_some_and(looks_like_trip) {
                items.clone()
            } else {
                Vec::new()
            }
        }
        Value::Object(map) => {
            for key in PREFERRED_KEYS {
                if let Some(nested) = map.get(*key) {
                    let found = find_trip_list(nested, depth - 1);
                    if !found.is_empty() {
                        return found;
                    }
                }
            }

            for (key, nested) in map {
                if PREFERRED_KEYS.contains(&key.as_str()) {
                    continue;
                }
                if nested.is_object() || nested.is_array() {
                    let found = find_trip_list(nested, depth - 1);
                    if !found.is_empty() {
                        return found;
                    }
                }
            }

            Vec::new()
        }
        _ => Vec::new(),
    }
}

/// Extract a value from nested JSON using dot-notation path.
pub fn extract_path<'a>(data: &'a Value, path: &str) -> &'a Value {
    if path.is_empty() {
        return data;
    }

    let mut current = data;
    for key in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(key).unwrap_or(&Value::Null),
            Value::Array(arr) => {
                if let Ok(idx) = key.parse::<usize>() {
                    arr.get(idx).unwrap_or(&Value::Null)
                } else {
                    &Value::Null
                }
            }
            _ => &Value::Null,
        };
    }

    current
}
