//! Candidate field names used by the sources for each canonical field.
//!
//! Lookups take the first candidate present with a non-null, non-empty value.

use serde_json::Value;

pub const DEPARTURE: &[&str] = &[
    "hora_salida",
    "departure_time",
    "departureTime",
    "horaSalida",
    "salida",
    "departure",
];
pub const ARRIVAL: &[&str] = &[
    "hora_llegada",
    "arrival_time",
    "arrivalTime",
    "horaLlegada",
    "llegada",
    "arrival",
];
pub const PRICE: &[&str] = &["precio", "price", "importe", "tarifa", "amount"];
pub const OPERATOR: &[&str] = &["empresa", "operator", "operador", "operator_name", "company"];
pub const OPERATOR_ID: &[&str] = &["operator_id", "empresa_id", "company_id"];
pub const LOGO: &[&str] = &["operator_logo", "logo", "empresa_logo", "logo_url"];
pub const CLASS: &[&str] = &["servicio", "service", "clase", "categoria", "category", "class"];
pub const SEATS: &[&str] = &[
    "asientos_disp",
    "available_seats",
    "asientos_libres",
    "seats_available",
];
pub const ID: &[&str] = &["id", "_id", "trip_id", "servicio_id"];
/// Only fields whose name states the unit; bare `duracion`/`duration` are ignored.
pub const DURATION: &[&str] = &["duration_min", "duracion_min"];

/// First candidate field holding a usable value.
pub fn first<'a>(record: &'a Value, candidates: &[&str]) -> Option<&'a Value> {
    candidates
        .iter()
        .filter_map(|name| record.get(*name))
        .find(|v| match v {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        })
}

/// First candidate rendered as text. Nested objects yield their `name`.
pub fn first_text(record: &Value, candidates: &[&str]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|name| record.get(*name))
        .find_map(as_text)
}

fn as_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Object(map) => return map.get("name").or(map.get("nombre")).and_then(as_text),
        _ => return None,
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Integer count from a number or a string with leading digits (`"3 libres"`).
pub fn as_count(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            let end = s
                .char_indices()
                .find(|(i, c)| !(c.is_ascii_digit() || (*i == 0 && *c == '-')))
                .map(|(i, _)| i)
                .unwrap_or(s.len());
            s[..end].parse().ok()
        }
        _ => None,
    }
}

/// Whole minutes from an integer or an all-digit string. Anything else, such
/// as `"12 h 15 min"` or `"12:15"`, is None.
pub fn as_minutes(value: &Value) -> Option<i64> {
    let minutes = match value {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            s.parse().ok()?
        }
        _ => return None,
    };
    (minutes >= 0).then_some(minutes)
}

/// Whether the record carries any of the candidate fields at all.
pub fn has_any(record: &Value, candidates: &[&str]) -> bool {
    first(record, candidates).is_some()
}
