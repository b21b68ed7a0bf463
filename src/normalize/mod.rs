//! Mapping of raw source records onto the canonical trip schema.
//!
//! Sources disagree on field names, units and formats. Normalization picks
//! the first usable candidate field for each canonical field, cleans it, and
//! rejects records that cannot describe a bookable trip.

pub mod fields;
pub mod price;
pub mod seat;
pub mod time;

pub use price::{format_ars, PricePolicy};
pub use seat::{amenities, classify};
pub use time::clean_time;

use serde_json::Value;

use crate::models::{sort_by_departure, CanonicalTrip};

/// Operator name used when the source does not name one.
pub const DEFAULT_OPERATOR: &str = "Operador";

/// Class label used when the source does not provide one.
pub const DEFAULT_CLASS: &str = "Servicio";

/// Per-batch settings for [`normalize`].
#[derive(Debug, Clone)]
pub struct NormalizeContext {
    /// Tag written to every trip's `source` field.
    pub source_tag: String,
    pub price_policy: PricePolicy,
    pub fallback_operator: String,
}

impl NormalizeContext {
    pub fn new(source_tag: &str) -> Self {
        Self {
            source_tag: source_tag.to_string(),
            price_policy: PricePolicy::default(),
            fallback_operator: DEFAULT_OPERATOR.to_string(),
        }
    }

    pub fn with_price_policy(mut self, policy: PricePolicy) -> Self {
        self.price_policy = policy;
        self
    }

    pub fn with_fallback_operator(mut self, name: &str) -> Self {
        self.fallback_operator = name.to_string();
        self
    }
}

/// Map one raw record to a canonical trip, or None if it is not a usable trip.
///
/// Records are dropped when they report fewer than one available seat, or
/// when they have neither a departure time nor a positive price.
pub fn normalize(raw: &Value, ctx: &NormalizeContext) -> Option<CanonicalTrip> {
    if !raw.is_object() {
        return None;
    }

    let departure_raw = fields::first(raw, fields::DEPARTURE);
    let arrival_raw = fields::first(raw, fields::ARRIVAL);
    let departure_time = departure_raw.map(time::clean_time_value).unwrap_or_default();
    let arrival_time = arrival_raw.map(time::clean_time_value).unwrap_or_default();

    let price = fields::first(raw, fields::PRICE)
        .and_then(price::parse_price)
        .map(|p| ctx.price_policy.apply(p))
        .unwrap_or(0.0);

    let available_seats = match fields::first(raw, fields::SEATS).and_then(fields::as_count) {
        Some(seats) if seats < 1 => return None,
        other => other,
    };

    let sourced_operator = fields::first_text(raw, fields::OPERATOR);
    let operator_name = sourced_operator
        .clone()
        .unwrap_or_else(|| ctx.fallback_operator.clone());

    let class_raw = fields::first(raw, fields::CLASS)
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| fields::first_text(raw, fields::CLASS))
        .unwrap_or_else(|| DEFAULT_CLASS.to_string());
    let seat_type = seat::classify(&class_raw);

    let id = fields::first_text(raw, fields::ID).unwrap_or_else(|| {
        let who = sourced_operator
            .or_else(|| fields::first_text(raw, fields::OPERATOR_ID))
            .unwrap_or_else(|| operator_name.clone());
        format!("{}-{}", departure_time, who)
    });

    let duration_min = fields::first(raw, fields::DURATION)
        .and_then(fields::as_minutes)
        .or_else(|| time::duration_minutes(departure_raw?, arrival_raw?));

    let trip = CanonicalTrip {
        id,
        operator_name,
        operator_logo: fields::first_text(raw, fields::LOGO).unwrap_or_default(),
        departure_time,
        arrival_time,
        class_raw,
        seat_type,
        available_seats,
        price_ars: price,
        price_final: price,
        price_display: format_ars(price),
        surcharge: 0.0,
        amenities: seat::amenities(seat_type),
        duration_min,
        source: ctx.source_tag.clone(),
    };
    trip.is_valid().then_some(trip)
}

/// Normalize a batch, dropping unusable records, sorted by departure time.
pub fn normalize_all(records: &[Value], ctx: &NormalizeContext) -> Vec<CanonicalTrip> {
    let mut trips: Vec<CanonicalTrip> = records
        .iter()
        .filter_map(|raw| normalize(raw, ctx))
        .collect();
    sort_by_departure(&mut trips);
    trips
}
