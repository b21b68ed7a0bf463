//! Inbound query and the response envelope.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::CanonicalTrip;

/// A single availability query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TripQuery {
    pub origin: String,
    pub destination: String,
    pub date: NaiveDate,
    pub passengers: u32,
}

impl TripQuery {
    pub fn new(origin: &str, destination: &str, date: NaiveDate, passengers: u32) -> Self {
        Self {
            origin: origin.to_string(),
            destination: destination.to_string(),
            date,
            passengers,
        }
    }

    /// Date in the `DD-MM-YYYY` form the checkout page expects.
    pub fn source_date(&self) -> String {
        self.date.format("%d-%m-%Y").to_string()
    }
}

/// Parse an ISO calendar date (`YYYY-MM-DD`).
pub fn parse_query_date(date: &str) -> Option<NaiveDate> {
    let bytes = date.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Result envelope returned for every query, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult {
    /// True iff at least one trip was produced.
    pub success: bool,
    pub trips: Vec<CanonicalTrip>,
    pub total: usize,
    pub error: Option<String>,
    /// Constructed request URL, so callers can link to the source directly.
    pub source_url: String,
    pub source_tag: String,
    pub cached: bool,
}

impl QueryResult {
    /// Build an envelope from a (possibly empty) trip list.
    pub fn from_trips(
        trips: Vec<CanonicalTrip>,
        source_url: String,
        source_tag: &str,
        empty_message: &str,
    ) -> Self {
        let success = !trips.is_empty();
        Self {
            success,
            total: trips.len(),
            trips,
            error: if success {
                None
            } else {
                Some(empty_message.to_string())
            },
            source_url,
            source_tag: source_tag.to_string(),
            cached: false,
        }
    }

    /// Build a failed envelope.
    pub fn failure(error: impl Into<String>, source_url: String, source_tag: &str) -> Self {
        Self {
            success: false,
            trips: Vec::new(),
            total: 0,
            error: Some(error.into()),
            source_url,
            source_tag: source_tag.to_string(),
            cached: false,
        }
    }
}
