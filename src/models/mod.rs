//! Data models for trip availability.

mod query;
mod trip;

pub use query::{parse_query_date, QueryResult, TripQuery};
pub use trip::{sort_by_departure, CanonicalTrip, SeatType};
