//! BusPlus scraper - bus trip availability extraction and normalization.
//!
//! Fetches third-party ticket-sales pages, locates trip data wherever it
//! lives in the document (embedded app state, global variables, or plain
//! markup), normalizes it into a canonical trip record and serves repeated
//! queries from a short-lived cache.

pub mod cache;
pub mod cli;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod server;

pub use cache::{CacheKey, QueryCache};
pub use config::Settings;
pub use extract::{extract, DocumentHint, Extraction, Strategy};
pub use fetch::{FetchError, FetchedDocument, Fetcher, HttpFetcher};
pub use models::{CanonicalTrip, QueryResult, SeatType, TripQuery};
pub use normalize::{normalize, NormalizeContext, PricePolicy};
pub use pipeline::Pipeline;
