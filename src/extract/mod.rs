//! Trip record extraction from raw source documents.
//!
//! Strategies are tried in a fixed priority order and the first one that
//! yields records wins. A strategy that fails to parse is treated exactly
//! like one that found nothing; [`extract`] itself never fails.

mod fallback;
mod search;
mod structured;

pub use search::{extract_path, find_trip_list, looks_like_trip, DEFAULT_DEPTH, PREFERRED_KEYS};

use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Error types for a single extraction strategy.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("{0} not found in document")]
    NotFound(&'static str),
    #[error("Invalid selector: {0}")]
    Selector(String),
    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// What kind of document the fetcher returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DocumentHint {
    /// Decide from the document itself.
    #[default]
    Auto,
    /// Server-rendered HTML page.
    Html,
    /// The whole body is a JSON document.
    Json,
}

impl DocumentHint {
    /// Resolve `Auto` by looking at the first non-blank character.
    pub fn resolve(self, document: &str) -> Self {
        match self {
            Self::Auto => match document.trim_start().chars().next() {
                Some('{') | Some('[') => Self::Json,
                _ => Self::Html,
            },
            other => other,
        }
    }

    fn chain(self) -> &'static [Strategy] {
        match self {
            Self::Json => JSON_CHAIN,
            Self::Html | Self::Auto => HTML_CHAIN,
        }
    }
}

/// A single way of locating trip records in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// `<script id="__NEXT_DATA__">` application payload.
    NextData,
    /// `window.__INITIAL_STATE__`-style global assignment.
    GlobalState,
    /// Whole document parsed as JSON.
    JsonBody,
    /// `"hora_salida" ... "precio"` fragments matched in raw text.
    InlineFragments,
    /// `r-item` result listing markup.
    ListingMarkup,
}

type StrategyFn = fn(&str) -> Result<Vec<Value>, ExtractError>;

const HTML_CHAIN: &[Strategy] = &[
    Strategy::NextData,
    Strategy::GlobalState,
    Strategy::InlineFragments,
    Strategy::ListingMarkup,
];

const JSON_CHAIN: &[Strategy] = &[Strategy::JsonBody, Strategy::InlineFragments];

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NextData => "next_data",
            Self::GlobalState => "global_state",
            Self::JsonBody => "json_body",
            Self::InlineFragments => "inline_fragments",
            Self::ListingMarkup => "listing_markup",
        }
    }

    /// Whether prices from this strategy may be in minor currency units.
    ///
    /// Listing markup shows prices as rendered for the customer, always in
    /// pesos; the JSON-backed strategies carry whatever the backend emits.
    pub fn may_report_minor_units(&self) -> bool {
        !matches!(self, Self::ListingMarkup)
    }

    fn runner(self) -> StrategyFn {
        match self {
            Self::NextData => structured::next_data,
            Self::GlobalState => structured::global_state,
            Self::JsonBody => structured::json_body,
            Self::InlineFragments => fallback::inline_fragments,
            Self::ListingMarkup => fallback::listing_markup,
        }
    }

    /// Run this strategy alone.
    pub fn run(self, document: &str) -> Result<Vec<Value>, ExtractError> {
        (self.runner())(document)
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Records found in a document and the strategy that found them.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub records: Vec<Value>,
    /// None when every strategy came up empty.
    pub strategy: Option<Strategy>,
}

impl Extraction {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Extract raw trip records using the first strategy that yields any.
pub fn extract(document: &str, hint: DocumentHint) -> Extraction {
    let hint = hint.resolve(document);

    for &strategy in hint.chain() {
        match strategy.run(document) {
            Ok(records) if !records.is_empty() => {
                debug!(
                    strategy = %strategy,
                    records = records.len(),
                    "Extraction strategy matched"
                );
                return Extraction {
                    records,
                    strategy: Some(strategy),
                };
            }
            Ok(_) => debug!(strategy = %strategy, "Extraction strategy yielded nothing"),
            Err(e) => debug!(strategy = %strategy, error = %e, "Extraction strategy failed"),
        }
    }

    Extraction::default()
}
