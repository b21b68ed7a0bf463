//! Query orchestration: fetch, extract, normalize, cache.
//!
//! Every failure mode ends up as a well-formed [`QueryResult`]; nothing
//! escapes [`Pipeline::run_query`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};

use crate::cache::{CacheKey, QueryCache};
use crate::config::Settings;
use crate::extract::{extract, DocumentHint};
use crate::fetch::{FetchError, Fetcher};
use crate::models::{parse_query_date, QueryResult, TripQuery};
use crate::normalize::{normalize_all, NormalizeContext, PricePolicy};

/// Tag for records coming from the BusPlus checkout.
pub const SOURCE_NAME: &str = "busplus";

/// Error reported when the page had no bookable services.
pub const NO_SERVICES_MESSAGE: &str = "Sin servicios disponibles";

/// Error reported for a date that is not `YYYY-MM-DD`.
pub const INVALID_DATE_MESSAGE: &str = "Date: YYYY-MM-DD";

type InFlight = Mutex<HashMap<CacheKey, InFlightEntry>>;

/// Per-key lock shared by every query currently running for that key.
struct InFlightEntry {
    lock: Arc<tokio::sync::Mutex<()>>,
    holders: usize,
}

/// A query's membership in its key's in-flight entry.
///
/// Leaving happens on drop, so cancelled queries release the entry too. The
/// entry is removed when its last holder leaves.
struct InFlightSlot<'a> {
    in_flight: &'a InFlight,
    key: CacheKey,
    lock: Arc<tokio::sync::Mutex<()>>,
}

impl Drop for InFlightSlot<'_> {
    fn drop(&mut self) {
        let Ok(mut entries) = self.in_flight.lock() else {
            return;
        };
        if let Some(entry) = entries.get_mut(&self.key) {
            entry.holders = entry.holders.saturating_sub(1);
            if entry.holders == 0 {
                entries.remove(&self.key);
            }
        }
    }
}

/// Glues the fetcher, extractor, normalizer and cache together.
pub struct Pipeline {
    fetcher: Arc<dyn Fetcher>,
    cache: Arc<QueryCache<QueryResult>>,
    base_url: String,
    price_policy: PricePolicy,
    fallback_operator: String,
    /// Per-key locks, present only when in-flight deduplication is enabled.
    in_flight: Option<InFlight>,
}

impl Pipeline {
    /// Create a new pipeline from settings.
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        cache: Arc<QueryCache<QueryResult>>,
        settings: &Settings,
    ) -> Self {
        Self {
            fetcher,
            cache,
            base_url: settings.fetch.base_url.trim_end_matches('/').to_string(),
            price_policy: settings.price,
            fallback_operator: settings.fallback_operator.clone(),
            in_flight: settings
                .cache
                .dedupe_in_flight
                .then(|| Mutex::new(HashMap::new())),
        }
    }

    /// The result cache shared with this pipeline.
    pub fn cache(&self) -> &QueryCache<QueryResult> {
        &self.cache
    }

    /// Checkout URL for a query.
    pub fn source_url(&self, query: &TripQuery) -> String {
        format!(
            "{}/?from={}&to={}&departure={}&cant_pasajeros={}",
            self.base_url,
            urlencoding::encode(&query.origin),
            urlencoding::encode(&query.destination),
            query.source_date(),
            query.passengers
        )
    }

    /// Run a query given an ISO calendar date string.
    pub async fn run_query(
        &self,
        origin: &str,
        destination: &str,
        date: &str,
        passengers: u32,
    ) -> QueryResult {
        match parse_query_date(date) {
            Some(date) => {
                self.run(&TripQuery::new(origin, destination, date, passengers))
                    .await
            }
            None => QueryResult::failure(INVALID_DATE_MESSAGE, String::new(), SOURCE_NAME),
        }
    }

    /// Run a query, answering from the cache when possible.
    pub async fn run(&self, query: &TripQuery) -> QueryResult {
        let key = CacheKey::from(query);
        if let Some(hit) = self.cached(&key) {
            return hit;
        }

        let slot = self.join_in_flight(&key);
        let _guard = match &slot {
            Some(slot) => {
                let guard = slot.lock.lock().await;
                // Another request for this key may have filled the cache meanwhile
                if let Some(hit) = self.cached(&key) {
                    return hit;
                }
                Some(guard)
            }
            None => None,
        };

        let url = self.source_url(query);
        info!(
            "Fetching {} -> {} on {} ({} pax)",
            query.origin, query.destination, query.date, query.passengers
        );

        let result = match self.fetch_document(&url).await {
            Ok((body, hint)) => self.process_document(&body, hint, &url),
            Err(e) => {
                warn!(url = %url, error = %e, "Source fetch failed");
                QueryResult::failure(e.to_string(), url, SOURCE_NAME)
            }
        };

        if result.success {
            self.cache.set(key, result.clone());
        }

        result
    }

    /// Extract and normalize an already fetched document.
    pub fn process_document(&self, body: &str, hint: DocumentHint, url: &str) -> QueryResult {
        let extraction = extract(body, hint);

        let policy = match extraction.strategy {
            Some(strategy) if strategy.may_report_minor_units() => self.price_policy,
            _ => PricePolicy::major_units(),
        };
        let ctx = NormalizeContext::new(SOURCE_NAME)
            .with_price_policy(policy)
            .with_fallback_operator(&self.fallback_operator);

        let trips = normalize_all(&extraction.records, &ctx);
        if trips.len() < extraction.records.len() {
            debug!(
                dropped = extraction.records.len() - trips.len(),
                kept = trips.len(),
                "Dropped records that are not bookable trips"
            );
        }

        let tag = match extraction.strategy {
            Some(strategy) => format!("{}_{}", SOURCE_NAME, strategy),
            None => SOURCE_NAME.to_string(),
        };
        QueryResult::from_trips(trips, url.to_string(), &tag, NO_SERVICES_MESSAGE)
    }

    async fn fetch_document(&self, url: &str) -> Result<(String, DocumentHint), FetchError> {
        let document = self.fetcher.fetch(url).await?;
        if !document.is_success() {
            return Err(FetchError::Status(document.status));
        }
        let hint = document.hint();
        Ok((document.body, hint))
    }

    fn cached(&self, key: &CacheKey) -> Option<QueryResult> {
        let mut hit = self.cache.get(key)?;
        info!("Cache hit for {}", key);
        hit.cached = true;
        Some(hit)
    }

    fn join_in_flight(&self, key: &CacheKey) -> Option<InFlightSlot<'_>> {
        let in_flight = self.in_flight.as_ref()?;
        let mut entries = in_flight.lock().ok()?;
        let entry = entries.entry(key.clone()).or_insert_with(|| InFlightEntry {
            lock: Arc::new(tokio::sync::Mutex::new(())),
            holders: 0,
        });
        entry.holders += 1;
        Some(InFlightSlot {
            in_flight,
            key: key.clone(),
            lock: entry.lock.clone(),
        })
    }

    #[cfg(test)]
    fn in_flight_len(&self) -> usize {
        self.in_flight
            .as_ref()
            .and_then(|m| m.lock().ok().map(|entries| entries.len()))
            .unwrap_or(0)
    }
}
