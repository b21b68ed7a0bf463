//! HTTP front end for trip searches.
//!
//! - `GET /` reports service status
//! - `GET /search?from=..&to=..&date=YYYY-MM-DD[&passengers=N]` runs a query

mod handlers;
mod routes;

pub use routes::create_router;

use std::net::SocketAddr;
use std::sync::Arc;

use crate::cache::QueryCache;
use crate::config::Settings;
use crate::fetch::HttpFetcher;
use crate::pipeline::Pipeline;

/// Shared state for the web server.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}

impl AppState {
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let fetcher = HttpFetcher::new(&settings.fetch)?;
        let cache = QueryCache::with_limits(settings.cache.ttl(), settings.cache.capacity);
        let pipeline = Pipeline::new(Arc::new(fetcher), Arc::new(cache), settings);

        Ok(Self {
            pipeline: Arc::new(pipeline),
        })
    }
}

/// Start the web server.
pub async fn serve(settings: &Settings) -> anyhow::Result<()> {
    let state = AppState::new(settings)?;
    let app = create_router(state, &settings.server);

    let addr: SocketAddr = settings.server.bind.parse()?;
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
