//! HTTP request handlers.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::models::parse_query_date;
use crate::pipeline::INVALID_DATE_MESSAGE;

pub const SERVICE_NAME: &str = "ViaComodoro Scraper";

/// Query string for `/search`.
///
/// Every field is optional so missing values produce our own 400 body rather
/// than the extractor's rejection text.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub from: Option<String>,
    pub to: Option<String>,
    pub date: Option<String>,
    pub passengers: Option<String>,
}

/// Service status.
pub async fn status() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Trip search.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let (Some(from), Some(to), Some(date)) = (
        present(&params.from),
        present(&params.to),
        present(&params.date),
    ) else {
        return bad_request("Params: from, to, date");
    };

    if parse_query_date(date).is_none() {
        return bad_request(INVALID_DATE_MESSAGE);
    }

    let passengers = match present(&params.passengers) {
        None => 1,
        Some(raw) => match raw.parse::<u32>() {
            Ok(n) if n >= 1 => n,
            _ => return bad_request("Passengers: positive integer"),
        },
    };

    let result = state.pipeline.run_query(from, to, date, passengers).await;
    Json(result).into_response()
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn bad_request(message: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "error": message })),
    )
        .into_response()
}
