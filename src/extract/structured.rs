//! Strategies that locate an embedded JSON document.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use serde_json::Value;

use super::search::{extract_path, find_trip_list, DEFAULT_DEPTH};
use super::ExtractError;

/// Element id of the server-rendered application payload.
pub const NEXT_DATA_ID: &str = "__NEXT_DATA__";

/// Property path holding the per-page props inside the payload.
pub const PAGE_PROPS_PATH: &str = "props.pageProps";

static GLOBAL_STATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"window\.__(?:INITIAL_STATE|APP_STATE|DATA)__\s*=\s*").expect("valid regex")
});

/// `<script id="__NEXT_DATA__">` payload, searched under `props.pageProps`.
pub fn next_data(html: &str) -> Result<Vec<Value>, ExtractError> {
    let payload = {
        let document = Html::parse_document(html);
        let selector = Selector::parse(&format!("script#{}", NEXT_DATA_ID))
            .map_err(|e| ExtractError::Selector(e.to_string()))?;
        let script = document
            .select(&selector)
            .next()
            .ok_or(ExtractError::NotFound(NEXT_DATA_ID))?;
        script.text().collect::<String>()
    };

    let data: Value = serde_json::from_str(payload.trim())?;
    let props = extract_path(&data, PAGE_PROPS_PATH);
    Ok(find_trip_list(props, DEFAULT_DEPTH))
}

/// `window.__INITIAL_STATE__ = {...};` and its sibling names.
pub fn global_state(html: &str) -> Result<Vec<Value>, ExtractError> {
    let assignment = GLOBAL_STATE_RE
        .find(html)
        .ok_or(ExtractError::NotFound("window state assignment"))?;
    let literal = &html[assignment.end()..];
    if !literal.starts_with('{') {
        return Err(ExtractError::NotFound("object literal"));
    }

    // Parse exactly one value; whatever follows the literal is ignored
    let data = serde_json::Deserializer::from_str(literal)
        .into_iter::<Value>()
        .next()
        .ok_or(ExtractError::NotFound("object literal"))??;

    Ok(find_trip_list(&data, DEFAULT_DEPTH))
}

/// The whole document is JSON (API responses).
pub fn json_body(body: &str) -> Result<Vec<Value>, ExtractError> {
    let data: Value = serde_json::from_str(body.trim())?;
    Ok(find_trip_list(&data, DEFAULT_DEPTH))
}
