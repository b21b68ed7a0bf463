//! One-shot search command.

use std::sync::Arc;

use console::style;

use crate::cache::QueryCache;
use crate::config::Settings;
use crate::fetch::HttpFetcher;
use crate::models::QueryResult;
use crate::pipeline::Pipeline;

/// Run one query against the live source and print the result.
pub async fn cmd_search(
    settings: &Settings,
    from: &str,
    to: &str,
    date: &str,
    passengers: u32,
    json: bool,
) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::new(&settings.fetch)?;
    let cache = QueryCache::with_limits(settings.cache.ttl(), settings.cache.capacity);
    let pipeline = Pipeline::new(Arc::new(fetcher), Arc::new(cache), settings);

    let result = pipeline.run_query(from, to, date, passengers).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
    }

    if result.success {
        Ok(())
    } else {
        std::process::exit(1)
    }
}

fn print_result(result: &QueryResult) {
    if !result.success {
        eprintln!(
            "{} {}",
            style("✗").red(),
            result.error.as_deref().unwrap_or("Search failed")
        );
        if !result.source_url.is_empty() {
            eprintln!("  {}", style(&result.source_url).dim());
        }
        return;
    }

    println!(
        "{} {} trips ({})",
        style("✓").green(),
        result.total,
        style(&result.source_tag).dim()
    );
    println!();
    println!(
        "{:<6} {:<6} {:<24} {:<10} {:>12} {:>7}",
        style("Sale").bold(),
        style("Llega").bold(),
        style("Empresa").bold(),
        style("Asiento").bold(),
        style("Precio").bold(),
        style("Libres").bold()
    );
    for trip in &result.trips {
        let arrival = if trip.arrival_time.is_empty() {
            "-"
        } else {
            trip.arrival_time.as_str()
        };
        let seats = trip
            .available_seats
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6} {:<6} {:<24} {:<10} {:>12} {:>7}",
            trip.departure_time,
            arrival,
            truncate(&trip.operator_name, 24),
            trip.seat_type.as_str(),
            trip.price_display,
            seats
        );
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let head: String = text.chars().take(max - 1).collect();
        format!("{}…", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Andesmar", 24), "Andesmar");
        assert_eq!(truncate("Via Bariloche Turismo", 10), "Via Baril…");
    }
}
