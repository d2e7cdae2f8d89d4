use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::models::{AnnotatedMatch, RawSymbolMatch, SymbolMatch};
use crate::services::market_config::currency_symbol;
use crate::services::market_session;

/// Clean, annotate and rank raw search hits.
///
/// Hits without a symbol or name are dropped. Scores that do not parse count
/// as 0.0 and are clamped to `[0, 1]`. The result is ordered by score,
/// highest first; equal scores keep the API's order.
pub fn process_search_results(raw: Vec<RawSymbolMatch>, now: DateTime<Utc>) -> Vec<AnnotatedMatch> {
    let received = raw.len();

    let mut matches: Vec<AnnotatedMatch> = raw
        .into_iter()
        .filter_map(clean_match)
        .map(|symbol_match| annotate(symbol_match, now))
        .collect();

    matches.sort_by(|a, b| {
        b.symbol_match
            .match_score
            .total_cmp(&a.symbol_match.match_score)
    });

    info!("Processed {} search results ({} received)", matches.len(), received);
    matches
}

fn clean_match(raw: RawSymbolMatch) -> Option<SymbolMatch> {
    let symbol = raw.symbol.trim().to_ascii_uppercase();
    let name = raw.name.trim().to_string();
    if symbol.is_empty() || name.is_empty() {
        debug!("Skipping search match without symbol or name: {:?}", raw);
        return None;
    }

    Some(SymbolMatch {
        symbol,
        name,
        instrument_type: raw.instrument_type.trim().to_string(),
        region: raw.region.trim().to_string(),
        market_open: raw.market_open.trim().to_string(),
        market_close: raw.market_close.trim().to_string(),
        timezone: raw.timezone.trim().to_string(),
        currency: raw.currency.trim().to_string(),
        match_score: parse_score(&raw.match_score),
    })
}

fn parse_score(input: &str) -> f64 {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map_or(0.0, |v| v.clamp(0.0, 1.0))
}

fn annotate(symbol_match: SymbolMatch, now: DateTime<Utc>) -> AnnotatedMatch {
    let market_status = market_session::resolve(
        &symbol_match.market_open,
        &symbol_match.market_close,
        &symbol_match.timezone,
        Some(symbol_match.region.as_str()),
        now,
    );

    AnnotatedMatch {
        currency_symbol: currency_symbol(&symbol_match.currency),
        display_label: format!("{} - {}", symbol_match.symbol, symbol_match.name),
        market_status,
        symbol_match,
    }
}
