use serde::{Deserialize, Serialize};

use crate::models::MarketSessionStatus;

/// One search hit as returned by the finance API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSymbolMatch {
    #[serde(default, alias = "1. symbol")]
    pub symbol: String,
    #[serde(default, alias = "2. name")]
    pub name: String,
    #[serde(default, rename = "type", alias = "3. type")]
    pub instrument_type: String,
    #[serde(default, alias = "4. region")]
    pub region: String,
    #[serde(default, alias = "5. marketOpen")]
    pub market_open: String,
    #[serde(default, alias = "6. marketClose")]
    pub market_close: String,
    #[serde(default, alias = "7. timezone")]
    pub timezone: String,
    #[serde(default, alias = "8. currency")]
    pub currency: String,
    #[serde(default, alias = "9. matchScore")]
    pub match_score: String,
}

/// A cleaned search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SymbolMatch {
    pub symbol: String,
    pub name: String,
    #[serde(rename = "type")]
    pub instrument_type: String,
    pub region: String,
    pub market_open: String,
    pub market_close: String,
    pub timezone: String,
    pub currency: String,
    pub match_score: f64,
}

/// A search hit with the display annotations the UI renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedMatch {
    #[serde(flatten)]
    pub symbol_match: SymbolMatch,
    pub currency_symbol: String,
    pub market_status: MarketSessionStatus,
    pub display_label: String,
}
