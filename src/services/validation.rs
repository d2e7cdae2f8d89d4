use chrono::{NaiveDate, Utc};
use tracing::{debug, warn};

use crate::errors::DataValidationError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const MAX_SYMBOL_LEN: usize = 10;
pub const MAX_KEYWORDS_LEN: usize = 100;

/// Intraday range (as a share of the mid price) above which a bar is logged
/// as suspicious. It is not rejected.
const SUSPICIOUS_RANGE_RATIO: f64 = 0.5;

/// Bounds applied to a parsed price by [`check_bounds`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NumericBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub allow_zero: bool,
}

impl NumericBounds {
    pub fn price() -> Self {
        Self { min: Some(0.0), max: None, allow_zero: false }
    }
}

/// Parse a strict `YYYY-MM-DD` date.
pub fn validate_date(field: &'static str, input: &str) -> Result<NaiveDate, DataValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DataValidationError::Empty { field });
    }

    // chrono accepts unpadded months/days; the API contract does not.
    let well_formed = trimmed.len() == 10
        && trimmed
            .char_indices()
            .all(|(i, ch)| if i == 4 || i == 7 { ch == '-' } else { ch.is_ascii_digit() });

    if !well_formed {
        return Err(DataValidationError::InvalidDate { field, value: input.to_string() });
    }

    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .map_err(|_| DataValidationError::InvalidDate { field, value: input.to_string() })
}

/// Validate an inclusive date range. Either side may be omitted.
pub fn validate_date_range(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<(Option<NaiveDate>, Option<NaiveDate>), DataValidationError> {
    let start = start
        .filter(|s| !s.trim().is_empty())
        .map(|s| validate_date("start_date", s))
        .transpose()?;
    let end = end
        .filter(|s| !s.trim().is_empty())
        .map(|s| validate_date("end_date", s))
        .transpose()?;

    if let (Some(start), Some(end)) = (start, end) {
        if start > end {
            return Err(DataValidationError::InvertedDateRange { start, end });
        }
    }

    if let Some(end) = end {
        if end > Utc::now().date_naive() {
            warn!("End date ({}) is in the future. This might not return any data.", end);
        }
    }

    debug!("Validated date range: {:?} to {:?}", start, end);
    Ok((start, end))
}

/// Trim and uppercase a ticker, then check its charset and length.
pub fn validate_symbol(input: &str) -> Result<String, DataValidationError> {
    let cleaned = input.trim().to_ascii_uppercase();
    if cleaned.is_empty() {
        return Err(DataValidationError::Empty { field: "symbol" });
    }

    let valid = cleaned
        .chars()
        .all(|ch| ch.is_ascii_uppercase() || ch.is_ascii_digit() || ch == '.');
    if !valid {
        return Err(DataValidationError::InvalidSymbol { value: cleaned });
    }

    if cleaned.chars().count() > MAX_SYMBOL_LEN {
        return Err(DataValidationError::SymbolTooLong { value: cleaned, max: MAX_SYMBOL_LEN });
    }

    debug!("Validated stock symbol: {}", cleaned);
    Ok(cleaned)
}

/// Parse a whole-number share count. Exponents and fractions are not
/// volumes; a negative count parses but is out of range.
pub fn validate_volume(field: &'static str, input: &str) -> Result<u64, DataValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DataValidationError::Empty { field });
    }

    if let Ok(volume) = trimmed.parse::<u64>() {
        return Ok(volume);
    }
    match trimmed.parse::<i64>() {
        Ok(negative) if negative < 0 => Err(DataValidationError::BelowMinimum {
            field,
            value: negative as f64,
            min: 0.0,
        }),
        _ => Err(DataValidationError::NotANumber { field, value: input.to_string() }),
    }
}

pub(crate) fn check_bounds(
    field: &'static str,
    value: f64,
    bounds: NumericBounds,
) -> Result<(), DataValidationError> {
    if !bounds.allow_zero && value == 0.0 {
        return Err(DataValidationError::Zero { field });
    }
    if let Some(min) = bounds.min {
        if value < min {
            return Err(DataValidationError::BelowMinimum { field, value, min });
        }
    }
    if let Some(max) = bounds.max {
        if value > max {
            return Err(DataValidationError::AboveMaximum { field, value, max });
        }
    }
    Ok(())
}

/// Check the price domain and OHLC ordering of one bar.
pub fn validate_ohlcv(
    open: f64,
    high: f64,
    low: f64,
    close: f64,
) -> Result<(), DataValidationError> {
    check_bounds("open", open, NumericBounds::price())?;
    check_bounds("high", high, NumericBounds::price())?;
    check_bounds("low", low, NumericBounds::price())?;
    check_bounds("close", close, NumericBounds::price())?;

    if high < open.max(close).max(low) {
        return Err(DataValidationError::HighNotHighest { high });
    }
    if low > open.min(close).min(high) {
        return Err(DataValidationError::LowNotLowest { low });
    }

    let mid = (high + low) / 2.0;
    if mid > 0.0 && (high - low) / mid > SUSPICIOUS_RANGE_RATIO {
        warn!(
            "Unusually large price range detected: {:.2} ({:.1}% of average price)",
            high - low,
            (high - low) / mid * 100.0
        );
    }

    Ok(())
}

pub fn validate_search_keywords(input: &str) -> Result<String, DataValidationError> {
    let cleaned = input.trim();
    if cleaned.is_empty() {
        return Err(DataValidationError::Empty { field: "keywords" });
    }

    let len = cleaned.chars().count();
    if len > MAX_KEYWORDS_LEN {
        return Err(DataValidationError::KeywordsTooLong {
            value: cleaned.to_string(),
            len,
            max: MAX_KEYWORDS_LEN,
        });
    }

    if !cleaned.chars().any(|ch| ch.is_ascii_alphanumeric()) {
        return Err(DataValidationError::KeywordsNotAlphanumeric { value: cleaned.to_string() });
    }

    Ok(cleaned.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_must_be_zero_padded() {
        assert_eq!(
            validate_date("date", "2024-01-09").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 9).unwrap()
        );
        let err = validate_date("date", "2024-1-9").unwrap_err();
        assert_eq!(err.field(), "date");
        assert_eq!(err.value().as_deref(), Some("2024-1-9"));
        assert!(validate_date("date", "2024-02-30").is_err());
    }

    #[test]
    fn date_range_rejects_inverted_bounds() {
        let err = validate_date_range(Some("2024-02-01"), Some("2024-01-01")).unwrap_err();
        assert!(matches!(err, DataValidationError::InvertedDateRange { .. }));
        assert_eq!(err.field(), "date_range");
    }

    #[test]
    fn date_range_allows_open_bounds() {
        let (start, end) = validate_date_range(None, Some("2024-01-01")).unwrap();
        assert!(start.is_none());
        assert!(end.is_some());
        let (start, end) = validate_date_range(Some(""), None).unwrap();
        assert!(start.is_none() && end.is_none());
    }

    #[test]
    fn symbol_is_normalized() {
        assert_eq!(validate_symbol("  brk.b ").unwrap(), "BRK.B");
        assert_eq!(validate_symbol("0700.hk").unwrap(), "0700.HK");
    }

    #[test]
    fn symbol_rejects_bad_input() {
        assert!(matches!(validate_symbol("   "), Err(DataValidationError::Empty { .. })));
        assert!(matches!(validate_symbol("AA-PL"), Err(DataValidationError::InvalidSymbol { .. })));
        assert!(matches!(
            validate_symbol("ABCDEFGHIJK"),
            Err(DataValidationError::SymbolTooLong { max: 10, .. })
        ));
    }

    #[test]
    fn price_bounds_are_enforced() {
        assert!(check_bounds("open", 12.5, NumericBounds::price()).is_ok());
        assert!(matches!(
            check_bounds("open", 0.0, NumericBounds::price()),
            Err(DataValidationError::Zero { field: "open" })
        ));
        assert!(matches!(
            check_bounds("close", -1.0, NumericBounds::price()),
            Err(DataValidationError::BelowMinimum { field: "close", .. })
        ));
    }

    #[test]
    fn volume_is_an_exact_whole_number() {
        assert_eq!(validate_volume("volume", " 0 ").unwrap(), 0);
        assert_eq!(validate_volume("volume", "9007199254740993").unwrap(), 9_007_199_254_740_993);
        assert_eq!(validate_volume("volume", "18446744073709551615").unwrap(), u64::MAX);

        assert!(matches!(
            validate_volume("volume", "-1"),
            Err(DataValidationError::BelowMinimum { field: "volume", .. })
        ));
        for bad in ["1e3", "1000.0", "12.5", "abc", "18446744073709551616", "NaN"] {
            assert!(
                matches!(validate_volume("volume", bad), Err(DataValidationError::NotANumber { .. })),
                "{bad} should not parse as a volume"
            );
        }
        assert!(matches!(validate_volume("volume", ""), Err(DataValidationError::Empty { .. })));
    }

    #[test]
    fn ohlcv_ordering() {
        assert!(validate_ohlcv(100.0, 105.0, 99.0, 102.0).is_ok());
        assert!(matches!(
            validate_ohlcv(100.0, 101.0, 99.0, 102.0),
            Err(DataValidationError::HighNotHighest { .. })
        ));
        assert!(matches!(
            validate_ohlcv(100.0, 105.0, 100.5, 102.0),
            Err(DataValidationError::LowNotLowest { .. })
        ));
        assert!(matches!(
            validate_ohlcv(-1.0, 105.0, 99.0, 102.0),
            Err(DataValidationError::BelowMinimum { field: "open", .. })
        ));
    }

    #[test]
    fn keywords() {
        assert_eq!(validate_search_keywords("  tesla ").unwrap(), "tesla");
        assert!(validate_search_keywords("").is_err());
        assert!(matches!(
            validate_search_keywords("$$$"),
            Err(DataValidationError::KeywordsNotAlphanumeric { .. })
        ));
        let long = "a".repeat(101);
        assert!(matches!(
            validate_search_keywords(&long),
            Err(DataValidationError::KeywordsTooLong { len: 101, .. })
        ));
    }
}
