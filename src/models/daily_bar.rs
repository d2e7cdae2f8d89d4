use std::fmt;

use chrono::NaiveDate;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::DataValidationError;
use crate::services::validation::validate_ohlcv;

/// Metadata block of a daily series payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesMetadata {
    #[serde(default, alias = "1. Information")]
    pub information: String,
    #[serde(default, alias = "2. Symbol")]
    pub symbol: String,
    #[serde(default, alias = "3. Last Refreshed")]
    pub last_refreshed: String,
    #[serde(default, alias = "4. Output Size")]
    pub output_size: String,
    #[serde(default, alias = "5. Time Zone")]
    pub time_zone: String,
}

/// Untrusted daily series as received from the finance API.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawDailySeries {
    #[serde(default, alias = "Meta Data")]
    pub meta_data: Option<SeriesMetadata>,
    #[serde(default, alias = "Time Series (Daily)")]
    pub time_series: Option<RawTimeSeries>,
}

/// One date's untrusted OHLCV strings.
#[derive(Debug, Clone, PartialEq)]
pub struct RawDailyBar {
    pub date: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
}

impl RawDailyBar {
    pub fn new(
        date: impl Into<String>,
        open: impl Into<String>,
        high: impl Into<String>,
        low: impl Into<String>,
        close: impl Into<String>,
        volume: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            open: open.into(),
            high: high.into(),
            low: low.into(),
            close: close.into(),
            volume: volume.into(),
        }
    }
}

/// Date-keyed raw bars in payload order.
///
/// Deserialized from a JSON object without collapsing repeated keys, so a
/// payload that lists a date twice can be rejected instead of silently
/// keeping the last entry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTimeSeries(pub Vec<RawDailyBar>);

impl RawTimeSeries {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<RawDailyBar> for RawTimeSeries {
    fn from_iter<I: IntoIterator<Item = RawDailyBar>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBarFields {
    #[serde(alias = "1. open", deserialize_with = "string_or_number")]
    open: String,
    #[serde(alias = "2. high", deserialize_with = "string_or_number")]
    high: String,
    #[serde(alias = "3. low", deserialize_with = "string_or_number")]
    low: String,
    #[serde(alias = "4. close", deserialize_with = "string_or_number")]
    close: String,
    #[serde(alias = "5. volume", deserialize_with = "string_or_number")]
    volume: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!("expected string or number, got {other}"))),
    }
}

impl<'de> Deserialize<'de> for RawTimeSeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct SeriesVisitor;

        impl<'de> Visitor<'de> for SeriesVisitor {
            type Value = RawTimeSeries;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of YYYY-MM-DD dates to OHLCV records")
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut bars = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((date, fields)) = map.next_entry::<String, RawBarFields>()? {
                    bars.push(RawDailyBar {
                        date,
                        open: fields.open,
                        high: fields.high,
                        low: fields.low,
                        close: fields.close,
                        volume: fields.volume,
                    });
                }
                Ok(RawTimeSeries(bars))
            }
        }

        deserializer.deserialize_map(SeriesVisitor)
    }
}

/// Validated OHLCV for one exchange-local calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyBar {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: u64,
}

impl DailyBar {
    /// Rejects non-positive prices and any high/low ordering violation.
    pub fn new(
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Result<Self, DataValidationError> {
        validate_ohlcv(open, high, low, close)?;
        Ok(Self { date, open, high, low, close, volume })
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn open(&self) -> f64 {
        self.open
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn close(&self) -> f64 {
        self.close
    }

    pub fn volume(&self) -> u64 {
        self.volume
    }
}

/// A [`DailyBar`] plus the analytics derived against its ascending neighbours.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedBar {
    #[serde(flatten)]
    pub bar: DailyBar,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
    pub range: f64,
    pub range_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma5: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma10: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ma20: Option<f64>,
}

impl DerivedBar {
    pub fn date(&self) -> NaiveDate {
        self.bar.date()
    }

    pub fn close(&self) -> f64 {
        self.bar.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_series_keeps_repeated_dates() {
        let payload = r#"{
            "2024-01-10": {"1. open": "100", "2. high": "105", "3. low": "99", "4. close": "102", "5. volume": "1000"},
            "2024-01-10": {"1. open": "101", "2. high": "106", "3. low": "100", "4. close": "103", "5. volume": "1100"}
        }"#;
        let series: RawTimeSeries = serde_json::from_str(payload).expect("payload");
        assert_eq!(series.len(), 2);
        assert_eq!(series.0[1].close, "103");
    }

    #[test]
    fn raw_series_accepts_plain_keys_and_numbers() {
        let payload = r#"{"2024-01-09": {"open": 98, "high": "101", "low": 97.5, "close": "100", "volume": 900}}"#;
        let series: RawTimeSeries = serde_json::from_str(payload).expect("payload");
        assert_eq!(series.0[0].low, "97.5");
        assert_eq!(series.0[0].volume, "900");
    }

    #[test]
    fn raw_series_rejects_unknown_fields() {
        let payload = r#"{"2024-01-09": {"open": "1", "high": "1", "low": "1", "close": "1", "volume": "1", "vwap": "1"}}"#;
        assert!(serde_json::from_str::<RawTimeSeries>(payload).is_err());
    }

    #[test]
    fn daily_series_reads_alpha_vantage_envelope() {
        let payload = r#"{
            "Meta Data": {"2. Symbol": "IBM", "4. Output Size": "Compact", "5. Time Zone": "US/Eastern"},
            "Time Series (Daily)": {"2024-01-09": {"1. open": "98", "2. high": "101", "3. low": "97", "4. close": "100", "5. volume": "900"}}
        }"#;
        let series: RawDailySeries = serde_json::from_str(payload).expect("payload");
        assert_eq!(series.meta_data.unwrap().symbol, "IBM");
        assert_eq!(series.time_series.unwrap().len(), 1);
    }

    #[test]
    fn bar_rejects_inconsistent_ohlc() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        assert!(DailyBar::new(date, 10.0, 12.0, 9.0, 11.0, 10).is_ok());
        let err = DailyBar::new(date, 10.0, 12.0, 9.0, 12.5, 10).unwrap_err();
        assert!(matches!(err, DataValidationError::HighNotHighest { .. }));
        let err = DailyBar::new(date, 0.0, 12.0, 9.0, 11.0, 10).unwrap_err();
        assert!(matches!(err, DataValidationError::Zero { field: "open" }));
    }
}
