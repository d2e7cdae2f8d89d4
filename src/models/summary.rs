use chrono::NaiveDate;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestSnapshot {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: u64,
    pub change: Option<f64>,
    pub change_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation; absent for a single bar.
    pub std: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeStats {
    pub min: u64,
    pub max: u64,
    pub mean: u64,
    pub total: u64,
}

/// Display aggregate over a series. `Default` is the empty summary returned
/// when the series is empty or the aggregate could not be computed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_records: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<LatestSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_stats: Option<PriceStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume_stats: Option<VolumeStats>,
}

impl SummaryStats {
    pub fn is_empty(&self) -> bool {
        self.total_records == 0
    }
}

/// Display-ready rendering of one [`crate::models::DerivedBar`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayRecord {
    pub date: String,
    pub open: String,
    pub high: String,
    pub low: String,
    pub close: String,
    pub volume: String,
    pub change: String,
    pub change_percent: String,
    pub range: String,
    pub range_percent: String,
    pub ma5: String,
    pub ma10: String,
    pub ma20: String,
}
