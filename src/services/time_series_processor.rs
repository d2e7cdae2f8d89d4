//! Daily time-series pipeline: raw payload in, validated and enriched
//! [`TimeSeries`] out, plus the filter/summary/display views over it.
//!
//! Derived fields are computed only over [`AscendingBars`], a sequence type
//! whose sole constructor sorts by date and rejects duplicates. The reversal
//! into newest-first order happens once, after derivation, inside
//! [`TimeSeries::from_ascending`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};

use crate::errors::{DataProcessingError, DataValidationError};
use crate::models::{
    DailyBar, DateRange, DerivedBar, DisplayRecord, LatestSnapshot, PriceStats, RawDailyBar,
    RawDailySeries, RawTimeSeries, SeriesMetadata, SummaryStats, TimeSeries, VolumeStats,
};
use crate::services::indicators::{mean, round2, sample_std_dev, sma};
use crate::services::validation::{validate_date, validate_volume};

/// Supported simple-moving-average windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MovingAverageWindow {
    #[serde(rename = "ma5")]
    Five,
    #[serde(rename = "ma10")]
    Ten,
    #[serde(rename = "ma20")]
    Twenty,
}

impl MovingAverageWindow {
    pub const ALL: [MovingAverageWindow; 3] = [Self::Five, Self::Ten, Self::Twenty];

    pub fn len(self) -> usize {
        match self {
            Self::Five => 5,
            Self::Ten => 10,
            Self::Twenty => 20,
        }
    }

    pub fn from_len(len: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.len() == len)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessorConfig {
    pub ma_windows: Vec<MovingAverageWindow>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            ma_windows: MovingAverageWindow::ALL.to_vec(),
        }
    }
}

impl ProcessorConfig {
    fn enabled(&self, window: MovingAverageWindow) -> bool {
        self.ma_windows.contains(&window)
    }
}

/// A raw bar dropped during coercion, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedBar {
    pub date: String,
    pub reason: DataValidationError,
}

/// Result of a successful ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    pub meta: Option<SeriesMetadata>,
    pub series: TimeSeries,
    pub rejected: Vec<RejectedBar>,
}

/// Daily bars sorted oldest first with unique dates.
#[derive(Debug, Clone, PartialEq)]
pub struct AscendingBars(Vec<DailyBar>);

impl AscendingBars {
    pub fn new(mut bars: Vec<DailyBar>) -> Result<Self, DataProcessingError> {
        bars.sort_by_key(DailyBar::date);
        if let Some(pair) = bars.windows(2).find(|pair| pair[0].date() == pair[1].date()) {
            return Err(DataProcessingError::DuplicateDate { date: pair[0].date() });
        }
        Ok(Self(bars))
    }

    pub fn as_slice(&self) -> &[DailyBar] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Numeric fields parsed but not yet range-checked.
struct CoercedBar {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: Result<u64, DataValidationError>,
}

impl CoercedBar {
    fn parse(raw: &RawDailyBar) -> Result<Self, DataValidationError> {
        // A negative volume is a coercible but invalid bar, not a dropped one
        let volume = match validate_volume("volume", &raw.volume) {
            Ok(volume) => Ok(volume),
            Err(err @ DataValidationError::BelowMinimum { .. }) => Err(err),
            Err(err) => return Err(err),
        };

        Ok(Self {
            date: validate_date("date", &raw.date)?,
            open: parse_finite("open", &raw.open)?,
            high: parse_finite("high", &raw.high)?,
            low: parse_finite("low", &raw.low)?,
            close: parse_finite("close", &raw.close)?,
            volume,
        })
    }

    fn validate(self) -> Result<DailyBar, DataValidationError> {
        DailyBar::new(self.date, self.open, self.high, self.low, self.close, self.volume?)
    }
}

fn parse_finite(field: &'static str, input: &str) -> Result<f64, DataValidationError> {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DataValidationError::NotANumber {
            field,
            value: input.to_string(),
        })
}

/// Ingest a daily series payload.
///
/// Bars whose fields cannot be coerced are dropped and reported; a bar with
/// coercible but invalid prices (non-positive, broken OHLC ordering) fails
/// the whole ingest, as do duplicate dates and an empty result.
pub fn ingest(
    raw: &RawDailySeries,
    config: &ProcessorConfig,
) -> Result<IngestReport, DataProcessingError> {
    let time_series = raw
        .time_series
        .as_ref()
        .ok_or(DataProcessingError::MissingTimeSeries)?;

    let (series, rejected) = ingest_series(time_series, config)?;

    Ok(IngestReport {
        meta: raw.meta_data.clone(),
        series,
        rejected,
    })
}

/// Ingest a bare date-keyed series.
pub fn ingest_series(
    raw: &RawTimeSeries,
    config: &ProcessorConfig,
) -> Result<(TimeSeries, Vec<RejectedBar>), DataProcessingError> {
    if raw.is_empty() {
        return Err(DataProcessingError::EmptyTimeSeries);
    }

    let mut valid = Vec::with_capacity(raw.len());
    let mut rejected = Vec::new();

    for raw_bar in &raw.0 {
        let coerced = match CoercedBar::parse(raw_bar) {
            Ok(coerced) => coerced,
            Err(reason) => {
                warn!("Dropping bar for '{}': {}", raw_bar.date, reason);
                rejected.push(RejectedBar {
                    date: raw_bar.date.clone(),
                    reason,
                });
                continue;
            }
        };

        let date = coerced.date;
        let bar = coerced
            .validate()
            .map_err(|source| DataProcessingError::InvalidBar { date, source })?;
        valid.push(bar);
    }

    if valid.is_empty() {
        return Err(DataProcessingError::NoValidBars {
            rejected: rejected.len(),
        });
    }

    let ascending = AscendingBars::new(valid)?;
    let series = TimeSeries::from_ascending(derive(&ascending, config));

    info!(
        "Processed daily data: {} records ({} dropped)",
        series.len(),
        rejected.len()
    );
    Ok((series, rejected))
}

/// Compute change, range and moving averages. Output stays ascending.
pub fn derive(bars: &AscendingBars, config: &ProcessorConfig) -> Vec<DerivedBar> {
    let bars = bars.as_slice();
    let closes: Vec<f64> = bars.iter().map(DailyBar::close).collect();

    let moving_average = |window: MovingAverageWindow| -> Vec<Option<f64>> {
        if config.enabled(window) {
            sma(&closes, window.len())
                .into_iter()
                .map(|v| v.map(round2))
                .collect()
        } else {
            vec![None; closes.len()]
        }
    };
    let ma5 = moving_average(MovingAverageWindow::Five);
    let ma10 = moving_average(MovingAverageWindow::Ten);
    let ma20 = moving_average(MovingAverageWindow::Twenty);

    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let previous_close = i.checked_sub(1).map(|j| closes[j]);
            let change = previous_close.map(|prev| bar.close() - prev);
            let change_percent = match (change, previous_close) {
                (Some(change), Some(prev)) if prev != 0.0 => Some(round2(change / prev * 100.0)),
                _ => None,
            };
            let range = bar.high() - bar.low();

            DerivedBar {
                bar: *bar,
                change,
                change_percent,
                range,
                range_percent: round2(range / bar.close() * 100.0),
                ma5: ma5[i],
                ma10: ma10[i],
                ma20: ma20[i],
            }
        })
        .collect()
}

/// Inclusive date filter. A view: derived fields are not recomputed.
pub fn filter_by_date_range(
    series: &TimeSeries,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> TimeSeries {
    let filtered = series.retain_view(|bar| {
        start.map_or(true, |start| bar.date() >= start) && end.map_or(true, |end| bar.date() <= end)
    });
    info!(
        "Filtered data from {} to {} records",
        series.len(),
        filtered.len()
    );
    filtered
}

#[derive(Debug, Error)]
enum SummaryError {
    #[error("volume total overflowed")]
    VolumeOverflow,
}

/// Aggregate statistics for display. Degrades to an empty summary on failure.
pub fn summarize(series: &TimeSeries) -> SummaryStats {
    match try_summarize(series) {
        Ok(stats) => stats,
        Err(e) => {
            error!("Failed to generate summary statistics: {}", e);
            SummaryStats::default()
        }
    }
}

fn try_summarize(series: &TimeSeries) -> Result<SummaryStats, SummaryError> {
    let (Some(latest), Some(start), Some(end)) = (
        series.latest_bar(),
        series.iter().map(DerivedBar::date).min(),
        series.iter().map(DerivedBar::date).max(),
    ) else {
        return Ok(SummaryStats::default());
    };

    let closes: Vec<f64> = series.iter().map(DerivedBar::close).collect();
    let price_stats = mean(&closes).map(|avg| PriceStats {
        min: closes.iter().copied().fold(f64::INFINITY, f64::min),
        max: closes.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        mean: avg,
        std: sample_std_dev(&closes),
    });

    let volumes: Vec<u64> = series.iter().map(|bar| bar.bar.volume()).collect();
    let total = volumes
        .iter()
        .try_fold(0_u64, |acc, &v| acc.checked_add(v))
        .ok_or(SummaryError::VolumeOverflow)?;
    let volume_stats = VolumeStats {
        min: volumes.iter().copied().min().unwrap_or(0),
        max: volumes.iter().copied().max().unwrap_or(0),
        mean: total / volumes.len() as u64,
        total,
    };

    info!("Generated summary statistics for {} records", series.len());
    Ok(SummaryStats {
        total_records: series.len(),
        date_range: Some(DateRange { start, end }),
        latest: Some(LatestSnapshot {
            date: latest.date(),
            close: latest.close(),
            volume: latest.bar.volume(),
            change: latest.change,
            change_percent: latest.change_percent,
        }),
        price_stats,
        volume_stats: Some(volume_stats),
    })
}

/// Render each bar as display strings, preserving series order.
pub fn format_for_display(series: &TimeSeries) -> Vec<DisplayRecord> {
    let records: Vec<DisplayRecord> = series
        .iter()
        .map(|bar| DisplayRecord {
            date: bar.date().format("%Y-%m-%d").to_string(),
            open: format_price(Some(bar.bar.open())),
            high: format_price(Some(bar.bar.high())),
            low: format_price(Some(bar.bar.low())),
            close: format_price(Some(bar.close())),
            volume: group_thousands(bar.bar.volume()),
            change: bar
                .change
                .map_or_else(|| "-".to_string(), |v| format!("{v:+.2}")),
            change_percent: format_signed_percent(bar.change_percent),
            range: format_price(Some(bar.range)),
            range_percent: format!("{:.2}%", bar.range_percent),
            ma5: format_price(bar.ma5),
            ma10: format_price(bar.ma10),
            ma20: format_price(bar.ma20),
        })
        .collect();

    info!("Formatted {} records for display", records.len());
    records
}

pub fn format_price(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

pub fn format_signed_percent(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:+.2}%"))
}

/// `1234567` -> `"1,234,567"`.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
