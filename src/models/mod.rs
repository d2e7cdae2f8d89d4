mod daily_bar;
mod market;
mod summary;
mod symbol_match;
mod time_series;

pub use daily_bar::{DailyBar, DerivedBar, RawDailyBar, RawDailySeries, RawTimeSeries, SeriesMetadata};
pub use market::{ClockTime, ExchangeZone, MarketInfo, MarketSessionConfig, MarketSessionStatus, SessionState};
pub use summary::{DateRange, DisplayRecord, LatestSnapshot, PriceStats, SummaryStats, VolumeStats};
pub use symbol_match::{AnnotatedMatch, RawSymbolMatch, SymbolMatch};
pub use time_series::TimeSeries;
