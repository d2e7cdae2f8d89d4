//! Market Session Resolver: open / pre-market / closed relative to an
//! instant, and the countdown to the next transition.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc, Weekday};
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{
    ClockTime, ExchangeZone, MarketSessionConfig, MarketSessionStatus, SessionState,
};
use crate::services::market_config::{market_for_region, zone_for_timezone_str};

const DEFAULT_OPEN: ClockTime = ClockTime::new(9, 30);
const DEFAULT_CLOSE: ClockTime = ClockTime::new(15, 0);
const DEFAULT_WEEKEND: &[Weekday] = &[Weekday::Sat, Weekday::Sun];
const GENERIC_MARKET_NAME: &str = "Market";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("close time {close} is not after open time {open}")]
    InvalidSessionWindow { open: ClockTime, close: ClockTime },

    #[error("calendar has no trading days")]
    NoTradingDays,

    #[error("local time {0} cannot be represented in {1}")]
    UnrepresentableLocalTime(String, String),
}

/// Everything the resolver needs about one exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionParams {
    pub name: String,
    pub zone: ExchangeZone,
    pub open: ClockTime,
    pub close: ClockTime,
    pub weekend: Vec<Weekday>,
}

impl From<&MarketSessionConfig> for SessionParams {
    fn from(config: &MarketSessionConfig) -> Self {
        Self {
            name: config.name.to_string(),
            zone: ExchangeZone::Named(config.timezone),
            open: config.open,
            close: config.close,
            weekend: config.weekend.to_vec(),
        }
    }
}

impl SessionParams {
    /// Pick session parameters. A configured region wins over the API's
    /// clock strings; otherwise the strings are parsed, falling back to
    /// 09:30/15:00, and the zone comes from the offset heuristic.
    pub fn resolve(
        market_open: &str,
        market_close: &str,
        timezone: &str,
        region: Option<&str>,
    ) -> Self {
        if let Some(config) = region.and_then(market_for_region) {
            debug!("Using configured session for region {:?}: {}", region, config.code);
            return Self::from(config);
        }

        let (open, close) = match (ClockTime::parse(market_open), ClockTime::parse(market_close)) {
            (Some(open), Some(close)) => (open, close),
            _ => (DEFAULT_OPEN, DEFAULT_CLOSE),
        };

        Self {
            name: GENERIC_MARKET_NAME.to_string(),
            zone: zone_for_timezone_str(timezone),
            open,
            close,
            weekend: DEFAULT_WEEKEND.to_vec(),
        }
    }

    fn is_weekend(&self, date: NaiveDate) -> bool {
        self.weekend.contains(&date.weekday())
    }

    /// First date strictly after `date` that is not a weekend day.
    fn next_trading_date(&self, date: NaiveDate) -> Result<NaiveDate, SessionError> {
        let mut next = date;
        for _ in 0..7 {
            next = next.succ_opt().ok_or(SessionError::NoTradingDays)?;
            if !self.is_weekend(next) {
                return Ok(next);
            }
        }
        Err(SessionError::NoTradingDays)
    }

    fn instant_at(&self, date: NaiveDate, clock: ClockTime) -> Result<DateTime<Utc>, SessionError> {
        let unrepresentable =
            || SessionError::UnrepresentableLocalTime(format!("{date} {clock}"), self.zone.name());
        let time = clock.to_naive().ok_or_else(unrepresentable)?;
        self.zone.instant(date.and_time(time)).ok_or_else(unrepresentable)
    }
}

/// Resolve session status, degrading to [`MarketSessionStatus::unknown`] on
/// any internal failure.
pub fn resolve(
    market_open: &str,
    market_close: &str,
    timezone: &str,
    region: Option<&str>,
    now: DateTime<Utc>,
) -> MarketSessionStatus {
    let params = SessionParams::resolve(market_open, market_close, timezone, region);
    match status_at(&params, now) {
        Ok(status) => status,
        Err(e) => {
            warn!("Failed to compute market status for {}: {}", params.name, e);
            MarketSessionStatus::unknown()
        }
    }
}

/// Resolve session status, surfacing internal failures.
pub fn try_resolve(
    market_open: &str,
    market_close: &str,
    timezone: &str,
    region: Option<&str>,
    now: DateTime<Utc>,
) -> Result<MarketSessionStatus, SessionError> {
    let params = SessionParams::resolve(market_open, market_close, timezone, region);
    status_at(&params, now)
}

/// Session status for explicit parameters.
pub fn status_at(
    params: &SessionParams,
    now: DateTime<Utc>,
) -> Result<MarketSessionStatus, SessionError> {
    if params.close <= params.open {
        return Err(SessionError::InvalidSessionWindow {
            open: params.open,
            close: params.close,
        });
    }
    if ALL_WEEKDAYS.iter().all(|d| params.weekend.contains(d)) {
        return Err(SessionError::NoTradingDays);
    }

    let today = params.zone.local(now).date();
    let name = &params.name;

    if params.is_weekend(today) {
        let next_date = params.next_trading_date(today)?;
        let next_open = params.instant_at(next_date, params.open)?;
        let remaining = time_until(now, next_open);
        return Ok(MarketSessionStatus {
            status: SessionState::Closed,
            status_text: format!("{name} closed (weekend)"),
            next_event: opening_event(next_date, remaining, "Opens in"),
            next_transition: Some(next_open),
            seconds_until_next: Some(remaining.num_seconds()),
        });
    }

    let open_at = params.instant_at(today, params.open)?;
    let close_at = params.instant_at(today, params.close)?;

    if now < open_at {
        let remaining = time_until(now, open_at);
        return Ok(MarketSessionStatus {
            status: SessionState::PreMarket,
            status_text: format!("{name} pre-market"),
            next_event: format!("Opens in {}", format_countdown(remaining)),
            next_transition: Some(open_at),
            seconds_until_next: Some(remaining.num_seconds()),
        });
    }

    if now <= close_at {
        let remaining = time_until(now, close_at);
        return Ok(MarketSessionStatus {
            status: SessionState::Open,
            status_text: format!("{name} open"),
            next_event: format!("Closes in {}", format_countdown(remaining)),
            next_transition: Some(close_at),
            seconds_until_next: Some(remaining.num_seconds()),
        });
    }

    let next_date = params.next_trading_date(today)?;
    let next_open = params.instant_at(next_date, params.open)?;
    let remaining = time_until(now, next_open);
    Ok(MarketSessionStatus {
        status: SessionState::Closed,
        status_text: format!("{name} closed"),
        next_event: opening_event(next_date, remaining, "Opens next trading day in"),
        next_transition: Some(next_open),
        seconds_until_next: Some(remaining.num_seconds()),
    })
}

const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn time_until(now: DateTime<Utc>, target: DateTime<Utc>) -> Duration {
    (target - now).max(Duration::zero())
}

fn opening_event(next_date: NaiveDate, remaining: Duration, same_day_prefix: &str) -> String {
    if remaining.num_days() > 0 {
        if next_date.weekday() == Weekday::Mon {
            format!("Opens Monday in {}", format_countdown(remaining))
        } else {
            format!("Opens next trading day in {}", format_countdown(remaining))
        }
    } else {
        format!("{same_day_prefix} {}", format_countdown(remaining))
    }
}

/// `"{d}d {h}h {m}m"` when a day or more remains, else `"{h}h {m}m"`.
pub fn format_countdown(remaining: Duration) -> String {
    let total_minutes = remaining.num_minutes().max(0);
    let days = total_minutes / (24 * 60);
    let hours = (total_minutes / 60) % 24;
    let minutes = total_minutes % 60;
    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else {
        format!("{hours}h {minutes}m")
    }
}
