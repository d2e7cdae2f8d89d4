use chrono::{DateTime, Duration, FixedOffset, LocalResult, NaiveDateTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use serde::Serialize;

/// Local clock time in `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClockTime {
    pub hour: u8,
    pub minute: u8,
}

impl ClockTime {
    pub const fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    /// Parse `HH:MM` (or `H:MM`). Seconds are not accepted.
    pub fn parse(input: &str) -> Option<Self> {
        let (hour, minute) = input.trim().split_once(':')?;
        let hour: u8 = hour.trim().parse().ok()?;
        let minute: u8 = minute.trim().parse().ok()?;
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    pub fn to_naive(self) -> Option<chrono::NaiveTime> {
        chrono::NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
    }
}

impl std::fmt::Display for ClockTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Timezone an exchange's clock runs in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ExchangeZone {
    Named(Tz),
    Fixed(FixedOffset),
}

impl ExchangeZone {
    pub fn utc() -> Self {
        Self::Named(Tz::UTC)
    }

    pub fn name(&self) -> String {
        match self {
            Self::Named(tz) => tz.name().to_string(),
            Self::Fixed(offset) => format!("UTC{offset}"),
        }
    }

    /// Wall-clock time in this zone at `instant`.
    pub fn local(&self, instant: DateTime<Utc>) -> NaiveDateTime {
        match self {
            Self::Named(tz) => instant.with_timezone(tz).naive_local(),
            Self::Fixed(offset) => instant.with_timezone(offset).naive_local(),
        }
    }

    /// The instant at which this zone's clock shows `local`. Ambiguous times
    /// take the earlier instant; times inside a DST gap move to the first
    /// minute after it.
    pub fn instant(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            Self::Named(tz) => localize(tz, local),
            Self::Fixed(offset) => localize(offset, local),
        }
    }
}

const MAX_GAP_MINUTES: i64 = 180;

fn localize<Z: TimeZone>(zone: &Z, local: NaiveDateTime) -> Option<DateTime<Utc>> {
    match zone.from_local_datetime(&local) {
        LocalResult::Single(t) => Some(t.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => (1..=MAX_GAP_MINUTES).find_map(|m| {
            zone.from_local_datetime(&(local + Duration::minutes(m)))
                .earliest()
                .map(|t| t.with_timezone(&Utc))
        }),
    }
}

/// Static trading-hour configuration for one exchange region.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSessionConfig {
    pub code: &'static str,
    pub name: &'static str,
    pub timezone: Tz,
    pub open: ClockTime,
    pub close: ClockTime,
    pub currency: &'static str,
    pub weekend: &'static [Weekday],
}

/// Serializable view of a [`MarketSessionConfig`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub timezone: String,
    pub market_open: String,
    pub market_close: String,
    pub currency: &'static str,
    pub weekend_days: Vec<String>,
}

impl From<&MarketSessionConfig> for MarketInfo {
    fn from(config: &MarketSessionConfig) -> Self {
        Self {
            code: config.code,
            name: config.name,
            timezone: config.timezone.name().to_string(),
            market_open: config.open.to_string(),
            market_close: config.close.to_string(),
            currency: config.currency,
            weekend_days: config.weekend.iter().map(|d| d.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Open,
    PreMarket,
    Closed,
    Unknown,
}

/// Session state at one instant plus the countdown to the next transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSessionStatus {
    pub status: SessionState,
    pub status_text: String,
    pub next_event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_transition: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seconds_until_next: Option<i64>,
}

impl MarketSessionStatus {
    /// Placeholder used when the status cannot be computed.
    pub fn unknown() -> Self {
        Self {
            status: SessionState::Unknown,
            status_text: "status unavailable".to_string(),
            next_event: String::new(),
            next_transition: None,
            seconds_until_next: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn parses_clock_times() {
        assert_eq!(ClockTime::parse("09:30"), Some(ClockTime::new(9, 30)));
        assert_eq!(ClockTime::parse("9:05"), Some(ClockTime::new(9, 5)));
        assert_eq!(ClockTime::parse("24:00"), None);
        assert_eq!(ClockTime::parse("0930"), None);
        assert_eq!(ClockTime::parse(""), None);
        assert_eq!(ClockTime::new(8, 0).to_string(), "08:00");
    }

    #[test]
    fn dst_gap_moves_forward() {
        // 2024-03-10 02:30 does not exist in New York.
        let zone = ExchangeZone::Named(chrono_tz::America::New_York);
        let local = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        let instant = zone.instant(local).unwrap();
        assert_eq!(instant.to_rfc3339(), "2024-03-10T07:00:00+00:00");
    }

    #[test]
    fn fixed_zone_round_trips_local_time() {
        let zone = ExchangeZone::Fixed(FixedOffset::east_opt(8 * 3600).unwrap());
        let local = NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        let instant = zone.instant(local).unwrap();
        assert_eq!(zone.local(instant), local);
        assert_eq!(zone.name(), "UTC+08:00");
    }
}
