//! Static lookup tables: exchange sessions, region names, UTC-offset
//! heuristics and currency symbols. All of it is compile-time data.

use chrono::{FixedOffset, Weekday};
use chrono_tz::Tz;

use crate::models::{ClockTime, ExchangeZone, MarketSessionConfig};

const SAT_SUN: &[Weekday] = &[Weekday::Sat, Weekday::Sun];

pub static MARKETS: &[MarketSessionConfig] = &[
    MarketSessionConfig {
        code: "US",
        name: "US Market",
        timezone: chrono_tz::America::New_York,
        open: ClockTime::new(9, 30),
        close: ClockTime::new(16, 0),
        currency: "USD",
        weekend: SAT_SUN,
    },
    MarketSessionConfig {
        code: "CN",
        name: "China A-Share Market",
        timezone: chrono_tz::Asia::Shanghai,
        open: ClockTime::new(9, 30),
        close: ClockTime::new(15, 0),
        currency: "CNY",
        weekend: SAT_SUN,
    },
    MarketSessionConfig {
        code: "HK",
        name: "Hong Kong Market",
        timezone: chrono_tz::Asia::Hong_Kong,
        open: ClockTime::new(9, 30),
        close: ClockTime::new(16, 0),
        currency: "HKD",
        weekend: SAT_SUN,
    },
    MarketSessionConfig {
        code: "GB",
        name: "UK Market",
        timezone: chrono_tz::Europe::London,
        open: ClockTime::new(8, 0),
        close: ClockTime::new(16, 30),
        currency: "GBP",
        weekend: SAT_SUN,
    },
    MarketSessionConfig {
        code: "DE",
        name: "German Market",
        timezone: chrono_tz::Europe::Berlin,
        open: ClockTime::new(9, 0),
        close: ClockTime::new(17, 30),
        currency: "EUR",
        weekend: SAT_SUN,
    },
    MarketSessionConfig {
        code: "JP",
        name: "Japanese Market",
        timezone: chrono_tz::Asia::Tokyo,
        open: ClockTime::new(9, 0),
        close: ClockTime::new(15, 0),
        currency: "JPY",
        weekend: SAT_SUN,
    },
    MarketSessionConfig {
        code: "KR",
        name: "Korean Market",
        timezone: chrono_tz::Asia::Seoul,
        open: ClockTime::new(9, 0),
        close: ClockTime::new(15, 30),
        currency: "KRW",
        weekend: SAT_SUN,
    },
    MarketSessionConfig {
        code: "AU",
        name: "Australian Market",
        timezone: chrono_tz::Australia::Sydney,
        open: ClockTime::new(10, 0),
        close: ClockTime::new(16, 0),
        currency: "AUD",
        weekend: SAT_SUN,
    },
    MarketSessionConfig {
        code: "CA",
        name: "Canadian Market",
        timezone: chrono_tz::America::Toronto,
        open: ClockTime::new(9, 30),
        close: ClockTime::new(16, 0),
        currency: "CAD",
        weekend: SAT_SUN,
    },
    MarketSessionConfig {
        code: "IN",
        name: "Indian Market",
        timezone: chrono_tz::Asia::Kolkata,
        open: ClockTime::new(9, 15),
        close: ClockTime::new(15, 30),
        currency: "INR",
        weekend: SAT_SUN,
    },
];

/// API region names (and their short codes) to market codes. Codes without
/// an entry in [`MARKETS`] are recognised but carry no session config.
static REGION_CODES: &[(&str, &str)] = &[
    ("United States", "US"),
    ("China", "CN"),
    ("Hong Kong", "HK"),
    ("United Kingdom", "GB"),
    ("Germany", "DE"),
    ("Japan", "JP"),
    ("South Korea", "KR"),
    ("Australia", "AU"),
    ("Canada", "CA"),
    ("India", "IN"),
    ("France", "FR"),
    ("Italy", "IT"),
    ("Spain", "ES"),
    ("Netherlands", "NL"),
    ("Switzerland", "CH"),
    ("Sweden", "SE"),
    ("Norway", "NO"),
    ("Denmark", "DK"),
    ("Finland", "FI"),
    ("Belgium", "BE"),
    ("Austria", "AT"),
    ("Brazil", "BR"),
    ("Mexico", "MX"),
    ("Russia", "RU"),
    ("Singapore", "SG"),
    ("Thailand", "TH"),
    ("Malaysia", "MY"),
    ("Indonesia", "ID"),
    ("Philippines", "PH"),
    ("Vietnam", "VN"),
    ("Taiwan", "TW"),
    ("New Zealand", "NZ"),
    ("South Africa", "ZA"),
    ("Israel", "IL"),
    ("Turkey", "TR"),
    ("Poland", "PL"),
    ("Czech Republic", "CZ"),
    ("Hungary", "HU"),
    ("UK", "GB"),
];

/// UTC offsets (minutes east) to the zone most listings at that offset use.
static OFFSET_ZONES: &[(i32, Tz)] = &[
    (-5 * 60, chrono_tz::America::New_York),
    (-4 * 60, chrono_tz::America::New_York),
    (0, chrono_tz::Europe::London),
    (60, chrono_tz::Europe::Berlin),
    (8 * 60, chrono_tz::Asia::Shanghai),
    (9 * 60, chrono_tz::Asia::Tokyo),
    (-8 * 60, chrono_tz::America::Los_Angeles),
    (-7 * 60, chrono_tz::America::Los_Angeles),
    (5 * 60 + 30, chrono_tz::Asia::Kolkata),
    (10 * 60, chrono_tz::Australia::Sydney),
    (11 * 60, chrono_tz::Australia::Sydney),
];

static CURRENCY_SYMBOLS: &[(&str, &str)] = &[
    ("USD", "$"),
    ("CNY", "¥"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("GBX", "p"),
    ("JPY", "¥"),
    ("KRW", "₩"),
    ("HKD", "HK$"),
    ("CAD", "C$"),
    ("AUD", "A$"),
    ("SGD", "S$"),
    ("INR", "₹"),
    ("BRL", "R$"),
    ("RUB", "₽"),
    ("CHF", "CHF"),
    ("SEK", "kr"),
    ("NOK", "kr"),
    ("DKK", "kr"),
    ("PLN", "zł"),
    ("CZK", "Kč"),
    ("HUF", "Ft"),
    ("TRY", "₺"),
    ("ZAR", "R"),
    ("MXN", "$"),
    ("THB", "฿"),
    ("MYR", "RM"),
    ("IDR", "Rp"),
    ("PHP", "₱"),
    ("VND", "₫"),
    ("TWD", "NT$"),
    ("NZD", "NZ$"),
];

pub fn all_markets() -> &'static [MarketSessionConfig] {
    MARKETS
}

/// Market code for an API region string or a two-letter code.
pub fn market_code_for_region(region: &str) -> Option<&'static str> {
    let region = region.trim();
    if region.is_empty() {
        return None;
    }
    REGION_CODES
        .iter()
        .find_map(|&(name, code)| {
            (name.eq_ignore_ascii_case(region) || code.eq_ignore_ascii_case(region)).then_some(code)
        })
}

pub fn market_by_code(code: &str) -> Option<&'static MarketSessionConfig> {
    MARKETS.iter().find(|m| m.code.eq_ignore_ascii_case(code))
}

/// Session config for a free-text region, if one is configured.
pub fn market_for_region(region: &str) -> Option<&'static MarketSessionConfig> {
    market_code_for_region(region).and_then(market_by_code)
}

/// Parse `UTC`, `UTC+8`, `UTC-05`, `UTC+05:30` into minutes east of UTC.
/// Returns `None` when the string is not in that family.
pub fn parse_utc_offset(input: &str) -> Option<i32> {
    let rest = input.trim().strip_prefix("UTC")?;
    if rest.is_empty() {
        return Some(0);
    }

    let (sign, digits) = match rest.as_bytes().first()? {
        b'+' => (1, &rest[1..]),
        b'-' => (-1, &rest[1..]),
        _ => (1, rest),
    };

    let (hours, minutes) = match digits.split_once(':') {
        Some((h, m)) => (h, m),
        None => (digits, "0"),
    };
    let hours: i32 = hours.parse().ok()?;
    let minutes: i32 = minutes.parse().ok()?;
    if !(0..=14).contains(&hours) || !(0..60).contains(&minutes) {
        return None;
    }

    Some(sign * (hours * 60 + minutes))
}

/// Resolve an API timezone string to a zone. Known offsets map to a named
/// zone so DST is honoured; other offsets become fixed; a bare IANA name is
/// accepted; anything else is UTC.
pub fn zone_for_timezone_str(input: &str) -> ExchangeZone {
    let trimmed = input.trim();

    if trimmed.starts_with("UTC") {
        let Some(offset_minutes) = parse_utc_offset(trimmed) else {
            return ExchangeZone::utc();
        };
        if let Some(&(_, tz)) = OFFSET_ZONES.iter().find(|(m, _)| *m == offset_minutes) {
            return ExchangeZone::Named(tz);
        }
        return FixedOffset::east_opt(offset_minutes * 60)
            .map(ExchangeZone::Fixed)
            .unwrap_or_else(ExchangeZone::utc);
    }

    trimmed
        .parse::<Tz>()
        .map(ExchangeZone::Named)
        .unwrap_or_else(|_| ExchangeZone::utc())
}

/// Currency symbol for an ISO code; unknown codes are echoed back.
pub fn currency_symbol(code: &str) -> String {
    let code = code.trim();
    CURRENCY_SYMBOLS
        .iter()
        .find(|(iso, _)| iso.eq_ignore_ascii_case(code))
        .map(|(_, symbol)| symbol.to_string())
        .unwrap_or_else(|| code.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_lookup() {
        assert_eq!(market_code_for_region("United States"), Some("US"));
        assert_eq!(market_code_for_region("united states"), Some("US"));
        assert_eq!(market_code_for_region(" HONG KONG "), Some("HK"));
        assert_eq!(market_code_for_region("UK"), Some("GB"));
        assert_eq!(market_code_for_region("hk"), Some("HK"));
        assert_eq!(market_code_for_region("Atlantis"), None);

        assert_eq!(market_for_region("Hong Kong").unwrap().timezone, chrono_tz::Asia::Hong_Kong);
        assert_eq!(market_for_region("United Kingdom").unwrap().open, ClockTime::new(8, 0));
        // Known region without a configured session.
        assert_eq!(market_code_for_region("France"), Some("FR"));
        assert!(market_for_region("France").is_none());
    }

    #[test]
    fn every_market_code_is_reachable_from_a_region() {
        for market in all_markets() {
            assert_eq!(market_for_region(market.code).map(|m| m.code), Some(market.code));
        }
    }

    #[test]
    fn parses_offsets() {
        assert_eq!(parse_utc_offset("UTC"), Some(0));
        assert_eq!(parse_utc_offset("UTC+08"), Some(480));
        assert_eq!(parse_utc_offset("UTC-05"), Some(-300));
        assert_eq!(parse_utc_offset("UTC+5:30"), Some(330));
        assert_eq!(parse_utc_offset("UTC+xx"), None);
        assert_eq!(parse_utc_offset("GMT+1"), None);
    }

    #[test]
    fn offset_heuristic() {
        assert_eq!(
            zone_for_timezone_str("UTC-04"),
            ExchangeZone::Named(chrono_tz::America::New_York)
        );
        assert_eq!(
            zone_for_timezone_str("UTC+08"),
            ExchangeZone::Named(chrono_tz::Asia::Shanghai)
        );
        assert_eq!(
            zone_for_timezone_str("UTC+03"),
            ExchangeZone::Fixed(FixedOffset::east_opt(3 * 3600).unwrap())
        );
        assert_eq!(
            zone_for_timezone_str("Asia/Tokyo"),
            ExchangeZone::Named(chrono_tz::Asia::Tokyo)
        );
        assert_eq!(zone_for_timezone_str("garbage"), ExchangeZone::utc());
        assert_eq!(zone_for_timezone_str("UTC+zz"), ExchangeZone::utc());
    }

    #[test]
    fn currency_symbols() {
        assert_eq!(currency_symbol("usd"), "$");
        assert_eq!(currency_symbol("HKD"), "HK$");
        assert_eq!(currency_symbol("XYZ"), "XYZ");
    }
}
