/// Market Session Resolver tests: weekend handling, countdown behaviour
/// across a closed period, and resolution from API-provided hours.

use chrono::{DateTime, Duration, TimeZone, Utc};
use chrono_tz::Tz;
use ifinance_backend::models::SessionState;
use ifinance_backend::services::market_session::{resolve, status_at, SessionParams};

fn at(tz: Tz, y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    tz.with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .unwrap()
        .with_timezone(&Utc)
}

#[test]
fn saturday_morning_in_new_york_is_closed_until_monday_open() {
    let now = at(chrono_tz::America::New_York, 2024, 1, 13, 10, 0);
    let status = resolve("", "", "", Some("United States"), now);

    assert_eq!(status.status, SessionState::Closed);
    assert_eq!(status.status_text, "US Market closed (weekend)");
    assert_eq!(
        status.next_transition,
        Some(at(chrono_tz::America::New_York, 2024, 1, 15, 9, 30))
    );
    assert_eq!(status.next_event, "Opens Monday in 1d 23h 30m");
}

#[test]
fn weekend_countdown_shrinks_monotonically() {
    let params = SessionParams::resolve("", "", "", Some("United States"));
    let start = at(chrono_tz::America::New_York, 2024, 1, 12, 16, 30);

    let mut previous: Option<i64> = None;
    for step in 0..(60 * 2) {
        let now = start + Duration::minutes(step * 30);
        let status = status_at(&params, now).unwrap();
        if status.status != SessionState::Closed {
            break;
        }
        let seconds = status.seconds_until_next.unwrap();
        if let Some(previous) = previous {
            assert!(seconds < previous, "countdown must shrink while closed");
            assert!(previous - seconds <= 30 * 60, "countdown cannot drop faster than the clock");
        }
        previous = Some(seconds);
    }
    assert!(previous.is_some());
}

#[test]
fn api_hours_and_offset_drive_resolution_without_a_region_config() {
    // 10:30 in Tokyo on a Wednesday, hours taken from the API strings.
    let now = at(chrono_tz::Asia::Tokyo, 2024, 1, 10, 10, 30);
    let status = resolve("09:00", "15:00", "UTC+09", Some("Atlantis"), now);
    assert_eq!(status.status, SessionState::Open);
    assert_eq!(status.status_text, "Market open");
    assert_eq!(status.next_event, "Closes in 4h 30m");
}

#[test]
fn london_pre_market_uses_local_summer_time() {
    // 07:00 BST is 06:00 UTC; the UK session opens at 08:00 local.
    let now = Utc.with_ymd_and_hms(2024, 7, 10, 6, 0, 0).unwrap();
    let status = resolve("", "", "", Some("United Kingdom"), now);
    assert_eq!(status.status, SessionState::PreMarket);
    assert_eq!(status.next_event, "Opens in 1h 0m");
}

#[test]
fn unparseable_inputs_still_resolve() {
    let now = Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap();
    let status = resolve("nonsense", "", "nowhere", None, now);
    // Defaults 09:30-15:00 in UTC.
    assert_eq!(status.status, SessionState::Open);
    assert_eq!(status.next_event, "Closes in 3h 0m");
}
