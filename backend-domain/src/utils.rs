use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use uuid::Uuid;

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Amounts in evidence are shown to two decimals.
pub fn round_money(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn start_of_month(at: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(at.year(), at.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(at)
}

const MAX_LOOKBACK_DAYS: u64 = 36_500;

pub fn days_before(at: DateTime<Utc>, days: u64) -> DateTime<Utc> {
    at - Duration::days(days.min(MAX_LOOKBACK_DAYS) as i64)
}

pub fn hours_before(at: DateTime<Utc>, hours: u64) -> DateTime<Utc> {
    at - Duration::hours(hours.min(MAX_LOOKBACK_DAYS * 24) as i64)
}
