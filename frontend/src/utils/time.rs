use chrono::{DateTime, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Playtime in hours, rounded to one decimal place.
pub fn minutes_to_hours(minutes: u32) -> f64 {
    (f64::from(minutes) / 60.0 * 10.0).round() / 10.0
}

/// Renders an unlock timestamp; `None` for locked achievements (`0`).
pub fn format_unlock_date(unlocktime: i64) -> Option<String> {
    if unlocktime <= 0 {
        return None;
    }
    DateTime::from_timestamp(unlocktime, 0).map(|at| at.format("%Y-%m-%d").to_string())
}
