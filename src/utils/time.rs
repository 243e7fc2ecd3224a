use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

/// This is the standard way of converting a date to a daily usage key in focuswave.
pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Returns start of the next day.
pub fn next_day_start(date: DateTime<Utc>) -> DateTime<Utc> {
    (date + Duration::days(1))
        .date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc()
}

/// Splits `[start, end)` into per-day portions. Empty when the range is empty or reversed.
pub fn split_by_day(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<(NaiveDate, Duration)> {
    let mut portions = vec![];
    let mut current = start;
    while current < end {
        let boundary = next_day_start(current).min(end);
        portions.push((current.date_naive(), boundary - current));
        current = boundary;
    }
    portions
}

/// Adds two durations, stopping at the largest representable one instead of overflowing.
pub fn saturating_add(total: Duration, portion: Duration) -> Duration {
    total.checked_add(&portion).unwrap_or(Duration::MAX)
}

/// Formats durations the way the dashboard shows them: `2h 5m` or `5m`.
pub fn format_duration(duration: Duration) -> String {
    let minutes_total = duration.num_minutes().max(0);
    let hours = minutes_total / 60;
    let minutes = minutes_total % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}
