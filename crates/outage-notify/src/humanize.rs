//! Human-readable time phrasing for notification details.
//!
//! Buckets follow the conventions chat users already know from monitoring
//! dashboards: anything under 45 seconds is "a few seconds", 45 to 89 seconds
//! is "a minute", and so on up to years.

use chrono::{DateTime, TimeDelta, Utc};

/// Average Gregorian month length in days.
const DAYS_PER_MONTH: f64 = 146_097.0 / 4800.0;

/// Phrase a duration ("5 minutes", "an hour", "3 days").
///
/// The sign of `elapsed` is ignored.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn duration(elapsed: TimeDelta) -> String {
    let secs = elapsed.num_seconds().unsigned_abs() as f64;
    let minutes = (secs / 60.0).round() as u64;
    let hours = (secs / 3600.0).round() as u64;
    let days_exact = secs / 86_400.0;
    let days = days_exact.round() as u64;
    let months_exact = days_exact / DAYS_PER_MONTH;
    let months = months_exact.round() as u64;
    let years = (months_exact / 12.0).round() as u64;

    if secs < 45.0 {
        "a few seconds".to_string()
    } else if minutes <= 1 {
        "a minute".to_string()
    } else if minutes < 45 {
        format!("{minutes} minutes")
    } else if hours <= 1 {
        "an hour".to_string()
    } else if hours < 22 {
        format!("{hours} hours")
    } else if days <= 1 {
        "a day".to_string()
    } else if days < 26 {
        format!("{days} days")
    } else if months <= 1 {
        "a month".to_string()
    } else if months < 11 {
        format!("{months} months")
    } else if years <= 1 {
        "a year".to_string()
    } else {
        format!("{years} years")
    }
}

/// Phrase `at` relative to `now` ("3 minutes ago", "in an hour").
#[must_use]
pub fn relative(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = now - at;
    if delta < TimeDelta::zero() {
        format!("in {}", duration(delta))
    } else {
        format!("{} ago", duration(delta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_duration_buckets() {
        let cases = [
            (TimeDelta::seconds(0), "a few seconds"),
            (TimeDelta::seconds(44), "a few seconds"),
            (TimeDelta::seconds(45), "a minute"),
            (TimeDelta::seconds(89), "a minute"),
            (TimeDelta::seconds(90), "2 minutes"),
            (TimeDelta::minutes(3), "3 minutes"),
            (TimeDelta::minutes(44), "44 minutes"),
            (TimeDelta::minutes(45), "an hour"),
            (TimeDelta::minutes(90), "2 hours"),
            (TimeDelta::hours(21), "21 hours"),
            (TimeDelta::hours(22), "a day"),
            (TimeDelta::hours(36), "2 days"),
            (TimeDelta::days(25), "25 days"),
            (TimeDelta::days(26), "a month"),
            (TimeDelta::days(45), "a month"),
            (TimeDelta::days(100), "3 months"),
            (TimeDelta::days(300), "10 months"),
            (TimeDelta::days(320), "a year"),
            (TimeDelta::days(730), "2 years"),
        ];

        for (delta, expected) in cases {
            assert_eq!(duration(delta), expected, "for {delta}");
        }
    }

    #[test]
    fn test_duration_ignores_sign() {
        assert_eq!(duration(TimeDelta::minutes(-5)), "5 minutes");
    }

    #[test]
    fn test_relative_past_and_future() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        assert_eq!(relative(now - TimeDelta::minutes(3), now), "3 minutes ago");
        assert_eq!(relative(now, now), "a few seconds ago");
        assert_eq!(relative(now + TimeDelta::hours(1), now), "in an hour");
    }
}
