// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time formatting.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Format a duration in seconds as `"3h 07m"`.
///
/// Zero or missing durations render as an em dash.
pub fn format_duration(seconds: Option<f64>) -> String {
    match seconds {
        Some(s) if s > 0.0 => {
            let total = s as u64;
            format!("{}h {:02}m", total / 3600, (total % 3600) / 60)
        }
        _ => "\u{2014}".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_utc_rfc3339() {
        let date = Utc.with_ymd_and_hms(2026, 7, 14, 6, 30, 0).unwrap();
        assert_eq!(format_utc_rfc3339(date), "2026-07-14T06:30:00Z");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Some(11220.0)), "3h 07m");
        assert_eq!(format_duration(Some(59.9)), "0h 00m");
        assert_eq!(format_duration(Some(90061.0)), "25h 01m");
    }

    #[test]
    fn test_format_duration_empty() {
        assert_eq!(format_duration(None), "\u{2014}");
        assert_eq!(format_duration(Some(0.0)), "\u{2014}");
    }
}
