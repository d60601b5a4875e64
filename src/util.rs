// ABOUTME: Utility functions for fallbacks, ordinals, and human-readable dates
// ABOUTME: Provides consistent text rendering for notes and Things date strings

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc};

/// First present value from `sources`, in order, else `default`.
pub fn fallback(sources: &[Option<&str>], default: &str) -> String {
    sources
        .iter()
        .find_map(|s| *s)
        .unwrap_or(default)
        .to_string()
}

pub fn ordinal(day: u32) -> String {
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", day, suffix)
}

/// `January 5th, 2024`
pub fn format_date(date: NaiveDate) -> String {
    format!(
        "{} {}, {}",
        date.format("%B"),
        ordinal(date.day()),
        date.year()
    )
}

/// `January 5th, 2024 at 3 PM` in `offset`, or `Unknown`.
pub fn format_timestamp(ts: Option<&DateTime<Utc>>, offset: &FixedOffset) -> String {
    match ts {
        Some(ts) => {
            let local = ts.with_timezone(offset);
            format!(
                "{} at {}",
                format_date(local.date_naive()),
                local.format("%-I %p")
            )
        }
        None => "Unknown".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_takes_first_present() {
        assert_eq!(fallback(&[None, Some("b"), Some("c")], "d"), "b");
        assert_eq!(fallback(&[Some("a"), Some("b")], "d"), "a");
    }

    #[test]
    fn test_fallback_default() {
        assert_eq!(fallback(&[None, None], "No name"), "No name");
        assert_eq!(fallback(&[], "No title"), "No title");
    }

    #[test]
    fn test_fallback_keeps_empty_strings() {
        assert_eq!(fallback(&[Some(""), Some("b")], "d"), "");
    }

    #[test]
    fn test_ordinal_suffixes() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(21), "21st");
        assert_eq!(ordinal(22), "22nd");
        assert_eq!(ordinal(31), "31st");
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        assert_eq!(format_date(date), "January 5th, 2024");
    }

    #[test]
    fn test_format_timestamp_utc() {
        let ts: DateTime<Utc> = "2024-01-05T15:30:00Z".parse().unwrap();
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(
            format_timestamp(Some(&ts), &utc),
            "January 5th, 2024 at 3 PM"
        );
    }

    #[test]
    fn test_format_timestamp_shifts_day_with_offset() {
        let ts: DateTime<Utc> = "2024-03-01T02:00:00Z".parse().unwrap();
        let eastern = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(
            format_timestamp(Some(&ts), &eastern),
            "February 29th, 2024 at 9 PM"
        );
    }

    #[test]
    fn test_format_timestamp_missing() {
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(format_timestamp(None, &utc), "Unknown");
    }
}
