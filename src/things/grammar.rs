// ABOUTME: Date, time and date@time grammars accepted by the Things URL scheme
// ABOUTME: Parses typed or textual values and renders the canonical strings

use crate::util::format_date;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Timelike};
use regex::Regex;
use std::sync::OnceLock;

/// A calendar day for `deadline` or `when`.
#[derive(Debug, Clone, PartialEq)]
pub enum DateValue {
    Date(NaiveDate),
    Timestamp(DateTime<FixedOffset>),
    /// `anytime`, `someday`, `2024-01-05`, RFC 3339, or `January 5th, 2024`.
    Text(String),
}

/// A time of day.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeValue {
    Time(NaiveTime),
    /// `3:30pm`, `3:30 PM`, `15:30`.
    Text(String),
}

/// A day plus a reminder time.
#[derive(Debug, Clone, PartialEq)]
pub enum DateTimeValue {
    Timestamp(DateTime<FixedOffset>),
    Parts(DateValue, TimeValue),
    /// RFC 3339 or `<date>@<time>`.
    Text(String),
}

fn long_date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^([A-Za-z]+)\.? (\d{1,2})(?:st|nd|rd|th)?,? (\d{4})$")
            .expect("long date pattern is valid")
    })
}

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^(?:(1[0-2]|0?[1-9]):([0-5][0-9]) ?([AaPp][Mm])|([01]?[0-9]|2[0-3]):([0-5][0-9]))$",
        )
        .expect("time pattern is valid")
    })
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.date_naive());
    }
    let caps = long_date_pattern().captures(text)?;
    NaiveDate::parse_from_str(
        &format!("{} {} {}", &caps[1], &caps[2], &caps[3]),
        "%B %d %Y",
    )
    .ok()
}

fn parse_time_text(text: &str) -> Option<NaiveTime> {
    let caps = time_pattern().captures(text.trim())?;
    if let (Some(hour), Some(minute), Some(meridiem)) = (caps.get(1), caps.get(2), caps.get(3)) {
        let hour: u32 = hour.as_str().parse().ok()?;
        let minute: u32 = minute.as_str().parse().ok()?;
        let pm = meridiem.as_str().eq_ignore_ascii_case("pm");
        let hour = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, true) => h + 12,
            (h, false) => h,
        };
        return NaiveTime::from_hms_opt(hour, minute, 0);
    }
    let hour: u32 = caps.get(4)?.as_str().parse().ok()?;
    let minute: u32 = caps.get(5)?.as_str().parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

fn format_time(time: NaiveTime) -> String {
    let (pm, hour) = time.hour12();
    format!("{} {}", hour, if pm { "pm" } else { "am" })
}

/// Renders `MMMM do, yyyy`, passing the `anytime`/`someday` keywords through.
pub fn render_date(value: &DateValue) -> Result<String, String> {
    match value {
        DateValue::Date(date) => Ok(format_date(*date)),
        DateValue::Timestamp(ts) => Ok(format_date(ts.date_naive())),
        DateValue::Text(text) if text == "anytime" || text == "someday" => Ok(text.clone()),
        DateValue::Text(text) => parse_date_text(text).map(format_date).ok_or_else(|| {
            format!(
                "invalid date `{}`, expected YYYY-MM-DD, an ISO timestamp or `Month D, YYYY`",
                text
            )
        }),
    }
}

/// Renders `h am|pm`.
pub fn render_time(value: &TimeValue) -> Result<String, String> {
    match value {
        TimeValue::Time(time) => Ok(format_time(*time)),
        TimeValue::Text(text) => parse_time_text(text)
            .map(format_time)
            .ok_or_else(|| format!("invalid time `{}`, expected h:mm am|pm or HH:mm", text)),
    }
}

/// Renders `MMMM do, yyyy@h am|pm`.
pub fn render_date_time(value: &DateTimeValue) -> Result<String, String> {
    match value {
        DateTimeValue::Timestamp(ts) => Ok(format!(
            "{}@{}",
            format_date(ts.date_naive()),
            format_time(ts.time())
        )),
        DateTimeValue::Parts(date, time) => join_parts(render_date(date), render_time(time)),
        DateTimeValue::Text(text) => {
            if let Ok(ts) = DateTime::parse_from_rfc3339(text.trim()) {
                return render_date_time(&DateTimeValue::Timestamp(ts));
            }
            match text.split_once('@') {
                Some((date, time)) => join_parts(
                    render_date(&DateValue::Text(date.trim().to_string())),
                    render_time(&TimeValue::Text(time.trim().to_string())),
                ),
                None => Err(format!(
                    "invalid date-time `{}`, expected an ISO timestamp or <date>@<time>",
                    text
                )),
            }
        }
    }
}

fn join_parts(
    date: Result<String, String>,
    time: Result<String, String>,
) -> Result<String, String> {
    match (date, time) {
        (Ok(date), Ok(time)) => Ok(format!("{}@{}", date, time)),
        (Err(e), Ok(_)) | (Ok(_), Err(e)) => Err(e),
        (Err(a), Err(b)) => Err(format!("{}; {}", a, b)),
    }
}
