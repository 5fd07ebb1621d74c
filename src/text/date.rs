//! Issuance dates.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};

/// English ordinal suffix for a day of the month.
pub fn ordinal_suffix(day: u32) -> &'static str {
    if (11..=13).contains(&(day % 100)) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

/// `Given this 15th day of January, 2024.`
pub fn issuance_paragraph(date: NaiveDate) -> String {
    format!(
        "Given this {}{} day of {}, {}.",
        date.day(),
        ordinal_suffix(date.day()),
        date.format("%B"),
        date.year()
    )
}

/// Parse `generated_on`, falling back to today's local date.
pub fn resolve_issuance_date(generated_on: Option<&str>) -> NaiveDate {
    resolve_issuance_date_or(generated_on, Local::now().date_naive())
}

/// Parse `generated_on`, falling back to `today`.
pub fn resolve_issuance_date_or(generated_on: Option<&str>, today: NaiveDate) -> NaiveDate {
    generated_on
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(parse_date)
        .unwrap_or(today)
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

fn parse_date(input: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.date_naive());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .map(|dt| dt.date())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
        })
}
