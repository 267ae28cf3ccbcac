//! Date normalization.
//!
//! Dates enter the system in whatever form the office spreadsheets and forms
//! produce; they are stored as calendar dates and rendered `YYYY-MM-DD`.

use chrono::NaiveDate;

/// Canonical rendering of stored dates.
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d";

/// Parse `YYYY-MM-DD`, `D/M/YYYY` (one or two digit day and month) or an ISO
/// datetime whose date part is kept.
///
/// Returns `None` for anything else, including impossible calendar dates.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Some(date) = parse_ymd(raw) {
        return Some(date);
    }

    if let Some((date_part, _)) = raw.split_once('T') {
        return parse_ymd(date_part);
    }

    let mut parts = raw.split('/');
    let (day, month, year) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some()
        || !is_digits(day, 1..=2)
        || !is_digits(month, 1..=2)
        || !is_digits(year, 4..=4)
    {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Normalize to the canonical text form, or `None` when unparseable.
pub fn normalize_date(raw: &str) -> Option<String> {
    parse_date(raw).map(|d| d.format(CANONICAL_FORMAT).to_string())
}

fn parse_ymd(raw: &str) -> Option<NaiveDate> {
    let mut parts = raw.split('-');
    let (year, month, day) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some()
        || !is_digits(year, 4..=4)
        || !is_digits(month, 2..=2)
        || !is_digits(day, 2..=2)
    {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn is_digits(s: &str, len: std::ops::RangeInclusive<usize>) -> bool {
    len.contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}
