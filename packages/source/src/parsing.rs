//! Cell-level parsing for crime source tables.
//!
//! Parsing never fails loudly: a value that cannot be interpreted becomes
//! `None` and the record is kept.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Day-first date layouts, tried in order. `yyyy/mm/dd` comes last: a
/// four-digit leading field can never be a day.
const DAY_FIRST_DATE_FORMATS: &[&str] = &[
    "%d/%m/%y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y/%m/%d",
];

/// Time suffixes accepted after a date, tried in order.
const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

/// ISO date-time layouts.
const ISO_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses a reported-date cell, reading ambiguous dates day-first.
///
/// Accepts `dd/mm/yyyy`, `dd/mm/yy`, `dd-mm-yyyy`, `dd.mm.yyyy` and
/// `yyyy/mm/dd`, each optionally followed by a space and a 24-hour
/// `HH:MM[:SS]` or 12-hour `hh:MM[:SS] AM|PM` time. ISO `yyyy-mm-dd` (with
/// an optional `T`- or space-separated time) is accepted as well since it
/// cannot be confused with a day-first layout.
///
/// Returns `None` for empty or unparseable values.
#[must_use]
pub fn parse_reported_date(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(dt) = parse_iso(s) {
        return Some(dt);
    }

    let (date_part, time_part) = match s.split_once(' ') {
        Some((d, t)) => (d, Some(t.trim())),
        None => (s, None),
    };

    let date = DAY_FIRST_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())?;

    let time = match time_part {
        None | Some("") => NaiveTime::MIN,
        Some(t) => TIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveTime::parse_from_str(t, fmt).ok())?,
    };

    Some(date.and_time(time))
}

fn parse_iso(s: &str) -> Option<NaiveDateTime> {
    // Only four-digit years lead, so `dd-mm-yy` is never read as year `dd`.
    if s.as_bytes().get(4) != Some(&b'-') {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date.and_time(NaiveTime::MIN));
    }
    ISO_DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// Parses an offence-count cell as a non-negative integer.
///
/// Integral decimal renderings such as `"3.0"` are accepted. Returns `None`
/// for empty, negative, fractional, or non-numeric values.
#[must_use]
pub fn parse_offence_count(raw: &str) -> Option<u64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(n) = s.parse::<u64>() {
        return Some(n);
    }
    let (whole, frac) = s.split_once('.')?;
    if frac.chars().all(|c| c == '0') {
        whole.parse::<u64>().ok()
    } else {
        None
    }
}

/// Trims a text cell, mapping blank values to `None`.
#[must_use]
pub fn non_blank(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() {
        None
    } else {
        Some(s.to_owned())
    }
}
