//! Field normalizers for loosely formatted listing input.
//!
//! Everything except [`normalize_date`], which reads the wall clock, is a
//! pure function. None of them reject by panicking; invalid input is
//! signalled with `None` or `false`. Digit classes are ASCII only.

use chrono::{NaiveDate, Utc};
use regex::Regex;

/// Area codes that mark a bare local number as Argentine.
pub const AREA_CODES: [&str; 10] = [
    "11", "15", "351", "341", "381", "387", "388", "299", "280", "290",
];

/// Normalize a contact phone into `+54…` international form.
///
/// Whitespace and the characters `-`, `(`, `)` are stripped first. The
/// country code is then inferred from the leading digits: an existing `+54`
/// is kept, a bare `54` gains a `+`, and a leading mobile marker `9` or one
/// of [`AREA_CODES`] gains `+54`. Anything else yields `None`.
///
/// This is prefix inference only; digit counts are not checked.
#[must_use]
pub fn normalize_phone(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && !matches!(c, '-' | '(' | ')'))
        .collect();

    if cleaned.starts_with("+54") {
        return Some(cleaned);
    }
    if cleaned.starts_with("54") {
        return Some(format!("+{cleaned}"));
    }
    if cleaned.starts_with('9') {
        return Some(format!("+54{cleaned}"));
    }
    if AREA_CODES.iter().any(|code| cleaned.starts_with(code)) {
        return Some(format!("+54{cleaned}"));
    }
    None
}

/// Normalize a date to `YYYY-MM-DD`, falling back to today's UTC date.
///
/// See [`normalize_date_on`] for the accepted shapes.
#[must_use]
pub fn normalize_date(raw: Option<&str>) -> String {
    normalize_date_on(raw, Utc::now().date_naive())
}

/// Normalize a date to `YYYY-MM-DD`, substituting `today` when the input is
/// absent or unrecognized.
///
/// Accepted shapes:
/// - `YYYY-MM-DD`, returned unchanged (the calendar value is not checked);
/// - `D/M/YYYY` with one- or two-digit day and month, reordered and padded.
///
/// Unparseable dates are never rejected, only replaced.
#[must_use]
pub fn normalize_date_on(raw: Option<&str>, today: NaiveDate) -> String {
    let fallback = || today.format("%Y-%m-%d").to_string();

    let Some(raw) = raw else {
        return fallback();
    };

    let iso = Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid iso date regex");
    if iso.is_match(raw) {
        return raw.to_string();
    }

    let dmy = Regex::new(r"^([0-9]{1,2})/([0-9]{1,2})/([0-9]{4})$").expect("valid d/m/y date regex");
    if let Some(caps) = dmy.captures(raw) {
        return format!("{}-{:0>2}-{:0>2}", &caps[3], &caps[2], &caps[1]);
    }

    fallback()
}

/// Parse the longest leading decimal number in `raw`.
///
/// Leading whitespace is skipped and trailing garbage ignored, so `"30000 kg"`
/// parses as `30000.0`. Returns `None` when no digits lead the string or the
/// value is not finite.
#[must_use]
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start();
    let number = Regex::new(r"^[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?").expect("valid number regex");
    let matched = number.find(trimmed)?;
    matched
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Weight is required and must be a number strictly greater than zero.
#[must_use]
pub fn is_valid_weight(raw: Option<&str>) -> bool {
    raw.and_then(parse_number).is_some_and(|w| w > 0.0)
}

/// Price is optional; when present it must be a number of at least zero.
#[must_use]
pub fn is_valid_price(raw: Option<&str>) -> bool {
    raw.is_none_or(|p| parse_number(p).is_some_and(|v| v >= 0.0))
}

/// Email is optional; when present it must look like `local@domain.tld`.
#[must_use]
pub fn is_valid_email(raw: Option<&str>) -> bool {
    let shape = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex");
    raw.is_none_or(|email| shape.is_match(email))
}
