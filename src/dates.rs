//! Date extraction from letter text and from canonical filenames.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

/// Format used in letter bodies and in the bracketed filename segment
pub const DATE_FORMAT: &str = "%d %B %Y";

pub const UNKNOWN_DATE: &str = "Unknown Date";
pub const UNKNOWN_YEAR: &str = "Unknown";

static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2} [A-Za-z]+ \d{4})\b").expect("valid date regex"));

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Date found in a document, or the sentinel pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateStamp {
    /// "DD Month YYYY" or "Unknown Date"
    pub formatted: String,
    /// "YYYY" or "Unknown"
    pub year: String,
}

impl DateStamp {
    pub fn unknown() -> Self {
        Self {
            formatted: UNKNOWN_DATE.to_string(),
            year: UNKNOWN_YEAR.to_string(),
        }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            formatted: date.format(DATE_FORMAT).to_string(),
            year: date.format("%Y").to_string(),
        }
    }

    pub fn is_known(&self) -> bool {
        self.formatted != UNKNOWN_DATE
    }
}

/// Parse "D Month YYYY" / "DD Month YYYY" with a full month name.
///
/// chrono's `%B` also accepts abbreviations, so the month word is checked
/// against the full names separately.
pub fn parse_day_month_year(text: &str) -> Option<NaiveDate> {
    let date = NaiveDate::parse_from_str(text, DATE_FORMAT).ok()?;

    let month_word = text.split(' ').nth(1)?;
    let full_name = MONTH_NAMES[date.month0() as usize];
    if month_word.eq_ignore_ascii_case(full_name) {
        Some(date)
    } else {
        None
    }
}

/// Find the first date-like substring in document text.
///
/// Only the first candidate is considered; if it does not parse, the
/// sentinel pair is returned rather than searching further.
pub fn extract_date(text: &str) -> DateStamp {
    let Some(candidate) = DATE_PATTERN.captures(text).and_then(|c| c.get(1)) else {
        return DateStamp::unknown();
    };

    match parse_day_month_year(candidate.as_str()) {
        Some(date) => DateStamp::from_date(date),
        None => {
            tracing::warn!("Invalid date format in text: {}", candidate.as_str());
            DateStamp::unknown()
        }
    }
}

/// Parse the date held between the first `[` and the following `]` of a filename
pub fn parse_bracketed_date(filename: &str) -> Option<NaiveDate> {
    let start = filename.find('[')? + 1;
    let len = filename[start..].find(']')?;
    parse_day_month_year(&filename[start..start + len])
}
