//! Value coercion to numbers and dates.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::input::DataTable;

// =============================================================================
// LAZY STATIC PATTERNS
// =============================================================================
// Shape checks compiled once on first use. A value has to match one of these
// before any chrono format is tried.

static DATE_SHAPES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{4}[-/]\d{1,2}[-/]\d{1,2}").unwrap(), // ISO and year-first
        Regex::new(r"^\d{1,2}[-/.]\d{1,2}[-/.]\d{4}").unwrap(), // US / European
        Regex::new(r"(?i)^\d{1,2}\s+[a-z]{3,9}\.?,?\s+\d{4}").unwrap(), // 15 Jan 2024
        Regex::new(r"(?i)^[a-z]{3,9}\.?\s+\d{1,2},?\s+\d{4}").unwrap(), // Jan 15, 2024
    ]
});

/// Date-only formats, tried in order. Month-first wins over day-first.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%b %d %Y",
    "%B %d %Y",
    "%d %b %Y",
    "%d %B %Y",
];

/// Date-time formats, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Parse a cell as a finite number.
///
/// Missing markers, empty strings and non-finite spellings (`inf`, `nan`)
/// are rejected.
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    // Rust accepts "inf"/"infinity"/"nan"; a data cell spelled that way is text
    if trimmed
        .trim_start_matches(['+', '-'])
        .starts_with(|c: char| c.is_ascii_alphabetic())
    {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Coerce a cell to a number with missing or unparseable entries as zero.
pub fn number_or_zero(value: &str) -> f64 {
    parse_number(value).unwrap_or(0.0)
}

/// Parse a cell as a calendar date or date-time.
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.trim();
    if trimmed.len() < 6 || !DATE_SHAPES.iter().any(|p| p.is_match(trimmed)) {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }

    let cleaned: String = trimmed
        .replace(',', " ")
        .replace('.', if trimmed.contains(char::is_alphabetic) { "" } else { "." })
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Returns true if the cell parses as a date.
pub fn is_date(value: &str) -> bool {
    parse_date(value).is_some()
}

/// Canonical ISO-8601 text for a parsed date.
///
/// Midnight values are written as a plain date.
pub fn format_date(dt: &NaiveDateTime) -> String {
    if dt.time() == NaiveTime::MIN {
        dt.format("%Y-%m-%d").to_string()
    } else if dt.nanosecond() == 0 {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
    }
}

/// Non-missing cells of a column, parsed as numbers, unparseable ones dropped.
pub fn numeric_values(table: &DataTable, index: usize) -> Vec<f64> {
    table
        .column_values(index)
        .filter(|v| !DataTable::is_null_value(v))
        .filter_map(parse_number)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("42"), Some(42.0));
        assert_eq!(parse_number(" -3.5 "), Some(-3.5));
        assert_eq!(parse_number("+1e3"), Some(1000.0));
        assert_eq!(parse_number(".5"), Some(0.5));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("-Infinity"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("1,000"), None);
    }

    #[test]
    fn test_number_or_zero() {
        assert_eq!(number_or_zero("7"), 7.0);
        assert_eq!(number_or_zero(""), 0.0);
        assert_eq!(number_or_zero("n/a"), 0.0);
    }

    #[test]
    fn test_parse_iso_and_slash_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_time(NaiveTime::MIN);

        assert_eq!(parse_date("2024-01-15"), Some(expected));
        assert_eq!(parse_date("2024/01/15"), Some(expected));
        assert_eq!(parse_date("01/15/2024"), Some(expected));
        assert_eq!(parse_date("15/01/2024"), Some(expected));
        assert_eq!(parse_date("15.01.2024"), Some(expected));
    }

    #[test]
    fn test_month_first_wins_when_ambiguous() {
        let parsed = parse_date("02/03/2024").unwrap();
        assert_eq!(parsed.date(), NaiveDate::from_ymd_opt(2024, 2, 3).unwrap());
    }

    #[test]
    fn test_parse_month_name_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();

        assert_eq!(parse_date("Mar 5, 2024").map(|d| d.date()), Some(expected));
        assert_eq!(parse_date("March 5 2024").map(|d| d.date()), Some(expected));
        assert_eq!(parse_date("5 Mar 2024").map(|d| d.date()), Some(expected));
    }

    #[test]
    fn test_parse_datetimes() {
        let parsed = parse_date("2024-01-15 13:45:00").unwrap();
        assert_eq!(format_date(&parsed), "2024-01-15T13:45:00");

        let parsed = parse_date("2024-01-15T08:00:00Z").unwrap();
        assert_eq!(format_date(&parsed), "2024-01-15T08:00:00");
    }

    #[test]
    fn test_rejects_non_dates() {
        assert!(parse_date("hello").is_none());
        assert!(parse_date("20240115").is_none());
        assert!(parse_date("2024").is_none());
        assert!(parse_date("2024-13-45").is_none());
        assert!(parse_date("").is_none());
    }

    #[test]
    fn test_numeric_values_skips_missing_and_text() {
        let table = DataTable::from_columns(vec![("v", vec!["1", "", "x", "2.5", "NA"])]);
        assert_eq!(numeric_values(&table, 0), vec![1.0, 2.5]);
    }
}
