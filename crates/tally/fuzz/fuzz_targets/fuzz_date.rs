//! Fuzz target for date and number coercion.
//!
//! This fuzzer tests that coercion:
//! 1. Never panics on any input values
//! 2. Regex-based shape checks don't crash on pathological input
//! 3. Formatting a parsed date yields a value that parses again

#![no_main]

use libfuzzer_sys::fuzz_target;
use tally::inference::coerce::{format_date, parse_date, parse_number};

fuzz_target!(|data: &[u8]| {
    if data.len() > 10_000 {
        return;
    }

    if let Ok(value) = std::str::from_utf8(data) {
        if let Some(number) = parse_number(value) {
            assert!(number.is_finite());
        }

        if let Some(date) = parse_date(value) {
            let formatted = format_date(&date);
            assert!(parse_date(&formatted).is_some(), "{:?} did not re-parse", formatted);
        }
    }
});
