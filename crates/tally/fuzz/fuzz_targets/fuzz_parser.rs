//! Fuzz target for the data loader.
//!
//! This fuzzer tests that the CSV/TSV loader:
//! 1. Never panics on malformed input
//! 2. Handles all delimiter combinations
//! 3. Produces tables the classifier accepts

#![no_main]

use libfuzzer_sys::fuzz_target;
use tally::{ColumnClassifier, Parser};

fuzz_target!(|data: &[u8]| {
    // Only process reasonable-sized inputs to avoid OOM
    if data.len() > 100_000 {
        return;
    }

    let parser = Parser::new();
    if let Ok(table) = parser.parse_bytes(data) {
        let (normalized, classification) = ColumnClassifier::classify_and_normalize(&table);
        assert_eq!(classification.len(), table.column_count());
        assert_eq!(ColumnClassifier::classify(&normalized), classification);
    }
});
