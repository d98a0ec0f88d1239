//! Fuzz target for the formula engine.
//!
//! This fuzzer tests that formula evaluation:
//! 1. Never panics on any formula text
//! 2. Never panics on any alias/column pairing
//! 3. Respects length and nesting limits on pathological input

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tally::{AliasMap, DataTable, FormulaEngine};

#[derive(Arbitrary, Debug)]
struct Input {
    formula: String,
    aliases: Vec<(String, u8)>,
    columns: Vec<Vec<String>>,
}

fuzz_target!(|input: Input| {
    if input.formula.len() > 4_096 || input.columns.len() > 8 {
        return;
    }

    let table = DataTable::from_columns(
        input
            .columns
            .into_iter()
            .enumerate()
            .map(|(i, values)| (format!("c{}", i), values.into_iter().take(64).collect::<Vec<_>>()))
            .collect(),
    );

    let mut aliases = AliasMap::new();
    for (alias, column) in input.aliases.into_iter().take(8) {
        aliases.insert(alias, format!("c{}", column % 8));
    }

    let _ = FormulaEngine::new().evaluate(&input.formula, &aliases, &table);
});
