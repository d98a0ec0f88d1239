//! Formula engine performance benchmarks.
//!
//! Measures parsing alone and full evaluation over growing columns.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tally::formula::parse;
use tally::{AliasMap, DataTable, FormulaEngine};

const FORMULAS: &[(&str, &str)] = &[
    ("aggregate", "sum(rev) - sum(cost)"),
    ("elementwise", "(rev - cost) / rev * 100"),
    ("mixed", "round(mean(rev / cost), 2) + max(rev, cost) ** 0.5"),
];

fn generate_table(rows: usize) -> DataTable {
    let revenue: Vec<String> = (0..rows).map(|i| format!("{:.2}", 100.0 + i as f64)).collect();
    let cost: Vec<String> = (0..rows).map(|i| format!("{}", 40 + i % 13)).collect();
    DataTable::from_columns(vec![("revenue", revenue), ("cost", cost)])
}

fn aliases() -> AliasMap {
    let mut aliases = AliasMap::new();
    aliases.insert("rev".into(), "revenue".into());
    aliases.insert("cost".into(), "cost".into());
    aliases
}

/// Benchmark parsing formulas without evaluation.
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("formula_parse");

    for (name, formula) in FORMULAS {
        group.bench_with_input(BenchmarkId::new("formula", name), formula, |b, formula| {
            b.iter(|| black_box(parse(formula, 64).unwrap()))
        });
    }

    let nested = format!("{}1{}", "(".repeat(60), ")".repeat(60));
    group.bench_function("nested_60", |b| b.iter(|| black_box(parse(&nested, 64).unwrap())));

    group.finish();
}

/// Benchmark evaluation over columns of various lengths.
fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("formula_evaluate");
    let engine = FormulaEngine::new();
    let aliases = aliases();

    for rows in [100, 1_000, 10_000].iter() {
        let table = generate_table(*rows);
        group.throughput(Throughput::Elements(*rows as u64));

        for (name, formula) in FORMULAS {
            group.bench_with_input(BenchmarkId::new(*name, rows), &table, |b, table| {
                b.iter(|| black_box(engine.evaluate(formula, &aliases, table)))
            });
        }
    }

    group.finish();
}

/// Benchmark rejection of hostile input.
fn bench_reject(c: &mut Criterion) {
    let engine = FormulaEngine::new();
    let table = generate_table(100);
    let aliases = aliases();

    c.bench_function("formula_reject_unknown_name", |b| {
        b.iter(|| black_box(engine.evaluate("__import__('os').system('ls')", &aliases, &table)))
    });
}

criterion_group!(benches, bench_parse, bench_evaluate, bench_reject);
criterion_main!(benches);
