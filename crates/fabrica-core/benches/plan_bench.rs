//! Criterion benchmarks for the planning calculators.
//!
//! Two benchmark groups:
//! - `plan`: line computation + plan aggregation over a wide selection
//! - `resolve`: ground resolution and flow-graph building over a deep chain

use criterion::{Criterion, criterion_group, criterion_main};
use fabrica_core::flow::build_graph;
use fabrica_core::ground::{resolve_material, resolve_plan};
use fabrica_core::line::{SelectionEntry, compute_plan};
use fabrica_core::settings::PlannerSettings;
use fabrica_core::test_utils::*;

/// A wide selection re-selecting the sample catalog's producible items.
fn wide_selection() -> Vec<SelectionEntry> {
    let mut selection = Vec::new();
    for i in 0..50 {
        selection.push(entry(
            "Xenoferrite Plates",
            "Xenoferrite Plates (Tier 1)",
            "Assembler I",
            30.0 + i as f64,
        ));
        selection.push(entry("Metal Frame", "Metal Frame", "Assembler I", 10.0 + i as f64));
        selection.push(entry("Spore Extract", "Spore Extract", "Greenhouse", 1.0));
    }
    selection
}

fn bench_plan(c: &mut Criterion) {
    let catalog = sample_catalog();
    let settings = PlannerSettings::default();
    let selection = wide_selection();

    c.bench_function("plan/compute_plan_150_lines", |b| {
        b.iter(|| compute_plan(&catalog, &settings, &selection))
    });
}

fn bench_resolve(c: &mut Criterion) {
    let catalog = sample_catalog();
    let deep = chain_catalog(18);
    let settings = PlannerSettings::default();
    let selection = wide_selection();
    let plan = compute_plan(&catalog, &settings, &selection);

    c.bench_function("resolve/ground_deep_chain", |b| {
        b.iter(|| resolve_material(&deep, &settings, "Stage 0", 60.0))
    });

    c.bench_function("resolve/ground_plan", |b| {
        b.iter(|| resolve_plan(&catalog, &settings, &plan))
    });

    c.bench_function("resolve/flow_graph", |b| {
        b.iter(|| build_graph(&catalog, &settings, &selection))
    });
}

criterion_group!(benches, bench_plan, bench_resolve);
criterion_main!(benches);
