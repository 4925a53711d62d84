//! Property-based tests for the planning calculators.
//!
//! Uses proptest to generate random goals, cycle times, and output shapes,
//! then verify the rounding/overproduction invariants, ground-resolution
//! conservation, and termination on cyclic catalogs.

use fabrica_core::catalog::{Catalog, CatalogBuilder, MachineClass};
use fabrica_core::flow::{NodeKind, build_graph};
use fabrica_core::ground::{ResolveWarning, resolve_material};
use fabrica_core::line::compute_line;
use fabrica_core::settings::PlannerSettings;
use fabrica_core::test_utils::*;
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

/// A one-recipe catalog: `Widget` produced on `Assembler I` from raw
/// `Regolith`, with the given cycle time, output amount, and chance.
fn widget_catalog(cycle_time: f64, amount: f64, chance: Option<f64>) -> Catalog {
    let mut b = CatalogBuilder::new();
    b.register_machine(machine_def("Assembler I", "assembler", MachineClass::General));
    b.register_recipe(raw_recipe("Regolith"));
    let out = match chance {
        Some(c) => output_chance(amount, c),
        None => output(amount),
    };
    b.register_recipe(recipe(
        "Widget",
        vec![ingredient("Regolith", 1.0)],
        vec![out],
        vec![machine_option("Assembler I", cycle_time)],
    ));
    b.build().unwrap()
}

/// A catalog whose recipes form one cycle of the given length.
fn cycle_catalog(len: usize) -> Catalog {
    let mut b = CatalogBuilder::new();
    b.register_machine(machine_def("Reactor", "reactor", MachineClass::General));
    for i in 0..len {
        let next = (i + 1) % len;
        b.register_recipe(recipe(
            &format!("Loop {i}"),
            vec![ingredient(&format!("Loop {next}"), 1.0)],
            vec![output(1.0)],
            vec![machine_option("Reactor", 1.0)],
        ));
    }
    b.build().unwrap()
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    /// machines_needed == ceil(goal / opm), and actual output never falls
    /// short of the goal.
    #[test]
    fn rounding_over_provisions(
        goal in 0.01f64..10_000.0,
        cycle_time in 0.1f64..600.0,
        amount in 0.1f64..20.0,
        chance in prop::option::of(0.01f64..=1.0),
    ) {
        let catalog = widget_catalog(cycle_time, amount, chance);
        let settings = PlannerSettings::default();
        let line = compute_line(
            &catalog,
            &settings,
            &entry("Widget", "Widget", "Assembler I", goal),
        )
        .expect("well-formed recipe computes");

        let opm = (60.0 / cycle_time) * amount * chance.unwrap_or(1.0);
        prop_assert!((line.output_per_machine - opm).abs() < 1e-9 * opm.max(1.0));
        prop_assert_eq!(
            line.machines_needed,
            (goal / line.output_per_machine).ceil() as u64
        );
        prop_assert!(line.actual_output >= goal - 1e-9);
        prop_assert!(line.overproduction >= -1e-9);
        prop_assert!(line.actual_output.is_finite());
    }

    /// Ground resolution of a pure raw material returns it unchanged.
    #[test]
    fn raw_resolution_is_idempotent(rate in 0.001f64..100_000.0) {
        let catalog = sample_catalog();
        let settings = PlannerSettings::default();
        let res = resolve_material(&catalog, &settings, "Regolith", rate);
        prop_assert_eq!(res.totals.len(), 1);
        prop_assert_eq!(res.totals["Regolith"].rate_per_min, rate);
        prop_assert!(res.warnings.is_empty());
    }

    /// A cyclic catalog always terminates, reports the cycle, and never
    /// produces NaN or infinite rates.
    #[test]
    fn cycles_terminate_cleanly(
        len in 2usize..8,
        rate in 0.1f64..1_000.0,
    ) {
        let catalog = cycle_catalog(len);
        let settings = PlannerSettings::default();
        let res = resolve_material(&catalog, &settings, "Loop 0", rate);
        let has_cycle = res
            .warnings
            .iter()
            .any(|w| matches!(w, ResolveWarning::Cycle { .. }));
        prop_assert!(has_cycle);
        for entry in res.totals.values() {
            prop_assert!(entry.rate_per_min.is_finite());
        }
    }

    /// Flow-graph conservation: every non-final node's rate equals the sum
    /// of its outgoing edge rates, within floating-point tolerance.
    #[test]
    fn flow_graph_conserves_rates(
        frame_goal in 0.1f64..5_000.0,
        plate_goal in 0.1f64..5_000.0,
    ) {
        let catalog = sample_catalog();
        let settings = PlannerSettings::default();
        let graph = build_graph(
            &catalog,
            &settings,
            &[
                entry("Metal Frame", "Metal Frame", "Assembler I", frame_goal),
                entry(
                    "Xenoferrite Plates",
                    "Xenoferrite Plates (Tier 1)",
                    "Assembler I",
                    plate_goal,
                ),
            ],
        )
        .expect("two-line selection always draws");

        for node in graph.nodes() {
            prop_assert!(node.rate.is_finite());
            prop_assert!(node.machine_count.is_finite());
            if node.kind == NodeKind::Final {
                continue;
            }
            let outgoing = graph.outgoing_rate(&node.label);
            prop_assert!(
                (outgoing - node.rate).abs() <= 1e-6 * node.rate.max(1.0),
                "conservation violated at {}: rate {} vs outgoing {}",
                node.label,
                node.rate,
                outgoing
            );
        }
    }

    /// Final-product graph rates equal the line calculator's actual output,
    /// including overproduction from rounding.
    #[test]
    fn graph_matches_line_totals(goal in 0.1f64..5_000.0) {
        let catalog = sample_catalog();
        let settings = PlannerSettings::default();
        let selection = [entry(
            "Xenoferrite Plates",
            "Xenoferrite Plates (Tier 1)",
            "Assembler I",
            goal,
        )];

        let line = compute_line(&catalog, &settings, &selection[0]).unwrap();
        let graph = build_graph(&catalog, &settings, &selection).unwrap();

        let plates = graph.node("Xenoferrite Plates").unwrap();
        prop_assert!((plates.rate - line.actual_output).abs() < 1e-9 * line.actual_output.max(1.0));
    }
}
