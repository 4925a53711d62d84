//! Line calculator: machines, actual output, and ingredient demand for each
//! selected production line.
//!
//! Machine counts round *up*: fractional machines are not physically
//! realizable, so the planner always over-provisions (overproduction) and
//! never under-provisions.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::bonus::effective_multiplier;
use crate::catalog::Catalog;
use crate::settings::PlannerSettings;

/// One selected end product with its throughput goal.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionEntry {
    /// Stable display/selection key for the item.
    pub item: String,
    /// Resolved recipe variant currently in effect (may differ from `item`
    /// when the item has tiered/alternative recipes).
    pub recipe: String,
    /// Chosen producing machine.
    pub machine: String,
    /// Desired throughput in units per minute. Must be positive; the input
    /// boundary rejects anything else before a recompute starts.
    pub goal_per_min: f64,
}

/// Result of computing one production line.
#[derive(Debug, Clone, Serialize)]
pub struct LineResult {
    pub item: String,
    pub recipe: String,
    pub machine: String,
    pub goal_per_min: f64,
    /// Output per minute of a single machine at the effective multiplier.
    pub output_per_machine: f64,
    /// Machines required, rounded up.
    pub machines_needed: u64,
    /// `machines_needed * output_per_machine`; always >= goal.
    pub actual_output: f64,
    /// `actual_output - goal`; always >= 0.
    pub overproduction: f64,
    /// Direct ingredient demand in units per minute, keyed by material.
    pub ingredient_rates: BTreeMap<String, f64>,
}

/// Aggregate over all lines of a plan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlanSummary {
    pub total_machines: u64,
    pub total_goal: f64,
    pub total_output: f64,
    pub total_overproduction: f64,
    pub unique_machine_types: usize,
    /// Mean machines per line; 0 for an empty plan (never NaN).
    pub average_machines: f64,
}

/// A fully computed plan: per-line results, combined direct ingredient
/// demand, and the summary aggregate.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub lines: Vec<LineResult>,
    /// Direct ingredient demand summed across all lines, keyed by material.
    pub ingredient_totals: BTreeMap<String, f64>,
    pub summary: PlanSummary,
}

/// Compute one production line.
///
/// Returns `None` when the selection is stale (recipe or machine no longer
/// in the catalog) or the recipe's effective primary output is zero --
/// such recipes are never divided into. Callers filter these out instead
/// of treating them as errors.
pub fn compute_line(
    catalog: &Catalog,
    settings: &PlannerSettings,
    entry: &SelectionEntry,
) -> Option<LineResult> {
    let recipe = catalog.recipe(&entry.recipe)?;
    let option = recipe.machine_option(&entry.machine)?;
    let cycle_time = option.cycle_time;
    if cycle_time <= 0.0 {
        return None;
    }

    let per_cycle = recipe.primary_output_amount();
    if per_cycle <= 0.0 {
        return None;
    }

    let multiplier = effective_multiplier(catalog, settings, &entry.item, recipe, &entry.machine);
    let output_per_machine = (60.0 / cycle_time) * per_cycle * multiplier;
    if output_per_machine <= 0.0 {
        return None;
    }

    let machines_needed = (entry.goal_per_min / output_per_machine).ceil() as u64;
    let actual_output = machines_needed as f64 * output_per_machine;

    let mut ingredient_rates = BTreeMap::new();
    for ingredient in &recipe.ingredients {
        let rate = (60.0 / cycle_time) * ingredient.amount * machines_needed as f64;
        *ingredient_rates.entry(ingredient.item.clone()).or_insert(0.0) += rate;
    }

    Some(LineResult {
        item: entry.item.clone(),
        recipe: entry.recipe.clone(),
        machine: entry.machine.clone(),
        goal_per_min: entry.goal_per_min,
        output_per_machine,
        machines_needed,
        actual_output,
        overproduction: actual_output - entry.goal_per_min,
        ingredient_rates,
    })
}

/// Compute the whole plan: every valid line, the combined ingredient totals,
/// and the summary. Stale entries are silently omitted.
pub fn compute_plan(
    catalog: &Catalog,
    settings: &PlannerSettings,
    entries: &[SelectionEntry],
) -> Plan {
    let mut lines = Vec::with_capacity(entries.len());
    let mut ingredient_totals: BTreeMap<String, f64> = BTreeMap::new();

    for entry in entries {
        let Some(line) = compute_line(catalog, settings, entry) else {
            continue;
        };
        for (material, rate) in &line.ingredient_rates {
            *ingredient_totals.entry(material.clone()).or_insert(0.0) += rate;
        }
        lines.push(line);
    }

    let summary = summarize(&lines);
    Plan {
        lines,
        ingredient_totals,
        summary,
    }
}

fn summarize(lines: &[LineResult]) -> PlanSummary {
    let mut summary = PlanSummary::default();
    let mut machine_types = std::collections::HashSet::new();
    for line in lines {
        summary.total_machines += line.machines_needed;
        summary.total_goal += line.goal_per_min;
        summary.total_output += line.actual_output;
        summary.total_overproduction += line.overproduction;
        machine_types.insert(line.machine.as_str());
    }
    summary.unique_machine_types = machine_types.len();
    summary.average_machines = if lines.is_empty() {
        0.0
    } else {
        summary.total_machines as f64 / lines.len() as f64
    };
    summary
}
