//! Ground-material resolver: recursive expansion of material demand down to
//! terminal (raw/mineable) resources.
//!
//! Expansion is depth-first with a fixed depth cap. Intermediate tiers use
//! the recipe's *first* machine at base output -- efficiency and workstation
//! bonuses apply only to top-level selection entries, never during recursive
//! expansion. That asymmetry is deliberate: bonuses are configured per
//! top-level selection, and recursively discovered demand carries no
//! per-path bonus context.
//!
//! A branch that exceeds the depth cap or closes a cycle stops contributing
//! and is reported as a [`ResolveWarning`] diagnostic; resolution itself
//! never fails.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::catalog::{Catalog, Recipe};
use crate::line::Plan;
use crate::settings::PlannerSettings;

/// Recursion depth cap guarding against cyclic or pathologically deep
/// catalog data.
pub const MAX_DEPTH: usize = 20;

/// Diagnostic emitted when an expansion branch is truncated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ResolveWarning {
    /// The material was already on the current expansion chain: the catalog
    /// contains a true recipe cycle through it.
    Cycle { material: String },
    /// The depth cap was hit while expanding this material; deeper demand
    /// is not included in the totals.
    DepthLimit { material: String },
}

/// Accumulated demand for one terminal material.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroundEntry {
    /// Total demand in units per minute.
    pub rate_per_min: f64,
    /// Chosen producer for mineable materials (a recipe with machines but
    /// no ingredients); `None` for materials with no producer at all.
    pub machine: Option<String>,
    /// Continuous machine count for the chosen producer at base output.
    pub machine_count: Option<f64>,
}

/// Result of a ground resolution: terminal totals plus any truncation
/// diagnostics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GroundResolution {
    pub totals: BTreeMap<String, GroundEntry>,
    pub warnings: Vec<ResolveWarning>,
}

/// Resolve a single material demand down to terminal materials.
pub fn resolve_material(
    catalog: &Catalog,
    settings: &PlannerSettings,
    material: &str,
    rate_per_min: f64,
) -> GroundResolution {
    let mut resolver = Resolver::new(catalog, settings);
    resolver.expand(material, rate_per_min, 0);
    resolver.finish()
}

/// Resolve a computed plan's direct ingredient totals down to terminal
/// materials. Each material expands on a fresh chain.
pub fn resolve_plan(
    catalog: &Catalog,
    settings: &PlannerSettings,
    plan: &Plan,
) -> GroundResolution {
    let mut resolver = Resolver::new(catalog, settings);
    for (material, rate) in &plan.ingredient_totals {
        resolver.expand(material, *rate, 0);
    }
    resolver.finish()
}

struct Resolver<'a> {
    catalog: &'a Catalog,
    settings: &'a PlannerSettings,
    totals: BTreeMap<String, GroundEntry>,
    warnings: Vec<ResolveWarning>,
    /// Resolved recipe names on the current expansion chain.
    chain: Vec<String>,
}

impl<'a> Resolver<'a> {
    fn new(catalog: &'a Catalog, settings: &'a PlannerSettings) -> Self {
        Self {
            catalog,
            settings,
            totals: BTreeMap::new(),
            warnings: Vec::new(),
            chain: Vec::new(),
        }
    }

    fn expand(&mut self, material: &str, rate_per_min: f64, depth: usize) {
        if depth >= MAX_DEPTH {
            self.warn(ResolveWarning::DepthLimit {
                material: material.to_string(),
            });
            return;
        }

        let resolved = self
            .settings
            .resolve_variant(self.catalog, material)
            .to_string();
        if self.chain.contains(&resolved) {
            self.warn(ResolveWarning::Cycle { material: resolved });
            return;
        }

        let recipe = self.catalog.recipe(&resolved);
        let terminal = recipe.map(Recipe::is_terminal).unwrap_or(true);
        if terminal {
            self.accumulate_terminal(&resolved, rate_per_min, recipe);
            return;
        }
        let recipe = recipe.expect("non-terminal implies a recipe exists");

        // Intermediate tier: first machine in catalog order, base output
        // (multiplier 1). is_terminal() guarantees a machine and a positive
        // primary output here.
        let option = recipe.first_machine().expect("non-terminal has machines");
        let per_minute_factor = 60.0 / option.cycle_time;
        let opm = per_minute_factor * recipe.primary_output_amount();
        if !opm.is_finite() || opm <= 0.0 {
            self.accumulate_terminal(&resolved, rate_per_min, Some(recipe));
            return;
        }
        let runs_per_min = rate_per_min / opm;

        self.chain.push(resolved);
        for ingredient in &recipe.ingredients {
            let ing_per_min = runs_per_min * ingredient.amount * per_minute_factor;
            self.expand(&ingredient.item, ing_per_min, depth + 1);
        }
        self.chain.pop();
    }

    fn accumulate_terminal(&mut self, name: &str, rate: f64, recipe: Option<&Recipe>) {
        let entry = self.totals.entry(name.to_string()).or_default();
        entry.rate_per_min += rate;

        // A mineable material (machines but no ingredients) records its
        // chosen producer: the preferred miner when configured and offered
        // by the recipe, else the first machine in catalog order.
        if entry.machine.is_none() {
            if let Some(recipe) = recipe {
                if recipe.ingredients.is_empty() && !recipe.machines.is_empty() {
                    let preferred = self
                        .settings
                        .miner_preferences
                        .get(name)
                        .filter(|m| recipe.machine_option(m).is_some());
                    let machine = preferred
                        .cloned()
                        .or_else(|| recipe.first_machine().map(|m| m.machine.clone()));
                    entry.machine = machine;
                }
            }
        }
    }

    fn warn(&mut self, warning: ResolveWarning) {
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }

    /// Fill in continuous machine counts for every terminal with a chosen
    /// producer, then hand the result out.
    fn finish(mut self) -> GroundResolution {
        for (name, entry) in &mut self.totals {
            let Some(machine) = entry.machine.as_deref() else {
                continue;
            };
            let count = self
                .catalog
                .recipe(name)
                .and_then(|r| {
                    let option = r.machine_option(machine)?;
                    let opm = (60.0 / option.cycle_time) * r.primary_output_amount();
                    (opm.is_finite() && opm > 0.0).then(|| entry.rate_per_min / opm)
                });
            entry.machine_count = count;
        }
        GroundResolution {
            totals: self.totals,
            warnings: self.warnings,
        }
    }
}
