//! Bonus resolver: the effective throughput multiplier for one production
//! line.
//!
//! Combines the recipe's base efficiency (or its per-item override), the
//! global mining/fluid productivity bonuses for the chosen machine class,
//! and the workstation bot bonuses for the machine's category:
//!
//! ```text
//! multiplier = (1 + eff/100) * (1 + mining + fluid + workstation)
//! ```
//!
//! Absent or invalid configuration always contributes 0 -- this path never
//! errors, so a half-configured session still computes.

use crate::catalog::{Catalog, MachineClass, Recipe};
use crate::settings::{PlannerSettings, WorkstationConfig, WorkstationOverride};

/// Tier-3 charged core scaling applied to the summed slot bonuses.
const CHARGED_CORE_FACTOR: f64 = 1.33;

/// Effective throughput multiplier for `item` produced by `recipe` in
/// `machine`. Always finite and positive for sane inputs; never an error.
pub fn effective_multiplier(
    catalog: &Catalog,
    settings: &PlannerSettings,
    item: &str,
    recipe: &Recipe,
    machine: &str,
) -> f64 {
    let base_eff = recipe.efficiency.unwrap_or(0.0);
    let eff = settings
        .bot_efficiency_overrides
        .get(item)
        .copied()
        .unwrap_or(base_eff);
    let eff_multiplier = 1.0 + eff / 100.0;

    let class = catalog.machine(machine).map(|m| m.class);
    let mining = if class == Some(MachineClass::Mining) {
        settings.mining_productivity / 100.0
    } else {
        0.0
    };
    let fluid = if class == Some(MachineClass::Fluid) {
        settings.fluid_productivity / 100.0
    } else {
        0.0
    };

    let ws = workstation_bonus(catalog, settings, item, machine);

    eff_multiplier * (1.0 + mining + fluid + ws)
}

/// Fractional additive workstation bonus (e.g. 0.15 for +15%) granted by
/// the bots slotted for `machine`'s category, honoring the per-item
/// override. Never negative; 0 when disabled or unconfigured.
pub fn workstation_bonus(
    catalog: &Catalog,
    settings: &PlannerSettings,
    item: &str,
    machine: &str,
) -> f64 {
    let Some(category) = catalog.machine(machine).map(|m| m.category.as_str()) else {
        return 0.0;
    };

    let config = match settings.workstation_overrides.get(item) {
        Some(WorkstationOverride::Disabled) => return 0.0,
        Some(WorkstationOverride::Config(cfg)) => cfg,
        None => match settings.workstation_configs.get(category) {
            Some(cfg) => cfg,
            None => return 0.0,
        },
    };

    let bonus = slot_bonus_sum(catalog, config, category);
    let bonus = if config.tier == 3 && config.charged_core {
        bonus * CHARGED_CORE_FACTOR
    } else {
        bonus
    };
    bonus.max(0.0)
}

/// Sum of the additive percentage contributions from every occupied slot
/// whose bot applies to `category`, expressed as a fraction.
fn slot_bonus_sum(catalog: &Catalog, config: &WorkstationConfig, category: &str) -> f64 {
    let mut sum = 0.0;
    for bot_name in config.occupied_slots() {
        let Some(effect) = catalog
            .recipe(bot_name)
            .and_then(|r| r.workstation_effect.as_ref())
        else {
            continue;
        };
        if !effect.applies_to.iter().any(|c| c == category) {
            continue;
        }
        if effect.exempt.iter().any(|c| c == category) {
            continue;
        }
        sum += effect.machine_efficiency.unwrap_or(0.0) / 100.0;
        // Speed contributes to the same additive pool as efficiency.
        sum += effect.machine_speed.unwrap_or(0.0) / 100.0;
    }
    sum
}
