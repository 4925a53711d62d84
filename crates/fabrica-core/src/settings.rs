//! Planner settings: the explicit, passed-in configuration the calculators
//! run under.
//!
//! Everything session-tunable lives here (productivity bonuses, variant and
//! miner preferences, bot overrides, workstation configurations) so that
//! core functions stay deterministic and independent planning scenarios can
//! coexist, rather than reading ambient global state.

use std::collections::HashMap;

use crate::catalog::Catalog;

/// A workstation configuration for one machine category.
///
/// `tier` is the slot count (1..=3); `robots` holds the bot recipe name
/// occupying each slot (`None` = empty). Only tier-3 configurations may
/// carry a charged core, which scales the summed slot bonuses by 1.33.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkstationConfig {
    pub tier: u8,
    pub robots: Vec<Option<String>>,
    pub charged_core: bool,
}

impl WorkstationConfig {
    /// An empty configuration of the given tier.
    pub fn empty(tier: u8) -> Self {
        Self {
            tier,
            robots: vec![None; tier as usize],
            charged_core: false,
        }
    }

    /// Slots actually considered: the first `tier` entries of `robots`.
    pub fn occupied_slots(&self) -> impl Iterator<Item = &str> {
        self.robots
            .iter()
            .take(self.tier as usize)
            .filter_map(|slot| slot.as_deref())
    }
}

/// A per-item workstation override. `Disabled` suppresses any workstation
/// bonus regardless of the global per-category configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkstationOverride {
    Disabled,
    Config(WorkstationConfig),
}

/// Session-scoped planner configuration with all-zero defaults.
#[derive(Debug, Clone, Default)]
pub struct PlannerSettings {
    /// Global mining productivity bonus, in percent.
    pub mining_productivity: f64,
    /// Global fluid productivity bonus, in percent.
    pub fluid_productivity: f64,
    /// Canonical item name -> preferred recipe variant.
    pub variant_preferences: HashMap<String, String>,
    /// Terminal material name -> preferred mining machine.
    pub miner_preferences: HashMap<String, String>,
    /// Item name -> efficiency percentage overriding the recipe's base.
    pub bot_efficiency_overrides: HashMap<String, f64>,
    /// Machine category -> global workstation configuration.
    pub workstation_configs: HashMap<String, WorkstationConfig>,
    /// Item name -> per-item workstation override (takes precedence over
    /// the category configuration).
    pub workstation_overrides: HashMap<String, WorkstationOverride>,
}

impl PlannerSettings {
    /// Resolve a canonical item name to the recipe variant currently in
    /// effect. Pure function of the settings and catalog:
    ///
    /// 1. an explicit preference naming a known recipe wins;
    /// 2. otherwise the first member of the item's variant group;
    /// 3. otherwise the item name itself (single-recipe items).
    pub fn resolve_variant<'a>(&'a self, catalog: &'a Catalog, item: &'a str) -> &'a str {
        if let Some(pref) = self.variant_preferences.get(item) {
            if catalog.recipe(pref).is_some() {
                return pref;
            }
        }
        if let Some(group) = catalog.variant_group(item) {
            if let Some(first) = group.first() {
                return first;
            }
        }
        item
    }
}
