//! Serde data file structs for catalog content.
//!
//! These structs define the on-disk format for recipes, machines, and
//! variant groups. They are deserialized from RON, JSON, or TOML files and
//! then normalized into `fabrica-core` catalog types by the loader. Field
//! aliases accept the camelCase spelling used by exported game data.

use serde::Deserialize;

// ===========================================================================
// Recipes
// ===========================================================================

/// A recipe definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeData {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub ingredients: Vec<IngredientData>,
    /// Single entry or list; normalized to a list with the first element
    /// primary when the catalog is built.
    pub output: OutputField,
    #[serde(default)]
    pub machines: Vec<MachineOptionData>,
    #[serde(default)]
    pub efficiency: Option<f64>,
    #[serde(default, alias = "workstationEffect")]
    pub workstation_effect: Option<WorkstationEffectData>,
}

/// One ingredient: `amount` units consumed per cycle.
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientData {
    pub item: String,
    pub amount: f64,
}

/// The on-disk `output` field: historically either a single object or an
/// ordered list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OutputField {
    One(OutputEntryData),
    Many(Vec<OutputEntryData>),
}

impl OutputField {
    /// Normalize to the uniform ordered sequence, first element primary.
    pub fn into_entries(self) -> Vec<OutputEntryData> {
        match self {
            OutputField::One(entry) => vec![entry],
            OutputField::Many(entries) => entries,
        }
    }
}

/// One output entry. `chance` must lie in `(0, 1]` when present.
#[derive(Debug, Clone, Deserialize)]
pub struct OutputEntryData {
    pub amount: f64,
    #[serde(default)]
    pub chance: Option<f64>,
}

/// A machine option: ordered position in the list is meaningful (the first
/// entry is the default producer during recursive resolution).
#[derive(Debug, Clone, Deserialize)]
pub struct MachineOptionData {
    pub machine: String,
    #[serde(alias = "cycleTime")]
    pub cycle_time: f64,
}

/// The workstation bonus an item grants when slotted as a bot.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkstationEffectData {
    #[serde(default, alias = "machineEfficiency")]
    pub machine_efficiency: Option<f64>,
    #[serde(default, alias = "machineSpeed")]
    pub machine_speed: Option<f64>,
    #[serde(alias = "appliesTo")]
    pub applies_to: Vec<String>,
    #[serde(default)]
    pub exempt: Vec<String>,
}

// ===========================================================================
// Machines
// ===========================================================================

/// A machine definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct MachineData {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub class: MachineClassData,
}

/// Machine productivity class.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MachineClassData {
    #[default]
    General,
    Mining,
    Fluid,
}

// ===========================================================================
// Variant groups
// ===========================================================================

/// A variant group: interchangeable recipes for one canonical item, first
/// member is the default.
#[derive(Debug, Clone, Deserialize)]
pub struct VariantGroupData {
    pub item: String,
    pub recipes: Vec<String>,
}
