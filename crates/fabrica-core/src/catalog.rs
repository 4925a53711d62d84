//! The recipe catalog: immutable game data the planner computes over.
//!
//! Built once at startup through [`CatalogBuilder`] (register everything,
//! then freeze with [`CatalogBuilder::build`]); read-only afterwards and
//! safe to share across any number of what-if planning sessions.

use std::collections::HashMap;

/// One ingredient of a recipe: `amount` units consumed per production cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Ingredient {
    pub item: String,
    pub amount: f64,
}

/// One output entry of a recipe.
///
/// `chance` is the probability in `(0, 1]` that a cycle yields this output;
/// `None` means guaranteed. The effective per-cycle amount is
/// `amount * chance`.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub amount: f64,
    pub chance: Option<f64>,
}

impl Output {
    /// Effective per-cycle amount: `amount * chance`, chance defaulting to 1.
    pub fn effective_amount(&self) -> f64 {
        self.amount * self.chance.unwrap_or(1.0)
    }
}

/// A machine option for a recipe. Recipes carry an explicit ordered list of
/// these so "the first machine" is a stable, testable choice rather than
/// incidental map iteration order.
#[derive(Debug, Clone, PartialEq)]
pub struct MachineOption {
    pub machine: String,
    /// Seconds per production cycle in this machine.
    pub cycle_time: f64,
}

/// The bonus an item grants to compatible machine categories when slotted
/// into a workstation as a bot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkstationEffect {
    /// Additive efficiency contribution, in percent.
    pub machine_efficiency: Option<f64>,
    /// Additive speed contribution, in percent. Folded into the same
    /// percentage pool as `machine_efficiency` before tier/core scaling.
    pub machine_speed: Option<f64>,
    /// Machine categories this bot affects.
    pub applies_to: Vec<String>,
    /// Machine categories excluded even when listed in `applies_to`.
    pub exempt: Vec<String>,
}

/// A recipe definition. Immutable once the catalog is built.
#[derive(Debug, Clone)]
pub struct Recipe {
    pub name: String,
    /// Classification tag for browse UIs; not used by the calculators.
    pub category: String,
    pub ingredients: Vec<Ingredient>,
    /// Normalized ordered outputs; the first entry is the primary output,
    /// the rest are by-products. Normalization from the on-disk
    /// single-or-list shape happens at the data-loading boundary.
    pub outputs: Vec<Output>,
    pub machines: Vec<MachineOption>,
    /// Base efficiency bonus in percent. Only meaningful for bot recipes.
    pub efficiency: Option<f64>,
    pub workstation_effect: Option<WorkstationEffect>,
}

impl Recipe {
    /// Effective per-cycle amount of the primary output (first entry),
    /// or 0 when the recipe has no outputs.
    pub fn primary_output_amount(&self) -> f64 {
        self.outputs.first().map(Output::effective_amount).unwrap_or(0.0)
    }

    /// Whether this recipe is a terminal (raw) node: nothing to decompose.
    ///
    /// Derived, never stored: a recipe is terminal iff it has no
    /// ingredients, no machines, or zero effective primary output.
    pub fn is_terminal(&self) -> bool {
        self.ingredients.is_empty()
            || self.machines.is_empty()
            || self.primary_output_amount() <= 0.0
    }

    /// Find a machine option by name.
    pub fn machine_option(&self, machine: &str) -> Option<&MachineOption> {
        self.machines.iter().find(|m| m.machine == machine)
    }

    /// The first machine option in catalog order, used for intermediate
    /// tiers during recursive resolution.
    pub fn first_machine(&self) -> Option<&MachineOption> {
        self.machines.first()
    }
}

/// Broad machine classification used by the bonus resolver's global
/// productivity bonuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineClass {
    General,
    Mining,
    Fluid,
}

/// A machine definition: category string (matched against workstation
/// `applies_to`/`exempt` lists) plus its productivity class.
#[derive(Debug, Clone)]
pub struct MachineDef {
    pub name: String,
    pub category: String,
    pub class: MachineClass,
}

/// Builder for constructing an immutable [`Catalog`].
/// Register recipes, machines, and variant groups, then freeze with
/// [`build`](Self::build).
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    recipes: Vec<Recipe>,
    recipe_index: HashMap<String, usize>,
    machines: Vec<MachineDef>,
    machine_index: HashMap<String, usize>,
    /// Canonical item name -> ordered interchangeable recipe names.
    variant_groups: HashMap<String, Vec<String>>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a recipe. Duplicate names are rejected at build time.
    pub fn register_recipe(&mut self, recipe: Recipe) -> &mut Self {
        self.recipe_index
            .entry(recipe.name.clone())
            .or_insert(self.recipes.len());
        self.recipes.push(recipe);
        self
    }

    /// Register a machine definition.
    pub fn register_machine(&mut self, machine: MachineDef) -> &mut Self {
        self.machine_index
            .entry(machine.name.clone())
            .or_insert(self.machines.len());
        self.machines.push(machine);
        self
    }

    /// Register a variant group: a set of recipes interchangeable for one
    /// canonical item. The first member is the default variant.
    pub fn register_variant_group(
        &mut self,
        item: &str,
        recipes: Vec<String>,
    ) -> &mut Self {
        self.variant_groups.insert(item.to_string(), recipes);
        self
    }

    /// Freeze the catalog. Validates name uniqueness and that every variant
    /// group member names a registered recipe.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        if self.recipes.len() != self.recipe_index.len() {
            let dup = find_duplicate(self.recipes.iter().map(|r| r.name.as_str()));
            return Err(CatalogError::DuplicateRecipe(dup));
        }
        if self.machines.len() != self.machine_index.len() {
            let dup = find_duplicate(self.machines.iter().map(|m| m.name.as_str()));
            return Err(CatalogError::DuplicateMachine(dup));
        }
        for (item, members) in &self.variant_groups {
            for member in members {
                if !self.recipe_index.contains_key(member) {
                    return Err(CatalogError::UnknownVariant {
                        item: item.clone(),
                        recipe: member.clone(),
                    });
                }
            }
        }

        Ok(Catalog {
            recipes: self.recipes,
            recipe_index: self.recipe_index,
            machines: self.machines,
            machine_index: self.machine_index,
            variant_groups: self.variant_groups,
        })
    }
}

fn find_duplicate<'a>(names: impl Iterator<Item = &'a str>) -> String {
    let mut seen = std::collections::HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return name.to_string();
        }
    }
    String::new()
}

/// Immutable recipe catalog. Frozen after build; lookups only.
#[derive(Debug)]
pub struct Catalog {
    recipes: Vec<Recipe>,
    recipe_index: HashMap<String, usize>,
    machines: Vec<MachineDef>,
    machine_index: HashMap<String, usize>,
    variant_groups: HashMap<String, Vec<String>>,
}

impl Catalog {
    /// Look up a recipe by name.
    pub fn recipe(&self, name: &str) -> Option<&Recipe> {
        self.recipe_index.get(name).map(|&i| &self.recipes[i])
    }

    /// Look up a machine definition by name. Machines referenced by recipes
    /// but never registered simply resolve to `None`; the bonus resolver
    /// treats them as plain machines with no category bonuses.
    pub fn machine(&self, name: &str) -> Option<&MachineDef> {
        self.machine_index.get(name).map(|&i| &self.machines[i])
    }

    /// The variant group for a canonical item, if one is registered.
    pub fn variant_group(&self, item: &str) -> Option<&[String]> {
        self.variant_groups.get(item).map(Vec::as_slice)
    }

    /// Iterate all recipes in registration order.
    pub fn recipes(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter()
    }

    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }

    pub fn machine_count(&self) -> usize {
        self.machines.len()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("duplicate recipe name: {0}")]
    DuplicateRecipe(String),
    #[error("duplicate machine name: {0}")]
    DuplicateMachine(String),
    #[error("variant group for '{item}' references unknown recipe '{recipe}'")]
    UnknownVariant { item: String, recipe: String },
}
