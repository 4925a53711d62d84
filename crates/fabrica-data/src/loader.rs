//! Resolution pipeline: reads catalog data files, normalizes shapes, builds
//! the immutable catalog.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and the
//! `load_catalog` entry point. `recipes` is the only required file;
//! `machines` and `variants` are optional.

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use fabrica_core::catalog::{
    Catalog, CatalogBuilder, CatalogError, Ingredient, MachineClass, MachineDef, MachineOption,
    Output, Recipe, WorkstationEffect,
};

use crate::schema::{MachineClassData, MachineData, RecipeData, VariantGroupData};

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur during catalog loading.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    /// A required data file was not found in the given directory.
    #[error("required file '{file}' not found in {dir}")]
    MissingRequired { file: &'static str, dir: PathBuf },

    /// The file has an extension we don't support.
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    /// A deserialization error occurred.
    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    /// A recipe declares an output chance outside (0, 1].
    #[error("recipe '{recipe}' in {file} has output chance {chance} outside (0, 1]")]
    InvalidChance {
        file: PathBuf,
        recipe: String,
        chance: f64,
    },

    /// Catalog validation failed (duplicate names, unknown variant refs).
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection and file discovery
// ===========================================================================

/// Supported data file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a file based on its extension.
pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

/// Scan a directory for a data file with the given base name. Returns
/// `Ok(None)` if nothing is found, or `ConflictingFormats` if more than one
/// format exists for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let extensions = ["ron", "toml", "json"];
    let mut found: Option<PathBuf> = None;

    for ext in &extensions {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(ref existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing.clone(),
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }

    Ok(found)
}

/// Like [`find_data_file`], but errors when no file is found.
pub fn require_data_file(
    dir: &Path,
    base_name: &'static str,
) -> Result<PathBuf, DataLoadError> {
    find_data_file(dir, base_name)?.ok_or_else(|| DataLoadError::MissingRequired {
        file: base_name,
        dir: dir.to_path_buf(),
    })
}

/// Deserialize a list from a file. For TOML files, extracts the array at the
/// given `toml_key` from a top-level table. RON and JSON deserialize
/// directly as `Vec<T>`.
pub fn deserialize_list<T: DeserializeOwned>(
    path: &Path,
    toml_key: &str,
) -> Result<Vec<T>, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;

    match format {
        Format::Ron => ron::from_str(&content).map_err(|e| DataLoadError::Parse {
            file: path.to_path_buf(),
            detail: e.to_string(),
        }),
        Format::Json => serde_json::from_str(&content).map_err(|e| DataLoadError::Parse {
            file: path.to_path_buf(),
            detail: e.to_string(),
        }),
        Format::Toml => {
            let table: toml::Value =
                toml::from_str(&content).map_err(|e| DataLoadError::Parse {
                    file: path.to_path_buf(),
                    detail: e.to_string(),
                })?;
            let array = table
                .get(toml_key)
                .ok_or_else(|| DataLoadError::Parse {
                    file: path.to_path_buf(),
                    detail: format!("missing key '{toml_key}' in TOML file"),
                })?
                .clone();
            array
                .try_into()
                .map_err(|e: toml::de::Error| DataLoadError::Parse {
                    file: path.to_path_buf(),
                    detail: e.to_string(),
                })
        }
    }
}

// ===========================================================================
// Catalog loading
// ===========================================================================

/// Load a catalog from a data directory.
///
/// Reads `recipes.{ron,toml,json}` (required), `machines.*` and
/// `variants.*` (optional), normalizes the on-disk shapes, and builds the
/// frozen catalog.
pub fn load_catalog(dir: &Path) -> Result<Catalog, DataLoadError> {
    let recipes_path = require_data_file(dir, "recipes")?;
    let recipes: Vec<RecipeData> = deserialize_list(&recipes_path, "recipes")?;

    let mut builder = CatalogBuilder::new();

    for data in recipes {
        builder.register_recipe(resolve_recipe(data, &recipes_path)?);
    }

    if let Some(path) = find_data_file(dir, "machines")? {
        let machines: Vec<MachineData> = deserialize_list(&path, "machines")?;
        for data in machines {
            builder.register_machine(MachineDef {
                name: data.name,
                category: data.category,
                class: match data.class {
                    MachineClassData::General => MachineClass::General,
                    MachineClassData::Mining => MachineClass::Mining,
                    MachineClassData::Fluid => MachineClass::Fluid,
                },
            });
        }
    }

    if let Some(path) = find_data_file(dir, "variants")? {
        let groups: Vec<VariantGroupData> = deserialize_list(&path, "variants")?;
        for group in groups {
            builder.register_variant_group(&group.item, group.recipes);
        }
    }

    Ok(builder.build()?)
}

/// Normalize one on-disk recipe into the catalog type, validating output
/// chances along the way.
fn resolve_recipe(data: RecipeData, file: &Path) -> Result<Recipe, DataLoadError> {
    let mut outputs = Vec::new();
    for entry in data.output.into_entries() {
        if let Some(chance) = entry.chance {
            if !(chance > 0.0 && chance <= 1.0) {
                return Err(DataLoadError::InvalidChance {
                    file: file.to_path_buf(),
                    recipe: data.name,
                    chance,
                });
            }
        }
        outputs.push(Output {
            amount: entry.amount,
            chance: entry.chance,
        });
    }

    Ok(Recipe {
        name: data.name,
        category: data.category,
        ingredients: data
            .ingredients
            .into_iter()
            .map(|i| Ingredient {
                item: i.item,
                amount: i.amount,
            })
            .collect(),
        outputs,
        machines: data
            .machines
            .into_iter()
            .map(|m| MachineOption {
                machine: m.machine,
                cycle_time: m.cycle_time,
            })
            .collect(),
        efficiency: data.efficiency,
        workstation_effect: data.workstation_effect.map(|w| WorkstationEffect {
            machine_efficiency: w.machine_efficiency,
            machine_speed: w.machine_speed,
            applies_to: w.applies_to,
            exempt: w.exempt,
        }),
    })
}

// ===========================================================================
// Tests
// ===========================================================================
