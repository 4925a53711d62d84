//! Shared test fixtures: sample catalogs and terse constructors.
//!
//! Available to dependent crates through the `test-utils` feature, the same
//! way unit tests here use it.

use crate::catalog::{
    Catalog, CatalogBuilder, Ingredient, MachineClass, MachineDef, MachineOption, Output, Recipe,
    WorkstationEffect,
};
use crate::line::SelectionEntry;

pub fn ingredient(item: &str, amount: f64) -> Ingredient {
    Ingredient {
        item: item.to_string(),
        amount,
    }
}

pub fn output(amount: f64) -> Output {
    Output {
        amount,
        chance: None,
    }
}

pub fn output_chance(amount: f64, chance: f64) -> Output {
    Output {
        amount,
        chance: Some(chance),
    }
}

pub fn machine_option(machine: &str, cycle_time: f64) -> MachineOption {
    MachineOption {
        machine: machine.to_string(),
        cycle_time,
    }
}

pub fn machine_def(name: &str, category: &str, class: MachineClass) -> MachineDef {
    MachineDef {
        name: name.to_string(),
        category: category.to_string(),
        class,
    }
}

/// A plain craftable recipe with guaranteed single output.
pub fn recipe(
    name: &str,
    ingredients: Vec<Ingredient>,
    outputs: Vec<Output>,
    machines: Vec<MachineOption>,
) -> Recipe {
    Recipe {
        name: name.to_string(),
        category: String::new(),
        ingredients,
        outputs,
        machines,
        efficiency: None,
        workstation_effect: None,
    }
}

/// A pure raw material: no ingredients, no machines.
pub fn raw_recipe(name: &str) -> Recipe {
    recipe(name, vec![], vec![output(1.0)], vec![])
}

pub fn entry(item: &str, recipe: &str, machine: &str, goal_per_min: f64) -> SelectionEntry {
    SelectionEntry {
        item: item.to_string(),
        recipe: recipe.to_string(),
        machine: machine.to_string(),
        goal_per_min,
    }
}

/// The standing sample catalog used across the test suite.
///
/// Production chain:
/// - `Xenoferrite Ore` -- mineable (Mining Drill / Heavy Drill), 1 per 1s
/// - `Regolith` -- pure raw (no producer)
/// - `Water` -- pumpable (Pumpjack), 10 per 1s
/// - `Xenoferrite Plates` -- variant group over Tier 1 (Assembler I, 3s,
///   2 ore -> 1) and Tier 2 (Assembler II, 2s, 3 ore -> 2)
/// - `Metal Frame` -- Assembler I, 6s, 4 plates + 1 regolith -> 1
/// - `Spore Extract` -- Greenhouse, 300s, 10 water -> 3 @ 50% chance
/// - bots: `Tuner Bot` (+5% efficiency to assemblers, base efficiency 15),
///   `Overdrive Bot` (+10% speed to assemblers, greenhouses exempt),
///   `Drag Bot` (-5% efficiency, for clamp tests)
pub fn sample_catalog() -> Catalog {
    let mut b = CatalogBuilder::new();

    b.register_machine(machine_def("Assembler I", "assembler", MachineClass::General));
    b.register_machine(machine_def("Assembler II", "assembler", MachineClass::General));
    b.register_machine(machine_def("Mining Drill", "miner", MachineClass::Mining));
    b.register_machine(machine_def("Heavy Drill", "miner", MachineClass::Mining));
    b.register_machine(machine_def("Pumpjack", "pump", MachineClass::Fluid));
    b.register_machine(machine_def("Greenhouse", "greenhouse", MachineClass::General));

    b.register_recipe(recipe(
        "Xenoferrite Ore",
        vec![],
        vec![output(1.0)],
        vec![machine_option("Mining Drill", 1.0), machine_option("Heavy Drill", 0.5)],
    ));
    b.register_recipe(raw_recipe("Regolith"));
    b.register_recipe(recipe(
        "Water",
        vec![],
        vec![output(10.0)],
        vec![machine_option("Pumpjack", 1.0)],
    ));

    b.register_recipe(recipe(
        "Xenoferrite Plates (Tier 1)",
        vec![ingredient("Xenoferrite Ore", 2.0)],
        vec![output(1.0)],
        vec![machine_option("Assembler I", 3.0)],
    ));
    b.register_recipe(recipe(
        "Xenoferrite Plates (Tier 2)",
        vec![ingredient("Xenoferrite Ore", 3.0)],
        vec![output(2.0)],
        vec![machine_option("Assembler II", 2.0)],
    ));
    b.register_variant_group(
        "Xenoferrite Plates",
        vec![
            "Xenoferrite Plates (Tier 1)".to_string(),
            "Xenoferrite Plates (Tier 2)".to_string(),
        ],
    );

    b.register_recipe(recipe(
        "Metal Frame",
        vec![ingredient("Xenoferrite Plates", 4.0), ingredient("Regolith", 1.0)],
        vec![output(1.0)],
        vec![machine_option("Assembler I", 6.0)],
    ));

    b.register_recipe(recipe(
        "Spore Extract",
        vec![ingredient("Water", 10.0)],
        vec![output_chance(3.0, 0.5)],
        vec![machine_option("Greenhouse", 300.0)],
    ));

    let mut tuner = recipe(
        "Tuner Bot",
        vec![ingredient("Metal Frame", 1.0)],
        vec![output(1.0)],
        vec![machine_option("Assembler I", 10.0)],
    );
    tuner.efficiency = Some(15.0);
    tuner.workstation_effect = Some(WorkstationEffect {
        machine_efficiency: Some(5.0),
        machine_speed: None,
        applies_to: vec!["assembler".to_string()],
        exempt: vec![],
    });
    b.register_recipe(tuner);

    let mut overdrive = recipe(
        "Overdrive Bot",
        vec![ingredient("Metal Frame", 1.0)],
        vec![output(1.0)],
        vec![machine_option("Assembler I", 10.0)],
    );
    overdrive.workstation_effect = Some(WorkstationEffect {
        machine_efficiency: None,
        machine_speed: Some(10.0),
        applies_to: vec!["assembler".to_string(), "greenhouse".to_string()],
        exempt: vec!["greenhouse".to_string()],
    });
    b.register_recipe(overdrive);

    let mut drag = recipe(
        "Drag Bot",
        vec![ingredient("Metal Frame", 1.0)],
        vec![output(1.0)],
        vec![machine_option("Assembler I", 10.0)],
    );
    drag.workstation_effect = Some(WorkstationEffect {
        machine_efficiency: Some(-5.0),
        machine_speed: None,
        applies_to: vec!["assembler".to_string()],
        exempt: vec![],
    });
    b.register_recipe(drag);

    b.build().expect("sample catalog is valid")
}

/// A catalog with a direct two-recipe cycle: Alpha needs Beta, Beta needs
/// Alpha. Both are otherwise well-formed producible recipes.
pub fn cyclic_catalog() -> Catalog {
    let mut b = CatalogBuilder::new();
    b.register_machine(machine_def("Reactor", "reactor", MachineClass::General));
    b.register_recipe(recipe(
        "Alpha Compound",
        vec![ingredient("Beta Compound", 1.0)],
        vec![output(1.0)],
        vec![machine_option("Reactor", 1.0)],
    ));
    b.register_recipe(recipe(
        "Beta Compound",
        vec![ingredient("Alpha Compound", 1.0)],
        vec![output(1.0)],
        vec![machine_option("Reactor", 1.0)],
    ));
    b.build().expect("cyclic catalog is structurally valid")
}

/// A linear chain of `stages` recipes: `Stage 0` needs `Stage 1`, ... the
/// last stage is a pure raw material. One unit converts one-to-one at a
/// 60s cycle so every stage's demand rate matches the top-level rate.
pub fn chain_catalog(stages: usize) -> Catalog {
    let mut b = CatalogBuilder::new();
    b.register_machine(machine_def("Assembler I", "assembler", MachineClass::General));
    for i in 0..stages {
        let name = format!("Stage {i}");
        if i + 1 == stages {
            b.register_recipe(raw_recipe(&name));
        } else {
            b.register_recipe(recipe(
                &name,
                vec![ingredient(&format!("Stage {}", i + 1), 1.0)],
                vec![output(1.0)],
                vec![machine_option("Assembler I", 60.0)],
            ));
        }
    }
    b.build().expect("chain catalog is valid")
}

/// A catalog whose only producible recipe has an effective output of zero.
pub fn zero_output_catalog() -> Catalog {
    let mut b = CatalogBuilder::new();
    b.register_machine(machine_def("Assembler I", "assembler", MachineClass::General));
    b.register_recipe(raw_recipe("Regolith"));
    b.register_recipe(recipe(
        "Dud",
        vec![ingredient("Regolith", 1.0)],
        vec![Output { amount: 0.0, chance: None }],
        vec![machine_option("Assembler I", 3.0)],
    ));
    b.build().expect("zero-output catalog is valid")
}
