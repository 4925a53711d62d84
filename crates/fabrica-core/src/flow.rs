//! Flow-graph builder: the complete weighted material-dependency graph for
//! visualization.
//!
//! Mirrors the ground resolver's recursion (same depth cap, same
//! first-machine choice for intermediate tiers) but aggregates continuous
//! flow rates into nodes and edges instead of flat terminal totals. Edges
//! point from ingredient to consumer (the direction material flows in a
//! Sankey rendering); parallel contributions between the same pair of nodes
//! sum into one edge.
//!
//! Top-level final products apply the full bonus multiplier stack and seed
//! the recursion with the rounded machine count's actual output, so graph
//! totals agree exactly with the line calculator's reported overproduction.
//! Node machine counts stay continuous (fractional machine load for display,
//! not procurement).

use std::collections::HashMap;

use serde::Serialize;
use slotmap::{SlotMap, new_key_type};

use crate::catalog::{Catalog, Recipe};
use crate::ground::{MAX_DEPTH, ResolveWarning};
use crate::line::{SelectionEntry, compute_line};
use crate::settings::PlannerSettings;

new_key_type! {
    /// Identifies a material node in a flow graph.
    pub struct FlowNodeId;
}

/// What a node represents in the production chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Terminal material; nothing upstream.
    Raw,
    /// Intermediate: produced and consumed only inside the chain.
    Mid,
    /// A top-level selected end product.
    Final,
}

/// A material node accumulating all demand routed through it.
#[derive(Debug, Clone, Serialize)]
pub struct FlowNode {
    pub label: String,
    pub kind: NodeKind,
    /// Total flow in units per minute.
    pub rate: f64,
    /// Continuous (non-rounded) machine load; 0 for raw nodes.
    pub machine_count: f64,
}

/// Weighted dependency graph over materials.
#[derive(Debug)]
pub struct FlowGraph {
    nodes: SlotMap<FlowNodeId, FlowNode>,
    index: HashMap<String, FlowNodeId>,
    edges: HashMap<(FlowNodeId, FlowNodeId), f64>,
    pub warnings: Vec<ResolveWarning>,
}

/// A serializable snapshot of a [`FlowGraph`], nodes and edges sorted by
/// label for stable rendering and diffing.
#[derive(Debug, Clone, Serialize)]
pub struct FlowGraphSnapshot {
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdgeSnapshot>,
}

/// One directed edge in a snapshot: `rate` units of `source` flow into the
/// production of `target` per minute.
#[derive(Debug, Clone, Serialize)]
pub struct FlowEdgeSnapshot {
    pub source: String,
    pub target: String,
    pub rate: f64,
}

impl FlowGraph {
    fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            index: HashMap::new(),
            edges: HashMap::new(),
            warnings: Vec::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Look up a node by material label.
    pub fn node(&self, label: &str) -> Option<&FlowNode> {
        self.index.get(label).map(|&id| &self.nodes[id])
    }

    /// Iterate all nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &FlowNode> {
        self.nodes.values()
    }

    /// Iterate all edges as `(source, target, rate)`.
    pub fn edges(&self) -> impl Iterator<Item = (&FlowNode, &FlowNode, f64)> {
        self.edges
            .iter()
            .map(|(&(s, t), &rate)| (&self.nodes[s], &self.nodes[t], rate))
    }

    /// Sum of rates on edges leaving the node with this label.
    pub fn outgoing_rate(&self, label: &str) -> f64 {
        let Some(&id) = self.index.get(label) else {
            return 0.0;
        };
        self.edges
            .iter()
            .filter(|&(&(s, _), _)| s == id)
            .map(|(_, &rate)| rate)
            .sum()
    }

    /// Render-ready snapshot with deterministic ordering.
    pub fn snapshot(&self) -> FlowGraphSnapshot {
        let mut nodes: Vec<FlowNode> = self.nodes.values().cloned().collect();
        nodes.sort_by(|a, b| a.label.cmp(&b.label));

        let mut edges: Vec<FlowEdgeSnapshot> = self
            .edges
            .iter()
            .map(|(&(s, t), &rate)| FlowEdgeSnapshot {
                source: self.nodes[s].label.clone(),
                target: self.nodes[t].label.clone(),
                rate,
            })
            .collect();
        edges.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));

        FlowGraphSnapshot { nodes, edges }
    }

    /// Insert or update the node for `label`. `Final` sticks once set;
    /// otherwise the given kind applies.
    fn upsert_node(&mut self, label: &str, kind: NodeKind) -> FlowNodeId {
        if let Some(&id) = self.index.get(label) {
            let node = &mut self.nodes[id];
            if kind == NodeKind::Final {
                node.kind = NodeKind::Final;
            }
            return id;
        }
        let id = self.nodes.insert(FlowNode {
            label: label.to_string(),
            kind,
            rate: 0.0,
            machine_count: 0.0,
        });
        self.index.insert(label.to_string(), id);
        id
    }

    fn add_edge(&mut self, source: FlowNodeId, target: FlowNodeId, rate: f64) {
        *self.edges.entry((source, target)).or_insert(0.0) += rate;
    }
}

/// Build the flow graph for a selection.
///
/// Returns `None` for an empty selection, or when the result has fewer than
/// two nodes or no edges -- nothing meaningful to draw.
pub fn build_graph(
    catalog: &Catalog,
    settings: &PlannerSettings,
    entries: &[SelectionEntry],
) -> Option<FlowGraph> {
    if entries.is_empty() {
        return None;
    }

    let mut builder = GraphBuilder {
        catalog,
        settings,
        graph: FlowGraph::new(),
        chain: Vec::new(),
    };

    for entry in entries {
        let Some(line) = compute_line(catalog, settings, entry) else {
            continue;
        };
        let recipe = catalog
            .recipe(&entry.recipe)
            .expect("compute_line checked the recipe");
        let option = recipe
            .machine_option(&entry.machine)
            .expect("compute_line checked the machine");

        let target = builder.graph.upsert_node(&entry.item, NodeKind::Final);
        {
            let node = &mut builder.graph.nodes[target];
            node.rate += line.actual_output;
            // actual_output / output_per_machine == machines_needed, but the
            // graph keeps the continuous form throughout.
            node.machine_count += line.actual_output / line.output_per_machine;
        }

        // Recurse from the rounded machine count's consumption so the graph
        // matches the line calculator's overproduction exactly.
        let per_minute_factor = 60.0 / option.cycle_time;
        builder.chain.push(entry.recipe.clone());
        for ingredient in &recipe.ingredients {
            let rate = per_minute_factor * ingredient.amount * line.machines_needed as f64;
            if let Some(source) = builder.expand(&ingredient.item, rate, 0) {
                builder.graph.add_edge(source, target, rate);
            }
        }
        builder.chain.pop();
    }

    let graph = builder.graph;
    if graph.node_count() < 2 || graph.edge_count() == 0 {
        return None;
    }
    Some(graph)
}

struct GraphBuilder<'a> {
    catalog: &'a Catalog,
    settings: &'a PlannerSettings,
    graph: FlowGraph,
    chain: Vec<String>,
}

impl GraphBuilder<'_> {
    /// Expand a material demand into the graph; returns the material's node
    /// so the caller can attach the edge toward its consumer. `None` means
    /// the branch was truncated (depth cap or cycle).
    fn expand(&mut self, material: &str, rate: f64, depth: usize) -> Option<FlowNodeId> {
        if depth >= MAX_DEPTH {
            self.warn(ResolveWarning::DepthLimit {
                material: material.to_string(),
            });
            return None;
        }

        let resolved = self
            .settings
            .resolve_variant(self.catalog, material)
            .to_string();
        if self.chain.contains(&resolved) {
            self.warn(ResolveWarning::Cycle { material: resolved });
            return None;
        }

        let recipe = self.catalog.recipe(&resolved);
        let terminal = recipe.map(Recipe::is_terminal).unwrap_or(true);
        if terminal {
            let id = self.graph.upsert_node(material, NodeKind::Raw);
            self.graph.nodes[id].rate += rate;
            return Some(id);
        }
        let recipe = recipe.expect("non-terminal implies a recipe exists");

        let option = recipe.first_machine().expect("non-terminal has machines");
        let per_minute_factor = 60.0 / option.cycle_time;
        let opm = per_minute_factor * recipe.primary_output_amount();
        if !opm.is_finite() || opm <= 0.0 {
            let id = self.graph.upsert_node(material, NodeKind::Raw);
            self.graph.nodes[id].rate += rate;
            return Some(id);
        }

        let id = self.graph.upsert_node(material, NodeKind::Mid);
        let runs_per_min = rate / opm;
        {
            let node = &mut self.graph.nodes[id];
            node.rate += rate;
            node.machine_count += runs_per_min;
        }

        self.chain.push(resolved);
        for ingredient in &recipe.ingredients {
            let ing_rate = runs_per_min * ingredient.amount * per_minute_factor;
            if let Some(source) = self.expand(&ingredient.item, ing_rate, depth + 1) {
                self.graph.add_edge(source, id, ing_rate);
            }
        }
        self.chain.pop();

        Some(id)
    }

    fn warn(&mut self, warning: ResolveWarning) {
        if !self.graph.warnings.contains(&warning) {
            self.graph.warnings.push(warning);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn empty_selection_yields_none() {
        let catalog = sample_catalog();
        let settings = PlannerSettings::default();
        assert!(build_graph(&catalog, &settings, &[]).is_none());
    }

    #[test]
    fn all_stale_selection_yields_none() {
        let catalog = sample_catalog();
        let settings = PlannerSettings::default();
        let graph = build_graph(
            &catalog,
            &settings,
            &[entry("Gone", "Removed Recipe", "Assembler I", 10.0)],
        );
        assert!(graph.is_none());
    }

    #[test]
    fn raw_only_selection_yields_none() {
        // A lone mineable product produces a single node and no edges.
        let catalog = sample_catalog();
        let settings = PlannerSettings::default();
        let graph = build_graph(
            &catalog,
            &settings,
            &[entry("Xenoferrite Ore", "Xenoferrite Ore", "Mining Drill", 60.0)],
        );
        assert!(graph.is_none());
    }

    #[test]
    fn simple_chain_builds_nodes_and_edges() {
        let catalog = sample_catalog();
        let settings = PlannerSettings::default();
        let graph = build_graph(
            &catalog,
            &settings,
            &[entry("Xenoferrite Plates", "Xenoferrite Plates (Tier 1)", "Assembler I", 60.0)],
        )
        .unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edge_count(), 1);

        let plates = graph.node("Xenoferrite Plates").unwrap();
        assert_eq!(plates.kind, NodeKind::Final);
        assert!((plates.rate - 60.0).abs() < 1e-9);
        assert!((plates.machine_count - 3.0).abs() < 1e-9);

        let ore = graph.node("Xenoferrite Ore").unwrap();
        assert_eq!(ore.kind, NodeKind::Raw);
        assert!((ore.rate - 120.0).abs() < 1e-9);
        assert_eq!(ore.machine_count, 0.0);
    }

    #[test]
    fn graph_totals_match_line_calculator_overproduction() {
        let catalog = sample_catalog();
        let settings = PlannerSettings::default();
        // Goal 61 forces rounding: 4 machines, actual 80/min.
        let graph = build_graph(
            &catalog,
            &settings,
            &[entry("Xenoferrite Plates", "Xenoferrite Plates (Tier 1)", "Assembler I", 61.0)],
        )
        .unwrap();

        let plates = graph.node("Xenoferrite Plates").unwrap();
        assert!((plates.rate - 80.0).abs() < 1e-9);
        // Ingredients follow the rounded machine count: 4 * 20 * 2 = 160.
        let ore = graph.node("Xenoferrite Ore").unwrap();
        assert!((ore.rate - 160.0).abs() < 1e-9);
    }

    #[test]
    fn mid_nodes_have_continuous_machine_counts() {
        let catalog = sample_catalog();
        let settings = PlannerSettings::default();
        let graph = build_graph(
            &catalog,
            &settings,
            &[entry("Metal Frame", "Metal Frame", "Assembler I", 10.0)],
        )
        .unwrap();

        // Frame needs 40 plates/min; plates opm at base = 20 => 2.0 machines
        // continuous, never rounded.
        let plates = graph.node("Xenoferrite Plates").unwrap();
        assert_eq!(plates.kind, NodeKind::Mid);
        assert!((plates.machine_count - 2.0).abs() < 1e-9);
        assert!((plates.rate - 40.0).abs() < 1e-9);
    }

    #[test]
    fn parallel_contributions_merge_into_one_edge() {
        let catalog = sample_catalog();
        let settings = PlannerSettings::default();
        let graph = build_graph(
            &catalog,
            &settings,
            &[
                entry("Xenoferrite Plates", "Xenoferrite Plates (Tier 1)", "Assembler I", 20.0),
                entry("Xenoferrite Plates", "Xenoferrite Plates (Tier 1)", "Assembler I", 20.0),
            ],
        )
        .unwrap();

        // Same (ore -> plates) pair from both entries: one edge, summed.
        assert_eq!(graph.edge_count(), 1);
        let snapshot = graph.snapshot();
        assert!((snapshot.edges[0].rate - 80.0).abs() < 1e-9);

        let plates = graph.node("Xenoferrite Plates").unwrap();
        assert!((plates.rate - 40.0).abs() < 1e-9);
    }

    #[test]
    fn final_kind_wins_over_mid() {
        // Plates are both a selected product and an ingredient of frames.
        let catalog = sample_catalog();
        let settings = PlannerSettings::default();
        let graph = build_graph(
            &catalog,
            &settings,
            &[
                entry("Metal Frame", "Metal Frame", "Assembler I", 10.0),
                entry("Xenoferrite Plates", "Xenoferrite Plates (Tier 1)", "Assembler I", 60.0),
            ],
        )
        .unwrap();

        let plates = graph.node("Xenoferrite Plates").unwrap();
        assert_eq!(plates.kind, NodeKind::Final);
        // Demand from both roles accumulates: 40 (frame ingredient) + 60.
        assert!((plates.rate - 100.0).abs() < 1e-9);
    }

    #[test]
    fn non_final_node_rate_equals_outgoing_edge_sum() {
        let catalog = sample_catalog();
        let settings = PlannerSettings::default();
        let graph = build_graph(
            &catalog,
            &settings,
            &[entry("Metal Frame", "Metal Frame", "Assembler I", 10.0)],
        )
        .unwrap();

        for node in graph.nodes() {
            if node.kind == NodeKind::Final {
                continue;
            }
            let outgoing = graph.outgoing_rate(&node.label);
            assert!(
                (outgoing - node.rate).abs() < 1e-9,
                "conservation violated at {}: rate {} vs outgoing {}",
                node.label,
                node.rate,
                outgoing
            );
        }
    }

    #[test]
    fn cyclic_catalog_terminates_with_diagnostic() {
        let catalog = cyclic_catalog();
        let settings = PlannerSettings::default();
        let graph = build_graph(
            &catalog,
            &settings,
            &[entry("Alpha Compound", "Alpha Compound", "Reactor", 60.0)],
        )
        .unwrap();

        assert!(graph
            .warnings
            .iter()
            .any(|w| matches!(w, ResolveWarning::Cycle { .. })));
        for node in graph.nodes() {
            assert!(node.rate.is_finite());
            assert!(node.machine_count.is_finite());
        }
    }

    #[test]
    fn depth_boundary_matches_ground_resolution() {
        use crate::ground::resolve_plan;
        use crate::line::compute_plan;

        // A chain whose raw terminal sits exactly MAX_DEPTH materials below
        // the selected line resolves fully in both consumers.
        let catalog = chain_catalog(MAX_DEPTH + 1);
        let settings = PlannerSettings::default();
        let entries = [entry("Stage 0", "Stage 0", "Assembler I", 60.0)];

        let graph = build_graph(&catalog, &settings, &entries).unwrap();
        assert!(graph.warnings.is_empty());
        let terminal = graph.node(&format!("Stage {MAX_DEPTH}")).unwrap();
        assert_eq!(terminal.kind, NodeKind::Raw);

        let plan = compute_plan(&catalog, &settings, &entries);
        let ground = resolve_plan(&catalog, &settings, &plan);
        assert!(ground.warnings.is_empty());
        let total = &ground.totals[&format!("Stage {MAX_DEPTH}")];
        assert!((terminal.rate - total.rate_per_min).abs() < 1e-9);

        // One material deeper truncates in both, with the same diagnostic.
        let catalog = chain_catalog(MAX_DEPTH + 2);
        let graph = build_graph(&catalog, &settings, &entries).unwrap();
        assert!(graph.node(&format!("Stage {}", MAX_DEPTH + 1)).is_none());
        assert_eq!(
            graph.warnings,
            vec![ResolveWarning::DepthLimit {
                material: format!("Stage {}", MAX_DEPTH + 1),
            }]
        );
        let plan = compute_plan(&catalog, &settings, &entries);
        let ground = resolve_plan(&catalog, &settings, &plan);
        assert_eq!(ground.warnings, graph.warnings);
    }

    #[test]
    fn snapshot_is_sorted_and_complete() {
        let catalog = sample_catalog();
        let settings = PlannerSettings::default();
        let graph = build_graph(
            &catalog,
            &settings,
            &[entry("Metal Frame", "Metal Frame", "Assembler I", 10.0)],
        )
        .unwrap();

        let snapshot = graph.snapshot();
        assert_eq!(snapshot.nodes.len(), graph.node_count());
        assert_eq!(snapshot.edges.len(), graph.edge_count());
        let labels: Vec<&str> = snapshot.nodes.iter().map(|n| n.label.as_str()).collect();
        let mut sorted = labels.clone();
        sorted.sort();
        assert_eq!(labels, sorted);
    }
}
