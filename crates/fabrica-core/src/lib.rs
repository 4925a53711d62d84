//! Fabrica Core -- the production-planning engine for factory games.
//!
//! Given a list of selected end products with throughput goals, this crate
//! computes machine counts, intermediate material flow rates, and the fully
//! resolved demand down to raw (mineable) resources.
//!
//! # Pipeline
//!
//! All three consumers run over the same immutable [`catalog::Catalog`] and
//! an explicit [`settings::PlannerSettings`] value:
//!
//! 1. **Line calculator** ([`line::compute_plan`]) -- per-selection machine
//!    counts, actual output, overproduction, and a combined map of direct
//!    ingredient demand rates.
//! 2. **Ground resolver** ([`ground::resolve_plan`]) -- recursively expands
//!    the direct ingredient demand through intermediate recipes down to
//!    terminal materials, with a fixed depth cap and cycle diagnostics.
//! 3. **Flow-graph builder** ([`flow::build_graph`]) -- the same expansion
//!    aggregated into a weighted material-flow graph for a Sankey-style
//!    renderer.
//!
//! Every computation is a pure, synchronous function; recompute everything
//! on each edit rather than updating incrementally, since rate changes
//! propagate non-locally through the recipe graph.
//!
//! # Error posture
//!
//! The calculators degrade gracefully instead of failing: stale selection
//! entries are filtered out (`Option`), cyclic or pathologically deep
//! catalog data is truncated at [`ground::MAX_DEPTH`] and surfaced as
//! [`ground::ResolveWarning`]s, and zero-output recipes are treated as
//! terminal rather than divided into. Only catalog construction
//! ([`catalog::CatalogBuilder::build`]) returns hard errors.

pub mod bonus;
pub mod catalog;
pub mod flow;
pub mod ground;
pub mod line;
pub mod settings;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
