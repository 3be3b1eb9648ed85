//! Generic directed graph used by the stage planner.
//!
//! Edges point from a vertex to what it depends on. The only non-trivial operation is
//! [`Graph::adjacency_to_node`], which computes longest-path distances and detects cycles.

#[allow(clippy::module_inception)]
mod graph;

pub use graph::{Cycle, Graph};
