//! # Stage planning.
//!
//! Partitions a dependency graph (edges point from a module to what it needs) into
//! ordered stages:
//!
//! ```text
//! graph.shallow_clone()
//!   └─► for leaf in leaves: add_edge(leaf, __root__)
//!         └─► adjacency_to_node(__root__)       (longest path, cycle check)
//!               └─► group by distance: [root] [leaves] [next] ...
//!                     └─► drop index 0 (the root)
//! ```
//!
//! A module's stage is the length of its longest dependency chain down to a module with
//! no needs, plus one. Within a stage, modules keep graph insertion order.

use crate::error::PlanError;
use crate::graph::Graph;
use crate::modules::{Module, ModuleRef};

/// Groups the modules of `graph` into stages that can run one after the other.
///
/// ### Errors
/// [`PlanError::Cycle`] with the names along the cycle.
pub(crate) fn plan_stages<C: 'static>(
    graph: &Graph<ModuleRef<C>>,
) -> Result<Vec<Vec<ModuleRef<C>>>, PlanError> {
    let root = Module::root();
    let mut anchored = graph.shallow_clone();

    let leaves: Vec<ModuleRef<C>> = graph.leaves().cloned().collect();
    for leaf in leaves {
        anchored.add_edge(leaf, root.clone());
    }

    let dist = anchored.adjacency_to_node(&root).map_err(|cycle| PlanError::Cycle {
        path: cycle.path.iter().map(|m| m.name().to_string()).collect(),
    })?;

    // A module missing from `dist` cannot reach any leaf, so it sits on or behind a cycle
    // the walk from the root never entered.
    if let Some(stuck) = graph.vertices().find(|m| !dist.contains_key(*m)) {
        if let Some(cycle) = graph.find_cycle_from(stuck) {
            return Err(PlanError::Cycle {
                path: cycle.path.iter().rev().map(|m| m.name().to_string()).collect(),
            });
        }
    }

    let depth = dist.values().copied().max().unwrap_or(0);
    let mut stages: Vec<Vec<ModuleRef<C>>> = vec![Vec::new(); depth];
    for module in graph.vertices() {
        if let Some(&d) = dist.get(module) {
            stages[d - 1].push(module.clone());
        }
    }
    Ok(stages)
}
