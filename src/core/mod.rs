//! Runtime core: planning and staged execution.
//!
//! The public API from this module is [`ModuleCollection`] with its builder, the
//! [`Config`] it is created with, and the [`Once`] latch backing `init`.
//!
//! Internal modules:
//! - [`planner`]: groups the dependency graph into stages;
//! - [`runner`]: runs the stages in order, each stage's modules concurrently;
//! - [`collection`]: owns the graph and drives a single staged run.

mod builder;
mod collection;
mod config;
mod once;
mod planner;
mod runner;

pub use builder::ModuleCollectionBuilder;
pub use collection::{IntoModules, ModuleCollection};
pub use config::Config;
pub use once::Once;
