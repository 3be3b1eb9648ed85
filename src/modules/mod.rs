//! # Module descriptors and init actions.
//!
//! This module provides the types a caller defines its units of work with:
//! - [`Module`] - immutable descriptor (name, `needs`, `needed_by`, init action)
//! - [`ModuleRef`] - shared reference to a module (`Arc<Module<C>>`)
//! - [`ModuleBuilder`] - fluent definition API
//! - [`Init`] - trait for async init actions, with [`InitFn`] and [`SyncInitFn`]

mod init;
mod module;

pub use init::{BoxInitFuture, Init, InitFn, InitRef, SyncInitFn};
pub use module::{Module, ModuleBuilder, ModuleRef};
