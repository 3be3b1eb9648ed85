//! # Module discovery.
//!
//! Turns a set of named units (whatever a host application loads modules from) into
//! a [`ModuleMap`] that can be fed straight into
//! [`ModuleCollection::add`](crate::ModuleCollection::add).
//!
//! ```text
//! (key, unit) ──filter(key)?──► Resolve::resolve(unit) ──Some──► post_resolve(module, key)
//!                                                                  └─► ModuleMap (unique names)
//! ```
//!
//! - [`Resolve`]: extracts a module from one unit (closures implement it);
//! - [`Discovery`]: filter, resolve, post-resolve hook, duplicate detection;
//! - [`ModuleMap`]: name-ordered result map.

mod loader;
mod map;
mod resolve;

pub use loader::Discovery;
pub use map::ModuleMap;
pub use resolve::Resolve;
