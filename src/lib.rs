//! # initvisor
//!
//! **Initvisor** initializes a set of named modules in dependency order.
//!
//! Each module declares what it `needs` (modules that must finish first) and what it is
//! `needed_by` (modules that must start only after it). The collection groups modules into
//! stages, runs every module of a stage concurrently, and starts a stage only after the
//! previous one finished successfully. The whole sequence runs at most once.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │    Module    │   │    Module    │   │    Module    │
//!     │  (database)  │   │   (cache)    │   │    (http)    │
//!     └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!            ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  ModuleCollection                                                 │
//! │  - Graph (module → need, needed_by → module)                      │
//! │  - planner (longest dependency chain ─► stage index)              │
//! │  - Once (single shared outcome of init)                           │
//! │  - Bus (broadcast events)                                         │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               │
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   │
//!     │   stage 1    │──►│   stage 2    │──►│   stage 3    │   │
//!     │ (concurrent) │   │ (concurrent) │   │ (concurrent) │   │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘   │
//!      │ Publishes:       │                  │                 │
//!      │ - StageStarting  │                  │                 │
//!      │ - ModuleReady    │                  │                 │
//!      │ - ModuleFailed   │                  │                 │
//!      ▼                  ▼                  ▼                 ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │                   (capacity: Config::bus_capacity)                │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                       ┌────────────────────────┐
//!                       │       listener         │
//!                       │  (in ModuleCollection) │
//!                       └───────────┬────────────┘
//!                                   ▼
//!                             SubscriberSet
//!                            (per-sub queues)
//!                         ┌─────────┼─────────┐
//!                         ▼         ▼         ▼
//!                     sub1.on   sub2.on   subN.on
//!                      _event()  _event()  _event()
//! ```
//!
//! ### Lifecycle
//! ```text
//! Module::builder(..) ──► ModuleCollection::add ──► Graph
//!
//! init(ctx) (first call only)
//!   ├─► seal (later add ─► AlreadyStarted)
//!   ├─► plan stages ── cycle ─► InitFailed, RuntimeError::Plan
//!   └─► for stage in stages {
//!         ├─► spawn every module's init(ctx.clone())
//!         ├─► wait for all of them
//!         └─► any failed ─► InitFailed, RuntimeError::ModuleFailed (no later stage runs)
//!       }
//!       InitCompleted
//!
//! every init(ctx) call resolves to the same outcome
//! ```
//!
//! ## Features
//! | Area              | Description                                                      | Key types / traits                         |
//! |-------------------|------------------------------------------------------------------|--------------------------------------------|
//! | **Modules**       | Define units of work with their dependencies and init actions.   | [`Module`], [`ModuleBuilder`], [`Init`]    |
//! | **Collection**    | Plan stages and run them once.                                   | [`ModuleCollection`]                       |
//! | **Graph**         | Generic directed graph with longest-path distances.              | [`Graph`], [`Cycle`]                       |
//! | **Discovery**     | Resolve modules from keyed units with a filter and a hook.       | [`Discovery`], [`Resolve`], [`ModuleMap`]  |
//! | **Subscriber API**| Hook into init lifecycle events (logging, metrics, custom).      | [`Subscribe`]                              |
//! | **Errors**        | Typed errors for definitions, planning and initialization.       | [`PlanError`], [`RuntimeError`]            |
//! | **Configuration** | Centralize runtime settings.                                     | [`Config`]                                 |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use initvisor::{Config, InitError, Module, ModuleCollection};
//!
//! #[derive(Clone)]
//! struct App {
//!     dsn: Arc<str>,
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn initvisor::Subscribe>> = vec![Arc::new(initvisor::LogWriter)];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn initvisor::Subscribe>> = Vec::new();
//!
//!     let db = Module::builder("database").init_fn(|app: App| async move {
//!         if app.dsn.is_empty() {
//!             return Err(InitError::fail("empty dsn"));
//!         }
//!         Ok(())
//!     });
//!     let http = Module::builder("http").need(&db).noop();
//!
//!     let collection = ModuleCollection::builder(Config::default())
//!         .with_subscribers(subs)
//!         .with_modules([db, http])
//!         .build()?;
//!
//!     collection.init(App { dsn: "postgres://localhost".into() }).await?;
//!     Ok(())
//! }
//! ```
mod core;
mod discovery;
mod error;
mod events;
mod graph;
mod modules;
mod subscribers;

// ---- Public re-exports ----

pub use crate::core::{Config, IntoModules, ModuleCollection, ModuleCollectionBuilder, Once};
pub use discovery::{Discovery, ModuleMap, Resolve};
pub use error::{
    CollectionError, DependencyList, InitError, PlanError, RuntimeError, ValidationError,
};
pub use events::{Event, EventKind};
pub use graph::{Cycle, Graph};
pub use modules::{BoxInitFuture, Init, InitFn, InitRef, Module, ModuleBuilder, ModuleRef, SyncInitFn};
pub use subscribers::Subscribe;

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
