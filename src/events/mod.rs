//! Runtime events: types and broadcast bus.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] per-collection wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: the stage runner (`core::runner`), `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the per-run `SubscriberSet` listener and any receiver
//!   obtained from [`ModuleCollection::subscribe`](crate::ModuleCollection::subscribe).

mod bus;
mod event;

pub(crate) use bus::Bus;
pub use event::{Event, EventKind};
