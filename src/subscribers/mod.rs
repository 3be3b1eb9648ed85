//! # Event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the per-run `SubscriberSet` fan-out and
//! (with the `logging` feature) a built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! stage runner ── publish(Event) ──► Bus ──► SubscriberSet::listen ──► deliver(Event)
//!                                                              │
//!                                                  ┌───────────┼───────────┐
//!                                                  ▼           ▼           ▼
//!                                              LogWriter    Metrics     Custom
//! ```

#[cfg(feature = "logging")]
mod log;
mod subscribe;
mod subscriber_set;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use subscribe::Subscribe;
pub(crate) use subscriber_set::panic_info;
pub(crate) use subscriber_set::SubscriberSet;
