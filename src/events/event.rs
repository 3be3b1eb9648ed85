//! # Runtime events emitted while a collection initializes.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Run events**: the whole staged sequence (starting, completed, failed)
//! - **Stage/module events**: progress of each stage and of each module's init action
//! - **Subscriber events**: delivery problems in the fan-out layer
//!
//! The [`Event`] struct carries metadata such as timestamps, stage index, module name and reasons.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use initvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ModuleFailed)
//!     .with_stage(2)
//!     .with_module("cache")
//!     .with_reason("connection refused");
//!
//! assert_eq!(ev.kind, EventKind::ModuleFailed);
//! assert_eq!(ev.module.as_deref(), Some("cache"));
//! assert_eq!(ev.stage, Some(2));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `module`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `module`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Run events ===
    /// The first `init` call started the staged sequence.
    ///
    /// Sets:
    /// - `count`: number of stages
    InitStarting,

    /// Every stage completed.
    ///
    /// Sets:
    /// - `count`: number of stages
    /// - `elapsed_ms`: wall time of the whole sequence
    InitCompleted,

    /// The sequence stopped on a planning error or a failed module.
    ///
    /// Sets:
    /// - `stage`: failed stage (absent for planning errors)
    /// - `module`: failing module (absent for planning errors)
    /// - `reason`: error message
    InitFailed,

    // === Stage events ===
    /// A stage is about to launch its modules.
    ///
    /// Sets:
    /// - `stage`: 1-based stage index
    /// - `count`: number of modules in the stage
    StageStarting,

    /// Every module of the stage succeeded.
    ///
    /// Sets:
    /// - `stage`: 1-based stage index
    /// - `elapsed_ms`: wall time of the stage
    StageCompleted,

    // === Module events ===
    /// A module's init action was launched.
    ///
    /// Sets:
    /// - `stage`, `module`
    ModuleStarting,

    /// A module's init action succeeded.
    ///
    /// Sets:
    /// - `stage`, `module`, `elapsed_ms`
    ModuleReady,

    /// A module's init action failed or panicked.
    ///
    /// Sets:
    /// - `stage`, `module`
    /// - `reason`: error message
    ModuleFailed,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,

    /// Event classification.
    pub kind: EventKind,
    /// 1-based stage index, if applicable.
    pub stage: Option<u32>,
    /// Module (or subscriber) name, if applicable.
    pub module: Option<Arc<str>>,
    /// Number of stages or modules, depending on the kind.
    pub count: Option<u32>,
    /// Elapsed time in milliseconds (compact).
    pub elapsed_ms: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            stage: None,
            module: None,
            count: None,
            elapsed_ms: None,
            reason: None,
        }
    }

    /// Attaches a 1-based stage index.
    #[inline]
    pub fn with_stage(mut self, stage: usize) -> Self {
        self.stage = Some(clamp_u32(stage));
        self
    }

    /// Attaches a module name.
    #[inline]
    pub fn with_module(mut self, module: impl Into<Arc<str>>) -> Self {
        self.module = Some(module.into());
        self
    }

    /// Attaches a count.
    #[inline]
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(clamp_u32(count));
        self
    }

    /// Attaches an elapsed duration (stored as milliseconds).
    #[inline]
    pub fn with_elapsed(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.elapsed_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_module(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_module(subscriber)
            .with_reason(info)
    }

    /// Returns true for the events that end a run.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, EventKind::InitCompleted | EventKind::InitFailed)
    }
}

fn clamp_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seq_is_monotonic() {
        let a = Event::new(EventKind::StageStarting);
        let b = Event::new(EventKind::StageStarting);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn test_elapsed_saturates() {
        let ev = Event::new(EventKind::ModuleReady).with_elapsed(Duration::from_secs(u64::MAX));
        assert_eq!(ev.elapsed_ms, Some(u32::MAX));
    }

    #[test]
    fn test_terminal_kinds() {
        assert!(Event::new(EventKind::InitCompleted).is_terminal());
        assert!(Event::new(EventKind::InitFailed).is_terminal());
        assert!(!Event::new(EventKind::StageCompleted).is_terminal());
    }
}
