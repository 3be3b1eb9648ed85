//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom event handlers into the
//! runtime. Each subscriber is driven by a dedicated worker loop fed by a bounded
//! queue that lives for one init run.
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching); they do **not** block
//!   the stage runner nor other subscribers.
//! - Each subscriber declares its preferred queue capacity via
//!   [`Subscribe::queue_capacity`]. If a queue overflows, events for that
//!   subscriber are **dropped**.
//! - [`Subscribe::accepts`] filters by [`EventKind`](crate::EventKind) before an event
//!   is queued, so filtered events never count against the queue.
//!
//! ## Example
//! ```rust
//! use initvisor::{Event, EventKind, Subscribe};
//!
//! struct Audit;
//!
//! #[async_trait::async_trait]
//! impl Subscribe for Audit {
//!     async fn on_event(&self, ev: &Event) {
//!         println!("audit: {:?} failed: {:?}", ev.module, ev.reason);
//!     }
//!     fn name(&self) -> &'static str { "audit" }
//!     fn accepts(&self, kind: EventKind) -> bool { kind == EventKind::ModuleFailed }
//!     fn queue_capacity(&self) -> usize { 512 }
//! }
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};

/// Contract for event subscribers.
///
/// Called from a subscriber-dedicated worker task. Implementations should avoid
/// blocking the async runtime.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }

    /// Whether events of `kind` are delivered to this subscriber at all.
    fn accepts(&self, kind: EventKind) -> bool {
        let _ = kind;
        true
    }
}
