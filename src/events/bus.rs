//! # Event bus of a module collection.
//!
//! [`Bus`] wraps a [`tokio::sync::broadcast`] channel owned by one collection.
//!
//! ```text
//! stage runner ──┐
//! module tasks ──┼──► Bus ──► SubscriberSet::listen (one per init run)
//! sub. workers ──┘       └──► ModuleCollection::subscribe()
//! ```
//!
//! Publishing never blocks. Events published while nobody listens are lost; slow
//! receivers observe `Lagged(n)` and skip the `n` oldest events.

use tokio::sync::broadcast;

use super::event::{Event, EventKind};
use crate::error::RuntimeError;

/// Broadcast channel for runtime events.
#[derive(Clone, Debug)]
pub(crate) struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a bus retaining at most `capacity` (at least 1) unread events per receiver.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            tx: broadcast::channel(capacity.max(1)).0,
        }
    }

    /// Publishes to every current receiver.
    pub(crate) fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Publishes the terminal `InitFailed` event for `err`.
    ///
    /// A module failure carries its stage and module name.
    pub(crate) fn init_failed(&self, err: &RuntimeError) {
        let mut ev = Event::new(EventKind::InitFailed).with_reason(err.to_string());
        if let RuntimeError::ModuleFailed { module, stage, .. } = err {
            ev = ev.with_stage(*stage).with_module(module.as_str());
        }
        self.publish(ev);
    }

    /// Receiver observing events published from now on.
    pub(crate) fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{InitError, PlanError};

    #[tokio::test]
    async fn test_receiver_sees_later_events_only() {
        let bus = Bus::new(0);
        bus.publish(Event::new(EventKind::InitStarting));

        let mut rx = bus.subscribe();
        bus.publish(Event::new(EventKind::InitCompleted));

        let ev = rx.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::InitCompleted);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_init_failed_locates_module_failures() {
        let bus = Bus::new(4);
        let mut rx = bus.subscribe();

        bus.init_failed(&RuntimeError::ModuleFailed {
            module: "db".to_string(),
            stage: 2,
            source: InitError::fail("down"),
        });
        bus.init_failed(&RuntimeError::Plan(PlanError::Cycle {
            path: vec!["a".into(), "b".into(), "a".into()],
        }));

        let located = rx.try_recv().unwrap();
        assert!(located.is_terminal());
        assert_eq!(located.stage, Some(2));
        assert_eq!(located.module.as_deref(), Some("db"));

        let plan = rx.try_recv().unwrap();
        assert_eq!(plan.stage, None);
        assert_eq!(
            plan.reason.as_deref(),
            Some("found circular reference a -> b -> a")
        );
    }
}
