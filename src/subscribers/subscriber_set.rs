//! # Per-run event fan-out to subscribers.
//!
//! [`SubscriberSet::listen`] attaches to the bus before an init run starts and lives
//! exactly as long as that run:
//!
//! ```text
//! Bus ──► listener ──► deliver(event)
//!                         ├──► [queue 1] ──► worker 1 ──► subscriber1.on_event()
//!                         │    (bounded)         └──────► panic → SubscriberPanicked
//!                         └──► [queue N] ──► worker N ──► subscriberN.on_event()
//!
//! InitCompleted | InitFailed ──► close queues ──► await workers (drain)
//! ```
//!
//! ## Rules
//! - Each subscriber sees the events it [accepts](Subscribe::accepts) in publish order.
//! - A full queue drops the event for that subscriber only and publishes
//!   `SubscriberOverflow`.
//! - The listener's handle resolves only after every queued event was handled, so a run's
//!   caller can await it before returning.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::events::{Bus, Event, EventKind};
use crate::subscribers::Subscribe;

/// Queue feeding one subscriber worker.
struct Queue {
    sub: Arc<dyn Subscribe>,
    tx: mpsc::Sender<Arc<Event>>,
}

/// Subscribers attached to a single init run.
pub(crate) struct SubscriberSet {
    queues: Vec<Queue>,
    workers: Vec<JoinHandle<()>>,
    bus: Bus,
}

impl SubscriberSet {
    /// Subscribes to `bus` now and forwards events to `subs` until the run's terminal
    /// event, then drains every queue.
    ///
    /// Returns `None` when there is nobody to deliver to. Must be called within a tokio
    /// runtime.
    pub(crate) fn listen(subs: &[Arc<dyn Subscribe>], bus: &Bus) -> Option<JoinHandle<()>> {
        if subs.is_empty() {
            return None;
        }
        let mut rx = bus.subscribe();
        let set = Self::spawn(subs, bus.clone());

        Some(tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => {
                        let terminal = ev.is_terminal();
                        set.deliver(Arc::new(ev));
                        if terminal {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            set.drain().await;
        }))
    }

    fn spawn(subs: &[Arc<dyn Subscribe>], bus: Bus) -> Self {
        let (queues, workers) = subs
            .iter()
            .map(|sub| {
                let (tx, rx) = mpsc::channel(sub.queue_capacity().max(1));
                let worker = tokio::spawn(work(Arc::clone(sub), rx, bus.clone()));
                (
                    Queue {
                        sub: Arc::clone(sub),
                        tx,
                    },
                    worker,
                )
            })
            .unzip();
        Self {
            queues,
            workers,
            bus,
        }
    }

    /// Hands `event` to every subscriber that accepts it, without waiting.
    fn deliver(&self, event: Arc<Event>) {
        let overflow = event.kind == EventKind::SubscriberOverflow;

        for queue in self.queues.iter().filter(|q| q.sub.accepts(event.kind)) {
            let reason = match queue.tx.try_send(Arc::clone(&event)) {
                Ok(()) => continue,
                Err(mpsc::error::TrySendError::Full(_)) => "full",
                Err(mpsc::error::TrySendError::Closed(_)) => "closed",
            };
            if !overflow {
                self.bus
                    .publish(Event::subscriber_overflow(queue.sub.name(), reason));
            }
        }
    }

    /// Closes the queues and waits until every worker handled what it was given.
    async fn drain(self) {
        drop(self.queues);
        for worker in self.workers {
            let _ = worker.await;
        }
    }
}

/// Worker loop of one subscriber; a panicking handler is reported and skipped.
async fn work(sub: Arc<dyn Subscribe>, mut rx: mpsc::Receiver<Arc<Event>>, bus: Bus) {
    while let Some(ev) = rx.recv().await {
        let handled = std::panic::AssertUnwindSafe(sub.on_event(&ev)).catch_unwind();
        if let Err(panic_err) = handled.await {
            bus.publish(Event::subscriber_panicked(sub.name(), panic_info(&*panic_err)));
        }
    }
}

/// Extracts a readable message from a panic payload.
pub(crate) fn panic_info(any: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
