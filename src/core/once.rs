//! # Single-shot async execution.
//!
//! [`Once`] runs an async computation at most once and shares its outcome with every
//! caller, racing or sequential.
//!
//! ```text
//! slot: None ──first call──► Some(Shared<fut>) ──► every caller awaits a clone
//! ```
//!
//! The slot is filled under a lock, so concurrent first callers cannot both start the
//! computation. The stored future is a [`Shared`] handle: whichever caller polls first
//! drives it, and the output is cloned out to all of them.

use std::sync::Mutex;

use futures::future::{BoxFuture, FutureExt, Shared};

/// Memoized, single-shot future.
pub struct Once<T: Clone> {
    slot: Mutex<Option<Shared<BoxFuture<'static, T>>>>,
}

impl<T: Clone + Send + Sync + 'static> Once<T> {
    /// Creates an empty latch.
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Returns the shared outcome, starting `f` only if nothing was started before.
    pub async fn get_or_run<F, Fut>(&self, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T> + Send + 'static,
    {
        let shared = {
            let mut slot = self.slot.lock().unwrap_or_else(|p| p.into_inner());
            match slot.as_ref() {
                Some(shared) => shared.clone(),
                None => {
                    let shared = f().boxed().shared();
                    *slot = Some(shared.clone());
                    shared
                }
            }
        };
        shared.await
    }

    /// Returns true once the computation has been started.
    pub fn is_started(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .is_some()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for Once<T> {
    fn default() -> Self {
        Self::new()
    }
}
