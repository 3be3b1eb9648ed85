//! # Init actions and function-backed implementations.
//!
//! This module defines the [`Init`] trait and two closure-backed implementations:
//! - [`InitFn`] wraps `F: Fn(C) -> Fut` and produces a fresh future per call;
//! - [`SyncInitFn`] wraps a synchronous `F: Fn(C) -> Result<(), InitError>`.
//!
//! The common handle type is [`InitRef`], an `Arc<dyn Init<C>>` shared by a module and the runtime.
//!
//! ## Example
//! ```rust
//! use initvisor::{InitFn, InitRef, InitError};
//!
//! let open: InitRef<&'static str> = InitFn::arc(|dsn: &'static str| async move {
//!     if dsn.is_empty() {
//!         return Err(InitError::fail("empty dsn"));
//!     }
//!     Ok(())
//! });
//! # let _ = open;
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::InitError;

/// Boxed future returned by [`Init::init`].
pub type BoxInitFuture = Pin<Box<dyn Future<Output = Result<(), InitError>> + Send + 'static>>;

/// Shared handle to an init action.
pub type InitRef<C> = Arc<dyn Init<C>>;

/// # Initialization action of a module.
///
/// Receives the collection's context by value (the runtime clones it for every module)
/// and completes once the module is ready.
pub trait Init<C>: Send + Sync + 'static {
    /// Starts the action and returns its future.
    fn init(&self, ctx: C) -> BoxInitFuture;
}

/// Async function-backed init action.
#[derive(Debug)]
pub struct InitFn<F> {
    f: F,
}

impl<F> InitFn<F> {
    /// Creates a new function-backed action.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the action and returns it as a shared handle.
    pub fn arc<C, Fut>(f: F) -> InitRef<C>
    where
        F: Fn(C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), InitError>> + Send + 'static,
        C: 'static,
    {
        Arc::new(Self::new(f))
    }
}

impl<C, F, Fut> Init<C> for InitFn<F>
where
    F: Fn(C) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), InitError>> + Send + 'static,
{
    fn init(&self, ctx: C) -> BoxInitFuture {
        Box::pin((self.f)(ctx))
    }
}

/// Synchronous function-backed init action.
///
/// The closure runs when the action is started, inside the module's own task.
#[derive(Debug)]
pub struct SyncInitFn<F> {
    f: Arc<F>,
}

impl<F> SyncInitFn<F> {
    /// Creates a new synchronous action.
    pub fn new(f: F) -> Self {
        Self { f: Arc::new(f) }
    }

    /// Creates the action and returns it as a shared handle.
    pub fn arc<C>(f: F) -> InitRef<C>
    where
        F: Fn(C) -> Result<(), InitError> + Send + Sync + 'static,
        C: Send + 'static,
    {
        Arc::new(Self::new(f))
    }
}

impl<C, F> Init<C> for SyncInitFn<F>
where
    F: Fn(C) -> Result<(), InitError> + Send + Sync + 'static,
    C: Send + 'static,
{
    fn init(&self, ctx: C) -> BoxInitFuture {
        let f = Arc::clone(&self.f);
        Box::pin(async move { f(ctx) })
    }
}

/// Action that completes immediately.
pub(crate) struct Noop;

impl<C> Init<C> for Noop {
    fn init(&self, _ctx: C) -> BoxInitFuture {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn test_init_fn_passes_context() {
        let seen = Arc::new(AtomicUsize::new(0));
        let s = seen.clone();
        let action: InitRef<usize> = InitFn::arc(move |n: usize| {
            let s = s.clone();
            async move {
                s.store(n, Ordering::SeqCst);
                Ok(())
            }
        });

        action.init(7).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 7);
    }

    #[tokio::test]
    async fn test_sync_init_is_lazy() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let action: InitRef<()> = SyncInitFn::arc(move |_: ()| {
            c.fetch_add(1, Ordering::SeqCst);
            Err(InitError::fail("nope"))
        });

        let fut = action.init(());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(fut.await, Err(InitError::fail("nope")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
