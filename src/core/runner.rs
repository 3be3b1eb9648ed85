//! # Staged execution.
//!
//! Runs a stage plan: every module of a stage in its own tokio task, stages strictly one
//! after the other.
//!
//! ## Event flow
//! ```text
//! InitStarting
//!   for stage in stages:
//!     StageStarting
//!       ModuleStarting ─► init(ctx) ─► ModuleReady | ModuleFailed   (per module, concurrent)
//!     join all ─► StageCompleted | (stop)
//! InitCompleted | InitFailed
//! ```
//!
//! ## Rules
//! - All modules of a stage are launched before any of them is awaited.
//! - A stage is always drained, even after one of its modules failed; in-flight actions are
//!   never cancelled.
//! - The first failure in completion order is reported; no later stage is started.
//! - A panicking action is reported as [`InitError::Panicked`].

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use futures::FutureExt;
use tokio::task::JoinSet;

use crate::error::{InitError, RuntimeError};
use crate::events::{Bus, Event, EventKind};
use crate::modules::ModuleRef;
use crate::subscribers::panic_info;

/// Executes `stages` in order, passing a clone of `ctx` to every module.
pub(crate) async fn run_stages<C>(
    stages: Vec<Vec<ModuleRef<C>>>,
    ctx: C,
    bus: &Bus,
) -> Result<(), RuntimeError>
where
    C: Clone + Send + Sync + 'static,
{
    let started = Instant::now();
    bus.publish(Event::new(EventKind::InitStarting).with_count(stages.len()));

    let total = stages.len();
    for (i, stage) in stages.into_iter().enumerate() {
        let index = i + 1;
        if let Err(err) = run_stage(index, stage, &ctx, bus).await {
            bus.init_failed(&err);
            return Err(err);
        }
    }

    bus.publish(
        Event::new(EventKind::InitCompleted)
            .with_count(total)
            .with_elapsed(started.elapsed()),
    );
    Ok(())
}

/// Launches every module of one stage and waits for all of them.
async fn run_stage<C>(
    index: usize,
    stage: Vec<ModuleRef<C>>,
    ctx: &C,
    bus: &Bus,
) -> Result<(), RuntimeError>
where
    C: Clone + Send + Sync + 'static,
{
    let started = Instant::now();
    bus.publish(
        Event::new(EventKind::StageStarting)
            .with_stage(index)
            .with_count(stage.len()),
    );

    let mut set = JoinSet::new();
    let mut names = HashMap::with_capacity(stage.len());
    for module in stage {
        bus.publish(
            Event::new(EventKind::ModuleStarting)
                .with_stage(index)
                .with_module(module.name()),
        );
        let name = module.name().to_string();
        let handle = set.spawn(run_module(index, module, ctx.clone(), bus.clone()));
        names.insert(handle.id(), name);
    }

    let mut first_err: Option<RuntimeError> = None;
    while let Some(joined) = set.join_next_with_id().await {
        let failure = match joined {
            Ok((_, res)) => res.err(),
            Err(join_err) => {
                let module = names.remove(&join_err.id()).unwrap_or_default();
                let source = InitError::Panicked {
                    info: join_err.to_string(),
                };
                publish_module_failed(bus, index, &module, &source);
                Some(RuntimeError::ModuleFailed {
                    module,
                    stage: index,
                    source,
                })
            }
        };
        if first_err.is_none() {
            first_err = failure;
        }
    }

    match first_err {
        Some(err) => Err(err),
        None => {
            bus.publish(
                Event::new(EventKind::StageCompleted)
                    .with_stage(index)
                    .with_elapsed(started.elapsed()),
            );
            Ok(())
        }
    }
}

/// Runs one module's action, publishing its outcome.
///
/// The action is started inside `catch_unwind`, so a panic while building or polling its
/// future becomes [`InitError::Panicked`].
async fn run_module<C>(
    stage: usize,
    module: ModuleRef<C>,
    ctx: C,
    bus: Bus,
) -> Result<(), RuntimeError>
where
    C: Send + 'static,
{
    let started = Instant::now();
    let action = async { module.action().init(ctx).await };

    let res = match AssertUnwindSafe(action).catch_unwind().await {
        Ok(res) => res,
        Err(panic_err) => Err(InitError::Panicked {
            info: panic_info(&*panic_err),
        }),
    };

    match res {
        Ok(()) => {
            bus.publish(
                Event::new(EventKind::ModuleReady)
                    .with_stage(stage)
                    .with_module(module.name())
                    .with_elapsed(started.elapsed()),
            );
            Ok(())
        }
        Err(source) => {
            publish_module_failed(&bus, stage, module.name(), &source);
            Err(RuntimeError::ModuleFailed {
                module: module.name().to_string(),
                stage,
                source,
            })
        }
    }
}

fn publish_module_failed(bus: &Bus, stage: usize, module: &str, err: &InitError) {
    bus.publish(
        Event::new(EventKind::ModuleFailed)
            .with_stage(stage)
            .with_module(module)
            .with_reason(err.to_string()),
    );
}
