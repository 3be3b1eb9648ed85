//! # LogWriter: simple event printer
//!
//! A minimal subscriber that prints incoming [`Event`]s to stdout.
//! Use it for test or demo.
//!
//! ## Example output
//! ```text
//! [init-starting] stages=3
//! [stage-starting] stage=1 modules=3
//! [module-starting] stage=1 module="database"
//! [module-ready] stage=1 module="database" elapsed_ms=12
//! [module-failed] stage=2 module="cache" err="connection refused"
//! [init-failed] stage=2 module="cache" err="..."
//! ```

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let stage = e.stage.unwrap_or_default();
        let module = e.module.as_deref().unwrap_or("unknown");
        let err = e.reason.as_deref().unwrap_or("unknown");
        let elapsed = e.elapsed_ms.unwrap_or_default();

        match e.kind {
            EventKind::InitStarting => {
                println!("[init-starting] stages={}", e.count.unwrap_or_default());
            }
            EventKind::InitCompleted => {
                println!("[init-completed] elapsed_ms={elapsed}");
            }
            EventKind::InitFailed => match e.stage {
                Some(stage) => println!("[init-failed] stage={stage} module={module:?} err={err:?}"),
                None => println!("[init-failed] err={err:?}"),
            },
            EventKind::StageStarting => {
                println!(
                    "[stage-starting] stage={stage} modules={}",
                    e.count.unwrap_or_default()
                );
            }
            EventKind::StageCompleted => {
                println!("[stage-completed] stage={stage} elapsed_ms={elapsed}");
            }
            EventKind::ModuleStarting => {
                println!("[module-starting] stage={stage} module={module:?}");
            }
            EventKind::ModuleReady => {
                println!("[module-ready] stage={stage} module={module:?} elapsed_ms={elapsed}");
            }
            EventKind::ModuleFailed => {
                println!("[module-failed] stage={stage} module={module:?} err={err:?}");
            }
            EventKind::SubscriberOverflow => {
                println!("[subscriber-overflow] subscriber={module:?} reason={err:?}");
            }
            EventKind::SubscriberPanicked => {
                println!("[subscriber-panicked] subscriber={module} info={err}");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
