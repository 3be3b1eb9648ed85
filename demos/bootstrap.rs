//! # Application bootstrap
//!
//! Demonstrates basic initvisor features:
//! - `needs` and `needed_by` declarations
//! - Concurrent modules within a stage
//! - Shared application context
//! - Event logging through `LogWriter`
//!
//! Run with: `cargo run --example bootstrap --features logging`

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use initvisor::{
    Config, InitError, LogWriter, Module, ModuleBuilder, ModuleCollection, ModuleRef, Subscribe,
};

/// Context handed to every module.
#[derive(Clone, Default)]
struct App {
    ready: Arc<Mutex<Vec<&'static str>>>,
}

/// Finishes a module that pretends to connect somewhere for `work_ms`.
fn connect(builder: ModuleBuilder<App>, name: &'static str, work_ms: u64) -> ModuleRef<App> {
    builder.init_fn(move |app: App| async move {
        tokio::time::sleep(Duration::from_millis(work_ms)).await;
        app.ready.lock().await.push(name);
        Ok::<(), InitError>(())
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let config = connect(Module::builder("config"), "config", 10);
    let database = connect(Module::builder("database").need(&config), "database", 120);
    let cache = connect(Module::builder("cache").need(&config), "cache", 40);
    let http = connect(Module::builder("http").needs([&database, &cache]), "http", 20);
    // `metrics` pushes itself in front of `http` without `http` knowing about it.
    let metrics = connect(Module::builder("metrics").needed_by(&http), "metrics", 5);

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let collection = ModuleCollection::builder(Config::default())
        .with_subscribers(subs)
        .with_modules([http, metrics])
        .build()?;

    for (i, stage) in collection.init_stages()?.iter().enumerate() {
        let names: Vec<&str> = stage.iter().map(|m| m.name()).collect();
        println!("stage {}: {}", i + 1, names.join(", "));
    }

    let app = App::default();
    collection.init(app.clone()).await?;

    println!("ready: {:?}", app.ready.lock().await);
    Ok(())
}
