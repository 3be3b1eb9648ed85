//! # ModuleCollection: dependency-ordered, stage-parallel initialization.
//!
//! A [`ModuleCollection`] owns the dependency graph built from its modules, plans stages
//! on demand, and runs the staged sequence exactly once.
//!
//! ## High-level architecture
//! ```text
//! add(modules) ──► Graph (module → need, needed_by → module)
//!
//! init_stages() ──► planner::plan_stages(&graph) ──► [[stage 1], [stage 2], ...]
//!
//! init(ctx) ──► Once::get_or_run (first caller only)
//!                 ├─► seal graph (later `add` fails)
//!                 ├─► plan stages
//!                 ├─► SubscriberSet::listen (Bus ─► subscribers until InitCompleted/InitFailed)
//!                 └─► tokio::spawn(runner::run_stages(stages, ctx, bus))
//!               every caller awaits the same shared outcome
//! ```
//!
//! ## Rules
//! - `init` runs the sequence at most once per collection, however often and however
//!   concurrently it is called; every caller observes the same outcome.
//! - The sequence runs on its own tokio task: it completes even if every caller drops
//!   its `init` future.
//! - `add` after the first `init` call fails with [`CollectionError::AlreadyStarted`].
//!
//! ## Example
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use initvisor::{Module, ModuleCollection};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let log = Arc::new(Mutex::new(Vec::<String>::new()));
//!
//!     let db = Module::builder("database").init_sync(|log: Arc<Mutex<Vec<String>>>| {
//!         log.lock().unwrap().push("database".into());
//!         Ok(())
//!     });
//!     let http = Module::builder("http").need(&db).init_sync(|log: Arc<Mutex<Vec<String>>>| {
//!         log.lock().unwrap().push("http".into());
//!         Ok(())
//!     });
//!
//!     let collection = ModuleCollection::new([http, db])?;
//!     collection.init(log.clone()).await?;
//!
//!     assert_eq!(*log.lock().unwrap(), ["database", "http"]);
//!     Ok(())
//! }
//! ```

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::broadcast;

use crate::core::builder::ModuleCollectionBuilder;
use crate::core::once::Once;
use crate::core::{Config, planner, runner};
use crate::error::{CollectionError, PlanError, RuntimeError};
use crate::events::{Bus, Event};
use crate::graph::Graph;
use crate::modules::ModuleRef;
use crate::subscribers::{Subscribe, SubscriberSet};

/// Collection of modules initialized in dependency order.
pub struct ModuleCollection<C> {
    cfg: Config,
    graph: RwLock<Graph<ModuleRef<C>>>,
    sealed: AtomicBool,
    bus: Bus,
    subscribers: Vec<Arc<dyn Subscribe>>,
    once: Once<Result<(), RuntimeError>>,
}

impl<C> ModuleCollection<C>
where
    C: Clone + Send + Sync + 'static,
{
    /// Creates a collection with the default [`Config`] and the given modules.
    ///
    /// ### Errors
    /// [`CollectionError::DuplicateName`] if two distinct modules share a name.
    pub fn new(modules: impl IntoModules<C>) -> Result<Self, CollectionError> {
        let collection = Self::new_internal(Config::default(), Vec::new());
        collection.add(modules)?;
        Ok(collection)
    }

    /// Returns a builder for configuring subscribers and initial modules.
    pub fn builder(cfg: Config) -> ModuleCollectionBuilder<C> {
        ModuleCollectionBuilder::new(cfg)
    }

    pub(crate) fn new_internal(cfg: Config, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        Self {
            cfg,
            graph: RwLock::new(Graph::new()),
            sealed: AtomicBool::new(false),
            bus,
            subscribers,
            once: Once::new(),
        }
    }

    /// Adds one or more modules, merging them into the dependency graph.
    ///
    /// Everything reachable through `needs`/`needed_by`, however indirectly, is added as
    /// well. On error nothing is added.
    ///
    /// ### Errors
    /// - [`CollectionError::AlreadyStarted`] once `init` has been called.
    /// - [`CollectionError::DuplicateName`] if enabled by [`Config::reject_duplicate_names`].
    pub fn add(&self, modules: impl IntoModules<C>) -> Result<(), CollectionError> {
        let modules = modules.into_modules();
        let mut graph = self.graph.write().unwrap_or_else(PoisonError::into_inner);

        if self.sealed.load(Ordering::SeqCst) {
            return Err(CollectionError::AlreadyStarted);
        }
        let closure = reachable(&graph, modules);
        if self.cfg.reject_duplicate_names {
            check_names(&graph, &closure)?;
        }

        for module in closure {
            graph.add_vertex(module.clone());
            for need in module.needs() {
                graph.add_edge(module.clone(), need.clone());
            }
            for dependant in module.needed_by() {
                graph.add_edge(dependant.clone(), module.clone());
            }
        }
        Ok(())
    }

    /// Groups the modules into stages for initialization in sequence.
    ///
    /// Recomputed on every call. Modules within a stage have no ordering constraint
    /// between them.
    ///
    /// ### Errors
    /// [`PlanError::Cycle`] with the modules along a dependency cycle.
    pub fn init_stages(&self) -> Result<Vec<Vec<ModuleRef<C>>>, PlanError> {
        let graph = self.graph.read().unwrap_or_else(PoisonError::into_inner);
        planner::plan_stages(&graph)
    }

    /// Initializes every module, stage by stage, passing each a clone of `ctx`.
    ///
    /// Only the first call starts the sequence (and only its `ctx` is used); every call
    /// resolves to the same outcome. Must be called within a tokio runtime.
    ///
    /// ### Errors
    /// - [`RuntimeError::Plan`] if no stage plan exists;
    /// - [`RuntimeError::ModuleFailed`] with the first failure of the first failing stage.
    pub async fn init(&self, ctx: C) -> Result<(), RuntimeError> {
        self.once.get_or_run(|| self.start(ctx)).await
    }

    /// Seals the graph, plans, and spawns the staged run.
    fn start(&self, ctx: C) -> BoxFuture<'static, Result<(), RuntimeError>> {
        let planned = {
            let graph = self.graph.write().unwrap_or_else(PoisonError::into_inner);
            self.sealed.store(true, Ordering::SeqCst);
            planner::plan_stages(&graph)
        };

        let listener = SubscriberSet::listen(&self.subscribers, &self.bus);
        let bus = self.bus.clone();
        let aborted_bus = self.bus.clone();
        let run = tokio::spawn(async move {
            match planned {
                Ok(stages) => runner::run_stages(stages, ctx, &bus).await,
                Err(err) => {
                    let err = RuntimeError::from(err);
                    bus.init_failed(&err);
                    Err(err)
                }
            }
        });

        async move {
            let res = run.await.unwrap_or_else(|join_err| {
                let err = RuntimeError::Aborted {
                    reason: join_err.to_string(),
                };
                aborted_bus.init_failed(&err);
                Err(err)
            });
            if let Some(listener) = listener {
                let _ = listener.await;
            }
            res
        }
        .boxed()
    }

    /// Returns a receiver for the runtime events of this collection.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Returns the modules of the collection in insertion order.
    pub fn modules(&self) -> Vec<ModuleRef<C>> {
        let graph = self.graph.read().unwrap_or_else(PoisonError::into_inner);
        graph.vertices().cloned().collect()
    }

    /// Number of modules, including those only reached through `needs`/`needed_by`.
    pub fn len(&self) -> usize {
        self.graph.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if the collection has no modules.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true once `init` has been called.
    pub fn is_started(&self) -> bool {
        self.once.is_started()
    }
}

/// `modules` plus everything they reach through `needs`/`needed_by`, in discovery order.
///
/// Vertices already in `graph` are skipped: their own reach was merged when they were added.
fn reachable<C>(graph: &Graph<ModuleRef<C>>, modules: Vec<ModuleRef<C>>) -> Vec<ModuleRef<C>> {
    let mut seen: HashSet<ModuleRef<C>> = HashSet::new();
    let mut queue: VecDeque<ModuleRef<C>> = modules.into();
    let mut closure = Vec::new();

    while let Some(module) = queue.pop_front() {
        if graph.contains(&module) || !seen.insert(module.clone()) {
            continue;
        }
        queue.extend(module.needs().iter().cloned());
        queue.extend(module.needed_by().iter().cloned());
        closure.push(module);
    }
    closure
}

/// Rejects a module whose name is already taken by a different module.
fn check_names<C>(
    graph: &Graph<ModuleRef<C>>,
    modules: &[ModuleRef<C>],
) -> Result<(), CollectionError> {
    let mut seen: HashMap<&str, &ModuleRef<C>> = graph.vertices().map(|m| (m.name(), m)).collect();

    for module in modules {
        match seen.entry(module.name()) {
            Entry::Occupied(e) if !Arc::ptr_eq(e.get(), module) => {
                return Err(CollectionError::DuplicateName {
                    name: module.name().to_string(),
                });
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(e) => {
                e.insert(module);
            }
        }
    }
    Ok(())
}

/// Values accepted by [`ModuleCollection::add`]: one module or several.
pub trait IntoModules<C> {
    /// Converts into a list of modules.
    fn into_modules(self) -> Vec<ModuleRef<C>>;
}

impl<C> IntoModules<C> for ModuleRef<C> {
    fn into_modules(self) -> Vec<ModuleRef<C>> {
        vec![self]
    }
}

impl<C> IntoModules<C> for &ModuleRef<C> {
    fn into_modules(self) -> Vec<ModuleRef<C>> {
        vec![Arc::clone(self)]
    }
}

impl<C> IntoModules<C> for Vec<ModuleRef<C>> {
    fn into_modules(self) -> Vec<ModuleRef<C>> {
        self
    }
}

impl<C> IntoModules<C> for &[ModuleRef<C>] {
    fn into_modules(self) -> Vec<ModuleRef<C>> {
        self.to_vec()
    }
}

impl<C, const N: usize> IntoModules<C> for [ModuleRef<C>; N] {
    fn into_modules(self) -> Vec<ModuleRef<C>> {
        self.into()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use tokio::sync::Barrier;

    use super::*;
    use crate::error::InitError;
    use crate::events::EventKind;
    use crate::modules::Module;

    type Log = Arc<Mutex<Vec<String>>>;

    fn noop(name: &'static str) -> ModuleRef<()> {
        Module::builder(name).noop()
    }

    fn stage_names<C>(stages: &[Vec<ModuleRef<C>>]) -> Vec<Vec<String>> {
        stages
            .iter()
            .map(|s| {
                let mut names: Vec<String> = s.iter().map(|m| m.name().to_string()).collect();
                names.sort();
                names
            })
            .collect()
    }

    fn recording(name: &'static str) -> crate::modules::ModuleBuilder<Log> {
        Module::builder(name)
    }

    fn record(builder: crate::modules::ModuleBuilder<Log>, name: &'static str) -> ModuleRef<Log> {
        builder.init_sync(move |log: Log| {
            log.lock().unwrap().push(name.to_string());
            Ok(())
        })
    }

    #[test]
    fn test_stages_follow_needs_and_needed_by() {
        let a = noop("a");
        let g = noop("g");
        let f = noop("f");
        let e = Module::builder("e").need(&f).noop();
        let d = Module::builder("d").need(&f).needed_by(&a).noop();
        let c = Module::builder("c").needed_by(&a).noop();
        let b = Module::builder("b").need(&e).noop();

        let collection = ModuleCollection::new([a, b, c, d, e, f, g]).unwrap();
        let stages = collection.init_stages().unwrap();

        assert_eq!(
            stage_names(&stages),
            [vec!["c", "f", "g"], vec!["d", "e"], vec!["a", "b"]]
        );
    }

    #[test]
    fn test_stage_index_is_longest_need_chain() {
        let a = noop("a");
        let g = noop("g");
        let f = noop("f");
        let e = Module::builder("e").need(&f).noop();
        let d = Module::builder("d").need(&f).needed_by(&a).noop();
        let c = Module::builder("c").needed_by(&a).noop();
        let b = Module::builder("b").need(&e).noop();
        let collection = ModuleCollection::new([a, b, c, d, e, f, g]).unwrap();

        let stages = collection.init_stages().unwrap();
        let stage_of: HashMap<String, usize> = stages
            .iter()
            .enumerate()
            .flat_map(|(i, s)| s.iter().map(move |m| (m.name().to_string(), i + 1)))
            .collect();

        // every module sits strictly after everything it depends on
        for m in collection.modules() {
            for need in m.needs() {
                assert!(stage_of[m.name()] > stage_of[need.name()]);
            }
            for dependant in m.needed_by() {
                assert!(stage_of[dependant.name()] > stage_of[m.name()]);
            }
        }
        assert_eq!(stage_of.len(), 7);
    }

    #[test]
    fn test_cycle_is_reported_with_its_path() {
        let g = noop("g");
        let f = noop("f");
        let e = Module::builder("e").need(&f).noop();
        let d = Module::builder("d").need(&f).noop();
        let c = noop("c");
        let b = Module::builder("b").need(&e).noop();
        // `needed_by(&f)` makes f need a, closing a -> f -> d -> a
        let a = Module::builder("a").need(&c).need(&d).needed_by(&f).noop();

        let collection = ModuleCollection::new([a, b, c, d, e, f, g]).unwrap();
        let err = collection.init_stages().unwrap_err();

        assert_eq!(err.to_string(), "found circular reference a -> f -> d -> a");
    }

    #[test]
    fn test_plan_is_reproducible() {
        let x = noop("x");
        let y = Module::builder("y").need(&x).noop();
        let collection = ModuleCollection::new(vec![y, x]).unwrap();

        let first = stage_names(&collection.init_stages().unwrap());
        let second = stage_names(&collection.init_stages().unwrap());
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_indirect_dependencies_join_and_run_first() {
        let config = record(recording("config"), "config");
        let database = record(recording("database").need(&config), "database");
        let http = record(recording("http").need(&database), "http");

        let collection = ModuleCollection::new(http).unwrap();
        let mut names: Vec<String> = collection
            .modules()
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, ["config", "database", "http"]);

        let log: Log = Arc::default();
        collection.init(log.clone()).await.unwrap();
        assert_eq!(*log.lock().unwrap(), ["config", "database", "http"]);

        // reached only through `needed_by` of something deep in the chain
        let z = Module::<()>::builder("z").noop();
        let y = Module::builder("y").need(&z).noop();
        let x = Module::builder("x").needed_by(&y).noop();
        let collection = ModuleCollection::new(x).unwrap();
        assert_eq!(collection.len(), 3);
        assert_eq!(
            stage_names(&collection.init_stages().unwrap()),
            [vec!["x", "z"], vec!["y"]]
        );
    }

    #[test]
    fn test_duplicate_names_checked_across_indirect_dependencies() {
        let collection = ModuleCollection::new(noop("config")).unwrap();
        let other_config = noop("config");
        let database = Module::builder("database").need(&other_config).noop();
        let http = Module::builder("http").need(&database).noop();

        assert_eq!(
            collection.add(http),
            Err(CollectionError::DuplicateName {
                name: "config".to_string()
            })
        );
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_add_is_additive_and_accepts_single_module() {
        let x = noop("x");
        let y = Module::builder("y").need(&x).noop();
        let collection = ModuleCollection::new(Vec::new()).unwrap();

        collection.add(&x).unwrap();
        collection.add(y.clone()).unwrap();
        collection.add([y]).unwrap();

        assert_eq!(collection.len(), 2);
        assert_eq!(
            stage_names(&collection.init_stages().unwrap()),
            [vec!["x"], vec!["y"]]
        );
    }

    #[test]
    fn test_duplicate_names_rejected_atomically() {
        let collection = ModuleCollection::new(noop("db")).unwrap();
        let other = noop("cache");
        let twin = Module::builder("db").needed_by(&other).noop();

        let err = collection.add(vec![other, twin]).unwrap_err();
        assert_eq!(
            err,
            CollectionError::DuplicateName {
                name: "db".to_string()
            }
        );
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_duplicate_names_allowed_when_disabled() {
        let cfg = Config {
            reject_duplicate_names: false,
            ..Config::default()
        };
        let collection = ModuleCollection::builder(cfg)
            .with_modules([noop("db"), noop("db")])
            .build()
            .unwrap();
        assert_eq!(collection.len(), 2);
    }

    #[tokio::test]
    async fn test_init_runs_stage_by_stage() {
        let e = record(recording("e"), "e");
        let f = record(recording("f").needed_by(&e), "f");
        let d = record(recording("d").need(&f), "d");
        let c = record(recording("c"), "c");
        let b = record(recording("b").need(&e), "b");
        let a = record(recording("a").need(&c).need(&d), "a");
        let g = record(recording("g"), "g");

        let collection = ModuleCollection::new([a, b, c, d, e, f, g]).unwrap();
        let expected = stage_names(&collection.init_stages().unwrap());
        assert_eq!(expected, [vec!["c", "f", "g"], vec!["d", "e"], vec!["a", "b"]]);

        let log: Log = Arc::default();
        collection.init(log.clone()).await.unwrap();

        let log = log.lock().unwrap().clone();
        let mut pos = 0;
        for stage in expected {
            let mut got = log[pos..pos + stage.len()].to_vec();
            got.sort();
            assert_eq!(got, stage);
            pos += stage.len();
        }
        assert_eq!(pos, log.len());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_init_runs_exactly_once() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counted = |name: &'static str, runs: &Arc<AtomicUsize>| {
            let runs = runs.clone();
            Module::builder(name).init_fn(move |_: ()| {
                let runs = runs.clone();
                async move {
                    runs.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    Ok(())
                }
            })
        };
        let x = counted("x", &runs);
        let y = Module::builder("y").need(&x).noop();
        let z = counted("z", &runs);
        let collection = Arc::new(ModuleCollection::new([x, y, z]).unwrap());

        let calls = (0..8).map(|_| {
            let collection = collection.clone();
            tokio::spawn(async move { collection.init(()).await })
        });
        let results = futures::future::join_all(calls).await;

        for res in results {
            assert_eq!(res.unwrap(), Ok(()));
        }
        assert_eq!(runs.load(Ordering::SeqCst), 2);
        assert_eq!(collection.init(()).await, Ok(()));
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stage_members_start_together() {
        // Both modules wait for each other; serialized execution would never finish.
        let barrier = Arc::new(Barrier::new(2));
        let meet = |name: &'static str| {
            let barrier = barrier.clone();
            Module::builder(name).init_fn(move |_: ()| {
                let barrier = barrier.clone();
                async move {
                    barrier.wait().await;
                    Ok(())
                }
            })
        };
        let collection = ModuleCollection::new([meet("left"), meet("right")]).unwrap();

        let res = tokio::time::timeout(Duration::from_secs(5), collection.init(())).await;
        assert_eq!(res.expect("stage members were serialized"), Ok(()));
    }

    #[tokio::test]
    async fn test_failure_stops_later_stages_and_is_shared() {
        let log: Log = Arc::default();
        let bad = Module::builder("bad").init_fn(|_: Log| async { Err(InitError::fail("boom")) });
        let slow = Module::builder("slow").init_fn(|log: Log| async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            log.lock().unwrap().push("slow".to_string());
            Ok(())
        });
        let after = record(recording("after").need(&bad), "after");

        let collection = ModuleCollection::new([bad, slow, after]).unwrap();
        let first = collection.init(log.clone()).await.unwrap_err();
        let second = collection.init(log.clone()).await.unwrap_err();

        assert_eq!(
            first,
            RuntimeError::ModuleFailed {
                module: "bad".to_string(),
                stage: 1,
                source: InitError::fail("boom"),
            }
        );
        assert_eq!(first, second);
        // the sibling was drained, the next stage never started
        assert_eq!(*log.lock().unwrap(), ["slow"]);
    }

    #[tokio::test]
    async fn test_panicking_action_becomes_error() {
        let boom = Module::builder("boom").init_sync(|_: ()| -> Result<(), InitError> {
            panic!("kaboom");
        });
        let collection = ModuleCollection::new(boom).unwrap();

        let err = collection.init(()).await.unwrap_err();
        assert_eq!(
            err.init_error(),
            Some(&InitError::Panicked {
                info: "kaboom".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_cycle_fails_init() {
        let a = noop("a");
        let b = Module::builder("b").need(&a).needed_by(&a).noop();
        let collection = ModuleCollection::new([a, b]).unwrap();

        let err = collection.init(()).await.unwrap_err();
        assert_eq!(err.as_label(), "plan_cycle");
    }

    #[tokio::test]
    async fn test_add_after_init_fails_fast() {
        let collection = ModuleCollection::new(noop("a")).unwrap();
        collection.init(()).await.unwrap();

        assert!(collection.is_started());
        assert_eq!(
            collection.add(noop("late")),
            Err(CollectionError::AlreadyStarted)
        );
        assert_eq!(collection.len(), 1);
    }

    #[tokio::test]
    async fn test_events_trace_the_run() {
        let x = noop("x");
        let y = Module::builder("y").need(&x).noop();
        let collection = ModuleCollection::new([x, y]).unwrap();
        let mut rx = collection.subscribe();

        collection.init(()).await.unwrap();

        let mut kinds = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            kinds.push(ev.kind);
        }
        assert_eq!(
            kinds,
            [
                EventKind::InitStarting,
                EventKind::StageStarting,
                EventKind::ModuleStarting,
                EventKind::ModuleReady,
                EventKind::StageCompleted,
                EventKind::StageStarting,
                EventKind::ModuleStarting,
                EventKind::ModuleReady,
                EventKind::StageCompleted,
                EventKind::InitCompleted,
            ]
        );
    }

    #[tokio::test]
    async fn test_subscribers_receive_events_before_init_returns() {
        use async_trait::async_trait;

        #[derive(Default)]
        struct Recorder {
            seen: Mutex<Vec<EventKind>>,
        }

        #[async_trait]
        impl Subscribe for Recorder {
            async fn on_event(&self, event: &Event) {
                self.seen.lock().unwrap().push(event.kind);
            }
        }

        let rec = Arc::new(Recorder::default());
        let collection = ModuleCollection::builder(Config::default())
            .with_subscribers(vec![rec.clone() as Arc<dyn Subscribe>])
            .with_modules(noop("solo"))
            .build()
            .unwrap();

        collection.init(()).await.unwrap();

        let seen = rec.seen.lock().unwrap();
        assert_eq!(seen.first(), Some(&EventKind::InitStarting));
        assert_eq!(seen.last(), Some(&EventKind::InitCompleted));
    }
}
