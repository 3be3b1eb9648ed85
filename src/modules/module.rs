//! # Module descriptors.
//!
//! A [`Module`] names a unit of work, its predecessors (`needs`), its successors
//! (`needed_by`) and an [`Init`] action. Descriptors are immutable and shared as
//! [`ModuleRef`]; equality and hashing are by identity, so two modules with the same
//! name are distinct unless the caller deduplicates them.
//!
//! A module can be created:
//! - **Validated** with [`Module::try_new`], for dependency lists assembled from lookups
//!   that may have come back empty;
//! - **Fluently** with [`Module::builder`], which only accepts existing modules.

use std::borrow::Cow;
use std::fmt;
use std::future::Future;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::error::{DependencyList, InitError, ValidationError};
use crate::modules::init::{Init, InitFn, InitRef, Noop, SyncInitFn};

/// Shared handle to a module descriptor.
pub type ModuleRef<C> = Arc<Module<C>>;

/// Immutable module descriptor.
///
/// ## Example
/// ```rust
/// use initvisor::{Module, ModuleRef};
///
/// let db: ModuleRef<()> = Module::builder("database").init_fn(|_ctx: ()| async { Ok(()) });
/// let cache = Module::builder("cache").need(&db).init_fn(|_ctx: ()| async { Ok(()) });
///
/// assert_eq!(cache.to_string(), "cache");
/// assert!(std::sync::Arc::ptr_eq(&cache.needs()[0], &db));
/// ```
pub struct Module<C> {
    name: Cow<'static, str>,
    needs: Vec<ModuleRef<C>>,
    needed_by: Vec<ModuleRef<C>>,
    init: InitRef<C>,
}

impl<C: 'static> Module<C> {
    /// Defines a module, rejecting absent entries in either dependency list.
    ///
    /// ### Errors
    /// [`ValidationError`] naming the module, the list and the 1-based position of the
    /// first absent entry (`needs` is checked before `needed_by`).
    pub fn try_new(
        name: impl Into<Cow<'static, str>>,
        needs: Vec<Option<ModuleRef<C>>>,
        needed_by: Vec<Option<ModuleRef<C>>>,
        init: InitRef<C>,
    ) -> Result<ModuleRef<C>, ValidationError> {
        let name = name.into();
        let needs = collect_list(&name, DependencyList::Needs, needs)?;
        let needed_by = collect_list(&name, DependencyList::NeededBy, needed_by)?;
        Ok(Arc::new(Self {
            name,
            needs,
            needed_by,
            init,
        }))
    }

    /// Starts a fluent definition.
    pub fn builder(name: impl Into<Cow<'static, str>>) -> ModuleBuilder<C> {
        ModuleBuilder::new(name)
    }

    /// Internal sentinel used to anchor stage planning; never executed.
    pub(crate) fn root() -> ModuleRef<C> {
        Arc::new(Self {
            name: Cow::Borrowed("__root__"),
            needs: Vec::new(),
            needed_by: Vec::new(),
            init: Arc::new(Noop),
        })
    }
}

impl<C> Module<C> {
    /// Returns the module name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Modules that must finish initializing before this one starts.
    pub fn needs(&self) -> &[ModuleRef<C>] {
        &self.needs
    }

    /// Modules that must start only after this one finishes.
    pub fn needed_by(&self) -> &[ModuleRef<C>] {
        &self.needed_by
    }

    /// Returns the init action.
    pub fn action(&self) -> &InitRef<C> {
        &self.init
    }
}

fn collect_list<C>(
    name: &str,
    list: DependencyList,
    entries: Vec<Option<ModuleRef<C>>>,
) -> Result<Vec<ModuleRef<C>>, ValidationError> {
    entries
        .into_iter()
        .enumerate()
        .map(|(i, entry)| {
            entry.ok_or_else(|| ValidationError {
                module: name.to_string(),
                list,
                index: i + 1,
            })
        })
        .collect()
}

impl<C> PartialEq for Module<C> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

impl<C> Eq for Module<C> {}

impl<C> Hash for Module<C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self, state);
    }
}

impl<C> fmt::Display for Module<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl<C> fmt::Debug for Module<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn names<C>(list: &[ModuleRef<C>]) -> Vec<&str> {
            list.iter().map(|m| m.name()).collect()
        }
        f.debug_struct("Module")
            .field("name", &self.name)
            .field("needs", &names(&self.needs))
            .field("needed_by", &names(&self.needed_by))
            .finish_non_exhaustive()
    }
}

/// Builder for [`Module`] with fluent API.
pub struct ModuleBuilder<C> {
    name: Cow<'static, str>,
    needs: Vec<ModuleRef<C>>,
    needed_by: Vec<ModuleRef<C>>,
}

impl<C: 'static> ModuleBuilder<C> {
    /// Creates a new builder with the given module name.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            needs: Vec::new(),
            needed_by: Vec::new(),
        }
    }

    /// Adds a module that must finish before this one starts.
    pub fn need(mut self, module: &ModuleRef<C>) -> Self {
        self.needs.push(Arc::clone(module));
        self
    }

    /// Adds several modules that must finish before this one starts.
    pub fn needs<'a>(mut self, modules: impl IntoIterator<Item = &'a ModuleRef<C>>) -> Self {
        self.needs.extend(modules.into_iter().cloned());
        self
    }

    /// Adds a module that must start only after this one finishes.
    pub fn needed_by(mut self, module: &ModuleRef<C>) -> Self {
        self.needed_by.push(Arc::clone(module));
        self
    }

    /// Adds several modules that must start only after this one finishes.
    pub fn needed_by_all<'a>(mut self, modules: impl IntoIterator<Item = &'a ModuleRef<C>>) -> Self {
        self.needed_by.extend(modules.into_iter().cloned());
        self
    }

    /// Builds the module around an existing action.
    pub fn init(self, init: InitRef<C>) -> ModuleRef<C> {
        Arc::new(Module {
            name: self.name,
            needs: self.needs,
            needed_by: self.needed_by,
            init,
        })
    }

    /// Builds the module from an async closure.
    pub fn init_fn<F, Fut>(self, f: F) -> ModuleRef<C>
    where
        F: Fn(C) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), InitError>> + Send + 'static,
    {
        self.init(InitFn::arc(f))
    }

    /// Builds the module from a synchronous closure.
    pub fn init_sync<F>(self, f: F) -> ModuleRef<C>
    where
        F: Fn(C) -> Result<(), InitError> + Send + Sync + 'static,
        C: Send,
    {
        self.init(SyncInitFn::arc(f))
    }

    /// Builds a module whose action does nothing.
    pub fn noop(self) -> ModuleRef<C> {
        self.init(Arc::new(Noop) as Arc<dyn Init<C>>)
    }
}
