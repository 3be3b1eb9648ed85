use std::sync::Arc;

use super::collection::{IntoModules, ModuleCollection};
use crate::{core::Config, error::CollectionError, modules::ModuleRef, subscribers::Subscribe};

/// Builder for constructing a [`ModuleCollection`] with optional subscribers.
pub struct ModuleCollectionBuilder<C> {
    cfg: Config,
    subscribers: Vec<Arc<dyn Subscribe>>,
    modules: Vec<ModuleRef<C>>,
}

impl<C> ModuleCollectionBuilder<C>
where
    C: Clone + Send + Sync + 'static,
{
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            modules: Vec::new(),
        }
    }

    /// Sets event subscribers for observability.
    ///
    /// Subscribers receive runtime events (stage and module lifecycle, failures)
    /// through dedicated workers with bounded queues.
    pub fn with_subscribers(mut self, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        self.subscribers = subscribers;
        self
    }

    /// Queues modules to add when the collection is built.
    pub fn with_modules(mut self, modules: impl IntoModules<C>) -> Self {
        self.modules.extend(modules.into_modules());
        self
    }

    /// Builds the collection and adds the queued modules.
    ///
    /// ### Errors
    /// [`CollectionError::DuplicateName`] if name checks are enabled and two distinct
    /// modules share a name.
    pub fn build(self) -> Result<ModuleCollection<C>, CollectionError> {
        let collection = ModuleCollection::new_internal(self.cfg, self.subscribers);
        collection.add(self.modules)?;
        Ok(collection)
    }
}
