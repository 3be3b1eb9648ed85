use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::core::IntoModules;
use crate::error::CollectionError;
use crate::modules::ModuleRef;

/// Modules keyed by unique name, iterated in name order.
pub struct ModuleMap<C> {
    inner: BTreeMap<String, ModuleRef<C>>,
}

impl<C> Default for ModuleMap<C> {
    fn default() -> Self {
        Self {
            inner: BTreeMap::new(),
        }
    }
}

impl<C> ModuleMap<C> {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `module` under its name.
    ///
    /// ### Errors
    /// [`CollectionError::DuplicateName`] if the name is already present.
    pub fn insert(&mut self, module: ModuleRef<C>) -> Result<(), CollectionError> {
        match self.inner.entry(module.name().to_string()) {
            Entry::Occupied(e) => Err(CollectionError::DuplicateName {
                name: e.key().clone(),
            }),
            Entry::Vacant(e) => {
                e.insert(module);
                Ok(())
            }
        }
    }

    /// Returns the module named `name`.
    pub fn get(&self, name: &str) -> Option<&ModuleRef<C>> {
        self.inner.get(name)
    }

    /// Number of modules.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Module names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.inner.keys().map(String::as_str)
    }

    /// Modules in name order.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleRef<C>> + '_ {
        self.inner.values()
    }
}

impl<C> IntoModules<C> for ModuleMap<C> {
    fn into_modules(self) -> Vec<ModuleRef<C>> {
        self.inner.into_values().collect()
    }
}

impl<C> IntoModules<C> for &ModuleMap<C> {
    fn into_modules(self) -> Vec<ModuleRef<C>> {
        self.inner.values().cloned().collect()
    }
}
