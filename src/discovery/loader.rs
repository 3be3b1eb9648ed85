use std::sync::Arc;

use super::{ModuleMap, Resolve};
use crate::error::CollectionError;
use crate::modules::ModuleRef;

type KeyFilter = Arc<dyn Fn(&str) -> bool + Send + Sync>;
type PostResolve<C> = Arc<dyn Fn(&ModuleRef<C>, &str) + Send + Sync>;

/// Loads modules from keyed units.
///
/// Units whose key is rejected by the filter are skipped, as are units for which the
/// resolver returns `None`. The post-resolve hook sees every resolved module together
/// with its unit key before it is stored.
///
/// ### Example
/// ```rust
/// use initvisor::{Discovery, Module, ModuleRef};
///
/// let load = |unit: &&'static str| -> Option<ModuleRef<()>> {
///     Some(Module::builder(*unit).noop())
/// };
/// let modules = Discovery::new(load)
///     .with_filter(|key| key.ends_with(".mod"))
///     .load([
///         ("db.mod".to_string(), "db"),
///         ("README".to_string(), "readme"),
///     ])
///     .unwrap();
///
/// assert_eq!(modules.names().collect::<Vec<_>>(), ["db"]);
/// ```
pub struct Discovery<U, C> {
    resolve: Arc<dyn Resolve<U, C>>,
    filter: Option<KeyFilter>,
    post_resolve: Option<PostResolve<C>>,
}

impl<U, C> Discovery<U, C> {
    /// Creates a loader around a resolver; no filter, no hook.
    pub fn new(resolve: impl Resolve<U, C> + 'static) -> Self {
        Self {
            resolve: Arc::new(resolve),
            filter: None,
            post_resolve: None,
        }
    }

    /// Only units whose key satisfies `filter` are resolved.
    pub fn with_filter(mut self, filter: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Calls `hook` with every resolved module and its unit key.
    pub fn with_post_resolve(
        mut self,
        hook: impl Fn(&ModuleRef<C>, &str) + Send + Sync + 'static,
    ) -> Self {
        self.post_resolve = Some(Arc::new(hook));
        self
    }

    /// Resolves `units` into a fresh map.
    ///
    /// ### Errors
    /// [`CollectionError::DuplicateName`] if two resolved modules share a name.
    pub fn load(
        &self,
        units: impl IntoIterator<Item = (String, U)>,
    ) -> Result<ModuleMap<C>, CollectionError> {
        let mut modules = ModuleMap::new();
        self.load_into(units, &mut modules)?;
        Ok(modules)
    }

    /// Resolves `units` into an existing map.
    ///
    /// Modules resolved before a duplicate is met stay in `modules`.
    ///
    /// ### Errors
    /// [`CollectionError::DuplicateName`] if a resolved module's name is already present.
    pub fn load_into(
        &self,
        units: impl IntoIterator<Item = (String, U)>,
        modules: &mut ModuleMap<C>,
    ) -> Result<(), CollectionError> {
        for (key, unit) in units {
            if let Some(filter) = &self.filter {
                if !filter(&key) {
                    continue;
                }
            }
            let Some(module) = self.resolve.resolve(&unit) else {
                continue;
            };
            if let Some(hook) = &self.post_resolve {
                hook(&module, &key);
            }
            modules.insert(module)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::core::ModuleCollection;
    use crate::modules::Module;

    /// A unit either defines a module (by name) or nothing.
    fn resolver(unit: &Option<&'static str>) -> Option<ModuleRef<()>> {
        unit.map(|name| Module::builder(name).noop())
    }

    fn units(list: &[(&str, Option<&'static str>)]) -> Vec<(String, Option<&'static str>)> {
        list.iter().map(|(k, u)| (k.to_string(), *u)).collect()
    }

    #[test]
    fn test_filter_and_empty_units_are_skipped() {
        let discovery = Discovery::new(resolver).with_filter(|key| key.ends_with(".js"));
        let modules = discovery
            .load(units(&[
                ("a.js", Some("a")),
                ("b.txt", Some("b")),
                ("helpers.js", None),
                ("c.js", Some("c")),
            ]))
            .unwrap();

        assert_eq!(modules.names().collect::<Vec<_>>(), ["a", "c"]);
    }

    #[test]
    fn test_duplicate_names_are_rejected() {
        let discovery = Discovery::new(resolver);
        let err = discovery
            .load(units(&[("one.js", Some("db")), ("two.js", Some("db"))]))
            .err();

        assert_eq!(
            err,
            Some(CollectionError::DuplicateName {
                name: "db".to_string()
            })
        );
    }

    #[test]
    fn test_load_into_accumulates() {
        let discovery = Discovery::new(resolver);
        let mut modules = ModuleMap::new();
        discovery
            .load_into(units(&[("x.js", Some("x"))]), &mut modules)
            .unwrap();
        discovery
            .load_into(units(&[("y.js", Some("y"))]), &mut modules)
            .unwrap();

        assert_eq!(modules.len(), 2);
        assert!(modules.get("x").is_some());
        assert_eq!(
            discovery.load_into(units(&[("x2.js", Some("x"))]), &mut modules),
            Err(CollectionError::DuplicateName {
                name: "x".to_string()
            })
        );
    }

    #[test]
    fn test_post_resolve_sees_module_and_key() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let discovery = Discovery::new(resolver).with_post_resolve(move |module, key| {
            sink.lock().unwrap().push(format!("{module}@{key}"));
        });

        discovery
            .load(units(&[("a.js", Some("a")), ("none.js", None)]))
            .unwrap();
        assert_eq!(*seen.lock().unwrap(), ["a@a.js"]);
    }

    #[tokio::test]
    async fn test_loaded_map_feeds_collection() {
        let discovery = Discovery::new(resolver);
        let modules = discovery
            .load(units(&[("a.js", Some("a")), ("b.js", Some("b"))]))
            .unwrap();

        let collection = ModuleCollection::new(&modules).unwrap();
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.init(()).await, Ok(()));
    }
}
