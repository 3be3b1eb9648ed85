use crate::modules::ModuleRef;

/// Extracts the module defined by a unit, if it defines one.
///
/// Implemented for every `Fn(&U) -> Option<ModuleRef<C>>`.
pub trait Resolve<U, C>: Send + Sync {
    /// Returns the unit's module, or `None` if the unit defines none.
    fn resolve(&self, unit: &U) -> Option<ModuleRef<C>>;
}

impl<U, C, F> Resolve<U, C> for F
where
    F: Fn(&U) -> Option<ModuleRef<C>> + Send + Sync,
{
    fn resolve(&self, unit: &U) -> Option<ModuleRef<C>> {
        self(unit)
    }
}
