//! # Collection configuration.
//!
//! Provides [`Config`], the settings of a [`ModuleCollection`](crate::ModuleCollection).
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1 by the bus

/// Configuration of a module collection.
///
/// ## Field semantics
/// - `bus_capacity`: Event bus ring buffer size (min 1; clamped by Bus)
/// - `reject_duplicate_names`: refuse two distinct modules sharing a name
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Receivers lagging more than `bus_capacity` events observe `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Whether `add` rejects a module whose name is already taken by a different module.
    ///
    /// The check covers modules reached through `needs`/`needed_by` as well.
    pub reject_duplicate_names: bool,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `reject_duplicate_names = true`
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            reject_duplicate_names: true,
        }
    }
}
