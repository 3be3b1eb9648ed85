//! Error types used by module definitions, planning and initialization.
//!
//! This module defines the error enums of the crate:
//!
//! - [`ValidationError`]: a module definition with an absent dependency entry.
//! - [`PlanError`]: no valid staging exists for the dependency graph.
//! - [`CollectionError`]: a collection rejected an `add` call.
//! - [`InitError`]: raised by an individual module's init action.
//! - [`RuntimeError`]: the outcome of [`ModuleCollection::init`](crate::ModuleCollection::init).
//!
//! Most types provide `as_label` for logs; [`InitError`] also has `as_message`.
//! The init-path errors are `Clone` because a single outcome is shared by every caller of `init`.

use std::fmt;

use thiserror::Error;

/// Which dependency list of a module definition an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyList {
    /// Modules that must finish before this one starts.
    Needs,
    /// Modules that must start only after this one finishes.
    NeededBy,
}

impl DependencyList {
    fn noun(self) -> &'static str {
        match self {
            DependencyList::Needs => "dependency",
            DependencyList::NeededBy => "dependant",
        }
    }
}

impl fmt::Display for DependencyList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyList::Needs => f.write_str("needs"),
            DependencyList::NeededBy => f.write_str("needed_by"),
        }
    }
}

/// # Invalid module definition.
///
/// Raised by [`Module::try_new`](crate::Module::try_new) when an entry of `needs` or
/// `needed_by` is absent. Not retryable: the definition itself must be fixed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("module {module} has null {} (number {index})", .list.noun())]
pub struct ValidationError {
    /// Name of the module being defined.
    pub module: String,
    /// The list holding the absent entry.
    pub list: DependencyList,
    /// 1-based position of the absent entry.
    pub index: usize,
}

impl ValidationError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self.list {
            DependencyList::Needs => "module_null_dependency",
            DependencyList::NeededBy => "module_null_dependant",
        }
    }
}

/// # Errors produced by the stage planner.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlanError {
    /// The dependency graph contains a cycle.
    ///
    /// `path` is closed (first == last); every module in it must start after the previous one.
    #[error("found circular reference {}", .path.join(" -> "))]
    Cycle {
        /// Names along the cycle.
        path: Vec<String>,
    },
}

impl PlanError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use initvisor::PlanError;
    ///
    /// let err = PlanError::Cycle { path: vec!["a".into(), "b".into(), "a".into()] };
    /// assert_eq!(err.as_label(), "plan_cycle");
    /// assert_eq!(err.to_string(), "found circular reference a -> b -> a");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            PlanError::Cycle { .. } => "plan_cycle",
        }
    }
}

/// # Errors produced when adding modules to a collection.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CollectionError {
    /// Two distinct modules share a name within the same scope.
    #[error("duplicate module name '{name}'")]
    DuplicateName {
        /// The conflicting name.
        name: String,
    },

    /// Modules cannot be added once initialization has started.
    #[error("cannot add modules after init has started")]
    AlreadyStarted,
}

impl CollectionError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            CollectionError::DuplicateName { .. } => "collection_duplicate_name",
            CollectionError::AlreadyStarted => "collection_already_started",
        }
    }
}

/// # Errors produced by a module's init action.
///
/// Returned by [`Init::init`](crate::Init::init) implementations and passed through
/// [`RuntimeError::ModuleFailed`] unaltered.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InitError {
    /// Initialization failed.
    #[error("initialization failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The init action panicked.
    #[error("init action panicked: {info}")]
    Panicked {
        /// Panic payload, if it was a string.
        info: String,
    },
}

impl InitError {
    /// Builds [`InitError::Fail`] from anything printable.
    ///
    /// # Example
    /// ```
    /// use initvisor::InitError;
    ///
    /// let err = InitError::fail("connection refused");
    /// assert_eq!(err.as_label(), "init_failed");
    /// assert_eq!(err.to_string(), "initialization failed: connection refused");
    /// ```
    pub fn fail(error: impl fmt::Display) -> Self {
        InitError::Fail {
            error: error.to_string(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            InitError::Fail { .. } => "init_failed",
            InitError::Panicked { .. } => "init_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            InitError::Fail { error } => format!("error: {error}"),
            InitError::Panicked { info } => format!("panic: {info}"),
        }
    }
}

/// # Outcome of a failed collection initialization.
///
/// Every caller of [`ModuleCollection::init`](crate::ModuleCollection::init) observes the same value.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    /// No stage plan could be computed.
    #[error(transparent)]
    Plan(#[from] PlanError),

    /// A module's init action failed; later stages were not started.
    #[error("module '{module}' failed in stage {stage}: {source}")]
    ModuleFailed {
        /// Name of the failing module.
        module: String,
        /// 1-based stage index.
        stage: usize,
        /// The action's own error.
        #[source]
        source: InitError,
    },

    /// The task driving the stages ended abnormally (runtime shutdown or panic).
    #[error("initialization aborted: {reason}")]
    Aborted {
        /// Join error description.
        reason: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::Plan(e) => e.as_label(),
            RuntimeError::ModuleFailed { .. } => "runtime_module_failed",
            RuntimeError::Aborted { .. } => "runtime_aborted",
        }
    }

    /// Returns the failing module's error, if any.
    pub fn init_error(&self) -> Option<&InitError> {
        match self {
            RuntimeError::ModuleFailed { source, .. } => Some(source),
            RuntimeError::Plan(_) | RuntimeError::Aborted { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages_name_the_list() {
        let needs = ValidationError {
            module: "d".into(),
            list: DependencyList::Needs,
            index: 2,
        };
        assert_eq!(needs.to_string(), "module d has null dependency (number 2)");
        assert_eq!(needs.as_label(), "module_null_dependency");

        let needed_by = ValidationError {
            module: "d".into(),
            list: DependencyList::NeededBy,
            index: 1,
        };
        assert_eq!(needed_by.to_string(), "module d has null dependant (number 1)");
    }

    #[test]
    fn test_module_failed_keeps_source() {
        let err = RuntimeError::ModuleFailed {
            module: "db".into(),
            stage: 1,
            source: InitError::fail("boom"),
        };
        assert_eq!(err.init_error(), Some(&InitError::fail("boom")));
        assert_eq!(
            err.to_string(),
            "module 'db' failed in stage 1: initialization failed: boom"
        );
    }
}
