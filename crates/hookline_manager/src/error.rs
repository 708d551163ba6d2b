//! Error types for plugin management.

use std::sync::Arc;

use hookline_hooks::error::{BoxError, CallError, SpecError};
use thiserror::Error;

/// A plugin's implementation does not fit the hook it targets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PluginValidationError {
    /// Historic hooks cannot be wrapped.
    #[error("plugin '{plugin}': hook '{hook}' is historic and cannot have hookwrappers")]
    HistoricWrapper {
        /// Offending plugin.
        plugin: String,
        /// Hook name.
        hook: String,
    },

    /// The implementation requires names the specification does not declare.
    #[error(
        "plugin '{plugin}' for hook '{hook}'\nhookimpl definition: {signature}\n\
         argument(s) {arguments:?} are declared in the hookimpl but can not be found in the hookspec"
    )]
    ArgumentsNotInSpec {
        /// Offending plugin.
        plugin: String,
        /// Hook name.
        hook: String,
        /// Rendered implementation signature.
        signature: String,
        /// The undeclared names.
        arguments: Vec<String>,
    },

    /// An implementation asked for both `tryfirst` and `trylast`.
    #[error("plugin '{plugin}': hookimpl '{method}' cannot be both tryfirst and trylast")]
    ConflictingOrder {
        /// Offending plugin.
        plugin: String,
        /// Method name.
        method: String,
    },

    /// The `hookwrapper` flag was set on a plain function.
    #[error("plugin '{plugin}': hookimpl '{method}' is flagged as hookwrapper but is a plain function")]
    WrapperMismatch {
        /// Offending plugin.
        plugin: String,
        /// Method name.
        method: String,
    },

    /// A non-optional implementation has no specification.
    #[error("unknown hook '{hook}' in plugin '{plugin}'")]
    UnknownHook {
        /// Offending plugin.
        plugin: String,
        /// Hook name.
        hook: String,
    },
}

impl PluginValidationError {
    /// Name of the plugin that failed validation.
    #[must_use]
    pub fn plugin(&self) -> &str {
        match self {
            PluginValidationError::HistoricWrapper { plugin, .. }
            | PluginValidationError::ArgumentsNotInSpec { plugin, .. }
            | PluginValidationError::ConflictingOrder { plugin, .. }
            | PluginValidationError::WrapperMismatch { plugin, .. }
            | PluginValidationError::UnknownHook { plugin, .. } => plugin,
        }
    }
}

/// Errors returned by [`PluginManager`](crate::manager::PluginManager) operations.
#[derive(Debug, Clone, Error)]
pub enum ManagerError {
    /// The name or the plugin object is already registered.
    #[error("plugin already registered: {name}")]
    AlreadyRegistered {
        /// The conflicting name.
        name: String,
    },

    /// Neither the plugin nor the name is known.
    #[error("plugin is not registered: {0}")]
    NotRegistered(String),

    /// A specification namespace contained no spec for this project.
    #[error("did not find any '{project}' hooks in namespace '{namespace}'")]
    NoHookSpecs {
        /// Namespace name.
        namespace: String,
        /// Project the manager filters on.
        project: String,
    },

    /// A hook already has a specification.
    #[error("hook '{0}' already has a specification")]
    SpecAlreadyDefined(String),

    /// A specification declaration is contradictory.
    #[error(transparent)]
    InvalidSpec(#[from] SpecError),

    /// No hook caller exists under that name.
    #[error("unknown hook '{0}'")]
    UnknownHook(String),

    /// An implementation failed validation.
    #[error(transparent)]
    Validation(#[from] PluginValidationError),

    /// A call failed, e.g. while replaying history to a new implementation.
    #[error(transparent)]
    Call(#[from] CallError),

    /// An entry point could not be loaded.
    #[error("failed to load entry point '{name}' of group '{group}': {source}")]
    EntryPointLoad {
        /// Entry-point name.
        name: String,
        /// Entry-point group.
        group: String,
        /// Loader error.
        #[source]
        source: Arc<dyn core::error::Error + Send + Sync>,
    },
}

impl ManagerError {
    /// Creates an [`EntryPointLoad`](Self::EntryPointLoad) error.
    pub fn entry_point_load(name: impl Into<String>, group: impl Into<String>, source: BoxError) -> Self {
        Self::EntryPointLoad {
            name: name.into(),
            group: group.into(),
            source: Arc::from(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arguments_not_in_spec_lists_signature() {
        let err = PluginValidationError::ArgumentsNotInSpec {
            plugin: "audit".into(),
            hook: "on_save".into(),
            signature: "on_save(path, mode)".into(),
            arguments: vec!["mode".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("hookimpl definition: on_save(path, mode)"));
        assert!(msg.contains("[\"mode\"]"));
        assert_eq!(err.plugin(), "audit");
    }

    #[test]
    fn validation_converts_into_manager_error() {
        let err: ManagerError = PluginValidationError::UnknownHook {
            plugin: "p".into(),
            hook: "h".into(),
        }
        .into();
        assert!(matches!(err, ManagerError::Validation(_)));
        assert_eq!(err.to_string(), "unknown hook 'h' in plugin 'p'");
    }
}
