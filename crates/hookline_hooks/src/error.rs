//! Error types raised while calling hooks.

use std::sync::Arc;

/// Boxed error returned by hook implementations and wrappers.
pub type BoxError = Box<dyn core::error::Error + Send + Sync>;

/// Errors that can surface from a hook call.
///
/// Every failure raised during dispatch is carried through the
/// [`Outcome`](crate::outcome::Outcome) of the call, so hookwrappers observe
/// it before it reaches the caller.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CallError {
    /// The call did not provide an argument an implementation requires.
    #[error("hook call must provide argument '{argument}'")]
    MissingArgument {
        /// The missing argument name.
        argument: String,
    },

    /// An argument was present but could not be decoded into the requested type.
    #[error("argument '{argument}' has an unexpected shape: {reason}")]
    InvalidArgument {
        /// The argument name.
        argument: String,
        /// Decoder message.
        reason: String,
    },

    /// An implementation or wrapper failed.
    #[error("plugin '{plugin}' failed in hook '{hook}': {source}")]
    Failed {
        /// Name of the plugin owning the failing implementation.
        plugin: String,
        /// The hook being called.
        hook: String,
        /// The error raised by the implementation.
        #[source]
        source: Arc<dyn core::error::Error + Send + Sync>,
    },

    /// Historic hooks can only be invoked through `call_historic`.
    #[error("cannot directly call historic hook '{0}', use call_historic instead")]
    HistoricCall(String),

    /// `call_historic` was used on a hook without a historic specification.
    #[error("hook '{0}' is not historic")]
    NotHistoric(String),

    /// A failure injected by a hookwrapper or monitor without an originating plugin.
    #[error("{0}")]
    Custom(String),
}

impl CallError {
    /// Creates a [`Failed`](Self::Failed) error for the given plugin and hook.
    pub fn failed(plugin: impl Into<String>, hook: impl Into<String>, source: BoxError) -> Self {
        Self::Failed {
            plugin: plugin.into(),
            hook: hook.into(),
            source: Arc::from(source),
        }
    }

    /// Creates a [`Custom`](Self::Custom) error.
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    /// Returns the name of the plugin that raised the failure, if any.
    #[must_use]
    pub fn plugin(&self) -> Option<&str> {
        match self {
            CallError::Failed { plugin, .. } => Some(plugin),
            _ => None,
        }
    }
}

/// Errors in a hook specification declaration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpecError {
    /// A hook cannot be both historic and firstresult.
    #[error("cannot have a historic firstresult hook: '{0}'")]
    HistoricFirstresult(String),

    /// The hook caller is already bound to a specification.
    #[error("hook '{0}' already has a specification")]
    AlreadySpecified(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_reports_plugin_and_hook() {
        let err = CallError::failed("audit", "on_save", "disk full".into());
        assert_eq!(err.plugin(), Some("audit"));
        assert_eq!(
            err.to_string(),
            "plugin 'audit' failed in hook 'on_save': disk full"
        );
    }

    #[test]
    fn failed_exposes_source() {
        use core::error::Error as _;

        let err = CallError::failed("audit", "on_save", "disk full".into());
        let source = err.source().expect("source should be set");
        assert_eq!(source.to_string(), "disk full");
    }

    #[test]
    fn custom_has_no_plugin() {
        let err = CallError::custom("replaced by wrapper");
        assert!(err.plugin().is_none());
        assert_eq!(err.to_string(), "replaced by wrapper");
    }
}
