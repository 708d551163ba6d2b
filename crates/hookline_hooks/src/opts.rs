//! Option structs attached to hook implementations and specifications.
//!
//! These replace marker attributes: a plugin describes each implementation
//! with a [`HookimplOpts`], a host describes each hook contract with a
//! [`HookspecOpts`].

use serde::{Deserialize, Serialize};

use crate::error::SpecError;

/// Behavioral flags of a hook implementation.
///
/// # Example
///
/// ```
/// use hookline_hooks::opts::HookimplOpts;
///
/// let opts = HookimplOpts::new().tryfirst().specname("on_save");
/// assert!(opts.tryfirst);
/// assert_eq!(opts.specname.as_deref(), Some("on_save"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookimplOpts {
    /// The implementation wraps all plain implementations of the hook.
    pub hookwrapper: bool,
    /// Tolerate the absence of a matching specification.
    pub optionalhook: bool,
    /// Run as early as possible.
    pub tryfirst: bool,
    /// Run as late as possible.
    pub trylast: bool,
    /// Register under this hook name instead of the method name.
    pub specname: Option<String>,
}

impl HookimplOpts {
    /// Default options: a plain implementation in the middle tier.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the implementation as a hookwrapper.
    #[must_use]
    pub fn hookwrapper(mut self) -> Self {
        self.hookwrapper = true;
        self
    }

    /// Marks the implementation as optional.
    #[must_use]
    pub fn optionalhook(mut self) -> Self {
        self.optionalhook = true;
        self
    }

    /// Moves the implementation to the first tier.
    #[must_use]
    pub fn tryfirst(mut self) -> Self {
        self.tryfirst = true;
        self
    }

    /// Moves the implementation to the last tier.
    #[must_use]
    pub fn trylast(mut self) -> Self {
        self.trylast = true;
        self
    }

    /// Overrides the hook name the implementation is registered under.
    #[must_use]
    pub fn specname(mut self, name: impl Into<String>) -> Self {
        self.specname = Some(name.into());
        self
    }
}

/// Declared behavior of a hook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HookspecOpts {
    /// Stop at the first non-absent result and return it alone.
    pub firstresult: bool,
    /// Remember calls and replay them to implementations registered later.
    pub historic: bool,
    /// Warning emitted whenever an implementation is verified against this spec.
    pub warn_on_impl: Option<String>,
}

impl HookspecOpts {
    /// Default options: collect all results, no history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables firstresult aggregation.
    #[must_use]
    pub fn firstresult(mut self) -> Self {
        self.firstresult = true;
        self
    }

    /// Enables historic replay.
    #[must_use]
    pub fn historic(mut self) -> Self {
        self.historic = true;
        self
    }

    /// Sets the warning emitted for every implementation of this hook.
    #[must_use]
    pub fn warn_on_impl(mut self, warning: impl Into<String>) -> Self {
        self.warn_on_impl = Some(warning.into());
        self
    }

    /// Checks that the options can apply to a hook called `hook`.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::HistoricFirstresult`] if both flags are set.
    pub fn validate(&self, hook: &str) -> Result<(), SpecError> {
        if self.historic && self.firstresult {
            return Err(SpecError::HistoricFirstresult(hook.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impl_opts_default_is_plain() {
        let opts = HookimplOpts::default();
        assert!(!opts.hookwrapper);
        assert!(!opts.optionalhook);
        assert!(!opts.tryfirst);
        assert!(!opts.trylast);
        assert!(opts.specname.is_none());
    }

    #[test]
    fn impl_opts_deserialize_partial() {
        let opts: HookimplOpts =
            serde_json::from_str(r#"{"trylast": true, "specname": "on_load"}"#).unwrap();
        assert!(opts.trylast);
        assert_eq!(opts.specname.as_deref(), Some("on_load"));
        assert!(!opts.tryfirst);
    }

    #[test]
    fn spec_opts_reject_historic_firstresult() {
        let opts = HookspecOpts::new().historic().firstresult();
        assert_eq!(
            opts.validate("configure"),
            Err(SpecError::HistoricFirstresult("configure".into()))
        );
        assert!(HookspecOpts::new().historic().validate("configure").is_ok());
    }
}
