//! Specification records.

use crate::args::ArgNames;
use crate::error::SpecError;
use crate::opts::HookspecOpts;

/// The declared contract of a hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookSpec {
    namespace: String,
    name: String,
    argnames: ArgNames,
    opts: HookspecOpts,
}

impl HookSpec {
    /// Builds a specification declared by `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::HistoricFirstresult`] for contradictory options.
    pub fn new(
        namespace: impl Into<String>,
        name: impl Into<String>,
        argnames: ArgNames,
        opts: HookspecOpts,
    ) -> Result<Self, SpecError> {
        let name = name.into();
        opts.validate(&name)?;
        Ok(Self {
            namespace: namespace.into(),
            name,
            argnames,
            opts,
        })
    }

    /// Name of the namespace that declared the hook.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Hook name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared parameter names.
    #[must_use]
    pub fn argnames(&self) -> &ArgNames {
        &self.argnames
    }

    /// Declared options.
    #[must_use]
    pub fn opts(&self) -> &HookspecOpts {
        &self.opts
    }

    /// True if calls stop at the first non-absent result.
    #[must_use]
    pub fn firstresult(&self) -> bool {
        self.opts.firstresult
    }

    /// True if calls are recorded and replayed.
    #[must_use]
    pub fn historic(&self) -> bool {
        self.opts.historic
    }

    /// Warning emitted for every verified implementation.
    #[must_use]
    pub fn warn_on_impl(&self) -> Option<&str> {
        self.opts.warn_on_impl.as_deref()
    }

    /// Returns the names an implementation requires that this spec does not
    /// require, in the implementation's order.
    ///
    /// A name the spec only defaults may be omitted by callers, so requiring
    /// it is reported too.
    #[must_use]
    pub fn undeclared<'a>(&self, implementation: &'a ArgNames) -> Vec<&'a str> {
        implementation
            .required
            .iter()
            .filter(|name| !self.argnames.required.contains(*name))
            .map(String::as_str)
            .collect()
    }
}
