//! Implementation records.
//!
//! A [`HookImpl`] binds one callable of one plugin to one hook. Records are
//! immutable once built and shared as `Arc<HookImpl>` between the hook
//! caller, derived subset callers, and monitoring code.

use core::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::args::{ArgNames, HookArgs};
use crate::error::BoxError;
use crate::opts::HookimplOpts;
use crate::outcome::Outcome;

/// Return type of a plain implementation. `Ok(None)` is the absent value.
pub type ImplResult = Result<Option<Value>, BoxError>;

/// A plain implementation callable.
pub type PlainFn = Arc<dyn Fn(&HookArgs) -> ImplResult + Send + Sync>;

// ─────────────────────────────────────────────────────────────────────────────
// PluginId
// ─────────────────────────────────────────────────────────────────────────────

/// Identity of a registered plugin instance.
///
/// Derived from the address of the plugin's `Arc` allocation, so two
/// registrations of the same instance share an id while distinct instances
/// of the same type do not. The id does not keep the plugin alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PluginId(usize);

impl PluginId {
    /// Id used for temporary implementations added by
    /// [`HookCaller::call_extra`](crate::caller::HookCaller::call_extra).
    pub const TEMPORARY: PluginId = PluginId(0);

    /// Returns the id of the instance behind `plugin`.
    #[must_use]
    pub fn of<T: ?Sized>(plugin: &Arc<T>) -> Self {
        Self(Arc::as_ptr(plugin).cast::<()>() as usize)
    }

    /// Returns the raw id value.
    #[must_use]
    pub fn get(&self) -> usize {
        self.0
    }
}

impl fmt::Display for PluginId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HookWrapper
// ─────────────────────────────────────────────────────────────────────────────

/// An implementation that runs around all plain implementations of a hook.
///
/// [`before`](Self::before) runs ahead of every plain implementation;
/// [`after`](Self::after) runs once the aggregated outcome is known, in
/// reverse order of entry. A wrapper may inspect the outcome, override it
/// with [`Outcome::force_result`], or replace it with a failure.
///
/// # Example
///
/// ```
/// use hookline_hooks::args::HookArgs;
/// use hookline_hooks::error::BoxError;
/// use hookline_hooks::implementation::HookWrapper;
/// use hookline_hooks::outcome::{HookReturn, Outcome};
///
/// struct Fallback;
///
/// impl HookWrapper for Fallback {
///     fn after(&self, _args: &HookArgs, outcome: &mut Outcome) -> Result<(), BoxError> {
///         if outcome.excinfo().is_some() {
///             outcome.force_result(HookReturn::All(vec![]));
///         }
///         Ok(())
///     }
/// }
/// ```
pub trait HookWrapper: Send + Sync {
    /// Runs before any plain implementation. An error aborts the call; the
    /// wrappers already entered still observe it.
    fn before(&self, _args: &HookArgs) -> Result<(), BoxError> {
        Ok(())
    }

    /// Runs after the plain implementations with the aggregated outcome.
    ///
    /// Returning an error replaces the outcome with that failure.
    fn after(&self, args: &HookArgs, outcome: &mut Outcome) -> Result<(), BoxError>;
}

/// A [`HookWrapper`] built from a pair of closures.
pub struct FnWrapper<B, A> {
    before: B,
    after: A,
}

impl<B, A> FnWrapper<B, A>
where
    B: Fn(&HookArgs) -> Result<(), BoxError> + Send + Sync,
    A: Fn(&HookArgs, &mut Outcome) -> Result<(), BoxError> + Send + Sync,
{
    /// Pairs an enter and an exit closure.
    pub fn new(before: B, after: A) -> Self {
        Self { before, after }
    }
}

impl<B, A> HookWrapper for FnWrapper<B, A>
where
    B: Fn(&HookArgs) -> Result<(), BoxError> + Send + Sync,
    A: Fn(&HookArgs, &mut Outcome) -> Result<(), BoxError> + Send + Sync,
{
    fn before(&self, args: &HookArgs) -> Result<(), BoxError> {
        (self.before)(args)
    }

    fn after(&self, args: &HookArgs, outcome: &mut Outcome) -> Result<(), BoxError> {
        (self.after)(args, outcome)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ImplFunction
// ─────────────────────────────────────────────────────────────────────────────

/// The callable behind an implementation record.
#[derive(Clone)]
pub enum ImplFunction {
    /// A plain implementation producing an optional value.
    Plain(PlainFn),
    /// A wrapper running around the plain implementations.
    Wrapper(Arc<dyn HookWrapper>),
}

impl ImplFunction {
    /// Wraps a closure as a plain implementation.
    pub fn plain<F>(f: F) -> Self
    where
        F: Fn(&HookArgs) -> ImplResult + Send + Sync + 'static,
    {
        Self::Plain(Arc::new(f))
    }

    /// Wraps a [`HookWrapper`].
    pub fn wrapper<W: HookWrapper + 'static>(wrapper: W) -> Self {
        Self::Wrapper(Arc::new(wrapper))
    }

    /// Returns true for wrappers.
    #[must_use]
    pub fn is_wrapper(&self) -> bool {
        matches!(self, ImplFunction::Wrapper(_))
    }
}

impl fmt::Debug for ImplFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImplFunction::Plain(_) => f.write_str("Plain(<fn>)"),
            ImplFunction::Wrapper(_) => f.write_str("Wrapper(<wrapper>)"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HookImpl
// ─────────────────────────────────────────────────────────────────────────────

/// One registered implementation of one hook.
#[derive(Debug, Clone)]
pub struct HookImpl {
    plugin: PluginId,
    plugin_name: String,
    method_name: String,
    function: ImplFunction,
    argnames: ArgNames,
    opts: HookimplOpts,
}

impl HookImpl {
    /// Builds a record for `plugin`'s method `method_name`.
    ///
    /// The `hookwrapper` flag is taken from the function kind.
    #[must_use]
    pub fn new(
        plugin: PluginId,
        plugin_name: impl Into<String>,
        method_name: impl Into<String>,
        function: ImplFunction,
        argnames: ArgNames,
        mut opts: HookimplOpts,
    ) -> Self {
        opts.hookwrapper = function.is_wrapper();
        Self {
            plugin,
            plugin_name: plugin_name.into(),
            method_name: method_name.into(),
            function,
            argnames,
            opts,
        }
    }

    /// Builds a plugin-less plain implementation for a single call.
    #[must_use]
    pub fn temporary(function: PlainFn, argnames: ArgNames) -> Self {
        Self::new(
            PluginId::TEMPORARY,
            "<temp>",
            "<temp>",
            ImplFunction::Plain(function),
            argnames,
            HookimplOpts::default(),
        )
    }

    /// Identity of the owning plugin.
    #[must_use]
    pub fn plugin(&self) -> PluginId {
        self.plugin
    }

    /// Name the owning plugin was registered under.
    #[must_use]
    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    /// Name of the method as declared by the plugin.
    #[must_use]
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Hook name this record is registered under.
    #[must_use]
    pub fn hook_name(&self) -> &str {
        self.opts.specname.as_deref().unwrap_or(&self.method_name)
    }

    /// The callable.
    #[must_use]
    pub fn function(&self) -> &ImplFunction {
        &self.function
    }

    /// Declared parameter names.
    #[must_use]
    pub fn argnames(&self) -> &ArgNames {
        &self.argnames
    }

    /// The options the record was built with.
    #[must_use]
    pub fn opts(&self) -> &HookimplOpts {
        &self.opts
    }

    /// True for wrapper implementations.
    #[must_use]
    pub fn hookwrapper(&self) -> bool {
        self.opts.hookwrapper
    }

    /// True if a missing specification is tolerated.
    #[must_use]
    pub fn optionalhook(&self) -> bool {
        self.opts.optionalhook
    }

    /// True for first-tier implementations.
    #[must_use]
    pub fn tryfirst(&self) -> bool {
        self.opts.tryfirst
    }

    /// True for last-tier implementations.
    #[must_use]
    pub fn trylast(&self) -> bool {
        self.opts.trylast
    }

    /// The call signature, e.g. `on_save(path, force=...)`.
    #[must_use]
    pub fn signature(&self) -> String {
        self.argnames.format_def(&self.method_name)
    }
}
