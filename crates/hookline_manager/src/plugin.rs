//! Plugins and the declarations they contribute.
//!
//! A plugin is any `Send + Sync` object that lists its hook implementations
//! when asked. Declarations are explicit: the manager hands the plugin a
//! [`HookImpls`] collector tagged with its project name, and the plugin
//! pushes one [`ImplDef`] per implementation.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use hookline_hooks::prelude::*;
//! use hookline_manager::plugin::{HookImpls, Plugin};
//! use serde_json::json;
//!
//! struct Greeter {
//!     greeting: String,
//! }
//!
//! impl Plugin for Greeter {
//!     fn name(&self) -> Option<&str> {
//!         Some("greeter")
//!     }
//!
//!     fn hookimpls(self: Arc<Self>, impls: &mut HookImpls) {
//!         impls.plain("greet", ArgNames::new(["name"]), HookimplOpts::new(), move |args| {
//!             let name: String = args.get_as("name")?;
//!             Ok(Some(json!(format!("{} {name}", self.greeting))))
//!         });
//!     }
//! }
//! ```

use core::fmt;
use std::sync::Arc;

use downcast_rs::{DowncastSync, impl_downcast};
use hookline_hooks::args::{ArgNames, HookArgs};
use hookline_hooks::implementation::{HookImpl, HookWrapper, ImplFunction, ImplResult, PluginId};
use hookline_hooks::opts::HookimplOpts;

// ─────────────────────────────────────────────────────────────────────────────
// Plugin Trait
// ─────────────────────────────────────────────────────────────────────────────

/// An object contributing hook implementations.
///
/// Identity is the instance: registering two `Arc`s pointing at the same
/// allocation is a duplicate registration, while two instances of the same
/// type are distinct plugins.
///
/// [`hookimpls`](Self::hookimpls) receives the plugin by `Arc`, so
/// implementations can capture it and reach its state.
pub trait Plugin: DowncastSync {
    /// Name used when the caller of `register` gives none.
    ///
    /// Defaults to `None`, in which case the manager uses the plugin id.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Pushes this plugin's implementations into `impls`.
    ///
    /// Called once per registration.
    fn hookimpls(self: Arc<Self>, impls: &mut HookImpls);
}

impl_downcast!(sync Plugin);

impl fmt::Debug for dyn Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Plugin({name})"),
            None => f.write_str("Plugin(<unnamed>)"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ImplDef
// ─────────────────────────────────────────────────────────────────────────────

/// One implementation declared by a plugin, before registration.
#[derive(Debug, Clone)]
pub struct ImplDef {
    method_name: String,
    function: ImplFunction,
    argnames: ArgNames,
    opts: HookimplOpts,
    project: Option<String>,
}

impl ImplDef {
    /// Declares an implementation from its parts, options taken verbatim.
    #[must_use]
    pub fn new(
        method_name: impl Into<String>,
        function: ImplFunction,
        argnames: ArgNames,
        opts: HookimplOpts,
    ) -> Self {
        Self {
            method_name: method_name.into(),
            function,
            argnames,
            opts,
            project: None,
        }
    }

    /// Declares a plain implementation.
    pub fn plain<F>(method_name: impl Into<String>, argnames: ArgNames, function: F) -> Self
    where
        F: Fn(&HookArgs) -> ImplResult + Send + Sync + 'static,
    {
        Self::new(method_name, ImplFunction::plain(function), argnames, HookimplOpts::new())
    }

    /// Declares a hookwrapper.
    pub fn wrapper<W: HookWrapper + 'static>(
        method_name: impl Into<String>,
        argnames: ArgNames,
        wrapper: W,
    ) -> Self {
        Self::new(
            method_name,
            ImplFunction::wrapper(wrapper),
            argnames,
            HookimplOpts::new().hookwrapper(),
        )
    }

    /// Replaces the options. Wrappers keep their `hookwrapper` flag.
    #[must_use]
    pub fn with_opts(mut self, opts: HookimplOpts) -> Self {
        let hookwrapper = opts.hookwrapper || self.function.is_wrapper();
        self.opts = opts;
        self.opts.hookwrapper = hookwrapper;
        self
    }

    /// Tags the declaration with a project. Managers of other projects
    /// ignore it.
    #[must_use]
    pub fn for_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Declared method name.
    #[must_use]
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// Hook name the declaration targets.
    #[must_use]
    pub fn hook_name(&self) -> &str {
        self.opts.specname.as_deref().unwrap_or(&self.method_name)
    }

    /// The callable.
    #[must_use]
    pub fn function(&self) -> &ImplFunction {
        &self.function
    }

    /// Declared options.
    #[must_use]
    pub fn opts(&self) -> &HookimplOpts {
        &self.opts
    }

    /// Project tag, if any.
    #[must_use]
    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub(crate) fn into_hook_impl(self, plugin: PluginId, plugin_name: &str) -> HookImpl {
        HookImpl::new(
            plugin,
            plugin_name,
            self.method_name,
            self.function,
            self.argnames,
            self.opts,
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HookImpls
// ─────────────────────────────────────────────────────────────────────────────

/// Collector passed to [`Plugin::hookimpls`].
#[derive(Debug)]
pub struct HookImpls {
    project_name: String,
    defs: Vec<ImplDef>,
}

impl HookImpls {
    /// Creates an empty collector for `project_name`.
    #[must_use]
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            defs: Vec::new(),
        }
    }

    /// Project of the manager collecting the declarations.
    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Adds a declaration.
    pub fn push(&mut self, def: ImplDef) -> &mut Self {
        self.defs.push(def);
        self
    }

    /// Adds a plain implementation of `method_name`.
    pub fn plain<F>(
        &mut self,
        method_name: impl Into<String>,
        argnames: ArgNames,
        opts: HookimplOpts,
        function: F,
    ) -> &mut Self
    where
        F: Fn(&HookArgs) -> ImplResult + Send + Sync + 'static,
    {
        self.push(ImplDef::plain(method_name, argnames, function).with_opts(opts))
    }

    /// Adds a hookwrapper for `method_name`.
    pub fn wrapper<W: HookWrapper + 'static>(
        &mut self,
        method_name: impl Into<String>,
        argnames: ArgNames,
        opts: HookimplOpts,
        wrapper: W,
    ) -> &mut Self {
        self.push(ImplDef::wrapper(method_name, argnames, wrapper).with_opts(opts))
    }

    /// Number of collected declarations, including foreign ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// True if nothing was declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Declarations addressed to this collector's project, in order.
    pub(crate) fn into_matching(self) -> Vec<ImplDef> {
        let project_name = self.project_name;
        self.defs
            .into_iter()
            .filter(|def| def.project().is_none_or(|project| project == project_name))
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// FnPlugin
// ─────────────────────────────────────────────────────────────────────────────

/// A plugin assembled from closures.
///
/// ```
/// use hookline_hooks::prelude::*;
/// use hookline_manager::plugin::FnPlugin;
/// use serde_json::json;
///
/// let plugin = FnPlugin::named("answers")
///     .hook("answer", ArgNames::none(), |_| Ok(Some(json!(42))))
///     .hook_with("answer_late", ArgNames::none(), HookimplOpts::new().trylast(), |_| Ok(None));
/// assert_eq!(plugin.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FnPlugin {
    name: Option<String>,
    defs: Vec<ImplDef>,
}

impl FnPlugin {
    /// Creates an unnamed plugin.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a plugin whose canonical name is `name`.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            defs: Vec::new(),
        }
    }

    /// Adds a plain implementation with default options.
    #[must_use]
    pub fn hook<F>(self, method_name: impl Into<String>, argnames: ArgNames, function: F) -> Self
    where
        F: Fn(&HookArgs) -> ImplResult + Send + Sync + 'static,
    {
        self.def(ImplDef::plain(method_name, argnames, function))
    }

    /// Adds a plain implementation with explicit options.
    #[must_use]
    pub fn hook_with<F>(
        self,
        method_name: impl Into<String>,
        argnames: ArgNames,
        opts: HookimplOpts,
        function: F,
    ) -> Self
    where
        F: Fn(&HookArgs) -> ImplResult + Send + Sync + 'static,
    {
        self.def(ImplDef::plain(method_name, argnames, function).with_opts(opts))
    }

    /// Adds a hookwrapper.
    #[must_use]
    pub fn wrapper<W: HookWrapper + 'static>(
        self,
        method_name: impl Into<String>,
        argnames: ArgNames,
        opts: HookimplOpts,
        wrapper: W,
    ) -> Self {
        self.def(ImplDef::wrapper(method_name, argnames, wrapper).with_opts(opts))
    }

    /// Adds a prepared declaration.
    #[must_use]
    pub fn def(mut self, def: ImplDef) -> Self {
        self.defs.push(def);
        self
    }

    /// Number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    /// True if the plugin declares nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

impl Plugin for FnPlugin {
    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn hookimpls(self: Arc<Self>, impls: &mut HookImpls) {
        for def in &self.defs {
            impls.push(def.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hookline_hooks::error::BoxError;
    use hookline_hooks::implementation::FnWrapper;
    use hookline_hooks::outcome::Outcome;

    #[test]
    fn foreign_declarations_are_filtered() {
        let mut impls = HookImpls::new("app");
        impls
            .push(ImplDef::plain("mine", ArgNames::none(), |_| Ok(None)))
            .push(ImplDef::plain("tagged", ArgNames::none(), |_| Ok(None)).for_project("app"))
            .push(ImplDef::plain("foreign", ArgNames::none(), |_| Ok(None)).for_project("other"));
        assert_eq!(impls.len(), 3);

        let names: Vec<String> = impls
            .into_matching()
            .iter()
            .map(|def| def.method_name().to_string())
            .collect();
        assert_eq!(names, vec!["mine", "tagged"]);
    }

    #[test]
    fn wrapper_keeps_flag_through_with_opts() {
        let def = ImplDef::wrapper(
            "on_save",
            ArgNames::none(),
            FnWrapper::new(
                |_: &HookArgs| -> Result<(), BoxError> { Ok(()) },
                |_: &HookArgs, _: &mut Outcome| -> Result<(), BoxError> { Ok(()) },
            ),
        )
        .with_opts(HookimplOpts::new().tryfirst());
        assert!(def.opts().hookwrapper);
        assert!(def.opts().tryfirst);
    }

    #[test]
    fn hook_name_follows_specname() {
        let def = ImplDef::plain("save_v2", ArgNames::none(), |_| Ok(None))
            .with_opts(HookimplOpts::new().specname("on_save"));
        assert_eq!(def.hook_name(), "on_save");
    }

    #[test]
    fn plugins_downcast_to_concrete_type() {
        let plugin: Arc<dyn Plugin> = Arc::new(FnPlugin::named("p"));
        assert!(plugin.is::<FnPlugin>());
        let concrete = plugin.downcast_arc::<FnPlugin>().ok();
        assert_eq!(concrete.and_then(|p| p.name.clone()).as_deref(), Some("p"));
    }

    #[test]
    fn fn_plugin_pushes_every_declaration() {
        let plugin = Arc::new(
            FnPlugin::new()
                .hook("a", ArgNames::none(), |_| Ok(None))
                .hook("b", ArgNames::none(), |_| Ok(None)),
        );
        let mut impls = HookImpls::new("app");
        Arc::clone(&plugin).hookimpls(&mut impls);
        Arc::clone(&plugin).hookimpls(&mut impls);
        assert_eq!(impls.len(), 4);
        assert_eq!(plugin.name(), None);
    }
}
