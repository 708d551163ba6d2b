//! The plugin manager.
//!
//! [`PluginManager`] is the registry tying plugins, specifications, and hook
//! callers together. It owns the hook relay (one [`HookCaller`] per hook
//! name, created on first use), validates implementations against
//! specifications, and exposes the monitoring and tracing entry points.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use hookline_hooks::prelude::*;
//! use hookline_manager::manager::PluginManager;
//! use hookline_manager::plugin::FnPlugin;
//! use hookline_manager::specs::SpecNamespace;
//! use serde_json::json;
//!
//! let mut pm = PluginManager::new("app");
//! pm.add_hookspecs(&SpecNamespace::new("AppSpecs").hook(
//!     "double",
//!     ArgNames::new(["x"]),
//!     HookspecOpts::new(),
//! ))?;
//!
//! let plugin = FnPlugin::named("doubler").hook("double", ArgNames::new(["x"]), |args| {
//!     let x: i64 = args.get_as("x")?;
//!     Ok(Some(json!(x * 2)))
//! });
//! pm.register(Arc::new(plugin), None)?;
//!
//! let hook = pm.hook("double").expect("hook exists");
//! let result = hook.call(&HookArgs::new().with("x", 21))?;
//! assert_eq!(result.into_vec(), vec![json!(42)]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use core::fmt;
use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use hookline_hooks::args::HookArgs;
use hookline_hooks::caller::{HookCaller, HookExecHandle, new_hookexec_handle};
use hookline_hooks::implementation::{HookImpl, PluginId};
use hookline_hooks::outcome::Outcome;
use hookline_hooks::spec::HookSpec;
use indexmap::IndexMap;
use tracing::debug;

use crate::entrypoints::{DistInfo, EntryPointSource};
use crate::error::{ManagerError, PluginValidationError};
use crate::monitor::{self, HookcallMonitor};
use crate::plugin::{HookImpls, ImplDef, Plugin};
use crate::specs::SpecNamespace;
use crate::tracer::{TagTracer, TagTracerSub};
use crate::validation::{self, ImplWarning};

// ─────────────────────────────────────────────────────────────────────────────
// PluginEntry
// ─────────────────────────────────────────────────────────────────────────────

struct PluginEntry {
    plugin: Arc<dyn Plugin>,
    hookcallers: Vec<Arc<HookCaller>>,
}

impl PluginEntry {
    fn track(&mut self, caller: &Arc<HookCaller>) {
        if !self.hookcallers.iter().any(|known| Arc::ptr_eq(known, caller)) {
            self.hookcallers.push(Arc::clone(caller));
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PluginManager
// ─────────────────────────────────────────────────────────────────────────────

/// Registry of plugins and hooks for one project.
///
/// Mutation takes `&mut self`; hook callers handed out by [`hook`](Self::hook)
/// are shared and may be called while the manager is borrowed elsewhere.
pub struct PluginManager {
    project_name: String,
    name2plugin: IndexMap<String, Option<Arc<dyn Plugin>>>,
    plugins: HashMap<PluginId, PluginEntry>,
    plugin_distinfo: Vec<(Arc<dyn Plugin>, DistInfo)>,
    hook_relay: IndexMap<String, Arc<HookCaller>>,
    hookexec: HookExecHandle,
    trace: TagTracerSub,
    warnings: Vec<ImplWarning>,
}

impl PluginManager {
    /// Creates an empty manager. `project_name` selects which tagged
    /// implementation and spec declarations this manager accepts.
    #[must_use]
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            name2plugin: IndexMap::new(),
            plugins: HashMap::new(),
            plugin_distinfo: Vec::new(),
            hook_relay: IndexMap::new(),
            hookexec: new_hookexec_handle(),
            trace: TagTracer::new().get("pluginmanage"),
            warnings: Vec::new(),
        }
    }

    /// The project name.
    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// The `pluginmanage` tracer; its root is shared with [`enable_tracing`](Self::enable_tracing).
    #[must_use]
    pub fn trace(&self) -> &TagTracerSub {
        &self.trace
    }

    /// Warnings raised by `warn_on_impl` specs so far, oldest first.
    #[must_use]
    pub fn warnings(&self) -> &[ImplWarning] {
        &self.warnings
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Registration
    // ─────────────────────────────────────────────────────────────────────────

    /// Registers `plugin` and its implementations.
    ///
    /// Returns the name it was registered under, or `None` if that name is
    /// blocked. Without an explicit `name`, the canonical name is used.
    ///
    /// Each implementation is validated against its hook's spec if one is
    /// known, and historic calls are replayed to it before insertion. On
    /// failure every change made by this call is undone; effects of
    /// replayed calls are not.
    ///
    /// # Errors
    ///
    /// - [`ManagerError::AlreadyRegistered`] if the name or the instance is taken
    /// - [`ManagerError::Validation`] if an implementation is rejected
    /// - [`ManagerError::Call`] if a history replay fails
    pub fn register(
        &mut self,
        plugin: Arc<dyn Plugin>,
        name: Option<&str>,
    ) -> Result<Option<String>, ManagerError> {
        let id = PluginId::of(&plugin);
        let plugin_name = match name {
            Some(name) => name.to_string(),
            None => self.get_canonical_name(&plugin),
        };

        if let Some(existing) = self.name2plugin.get(&plugin_name) {
            if existing.is_none() {
                debug!(plugin = %plugin_name, "skipping blocked plugin");
                return Ok(None);
            }
            return Err(ManagerError::AlreadyRegistered { name: plugin_name });
        }
        if self.plugins.contains_key(&id) {
            return Err(ManagerError::AlreadyRegistered { name: plugin_name });
        }

        let mut collector = HookImpls::new(self.project_name.as_str());
        Arc::clone(&plugin).hookimpls(&mut collector);
        let defs = collector.into_matching();
        for def in &defs {
            validation::check_definition(&plugin_name, def)?;
        }

        self.name2plugin
            .insert(plugin_name.clone(), Some(Arc::clone(&plugin)));
        self.plugins.insert(
            id,
            PluginEntry {
                plugin,
                hookcallers: Vec::new(),
            },
        );

        if let Err(err) = self.attach(id, &plugin_name, defs) {
            self.detach(&plugin_name, id);
            return Err(err);
        }

        self.trace.call(&[&"registered", &plugin_name]);
        debug!(plugin = %plugin_name, "registered plugin");
        Ok(Some(plugin_name))
    }

    fn attach(&mut self, id: PluginId, plugin_name: &str, defs: Vec<ImplDef>) -> Result<(), ManagerError> {
        for def in defs {
            let hook_impl = Arc::new(def.into_hook_impl(id, plugin_name));
            let caller = self.hook_or_create(hook_impl.hook_name());

            if caller.has_spec() {
                let mut warnings = Vec::new();
                let verified = validation::verify_hook(&caller, &hook_impl, &mut warnings);
                self.warnings.append(&mut warnings);
                verified?;
                caller.add_implementation(hook_impl)?;
            } else {
                caller.insert_implementation(hook_impl);
            }

            if let Some(entry) = self.plugins.get_mut(&id) {
                entry.track(&caller);
            }
        }
        Ok(())
    }

    fn hook_or_create(&mut self, hook_name: &str) -> Arc<HookCaller> {
        if let Some(caller) = self.hook_relay.get(hook_name) {
            return Arc::clone(caller);
        }
        let caller = Arc::new(HookCaller::new(hook_name, Arc::clone(&self.hookexec)));
        self.hook_relay
            .insert(hook_name.to_string(), Arc::clone(&caller));
        caller
    }

    fn detach(&mut self, name: &str, id: PluginId) -> Option<Arc<dyn Plugin>> {
        if matches!(self.name2plugin.get(name), Some(Some(_))) {
            self.name2plugin.shift_remove(name);
        }
        let entry = self.plugins.remove(&id)?;
        for caller in &entry.hookcallers {
            caller.remove_plugin(id);
        }
        Some(entry.plugin)
    }

    /// Unregisters `plugin` and removes all of its implementations.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::NotRegistered`] if the plugin is unknown.
    pub fn unregister<P: Plugin + ?Sized>(&mut self, plugin: &Arc<P>) -> Result<Arc<dyn Plugin>, ManagerError> {
        let id = PluginId::of(plugin);
        let name = self
            .get_name(plugin)
            .ok_or_else(|| ManagerError::NotRegistered(self.get_canonical_name(plugin)))?;
        let removed = self
            .detach(&name, id)
            .ok_or_else(|| ManagerError::NotRegistered(name.clone()))?;
        self.trace.call(&[&"unregistered", &name]);
        debug!(plugin = %name, "unregistered plugin");
        Ok(removed)
    }

    /// Unregisters the plugin registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::NotRegistered`] if no plugin has that name.
    pub fn unregister_name(&mut self, name: &str) -> Result<Arc<dyn Plugin>, ManagerError> {
        let plugin = self
            .get_plugin(name)
            .ok_or_else(|| ManagerError::NotRegistered(name.to_string()))?;
        self.unregister(&plugin)
    }

    /// Blocks `name`, unregistering its plugin first if there is one.
    ///
    /// Later registrations under a blocked name return `Ok(None)`.
    pub fn set_blocked(&mut self, name: &str) {
        if let Some(plugin) = self.get_plugin(name) {
            self.detach(name, PluginId::of(&plugin));
        }
        self.name2plugin.insert(name.to_string(), None);
        debug!(plugin = %name, "blocked plugin name");
    }

    /// True if `name` is blocked.
    #[must_use]
    pub fn is_blocked(&self, name: &str) -> bool {
        matches!(self.name2plugin.get(name), Some(None))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Specifications
    // ─────────────────────────────────────────────────────────────────────────

    /// Adds the specifications of `namespace` visible to this project.
    ///
    /// Hooks that already have implementations get the spec bound and every
    /// existing implementation is verified against it. A failed verification
    /// leaves the spec bound.
    ///
    /// # Errors
    ///
    /// - [`ManagerError::NoHookSpecs`] if nothing in `namespace` is for this project
    /// - [`ManagerError::InvalidSpec`] for a historic firstresult declaration
    /// - [`ManagerError::SpecAlreadyDefined`] if a hook already has a spec
    /// - [`ManagerError::Validation`] if an existing implementation is rejected
    pub fn add_hookspecs(&mut self, namespace: &SpecNamespace) -> Result<(), ManagerError> {
        let mut specs = Vec::new();
        for def in namespace.defs_for(&self.project_name) {
            let spec = HookSpec::new(
                namespace.name(),
                def.name.as_str(),
                def.argnames.clone(),
                def.opts.clone(),
            )?;
            if self.hook_relay.get(&def.name).is_some_and(|caller| caller.has_spec()) {
                return Err(ManagerError::SpecAlreadyDefined(def.name.clone()));
            }
            specs.push(Arc::new(spec));
        }
        if specs.is_empty() {
            return Err(ManagerError::NoHookSpecs {
                namespace: namespace.name().to_string(),
                project: self.project_name.clone(),
            });
        }

        for spec in specs {
            let name = spec.name().to_string();
            let Some(caller) = self.hook_relay.get(&name).cloned() else {
                let caller = HookCaller::with_spec(name.as_str(), Arc::clone(&self.hookexec), spec);
                self.hook_relay.insert(name.clone(), Arc::new(caller));
                debug!(hook = %name, namespace = %namespace.name(), "added hook spec");
                continue;
            };

            caller
                .set_specification(spec)
                .map_err(|_| ManagerError::SpecAlreadyDefined(name.clone()))?;
            debug!(hook = %name, namespace = %namespace.name(), "bound hook spec");

            let mut warnings = Vec::new();
            let verified = caller
                .get_hookimpls()
                .iter()
                .try_for_each(|hook_impl| validation::verify_hook(&caller, hook_impl, &mut warnings));
            self.warnings.append(&mut warnings);
            verified?;
        }
        Ok(())
    }

    /// Verifies that every implementation of a hook without a spec is
    /// optional.
    ///
    /// # Errors
    ///
    /// Returns [`PluginValidationError::UnknownHook`] for the first offending
    /// implementation.
    pub fn check_pending(&self) -> Result<(), PluginValidationError> {
        for (name, caller) in &self.hook_relay {
            if caller.has_spec() {
                continue;
            }
            if let Some(hook_impl) = caller
                .get_hookimpls()
                .iter()
                .find(|hook_impl| !hook_impl.optionalhook())
            {
                return Err(PluginValidationError::UnknownHook {
                    plugin: hook_impl.plugin_name().to_string(),
                    hook: name.clone(),
                });
            }
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Hooks
    // ─────────────────────────────────────────────────────────────────────────

    /// The caller for `name`, if the hook has a spec or an implementation.
    #[must_use]
    pub fn hook(&self, name: &str) -> Option<Arc<HookCaller>> {
        self.hook_relay.get(name).cloned()
    }

    /// All hook callers in creation order.
    #[must_use]
    pub fn hooks(&self) -> Vec<Arc<HookCaller>> {
        self.hook_relay.values().cloned().collect()
    }

    /// Returns a caller for `name` that skips the implementations of
    /// `remove_plugins`.
    ///
    /// If none of those plugins implements the hook, the original caller is
    /// returned. Otherwise the derived caller shares the spec and executor
    /// and is updated when its remaining plugins are unregistered.
    ///
    /// # Errors
    ///
    /// Returns [`ManagerError::UnknownHook`] if there is no such hook.
    pub fn subset_hook_caller(
        &mut self,
        name: &str,
        remove_plugins: &[Arc<dyn Plugin>],
    ) -> Result<Arc<HookCaller>, ManagerError> {
        let orig = self
            .hook(name)
            .ok_or_else(|| ManagerError::UnknownHook(name.to_string()))?;
        let impls = orig.get_hookimpls();
        let excluded: HashSet<PluginId> = remove_plugins
            .iter()
            .map(PluginId::of)
            .filter(|id| impls.iter().any(|hook_impl| hook_impl.plugin() == *id))
            .collect();
        if excluded.is_empty() {
            return Ok(orig);
        }

        let derived = Arc::new(orig.derive(|hook_impl| !excluded.contains(&hook_impl.plugin())));
        for hook_impl in derived.get_hookimpls() {
            if let Some(entry) = self.plugins.get_mut(&hook_impl.plugin()) {
                entry.track(&derived);
            }
        }
        Ok(derived)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Monitoring
    // ─────────────────────────────────────────────────────────────────────────

    /// Runs `before` ahead of and `after` behind every hook call.
    ///
    /// `after` receives the [`Outcome`] of the call. The returned guard's
    /// [`undo`](HookcallMonitor::undo) restores the previous executor.
    pub fn add_hookcall_monitoring<B, A>(&self, before: B, after: A) -> HookcallMonitor
    where
        B: Fn(&str, &[Arc<HookImpl>], &HookArgs) + Send + Sync + 'static,
        A: Fn(&Outcome, &str, &[Arc<HookImpl>], &HookArgs) + Send + Sync + 'static,
    {
        monitor::install(&self.hookexec, before, after)
    }

    /// Traces every hook call to the `hook` tag of the root tracer.
    ///
    /// Each call logs its name and arguments one level deeper than the
    /// enclosing call and, when it succeeds, a `finish` line with the result.
    pub fn enable_tracing(&self) -> HookcallMonitor {
        let hooktrace = self.trace.root().get("hook");
        let before_trace = hooktrace.clone();
        self.add_hookcall_monitoring(
            move |hook_name, _, args| {
                before_trace.root().push_indent();
                let extra: Vec<(&str, &dyn fmt::Display)> = args
                    .iter()
                    .map(|(name, value)| (name, value as &dyn fmt::Display))
                    .collect();
                before_trace.call_with(&[&hook_name], &extra);
            },
            move |outcome, hook_name, _, _| {
                if let Ok(result) = outcome.result() {
                    hooktrace.call(&[&"finish", &hook_name, &"-->", result]);
                }
                hooktrace.root().pop_indent();
            },
        )
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Entry points
    // ─────────────────────────────────────────────────────────────────────────

    /// Loads and registers the plugins `source` advertises in `group`.
    ///
    /// With `name`, only that entry point is considered. Entry points whose
    /// name is already registered or blocked are skipped. Returns the number
    /// of plugins loaded by this call.
    ///
    /// # Errors
    ///
    /// - [`ManagerError::EntryPointLoad`] if a loader fails
    /// - any error of [`register`](Self::register)
    pub fn load_entrypoints(
        &mut self,
        source: &dyn EntryPointSource,
        group: &str,
        name: Option<&str>,
    ) -> Result<usize, ManagerError> {
        let mut count = 0;
        for entry in source.entry_points() {
            if entry.group != group
                || name.is_some_and(|wanted| wanted != entry.name)
                || self.has_plugin(&entry.name)
                || self.is_blocked(&entry.name)
            {
                continue;
            }
            let plugin = entry
                .load()
                .map_err(|err| ManagerError::entry_point_load(&entry.name, group, err))?;
            self.register(Arc::clone(&plugin), Some(entry.name.as_str()))?;
            debug!(
                entry_point = %entry.name,
                dist = %entry.dist.project_name,
                version = %entry.dist.version,
                "loaded entry point"
            );
            self.plugin_distinfo.push((plugin, entry.dist));
            count += 1;
        }
        Ok(count)
    }

    /// Plugins loaded from entry points with their distribution info.
    #[must_use]
    pub fn list_plugin_distinfo(&self) -> Vec<(Arc<dyn Plugin>, DistInfo)> {
        self.plugin_distinfo.clone()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Registered plugins in registration order.
    #[must_use]
    pub fn get_plugins(&self) -> Vec<Arc<dyn Plugin>> {
        self.name2plugin.values().flatten().cloned().collect()
    }

    /// True if this instance is registered.
    #[must_use]
    pub fn is_registered<P: Plugin + ?Sized>(&self, plugin: &Arc<P>) -> bool {
        self.plugins.contains_key(&PluginId::of(plugin))
    }

    /// [`Plugin::name`], or the plugin id when the plugin has no name.
    ///
    /// A plugin may be registered under a different name; see
    /// [`get_name`](Self::get_name).
    #[must_use]
    pub fn get_canonical_name<P: Plugin + ?Sized>(&self, plugin: &Arc<P>) -> String {
        plugin
            .name()
            .map_or_else(|| PluginId::of(plugin).to_string(), String::from)
    }

    /// The plugin registered under `name`.
    #[must_use]
    pub fn get_plugin(&self, name: &str) -> Option<Arc<dyn Plugin>> {
        self.name2plugin.get(name).cloned().flatten()
    }

    /// True if a plugin is registered under `name`.
    #[must_use]
    pub fn has_plugin(&self, name: &str) -> bool {
        self.get_plugin(name).is_some()
    }

    /// The name `plugin` is registered under.
    #[must_use]
    pub fn get_name<P: Plugin + ?Sized>(&self, plugin: &Arc<P>) -> Option<String> {
        let id = PluginId::of(plugin);
        self.name2plugin.iter().find_map(|(name, registered)| {
            registered
                .as_ref()
                .filter(|candidate| PluginId::of(*candidate) == id)
                .map(|_| name.clone())
        })
    }

    /// Every `(name, plugin)` pair; blocked names map to `None`.
    #[must_use]
    pub fn list_name_plugin(&self) -> Vec<(String, Option<Arc<dyn Plugin>>)> {
        self.name2plugin
            .iter()
            .map(|(name, plugin)| (name.clone(), plugin.clone()))
            .collect()
    }

    /// The hook callers `plugin` contributes to, subset callers included.
    #[must_use]
    pub fn get_hookcallers<P: Plugin + ?Sized>(&self, plugin: &Arc<P>) -> Option<Vec<Arc<HookCaller>>> {
        self.plugins
            .get(&PluginId::of(plugin))
            .map(|entry| entry.hookcallers.clone())
    }
}

impl fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginManager")
            .field("project_name", &self.project_name)
            .field("plugins", &self.name2plugin.keys().collect::<Vec<_>>())
            .field("hooks", &self.hook_relay.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
