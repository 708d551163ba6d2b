//! Shared test utilities for `hookline_manager` integration tests.
//!
//! Import via `mod test_utils;` in test files.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities, not all items used in every test binary"
)]

use std::sync::Arc;

use hookline_hooks::prelude::*;
use hookline_manager::prelude::*;
use parking_lot::Mutex;
use serde_json::{Value, json};

pub const PROJECT: &str = "example";

// ═══════════════════════════════════════════════════════════════════════════════
// SPECS
// ═══════════════════════════════════════════════════════════════════════════════

/// `he_method1(arg)`, plus the firstresult `he_first(arg)` and historic
/// `he_historic(arg)`.
pub fn example_specs() -> SpecNamespace {
    SpecNamespace::new("ExampleSpecs")
        .hook("he_method1", ArgNames::new(["arg"]), HookspecOpts::new())
        .hook("he_first", ArgNames::new(["arg"]), HookspecOpts::new().firstresult())
        .hook("he_historic", ArgNames::new(["arg"]), HookspecOpts::new().historic())
}

pub fn manager_with_specs() -> PluginManager {
    let mut pm = PluginManager::new(PROJECT);
    pm.add_hookspecs(&example_specs()).expect("example specs are valid");
    pm
}

pub fn call(pm: &PluginManager, hook: &str, args: HookArgs) -> Result<HookReturn, CallError> {
    pm.hook(hook).expect("hook exists").call(&args)
}

pub fn arg(value: impl Into<Value>) -> HookArgs {
    HookArgs::new().with("arg", value)
}

// ═══════════════════════════════════════════════════════════════════════════════
// CALL LOG
// ═══════════════════════════════════════════════════════════════════════════════

/// Records which plugins ran, in order.
#[derive(Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PLUGINS
// ═══════════════════════════════════════════════════════════════════════════════

/// A struct plugin implementing `he_method1` and returning its label.
pub struct Labeled {
    pub label: String,
    pub opts: HookimplOpts,
    pub log: CallLog,
}

impl Labeled {
    pub fn new(label: &str, log: &CallLog) -> Arc<Self> {
        Self::with_opts(label, HookimplOpts::new(), log)
    }

    pub fn with_opts(label: &str, opts: HookimplOpts, log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_string(),
            opts,
            log: log.clone(),
        })
    }
}

impl Plugin for Labeled {
    fn name(&self) -> Option<&str> {
        Some(&self.label)
    }

    fn hookimpls(self: Arc<Self>, impls: &mut HookImpls) {
        let opts = self.opts.clone();
        impls.plain("he_method1", ArgNames::new(["arg"]), opts, move |_| {
            self.log.push(self.label.clone());
            Ok(Some(json!(self.label)))
        });
    }
}

/// A closure plugin answering `he_method1` with `value`.
pub fn answering(name: &str, value: Option<Value>) -> Arc<dyn Plugin> {
    Arc::new(FnPlugin::named(name).hook("he_method1", ArgNames::new(["arg"]), move |_| {
        Ok(value.clone())
    }))
}

/// A closure plugin implementing `hook` with the given argument names.
pub fn implementing(name: &str, hook: &str, argnames: ArgNames, opts: HookimplOpts) -> Arc<dyn Plugin> {
    Arc::new(FnPlugin::named(name).hook_with(hook, argnames, opts, |_| Ok(None)))
}
