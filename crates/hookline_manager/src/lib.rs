//! Plugin management for hookline (Layer 2).
//!
//! `hookline_manager` keeps the registry of plugins and hook specifications
//! for one project and wires their implementations into the hook callers
//! of `hookline_hooks`.
//!
//! - [`manager`] - The [`PluginManager`](manager::PluginManager) registry
//! - [`plugin`] - The [`Plugin`](plugin::Plugin) trait and closure plugins
//! - [`specs`] - Specification namespaces
//! - [`validation`] - Checks applied at registration
//! - [`monitor`] - Hook-call monitoring
//! - [`tracer`] - Tag-based trace messages
//! - [`entrypoints`] - Entry-point discovery
//!
//! # Architecture
//!
//! - **Layer 1** (`hookline_hooks`): Dispatch of a single hook
//! - **Layer 2** (`hookline_manager`): Plugin registry (this crate)
//! - **Layer 3** (`hookline_tracing`): Subscriber setup and call logging

/// Entry-point discovery.
pub mod entrypoints;

/// Error types for plugin management.
pub mod error;

/// The plugin manager.
pub mod manager;

/// Hook-call monitoring.
pub mod monitor;

/// Plugins and the declarations they contribute.
pub mod plugin;

/// Specification namespaces.
pub mod specs;

/// Tag-based trace messages.
pub mod tracer;

/// Registration-time validation.
pub mod validation;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::entrypoints::{DistInfo, EntryPoint, EntryPointSource, PluginLoader, StaticEntryPoints};
    pub use crate::error::{ManagerError, PluginValidationError};
    pub use crate::manager::PluginManager;
    pub use crate::monitor::HookcallMonitor;
    pub use crate::plugin::{FnPlugin, HookImpls, ImplDef, Plugin};
    pub use crate::specs::{SpecDef, SpecNamespace};
    pub use crate::tracer::{TagTracer, TagTracerSub, TraceProcessor, TraceWriter};
    pub use crate::validation::ImplWarning;
}
