//! Hook dispatch primitives for hookline (Layer 1).
//!
//! `hookline_hooks` contains everything needed to call one hook: the
//! records describing implementations and specifications, the executor that
//! runs them in order, and the per-hook caller that owns them.
//!
//! # Core Concepts
//!
//! - [`HookArgs`](args::HookArgs) - Named arguments of a single call
//! - [`HookImpl`](implementation::HookImpl) - One plugin's implementation of one hook
//! - [`HookSpec`](spec::HookSpec) - The declared contract of a hook
//! - [`HookCaller`](caller::HookCaller) - Ordered implementations plus call history
//! - [`multicall`](multicall::multicall) - The executor
//! - [`Outcome`](outcome::Outcome) - Result or failure seen by wrappers
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use hookline_hooks::prelude::*;
//! use serde_json::json;
//!
//! let caller = HookCaller::new("greet", new_hookexec_handle());
//! caller.insert_implementation(Arc::new(HookImpl::new(
//!     PluginId::TEMPORARY,
//!     "english",
//!     "greet",
//!     ImplFunction::plain(|args| {
//!         let name: String = args.get_as("name")?;
//!         Ok(Some(json!(format!("hello {name}"))))
//!     }),
//!     ArgNames::new(["name"]),
//!     HookimplOpts::new(),
//! )));
//!
//! let result = caller.call(&HookArgs::new().with("name", "ada")).unwrap();
//! assert_eq!(result.into_vec(), vec![json!("hello ada")]);
//! ```
//!
//! # Architecture
//!
//! - **Layer 1** (`hookline_hooks`): Dispatch of a single hook (this crate)
//! - **Layer 2** (`hookline_manager`): Plugin registry, validation, monitoring
//! - **Layer 3** (`hookline_tracing`): Subscriber setup and call logging

/// Call arguments and declared parameter names.
pub mod args;

/// Per-hook caller with ordering and history.
pub mod caller;

/// Call and specification errors.
pub mod error;

/// Implementation records and wrappers.
pub mod implementation;

/// The executor.
pub mod multicall;

/// Implementation and specification options.
pub mod opts;

/// Aggregated results and the outcome wrapper.
pub mod outcome;

/// Specification records.
pub mod spec;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::args::{ArgNames, HookArgs};
    pub use crate::caller::{
        HookCaller, HookExecFn, HookExecHandle, ResultCallback, default_hookexec,
        new_hookexec_handle,
    };
    pub use crate::error::{BoxError, CallError, SpecError};
    pub use crate::implementation::{
        FnWrapper, HookImpl, HookWrapper, ImplFunction, ImplResult, PlainFn, PluginId,
    };
    pub use crate::multicall::multicall;
    pub use crate::opts::{HookimplOpts, HookspecOpts};
    pub use crate::outcome::{HookReturn, Outcome};
    pub use crate::spec::HookSpec;
}
