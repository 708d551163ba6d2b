//! Observability for hookline (Layer 3).
//!
//! hookline emits `tracing` events from every layer: `trace!` per executed
//! implementation, `debug!` for registration and spec binding, `warn!` for
//! deprecated hooks and incomplete calls. This crate installs a subscriber
//! for those events and adds structured logging of whole hook calls.
//!
//! - [`setup`] - [`TracingSetup`](setup::TracingSetup) subscriber builder
//! - [`monitor`] - [`log_hook_calls`](monitor::log_hook_calls)
//!
//! # Architecture
//!
//! - **Layer 1** (`hookline_hooks`): Dispatch of a single hook
//! - **Layer 2** (`hookline_manager`): Plugin registry
//! - **Layer 3** (`hookline_tracing`): Subscriber setup and call logging (this crate)

/// Structured logging of hook calls.
pub mod monitor;

/// Subscriber setup.
pub mod setup;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::monitor::log_hook_calls;
    pub use crate::setup::{TracingConfig, TracingFormat, TracingSetup};
}
