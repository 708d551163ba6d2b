//! # hookline Internal Library
//!
//! Re-exports the hookline crates for convenience.

/// Layer 1: Hook dispatch.
pub use hookline_hooks;

/// Layer 2: Plugin registry.
pub use hookline_manager;

/// Layer 3: Subscriber setup and call logging.
pub use hookline_tracing;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use hookline_hooks::prelude::*;
    pub use hookline_manager::prelude::*;
    pub use hookline_tracing::prelude::*;
}
