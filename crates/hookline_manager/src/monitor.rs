//! Hook-call monitoring.
//!
//! Monitoring replaces the executor shared by every hook caller of a
//! manager with one that runs a `before` callback, delegates to the previous
//! executor, then runs an `after` callback with the [`Outcome`]. Monitors
//! nest: each one wraps whatever executor was installed when it was added.

use core::fmt;
use std::sync::Arc;

use hookline_hooks::args::HookArgs;
use hookline_hooks::caller::{HookExecFn, HookExecHandle};
use hookline_hooks::error::CallError;
use hookline_hooks::implementation::HookImpl;
use hookline_hooks::outcome::{HookReturn, Outcome};

/// Guard returned when monitoring is installed.
///
/// Dropping it leaves the monitor in place; call [`undo`](Self::undo) to
/// restore the executor that was active before.
#[must_use = "the monitor stays installed until `undo` is called"]
pub struct HookcallMonitor {
    handle: HookExecHandle,
    previous: HookExecFn,
}

impl HookcallMonitor {
    /// Restores the executor that was active when this monitor was added.
    pub fn undo(self) {
        *self.handle.write() = self.previous;
    }
}

impl fmt::Debug for HookcallMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookcallMonitor").finish_non_exhaustive()
    }
}

/// Wraps the executor behind `handle` with `before` and `after`.
pub(crate) fn install<B, A>(handle: &HookExecHandle, before: B, after: A) -> HookcallMonitor
where
    B: Fn(&str, &[Arc<HookImpl>], &HookArgs) + Send + Sync + 'static,
    A: Fn(&Outcome, &str, &[Arc<HookImpl>], &HookArgs) + Send + Sync + 'static,
{
    let previous = Arc::clone(&*handle.read());
    let inner = Arc::clone(&previous);
    let traced: HookExecFn = Arc::new(
        move |hook_name: &str,
              hook_impls: &[Arc<HookImpl>],
              args: &HookArgs,
              firstresult: bool|
              -> Result<HookReturn, CallError> {
            before(hook_name, hook_impls, args);
            let outcome = Outcome::from_call(|| inner(hook_name, hook_impls, args, firstresult));
            after(&outcome, hook_name, hook_impls, args);
            outcome.get_result()
        },
    );
    *handle.write() = traced;
    HookcallMonitor {
        handle: Arc::clone(handle),
        previous,
    }
}
