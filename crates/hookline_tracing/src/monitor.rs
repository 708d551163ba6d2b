//! Structured logging of hook calls.

use hookline_manager::manager::PluginManager;
use hookline_manager::monitor::HookcallMonitor;
use tracing::debug;

/// Emits a `debug!` event before and after every hook call of `pm`.
///
/// The first event carries the hook name, the implementing plugins in
/// execution order and the call arguments; the second carries the result
/// or the failure. Undo the returned monitor to stop logging.
///
/// ```
/// use hookline_manager::manager::PluginManager;
/// use hookline_tracing::monitor::log_hook_calls;
///
/// let pm = PluginManager::new("app");
/// let monitor = log_hook_calls(&pm);
/// monitor.undo();
/// ```
pub fn log_hook_calls(pm: &PluginManager) -> HookcallMonitor {
    pm.add_hookcall_monitoring(
        |hook, impls, args| {
            let plugins: Vec<&str> = impls.iter().rev().map(|hook_impl| hook_impl.plugin_name()).collect();
            debug!(hook = %hook, plugins = ?plugins, args = %args, "hook call");
        },
        |outcome, hook, _, _| match outcome.result() {
            Ok(result) => debug!(hook = %hook, result = %result, "hook call finished"),
            Err(err) => debug!(hook = %hook, error = %err, "hook call failed"),
        },
    )
}
