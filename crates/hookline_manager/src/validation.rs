//! Registration-time checks of implementations against specifications.

use core::fmt;

use hookline_hooks::caller::HookCaller;
use hookline_hooks::implementation::HookImpl;
use tracing::warn;

use crate::error::PluginValidationError;
use crate::plugin::ImplDef;

/// A `warn_on_impl` warning raised while verifying an implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplWarning {
    /// Hook name.
    pub hook: String,
    /// Plugin owning the implementation.
    pub plugin: String,
    /// Signature of the implementation.
    pub signature: String,
    /// The warning declared on the spec.
    pub message: String,
}

impl fmt::Display for ImplWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} in plugin '{}')", self.message, self.signature, self.plugin)
    }
}

/// Checks a declaration on its own, before anything is registered.
pub(crate) fn check_definition(plugin: &str, def: &ImplDef) -> Result<(), PluginValidationError> {
    let opts = def.opts();
    if opts.tryfirst && opts.trylast {
        return Err(PluginValidationError::ConflictingOrder {
            plugin: plugin.to_string(),
            method: def.method_name().to_string(),
        });
    }
    if opts.hookwrapper && !def.function().is_wrapper() {
        return Err(PluginValidationError::WrapperMismatch {
            plugin: plugin.to_string(),
            method: def.method_name().to_string(),
        });
    }
    Ok(())
}

/// Verifies `hook_impl` against the spec bound to `caller`.
///
/// A spec warning is emitted and pushed to `warnings` before the argument
/// check, so it is reported even when the check fails. Callers without a
/// spec accept everything.
pub(crate) fn verify_hook(
    caller: &HookCaller,
    hook_impl: &HookImpl,
    warnings: &mut Vec<ImplWarning>,
) -> Result<(), PluginValidationError> {
    let Some(spec) = caller.spec() else {
        return Ok(());
    };

    if spec.historic() && hook_impl.hookwrapper() {
        return Err(PluginValidationError::HistoricWrapper {
            plugin: hook_impl.plugin_name().to_string(),
            hook: caller.name().to_string(),
        });
    }

    if let Some(message) = spec.warn_on_impl() {
        let warning = ImplWarning {
            hook: caller.name().to_string(),
            plugin: hook_impl.plugin_name().to_string(),
            signature: hook_impl.signature(),
            message: message.to_string(),
        };
        warn!(
            hook = %warning.hook,
            plugin = %warning.plugin,
            signature = %warning.signature,
            "{}",
            warning.message
        );
        warnings.push(warning);
    }

    let undeclared = spec.undeclared(hook_impl.argnames());
    if !undeclared.is_empty() {
        return Err(PluginValidationError::ArgumentsNotInSpec {
            plugin: hook_impl.plugin_name().to_string(),
            hook: caller.name().to_string(),
            signature: hook_impl.signature(),
            arguments: undeclared.into_iter().map(String::from).collect(),
        });
    }
    Ok(())
}
