//! The multicall executor.
//!
//! [`multicall`] runs an already ordered list of implementations for one
//! hook call:
//!
//! 1. Wrappers are entered from the end of the list backward.
//! 2. Plain implementations run from the end of the list backward, so the
//!    most recently added implementation of the highest tier runs first.
//! 3. Each implementation receives only the arguments it declared.
//! 4. Non-absent results are collected in execution order; with
//!    `firstresult` the loop stops at the first one.
//! 5. The first failure stops the loop.
//! 6. Entered wrappers resume in reverse order of entry with the outcome.

use std::sync::Arc;

use tracing::trace;

use crate::args::HookArgs;
use crate::error::CallError;
use crate::implementation::{HookImpl, HookWrapper, ImplFunction};
use crate::outcome::{HookReturn, Outcome};

/// A wrapper whose `before` half has run.
struct Teardown<'a> {
    hook_impl: &'a HookImpl,
    wrapper: &'a Arc<dyn HookWrapper>,
    args: HookArgs,
}

/// Executes `hook_impls` for one call of `hook_name`.
///
/// # Errors
///
/// Returns the failure left in the outcome after every entered wrapper has
/// seen it: a missing argument, an implementation or wrapper error, or a
/// failure forced by a wrapper.
pub fn multicall(
    hook_name: &str,
    hook_impls: &[Arc<HookImpl>],
    args: &HookArgs,
    firstresult: bool,
) -> Result<HookReturn, CallError> {
    let (wrappers, plain): (Vec<&Arc<HookImpl>>, Vec<&Arc<HookImpl>>) =
        hook_impls.iter().partition(|hook_impl| hook_impl.hookwrapper());

    let mut teardowns = Vec::with_capacity(wrappers.len());
    let mut results = Vec::new();

    let run = enter_wrappers(hook_name, &wrappers, args, &mut teardowns).and_then(|()| {
        run_plain(hook_name, &plain, args, firstresult, &mut results)
    });

    let mut outcome = Outcome::new(run.map(|()| {
        if firstresult {
            HookReturn::First(results.into_iter().next())
        } else {
            HookReturn::All(results)
        }
    }));

    for teardown in teardowns.iter().rev() {
        trace!(
            hook = hook_name,
            plugin = teardown.hook_impl.plugin_name(),
            failed = !outcome.is_ok(),
            "resuming hookwrapper"
        );
        if let Err(err) = teardown.wrapper.after(&teardown.args, &mut outcome) {
            outcome.force_exception(CallError::failed(
                teardown.hook_impl.plugin_name(),
                hook_name,
                err,
            ));
        }
    }

    outcome.get_result()
}

fn enter_wrappers<'a>(
    hook_name: &str,
    wrappers: &[&'a Arc<HookImpl>],
    args: &HookArgs,
    teardowns: &mut Vec<Teardown<'a>>,
) -> Result<(), CallError> {
    for hook_impl in wrappers.iter().rev() {
        let ImplFunction::Wrapper(wrapper) = hook_impl.function() else {
            continue;
        };
        let wrapper_args = args.select(hook_impl.argnames())?;
        trace!(
            hook = hook_name,
            plugin = hook_impl.plugin_name(),
            "entering hookwrapper"
        );
        wrapper
            .before(&wrapper_args)
            .map_err(|err| CallError::failed(hook_impl.plugin_name(), hook_name, err))?;
        teardowns.push(Teardown {
            hook_impl,
            wrapper,
            args: wrapper_args,
        });
    }
    Ok(())
}

fn run_plain(
    hook_name: &str,
    plain: &[&Arc<HookImpl>],
    args: &HookArgs,
    firstresult: bool,
    results: &mut Vec<serde_json::Value>,
) -> Result<(), CallError> {
    for hook_impl in plain.iter().rev() {
        let ImplFunction::Plain(function) = hook_impl.function() else {
            continue;
        };
        let impl_args = args.select(hook_impl.argnames())?;
        trace!(
            hook = hook_name,
            plugin = hook_impl.plugin_name(),
            "calling hook implementation"
        );
        let returned = function(&impl_args)
            .map_err(|err| CallError::failed(hook_impl.plugin_name(), hook_name, err))?;
        if let Some(value) = returned {
            results.push(value);
            if firstresult {
                break;
            }
        }
    }
    Ok(())
}
