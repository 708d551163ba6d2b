//! The per-hook caller object.
//!
//! A [`HookCaller`] owns the ordered implementation lists of one hook, its
//! optional specification, the call history of historic hooks, and a handle
//! to the executor used for every call.
//!
//! # Ordering
//!
//! Wrappers and plain implementations are kept in separate lists that follow
//! the same insertion rule:
//!
//! - `trylast` records go to the front,
//! - `tryfirst` records go to the end,
//! - other records go right before the trailing run of `tryfirst` records.
//!
//! The executor walks the lists from the end, so `tryfirst` records run
//! first and, within the first and middle tiers, the most recent
//! registration runs first.
//!
//! # Reentrancy
//!
//! Calls snapshot the implementation lists and release the internal lock
//! before running any implementation, so implementations may call hooks
//! (including the one being called) or register new implementations.

use core::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::warn;

use crate::args::{ArgNames, HookArgs};
use crate::error::{CallError, SpecError};
use crate::implementation::{HookImpl, PlainFn, PluginId};
use crate::multicall::multicall;
use crate::outcome::HookReturn;
use crate::spec::HookSpec;

/// Executor signature: `(hook_name, impls, args, firstresult)`.
pub type HookExecFn =
    Arc<dyn Fn(&str, &[Arc<HookImpl>], &HookArgs, bool) -> Result<HookReturn, CallError> + Send + Sync>;

/// Shared, replaceable executor.
///
/// Every caller created by one manager holds a clone of the same handle, so
/// swapping the function inside (for monitoring) affects all hooks at once.
pub type HookExecHandle = Arc<RwLock<HookExecFn>>;

/// Callback receiving each non-absent result of a historic call.
pub type ResultCallback = Arc<dyn Fn(&Value) + Send + Sync>;

/// Returns the plain [`multicall`] executor.
#[must_use]
pub fn default_hookexec() -> HookExecFn {
    Arc::new(multicall)
}

/// Returns a fresh handle wrapping [`default_hookexec`].
#[must_use]
pub fn new_hookexec_handle() -> HookExecHandle {
    Arc::new(RwLock::new(default_hookexec()))
}

struct HistoricCall {
    args: HookArgs,
    callback: Option<ResultCallback>,
}

#[derive(Default)]
struct CallerState {
    wrappers: Vec<Arc<HookImpl>>,
    nonwrappers: Vec<Arc<HookImpl>>,
    spec: Option<Arc<HookSpec>>,
    call_history: Option<Vec<HistoricCall>>,
}

impl CallerState {
    fn snapshot(&self) -> Vec<Arc<HookImpl>> {
        self.nonwrappers.iter().chain(&self.wrappers).cloned().collect()
    }

    fn firstresult(&self) -> bool {
        self.spec.as_ref().is_some_and(|spec| spec.firstresult())
    }

    fn insert(&mut self, hook_impl: Arc<HookImpl>) {
        let list = if hook_impl.hookwrapper() {
            &mut self.wrappers
        } else {
            &mut self.nonwrappers
        };
        insert_ordered(list, hook_impl);
    }
}

/// Dispatches calls of one named hook.
pub struct HookCaller {
    name: String,
    hookexec: HookExecHandle,
    state: RwLock<CallerState>,
}

impl HookCaller {
    /// Creates a caller without a specification.
    #[must_use]
    pub fn new(name: impl Into<String>, hookexec: HookExecHandle) -> Self {
        Self {
            name: name.into(),
            hookexec,
            state: RwLock::new(CallerState::default()),
        }
    }

    /// Creates a caller already bound to `spec`.
    #[must_use]
    pub fn with_spec(name: impl Into<String>, hookexec: HookExecHandle, spec: Arc<HookSpec>) -> Self {
        let caller = Self::new(name, hookexec);
        {
            let mut state = caller.state.write();
            if spec.historic() {
                state.call_history = Some(Vec::new());
            }
            state.spec = Some(spec);
        }
        caller
    }

    /// The hook name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True once a specification is bound.
    #[must_use]
    pub fn has_spec(&self) -> bool {
        self.state.read().spec.is_some()
    }

    /// The bound specification.
    #[must_use]
    pub fn spec(&self) -> Option<Arc<HookSpec>> {
        self.state.read().spec.clone()
    }

    /// True if the hook records and replays calls.
    #[must_use]
    pub fn is_historic(&self) -> bool {
        self.state.read().call_history.is_some()
    }

    /// The executor handle shared with the owning manager.
    #[must_use]
    pub fn hookexec(&self) -> &HookExecHandle {
        &self.hookexec
    }

    /// Binds a specification to a caller created without one.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::AlreadySpecified`] if a spec is already bound.
    pub fn set_specification(&self, spec: Arc<HookSpec>) -> Result<(), SpecError> {
        let mut state = self.state.write();
        if state.spec.is_some() {
            return Err(SpecError::AlreadySpecified(self.name.clone()));
        }
        if spec.historic() {
            state.call_history = Some(Vec::new());
        }
        state.spec = Some(spec);
        Ok(())
    }

    /// All implementations: plain ones first, then wrappers, each in
    /// insertion-rule order.
    #[must_use]
    pub fn get_hookimpls(&self) -> Vec<Arc<HookImpl>> {
        self.state.read().snapshot()
    }

    /// Number of implementations, wrappers included.
    #[must_use]
    pub fn len(&self) -> usize {
        let state = self.state.read();
        state.nonwrappers.len() + state.wrappers.len()
    }

    /// True if no implementation is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Calls the hook with `args`.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::HistoricCall`] for historic hooks, otherwise the
    /// failure produced by the executor.
    pub fn call(&self, args: &HookArgs) -> Result<HookReturn, CallError> {
        let (impls, firstresult) = {
            let state = self.state.read();
            if state.call_history.is_some() {
                return Err(CallError::HistoricCall(self.name.clone()));
            }
            self.warn_missing_args(&state, args);
            (state.snapshot(), state.firstresult())
        };
        self.execute(&impls, args, firstresult)
    }

    /// Calls a historic hook and records the call for later replay.
    ///
    /// The call is recorded before it executes, so a failing call is still
    /// replayed to implementations added afterwards. Each non-absent result
    /// is passed to `callback` in order.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::NotHistoric`] unless the bound spec is historic,
    /// otherwise the failure produced by the executor.
    pub fn call_historic(
        &self,
        args: HookArgs,
        callback: Option<ResultCallback>,
    ) -> Result<(), CallError> {
        let impls = {
            let mut state = self.state.write();
            self.warn_missing_args(&state, &args);
            let Some(history) = state.call_history.as_mut() else {
                return Err(CallError::NotHistoric(self.name.clone()));
            };
            history.push(HistoricCall {
                args: args.clone(),
                callback: callback.clone(),
            });
            state.snapshot()
        };
        let results = self.execute(&impls, &args, false)?;
        if let Some(callback) = callback {
            for value in results.into_vec() {
                callback(&value);
            }
        }
        Ok(())
    }

    /// Calls the hook with additional temporary plain implementations.
    ///
    /// The extra implementations join the middle tier for this call only.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::HistoricCall`] for historic hooks, otherwise the
    /// failure produced by the executor.
    pub fn call_extra(
        &self,
        extra: impl IntoIterator<Item = (PlainFn, ArgNames)>,
        args: &HookArgs,
    ) -> Result<HookReturn, CallError> {
        let (mut nonwrappers, wrappers, firstresult) = {
            let state = self.state.read();
            if state.call_history.is_some() {
                return Err(CallError::HistoricCall(self.name.clone()));
            }
            self.warn_missing_args(&state, args);
            (
                state.nonwrappers.clone(),
                state.wrappers.clone(),
                state.firstresult(),
            )
        };
        for (function, argnames) in extra {
            insert_ordered(
                &mut nonwrappers,
                Arc::new(HookImpl::temporary(function, argnames)),
            );
        }
        nonwrappers.extend(wrappers);
        self.execute(&nonwrappers, args, firstresult)
    }

    /// Replays the call history to `hook_impl`, then inserts it.
    ///
    /// Each replay runs the new implementation alone and passes its first
    /// result to the callback stored with that call. Historic calls made
    /// while replaying are replayed as well; the record is inserted once
    /// no history entry is left.
    ///
    /// # Errors
    ///
    /// Returns the first replay failure; the record is not inserted then.
    pub fn add_implementation(&self, hook_impl: Arc<HookImpl>) -> Result<(), CallError> {
        let single = [Arc::clone(&hook_impl)];
        let mut replayed = 0;
        loop {
            let (args, callback) = {
                let mut state = self.state.write();
                let pending = state
                    .call_history
                    .as_ref()
                    .and_then(|history| history.get(replayed))
                    .map(|call| (call.args.clone(), call.callback.clone()));
                match pending {
                    Some(pending) => pending,
                    None => {
                        state.insert(hook_impl);
                        return Ok(());
                    }
                }
            };
            let results = self.execute(&single, &args, false)?;
            if let (Some(callback), Some(first)) = (callback, results.into_first()) {
                callback(&first);
            }
            replayed += 1;
        }
    }

    /// Inserts `hook_impl` following the ordering rule, without replay.
    pub fn insert_implementation(&self, hook_impl: Arc<HookImpl>) {
        self.state.write().insert(hook_impl);
    }

    /// Removes every record owned by `plugin`. Returns true if any was found.
    pub fn remove_plugin(&self, plugin: PluginId) -> bool {
        let mut state = self.state.write();
        let before = state.wrappers.len() + state.nonwrappers.len();
        state.wrappers.retain(|hook_impl| hook_impl.plugin() != plugin);
        state.nonwrappers.retain(|hook_impl| hook_impl.plugin() != plugin);
        before != state.wrappers.len() + state.nonwrappers.len()
    }

    /// Builds a caller sharing this one's name, spec, and executor handle,
    /// holding only the records accepted by `keep`.
    ///
    /// The relative order of kept records is preserved. A historic derived
    /// caller starts with an empty history.
    #[must_use]
    pub fn derive(&self, keep: impl Fn(&HookImpl) -> bool) -> HookCaller {
        let state = self.state.read();
        let filter = |list: &[Arc<HookImpl>]| -> Vec<Arc<HookImpl>> {
            list.iter().filter(|hook_impl| keep(hook_impl)).cloned().collect()
        };
        HookCaller {
            name: self.name.clone(),
            hookexec: Arc::clone(&self.hookexec),
            state: RwLock::new(CallerState {
                wrappers: filter(&state.wrappers),
                nonwrappers: filter(&state.nonwrappers),
                spec: state.spec.clone(),
                call_history: state.call_history.as_ref().map(|_| Vec::new()),
            }),
        }
    }

    fn execute(
        &self,
        impls: &[Arc<HookImpl>],
        args: &HookArgs,
        firstresult: bool,
    ) -> Result<HookReturn, CallError> {
        let hookexec = Arc::clone(&*self.hookexec.read());
        hookexec(&self.name, impls, args, firstresult)
    }

    fn warn_missing_args(&self, state: &CallerState, args: &HookArgs) {
        let Some(spec) = &state.spec else {
            return;
        };
        let missing: Vec<&str> = spec
            .argnames()
            .required
            .iter()
            .map(String::as_str)
            .filter(|name| !args.contains(name))
            .collect();
        if !missing.is_empty() {
            warn!(
                hook = %self.name,
                missing = ?missing,
                "argument(s) declared in the hookspec cannot be found in this hook call"
            );
        }
    }
}

impl fmt::Debug for HookCaller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("HookCaller")
            .field("name", &self.name)
            .field("nonwrappers", &state.nonwrappers.len())
            .field("wrappers", &state.wrappers.len())
            .field("spec", &state.spec.as_ref().map(|spec| spec.namespace()))
            .field("historic", &state.call_history.is_some())
            .finish()
    }
}

fn insert_ordered(list: &mut Vec<Arc<HookImpl>>, hook_impl: Arc<HookImpl>) {
    if hook_impl.trylast() {
        list.insert(0, hook_impl);
    } else if hook_impl.tryfirst() {
        list.push(hook_impl);
    } else {
        let mut index = list.len();
        while index > 0 && list[index - 1].tryfirst() {
            index -= 1;
        }
        list.insert(index, hook_impl);
    }
}
