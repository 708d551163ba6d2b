//! Dispatch tests through the public caller API.
//!
//! Covers ordering across tiers and wrappers, firstresult short-circuiting,
//! wrapper result substitution, and historic replay.

use std::sync::Arc;

use hookline_hooks::prelude::*;
use parking_lot::Mutex;
use serde_json::{Value, json};

// ═══════════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Default)]
struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }
}

fn recording(log: &CallLog, name: &str, value: Option<Value>, opts: HookimplOpts) -> Arc<HookImpl> {
    let log = log.clone();
    let tag = name.to_string();
    Arc::new(HookImpl::new(
        PluginId::TEMPORARY,
        name,
        "compute",
        ImplFunction::plain(move |_| {
            log.push(tag.clone());
            Ok(value.clone())
        }),
        ArgNames::none(),
        opts,
    ))
}

fn logging_wrapper(log: &CallLog, name: &str, opts: HookimplOpts) -> Arc<HookImpl> {
    let enter = log.clone();
    let exit = log.clone();
    let enter_tag = format!("{name}>");
    let exit_tag = format!("<{name}");
    Arc::new(HookImpl::new(
        PluginId::TEMPORARY,
        name,
        "compute",
        ImplFunction::wrapper(FnWrapper::new(
            move |_: &HookArgs| -> Result<(), BoxError> {
                enter.push(enter_tag.clone());
                Ok(())
            },
            move |_: &HookArgs, _: &mut Outcome| -> Result<(), BoxError> {
                exit.push(exit_tag.clone());
                Ok(())
            },
        )),
        ArgNames::none(),
        opts,
    ))
}

fn spec(opts: HookspecOpts) -> Arc<HookSpec> {
    Arc::new(HookSpec::new("specs", "compute", ArgNames::new(["x"]), opts).unwrap())
}

// ═══════════════════════════════════════════════════════════════════════════════
// ORDERING
// ═══════════════════════════════════════════════════════════════════════════════

/// Plain then tryfirst registration yields tryfirst first.
#[test]
fn tryfirst_runs_before_earlier_plain() {
    let log = CallLog::default();
    let caller = HookCaller::new("compute", new_hookexec_handle());
    caller.insert_implementation(recording(&log, "a", Some(json!("A")), HookimplOpts::new()));
    caller.insert_implementation(recording(&log, "b", Some(json!("B")), HookimplOpts::new().tryfirst()));

    let result = caller.call(&HookArgs::new()).unwrap();

    assert_eq!(log.entries(), vec!["b", "a"]);
    assert_eq!(result.into_vec(), vec![json!("B"), json!("A")]);
}

/// Wrapper tiers order wrappers among themselves the same way.
#[test]
fn wrapper_tiers_nest_outermost_first() {
    let log = CallLog::default();
    let caller = HookCaller::new("compute", new_hookexec_handle());
    caller.insert_implementation(logging_wrapper(&log, "inner", HookimplOpts::new().trylast()));
    caller.insert_implementation(logging_wrapper(&log, "outer", HookimplOpts::new().tryfirst()));
    caller.insert_implementation(recording(&log, "plain", None, HookimplOpts::new()));

    caller.call(&HookArgs::new()).unwrap();

    assert_eq!(
        log.entries(),
        vec!["outer>", "inner>", "plain", "<inner", "<outer"]
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// AGGREGATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Under firstresult, implementations after the first answer never run.
#[test]
fn firstresult_skips_remaining_implementations() {
    let log = CallLog::default();
    let caller = HookCaller::with_spec(
        "compute",
        new_hookexec_handle(),
        spec(HookspecOpts::new().firstresult()),
    );
    caller.insert_implementation(recording(&log, "never", Some(json!(0)), HookimplOpts::new().trylast()));
    caller.insert_implementation(recording(&log, "answer", Some(json!(42)), HookimplOpts::new()));
    caller.insert_implementation(recording(&log, "abstain", None, HookimplOpts::new().tryfirst()));

    let result = caller.call(&HookArgs::new().with("x", 1)).unwrap();

    assert_eq!(result.as_first(), Some(&json!(42)));
    assert_eq!(log.entries(), vec!["abstain", "answer"]);
}

/// A wrapper observing a failure can substitute the value the caller gets.
#[test]
fn wrapper_rescues_failed_call() {
    let caller = HookCaller::new("compute", new_hookexec_handle());
    caller.insert_implementation(Arc::new(HookImpl::new(
        PluginId::TEMPORARY,
        "broken",
        "compute",
        ImplFunction::plain(|_| Err("division by zero".into())),
        ArgNames::none(),
        HookimplOpts::new(),
    )));
    caller.insert_implementation(Arc::new(HookImpl::new(
        PluginId::TEMPORARY,
        "rescue",
        "compute",
        ImplFunction::wrapper(FnWrapper::new(
            |_: &HookArgs| Ok(()),
            |_: &HookArgs, outcome: &mut Outcome| -> Result<(), BoxError> {
                let failed_plugin = outcome.excinfo().and_then(CallError::plugin).map(String::from);
                if let Some(plugin) = failed_plugin {
                    outcome.force_result(HookReturn::All(vec![json!({ "recovered_from": plugin })]));
                }
                Ok(())
            },
        )),
        ArgNames::none(),
        HookimplOpts::new(),
    )));

    let result = caller.call(&HookArgs::new()).unwrap();

    assert_eq!(result.into_vec(), vec![json!({ "recovered_from": "broken" })]);
}

// ═══════════════════════════════════════════════════════════════════════════════
// HISTORY
// ═══════════════════════════════════════════════════════════════════════════════

/// A late implementation is invoked once per past call, in original order.
#[test]
fn late_implementation_sees_every_past_call() {
    let caller = HookCaller::with_spec("compute", new_hookexec_handle(), spec(HookspecOpts::new().historic()));
    caller.call_historic(HookArgs::new().with("x", 1), None).unwrap();
    caller.call_historic(HookArgs::new().with("x", 2), None).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_impl = Arc::clone(&seen);
    caller
        .add_implementation(Arc::new(HookImpl::new(
            PluginId::TEMPORARY,
            "late",
            "compute",
            ImplFunction::plain(move |args| {
                seen_impl.lock().push(args.get_as::<i64>("x")?);
                Ok(None)
            }),
            ArgNames::new(["x"]),
            HookimplOpts::new(),
        )))
        .unwrap();

    assert_eq!(*seen.lock(), vec![1, 2]);
}
