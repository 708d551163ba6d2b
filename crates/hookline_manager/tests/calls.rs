//! Integration tests for calling hooks through a manager.

mod test_utils;

use std::sync::Arc;

use hookline_hooks::prelude::*;
use hookline_manager::prelude::*;
use parking_lot::Mutex;
use serde_json::{Value, json};
use test_utils::*;

// ═══════════════════════════════════════════════════════════════════════════════
// FIRSTRESULT
// ═══════════════════════════════════════════════════════════════════════════════

/// A firstresult hook stops at the first implementation with an answer.
#[test]
fn firstresult_short_circuits() {
    let mut pm = manager_with_specs();
    let log = CallLog::default();
    let record = |label: &'static str, value: Option<Value>| {
        let log = log.clone();
        Arc::new(FnPlugin::named(label).hook("he_first", ArgNames::new(["arg"]), move |_| {
            log.push(label);
            Ok(value.clone())
        }))
    };

    pm.register(record("skipped", Some(json!("late"))), None).unwrap();
    pm.register(record("answer", Some(json!("hit"))), None).unwrap();
    pm.register(record("silent", None), None).unwrap();

    let result = call(&pm, "he_first", arg(0)).unwrap();
    assert_eq!(result, HookReturn::First(Some(json!("hit"))));
    assert_eq!(log.entries(), vec!["silent", "answer"]);
}

/// A null answer still counts as an answer.
#[test]
fn firstresult_accepts_null() {
    let mut pm = manager_with_specs();
    pm.register(
        Arc::new(FnPlugin::named("null").hook("he_first", ArgNames::new(["arg"]), |_| {
            Ok(Some(Value::Null))
        })),
        None,
    )
    .unwrap();

    assert_eq!(call(&pm, "he_first", arg(0)).unwrap().as_first(), Some(&Value::Null));
}

// ═══════════════════════════════════════════════════════════════════════════════
// WRAPPERS
// ═══════════════════════════════════════════════════════════════════════════════

/// A wrapper can replace the aggregated result.
#[test]
fn wrapper_substitutes_result() {
    let mut pm = manager_with_specs();
    pm.register(answering("inner", Some(json!(1))), None).unwrap();
    let wrapper = FnPlugin::named("outer").wrapper(
        "he_method1",
        ArgNames::new(["arg"]),
        HookimplOpts::new(),
        FnWrapper::new(
            |_: &HookArgs| -> Result<(), BoxError> { Ok(()) },
            |_: &HookArgs, outcome: &mut Outcome| -> Result<(), BoxError> {
                let mut values = outcome.result().map_err(Clone::clone)?.clone().into_vec();
                values.push(json!("wrapped"));
                outcome.force_result(HookReturn::All(values));
                Ok(())
            },
        ),
    );
    pm.register(Arc::new(wrapper), None).unwrap();

    let result = call(&pm, "he_method1", arg(0)).unwrap();
    assert_eq!(result.into_vec(), vec![json!(1), json!("wrapped")]);
}

/// A failing implementation surfaces as a call failure naming its plugin.
#[test]
fn implementation_failure_names_plugin() {
    let mut pm = manager_with_specs();
    pm.register(
        Arc::new(FnPlugin::named("broken").hook("he_method1", ArgNames::new(["arg"]), |_| {
            Err("disk full".into())
        })),
        None,
    )
    .unwrap();

    let err = call(&pm, "he_method1", arg(0)).unwrap_err();
    assert_eq!(err.plugin(), Some("broken"));
    assert!(err.to_string().contains("disk full"));
}

// ═══════════════════════════════════════════════════════════════════════════════
// HISTORIC
// ═══════════════════════════════════════════════════════════════════════════════

/// Plugins registered after a historic call receive it on registration.
#[test]
fn historic_call_replayed_to_late_plugin() {
    let mut pm = manager_with_specs();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let callback: ResultCallback = Arc::new(move |value: &Value| sink.lock().push(value.clone()));

    pm.hook("he_historic")
        .unwrap()
        .call_historic(arg(10), Some(callback))
        .unwrap();
    assert!(seen.lock().is_empty());

    let doubler = FnPlugin::named("doubler").hook("he_historic", ArgNames::new(["arg"]), |args| {
        let arg: i64 = args.get_as("arg")?;
        Ok(Some(json!(arg * 2)))
    });
    pm.register(Arc::new(doubler), None).unwrap();

    assert_eq!(*seen.lock(), vec![json!(20)]);
}

/// Historic hooks cannot be called normally, and plain hooks cannot be
/// called historically.
#[test]
fn historic_and_plain_calls_do_not_mix() {
    let pm = manager_with_specs();
    assert!(matches!(
        call(&pm, "he_historic", arg(0)),
        Err(CallError::HistoricCall(_))
    ));
    assert!(matches!(
        pm.hook("he_method1").unwrap().call_historic(arg(0), None),
        Err(CallError::NotHistoric(_))
    ));
}

/// A plugin whose replay fails is not registered.
#[test]
fn failed_replay_rolls_back_registration() {
    let mut pm = manager_with_specs();
    pm.hook("he_historic").unwrap().call_historic(arg(0), None).unwrap();

    let plugin: Arc<dyn Plugin> = Arc::new(FnPlugin::named("picky").hook(
        "he_historic",
        ArgNames::new(["arg"]),
        |_| Err("refused".into()),
    ));
    assert!(matches!(
        pm.register(Arc::clone(&plugin), None),
        Err(ManagerError::Call(_))
    ));
    assert!(!pm.is_registered(&plugin));
    assert!(pm.hook("he_historic").unwrap().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════════
// SUBSET CALLERS
// ═══════════════════════════════════════════════════════════════════════════════

/// A subset caller skips the excluded plugins and follows unregistration of
/// the others.
#[test]
fn subset_hook_caller_excludes_plugins() {
    let mut pm = manager_with_specs();
    let log = CallLog::default();
    let a = Labeled::new("a", &log);
    let b = Labeled::new("b", &log);
    let c = Labeled::new("c", &log);
    for plugin in [&a, &b, &c] {
        pm.register(plugin.clone(), None).unwrap();
    }

    let excluded: Arc<dyn Plugin> = b.clone();
    let subset = pm.subset_hook_caller("he_method1", &[excluded]).unwrap();
    subset.call(&arg(0)).unwrap();
    assert_eq!(log.entries(), vec!["c", "a"]);

    log.clear();
    pm.unregister(&a).unwrap();
    subset.call(&arg(0)).unwrap();
    assert_eq!(log.entries(), vec!["c"]);

    log.clear();
    call(&pm, "he_method1", arg(0)).unwrap();
    assert_eq!(log.entries(), vec!["c", "b"]);
}

/// Excluding plugins that do not implement the hook returns the original
/// caller.
#[test]
fn subset_without_overlap_is_original() {
    let mut pm = manager_with_specs();
    let log = CallLog::default();
    pm.register(Labeled::new("a", &log), None).unwrap();

    let unrelated: Arc<dyn Plugin> = Arc::new(FnPlugin::named("unrelated"));
    let subset = pm.subset_hook_caller("he_method1", &[unrelated]).unwrap();
    assert!(Arc::ptr_eq(&subset, &pm.hook("he_method1").unwrap()));

    assert!(matches!(
        pm.subset_hook_caller("nope", &[]),
        Err(ManagerError::UnknownHook(_))
    ));
}

// ═══════════════════════════════════════════════════════════════════════════════
// REENTRANCY AND EXTRA IMPLEMENTATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// An implementation may call another hook of the same manager.
#[test]
fn implementation_calls_other_hook() {
    let mut pm = manager_with_specs();
    pm.register(answering("inner", Some(json!("inner"))), None).unwrap();

    let inner = pm.hook("he_method1").unwrap();
    let outer = FnPlugin::named("outer").hook("he_first", ArgNames::new(["arg"]), move |args| {
        let nested = inner.call(args)?;
        Ok(Some(json!(nested.into_vec())))
    });
    pm.register(Arc::new(outer), None).unwrap();

    let result = call(&pm, "he_first", arg(0)).unwrap();
    assert_eq!(result.into_first(), Some(json!(["inner"])));
}

/// `call_extra` runs temporary implementations alongside registered ones.
#[test]
fn call_extra_joins_plain_tier() {
    let mut pm = manager_with_specs();
    pm.register(answering("registered", Some(json!("registered"))), None)
        .unwrap();

    let extra: PlainFn = Arc::new(|_: &HookArgs| -> ImplResult { Ok(Some(json!("extra"))) });
    let hook = pm.hook("he_method1").unwrap();
    let result = hook
        .call_extra([(extra, ArgNames::new(["arg"]))], &arg(0))
        .unwrap();

    assert_eq!(result.into_vec(), vec![json!("extra"), json!("registered")]);
    assert_eq!(hook.len(), 1);
}

// ═══════════════════════════════════════════════════════════════════════════════
// MONITORING
// ═══════════════════════════════════════════════════════════════════════════════

/// Monitors see every call and its outcome until undone.
#[test]
fn monitoring_observes_calls() {
    let mut pm = manager_with_specs();
    pm.register(answering("a", Some(json!(1))), None).unwrap();

    let events = Arc::new(Mutex::new(Vec::new()));
    let before_events = Arc::clone(&events);
    let after_events = Arc::clone(&events);
    let monitor = pm.add_hookcall_monitoring(
        move |hook, impls, _| before_events.lock().push(format!("before {hook} {}", impls.len())),
        move |outcome, hook, _, _| {
            let result = outcome.result().map(ToString::to_string).unwrap_or_default();
            after_events.lock().push(format!("after {hook} {result}"));
        },
    );

    call(&pm, "he_method1", arg(0)).unwrap();
    monitor.undo();
    call(&pm, "he_method1", arg(0)).unwrap();

    assert_eq!(
        *events.lock(),
        vec!["before he_method1 1".to_string(), "after he_method1 [1]".to_string()]
    );
}
