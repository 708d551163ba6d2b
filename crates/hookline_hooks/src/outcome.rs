//! Aggregated results and the outcome wrapper seen by hookwrappers and monitors.

use core::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::error::CallError;

// ─────────────────────────────────────────────────────────────────────────────
// HookReturn
// ─────────────────────────────────────────────────────────────────────────────

/// Aggregated return value of a hook call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum HookReturn {
    /// Every non-absent result, in execution order.
    All(Vec<Value>),
    /// The first non-absent result of a firstresult hook, if any.
    First(Option<Value>),
}

impl HookReturn {
    /// Returns the collected results.
    ///
    /// A firstresult return yields zero or one element.
    #[must_use]
    pub fn into_vec(self) -> Vec<Value> {
        match self {
            HookReturn::All(values) => values,
            HookReturn::First(value) => value.into_iter().collect(),
        }
    }

    /// Returns the single firstresult value, or the first collected value.
    #[must_use]
    pub fn into_first(self) -> Option<Value> {
        match self {
            HookReturn::All(values) => values.into_iter().next(),
            HookReturn::First(value) => value,
        }
    }

    /// Borrows the collected results of a non-firstresult call.
    #[must_use]
    pub fn as_all(&self) -> Option<&[Value]> {
        match self {
            HookReturn::All(values) => Some(values),
            HookReturn::First(_) => None,
        }
    }

    /// Borrows the firstresult value.
    #[must_use]
    pub fn as_first(&self) -> Option<&Value> {
        match self {
            HookReturn::First(value) => value.as_ref(),
            HookReturn::All(_) => None,
        }
    }

    /// Returns true if no value was produced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            HookReturn::All(values) => values.is_empty(),
            HookReturn::First(value) => value.is_none(),
        }
    }
}

/// Renders the JSON form: an array for collected results, the bare value
/// (or `null`) for firstresult.
impl fmt::Display for HookReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Outcome
// ─────────────────────────────────────────────────────────────────────────────

/// Either the aggregated result of a call or the failure it raised.
///
/// Hookwrappers receive a mutable outcome in
/// [`HookWrapper::after`](crate::implementation::HookWrapper::after);
/// call monitors receive it by reference.
#[derive(Debug, Clone)]
pub struct Outcome {
    result: Result<HookReturn, CallError>,
}

impl Outcome {
    /// Wraps an already computed result.
    #[must_use]
    pub fn new(result: Result<HookReturn, CallError>) -> Self {
        Self { result }
    }

    /// Runs `f` and captures its result or failure.
    pub fn from_call(f: impl FnOnce() -> Result<HookReturn, CallError>) -> Self {
        Self::new(f())
    }

    /// Borrows the result or the failure.
    pub fn result(&self) -> Result<&HookReturn, &CallError> {
        self.result.as_ref()
    }

    /// The failure, if the call raised one.
    #[must_use]
    pub fn excinfo(&self) -> Option<&CallError> {
        self.result.as_ref().err()
    }

    /// True if the call produced a result.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Replaces the outcome with `result`, discarding any failure.
    pub fn force_result(&mut self, result: HookReturn) {
        self.result = Ok(result);
    }

    /// Replaces the outcome with `error`.
    pub fn force_exception(&mut self, error: CallError) {
        self.result = Err(error);
    }

    /// Consumes the outcome, returning the result or re-raising the failure.
    ///
    /// # Errors
    ///
    /// Returns the captured failure.
    pub fn get_result(self) -> Result<HookReturn, CallError> {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn into_vec_and_first() {
        let all = HookReturn::All(vec![json!(1), json!(2)]);
        assert_eq!(all.clone().into_first(), Some(json!(1)));
        assert_eq!(all.into_vec(), vec![json!(1), json!(2)]);

        let first = HookReturn::First(Some(json!("a")));
        assert_eq!(first.into_vec(), vec![json!("a")]);
        assert!(HookReturn::First(None).is_empty());
    }

    #[test]
    fn display_renders_json() {
        assert_eq!(HookReturn::All(vec![json!(1), json!("a")]).to_string(), r#"[1,"a"]"#);
        assert_eq!(HookReturn::First(None).to_string(), "null");
        assert_eq!(HookReturn::First(Some(json!({"k": 2}))).to_string(), r#"{"k":2}"#);
    }

    #[test]
    fn force_result_clears_failure() {
        let mut outcome = Outcome::from_call(|| Err(CallError::custom("boom")));
        assert!(outcome.excinfo().is_some());

        outcome.force_result(HookReturn::All(vec![json!(3)]));
        assert!(outcome.is_ok());
        assert_eq!(outcome.get_result().unwrap().into_vec(), vec![json!(3)]);
    }

    #[test]
    fn force_exception_replaces_result() {
        let mut outcome = Outcome::new(Ok(HookReturn::First(Some(json!(1)))));
        outcome.force_exception(CallError::custom("vetoed"));
        let err = outcome.get_result().unwrap_err();
        assert_eq!(err.to_string(), "vetoed");
    }
}
