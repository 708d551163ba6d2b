//! Call arguments and declared parameter names.
//!
//! A hook call carries a [`HookArgs`] bag of named JSON values. Each
//! implementation declares the names it consumes through [`ArgNames`]; the
//! executor hands it only that subset (see [`HookArgs::select`]).
//!
//! # Example
//!
//! ```
//! use hookline_hooks::args::{ArgNames, HookArgs};
//! use serde_json::json;
//!
//! let args = HookArgs::new()
//!     .with("config", json!({"verbose": true}))
//!     .with("path", json!("/tmp/out"));
//!
//! let wanted = ArgNames::new(["path"]);
//! let subset = args.select(&wanted).unwrap();
//! assert_eq!(subset.len(), 1);
//! assert_eq!(subset.get("path"), Some(&json!("/tmp/out")));
//! ```

use core::fmt;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CallError;

// ─────────────────────────────────────────────────────────────────────────────
// HookArgs
// ─────────────────────────────────────────────────────────────────────────────

/// Named arguments of a single hook call, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HookArgs {
    values: IndexMap<String, Value>,
}

impl HookArgs {
    /// Creates an empty argument bag.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: IndexMap::new(),
        }
    }

    /// Adds an argument, builder style.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or replaces an argument, returning the previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(name.into(), value.into())
    }

    /// Returns the raw value of an argument.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Decodes an argument into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::MissingArgument`] if the argument is absent and
    /// [`CallError::InvalidArgument`] if it does not decode.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<T, CallError> {
        let value = self
            .values
            .get(name)
            .ok_or_else(|| CallError::MissingArgument {
                argument: name.to_string(),
            })?;
        T::deserialize(value).map_err(|err| CallError::InvalidArgument {
            argument: name.to_string(),
            reason: err.to_string(),
        })
    }

    /// Returns true if the argument is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Iterates over argument names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Iterates over `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no arguments are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Extracts the arguments declared by `wanted`.
    ///
    /// Required names must be present; defaulted names are forwarded only
    /// when the caller supplied them. The result follows declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`CallError::MissingArgument`] for the first absent required name.
    pub fn select(&self, wanted: &ArgNames) -> Result<HookArgs, CallError> {
        let mut selected = IndexMap::with_capacity(wanted.len());
        for name in &wanted.required {
            let value = self
                .values
                .get(name)
                .ok_or_else(|| CallError::MissingArgument {
                    argument: name.clone(),
                })?;
            selected.insert(name.clone(), value.clone());
        }
        for name in &wanted.defaulted {
            if let Some(value) = self.values.get(name) {
                selected.insert(name.clone(), value.clone());
            }
        }
        Ok(HookArgs { values: selected })
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for HookArgs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl TryFrom<Value> for HookArgs {
    type Error = CallError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(CallError::custom(format!(
                "hook arguments must be a JSON object, got {other}"
            ))),
        }
    }
}

impl fmt::Display for HookArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, value)) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        f.write_str("}")
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ArgNames
// ─────────────────────────────────────────────────────────────────────────────

/// Parameter names declared by an implementation or specification.
///
/// Split into required names (must be supplied by every call) and defaulted
/// names (forwarded when present, never validated against a spec).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgNames {
    /// Names that must be present in the call.
    pub required: Vec<String>,
    /// Names that carry a default on the implementation side.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub defaulted: Vec<String>,
}

impl ArgNames {
    /// Declares the given required parameter names.
    #[must_use]
    pub fn new<I, S>(required: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required: required.into_iter().map(Into::into).collect(),
            defaulted: Vec::new(),
        }
    }

    /// Declares no parameters at all.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Adds parameters that have a default value.
    #[must_use]
    pub fn with_defaults<I, S>(mut self, defaulted: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.defaulted.extend(defaulted.into_iter().map(Into::into));
        self
    }

    /// Returns true if `name` is declared, required or defaulted.
    #[must_use]
    pub fn declares(&self, name: &str) -> bool {
        self.required.iter().chain(&self.defaulted).any(|n| n == name)
    }

    /// Total number of declared names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.required.len() + self.defaulted.len()
    }

    /// Returns true if nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.defaulted.is_empty()
    }

    /// Renders the call signature of `function`, e.g. `on_save(path, force=...)`.
    #[must_use]
    pub fn format_def(&self, function: &str) -> String {
        let params: Vec<String> = self
            .required
            .iter()
            .cloned()
            .chain(self.defaulted.iter().map(|name| format!("{name}=...")))
            .collect();
        format!("{function}({})", params.join(", "))
    }
}
