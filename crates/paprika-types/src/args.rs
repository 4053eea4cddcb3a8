//! Weakly-typed action arguments.
//!
//! The planner sends `args` as an arbitrary JSON object: a target may arrive
//! as `{"id": "OnionBox"}`, `{"name": "OnionBox"}`, `{"target": [1, 0, 2]}`
//! or `{"x": 1, "z": 2}`. [`ArgValue`] captures every shape at the boundary
//! and [`ActionArgs`] offers the few typed accessors the handlers need, so
//! every handler surfaces the same [`ArgError`] for the same mistake.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Errors raised while converting a weakly-typed argument.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgError {
    /// A required key is absent, null, or an empty string.
    #[error("missing argument '{key}'")]
    Missing {
        /// The key the handler looked for.
        key: String,
    },

    /// A key is present but its value has the wrong shape.
    #[error("invalid argument '{key}': {reason}")]
    Invalid {
        /// The offending key.
        key: String,
        /// What was wrong with the value.
        reason: String,
    },
}

impl ArgError {
    fn invalid(key: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key: key.to_owned(),
            reason: reason.into(),
        }
    }
}

/// A single argument value of unknown shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    /// JSON `null`.
    Null,
    /// A boolean.
    Bool(bool),
    /// Any JSON number.
    Number(f64),
    /// A string.
    Text(String),
    /// A list of values (coordinates arrive this way).
    List(Vec<ArgValue>),
    /// A nested object.
    Map(BTreeMap<String, ArgValue>),
}

impl ArgValue {
    /// Interpret the value as a number. Numeric strings are accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Render scalar values as text, the way an identifier is expected.
    ///
    /// Returns `None` for null, lists and maps.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Text(s) => Some(s.clone()),
            Self::Number(n) => Some(format!("{n}")),
            Self::Bool(b) => Some(b.to_string()),
            Self::Null | Self::List(_) | Self::Map(_) => None,
        }
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// The argument map of one action step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionArgs(BTreeMap<String, ArgValue>);

impl ActionArgs {
    /// Create an empty argument map.
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert, mostly useful in tests and scripted plans.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<ArgValue>) -> Self {
        self.0.insert(key.to_owned(), value.into());
        self
    }

    /// Look up a raw value.
    pub fn get(&self, key: &str) -> Option<&ArgValue> {
        self.0.get(key)
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Read an optional identifier-like string.
    ///
    /// Null and empty strings count as absent.
    ///
    /// # Errors
    ///
    /// Returns [`ArgError::Invalid`] if the value is a list or a map.
    pub fn text(&self, key: &str) -> Result<Option<String>, ArgError> {
        match self.0.get(key) {
            None | Some(ArgValue::Null) => Ok(None),
            Some(value) => value
                .as_text()
                .map(|s| Some(s).filter(|s| !s.trim().is_empty()))
                .ok_or_else(|| ArgError::invalid(key, "expected a string")),
        }
    }

    /// Read an optional number. Numeric strings are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`ArgError::Invalid`] if the value is present but not numeric.
    pub fn number(&self, key: &str) -> Result<Option<f64>, ArgError> {
        match self.0.get(key) {
            None | Some(ArgValue::Null) => Ok(None),
            Some(value) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| ArgError::invalid(key, "expected a number")),
        }
    }

    /// The logical target of an interaction: `name` first, then `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ArgError::Missing`] when neither key carries a non-empty
    /// value, or [`ArgError::Invalid`] when one has the wrong shape.
    pub fn target_name(&self) -> Result<String, ArgError> {
        if let Some(name) = self.text("name")? {
            return Ok(name);
        }
        self.text("id")?.ok_or_else(|| ArgError::Missing {
            key: "id".to_owned(),
        })
    }

    /// An explicit coordinate, either `target: [x, y, z]` or `x`/`z` with an
    /// optional `y` (defaulting to zero).
    ///
    /// Returns `Ok(None)` when no coordinate keys are present.
    ///
    /// # Errors
    ///
    /// Returns [`ArgError::Invalid`] when the coordinate keys are present
    /// but malformed.
    pub fn coordinate(&self) -> Result<Option<[f64; 3]>, ArgError> {
        if let Some(target) = self.0.get("target") {
            let ArgValue::List(items) = target else {
                return Err(ArgError::invalid("target", "expected [x, y, z]"));
            };
            let numbers: Option<Vec<f64>> = items.iter().map(ArgValue::as_f64).collect();
            return match numbers.as_deref() {
                Some([x, y, z, ..]) => Ok(Some([*x, *y, *z])),
                _ => Err(ArgError::invalid(
                    "target",
                    "expected at least three numeric components",
                )),
            };
        }

        match (self.number("x")?, self.number("z")?) {
            (Some(x), Some(z)) => {
                let y = self.number("y")?.unwrap_or(0.0);
                Ok(Some([x, y, z]))
            }
            _ => Ok(None),
        }
    }
}

impl FromIterator<(String, ArgValue)> for ActionArgs {
    fn from_iter<T: IntoIterator<Item = (String, ArgValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
