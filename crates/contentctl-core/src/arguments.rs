//! Named arguments supplied with an operation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ContractError;

/// Argument names as they appear in records (`space_id`, `document_file`, ...).
///
/// Backed by an ordered map so serialised records are byte-stable. A JSON
/// `null` is treated exactly like an absent argument.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    /// Empty argument set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an argument.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Builder-style [`Arguments::insert`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Raw value, skipping explicit nulls.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|value| !value.is_null())
    }

    /// Whether a non-null value was supplied.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Number of stored entries, nulls included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over stored entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// A scalar rendered as text. Strings pass through, numbers are formatted.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::InvalidArgument`] for booleans, arrays, and objects.
    pub fn text(&self, name: &str) -> Result<Option<String>, ContractError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.clone())),
            Some(Value::Number(value)) => Ok(Some(value.to_string())),
            Some(_) => Err(ContractError::invalid(name, "expected a string")),
        }
    }

    /// A non-negative integer, given either as a JSON number or a numeric string.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::InvalidArgument`] for negative, fractional, or
    /// non-numeric values.
    pub fn non_negative(&self, name: &str) -> Result<Option<u64>, ContractError> {
        const REASON: &str = "expected a non-negative integer";
        match self.get(name) {
            None => Ok(None),
            Some(Value::Number(value)) => value
                .as_u64()
                .map(Some)
                .ok_or_else(|| ContractError::invalid(name, REASON)),
            Some(Value::String(value)) => value
                .trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|_| ContractError::invalid(name, REASON)),
            Some(_) => Err(ContractError::invalid(name, REASON)),
        }
    }

    /// A boolean switch.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::InvalidArgument`] for non-boolean values.
    pub fn boolean(&self, name: &str) -> Result<Option<bool>, ContractError> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Bool(value)) => Ok(Some(*value)),
            Some(_) => Err(ContractError::invalid(name, "expected true or false")),
        }
    }

    /// A list of strings; a lone string counts as a one-element list.
    ///
    /// # Errors
    ///
    /// Returns [`ContractError::InvalidArgument`] when any element is not a string.
    pub fn strings(&self, name: &str) -> Result<Vec<String>, ContractError> {
        match self.get(name) {
            None => Ok(Vec::new()),
            Some(Value::String(value)) => Ok(vec![value.clone()]),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| ContractError::invalid(name, "expected a list of strings"))
                })
                .collect(),
            Some(_) => Err(ContractError::invalid(name, "expected a list of strings")),
        }
    }

    /// Underlying JSON map.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Arguments {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
