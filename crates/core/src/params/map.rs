//! Case-insensitive parameter map.

use std::collections::BTreeMap;

use folio_shared::{ParamType, Value};
use serde::{Deserialize, Serialize};

use super::error::ParameterError;

/// A named, typed report parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Name as supplied (original spelling).
    pub name: String,
    /// Typed value.
    pub value: Value,
    /// Declared type, used for coercion by data sources.
    pub param_type: ParamType,
}

impl Parameter {
    /// Creates a parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<Value>, param_type: ParamType) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            param_type,
        }
    }

    /// Creates a text parameter.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, Value::Text(value.into()), ParamType::String)
    }
}

/// Normalizes a parameter name into its map key.
///
/// Trims whitespace, drops one leading `@` and lowercases, so that `@Month`,
/// `month` and ` MONTH ` all address the same parameter.
#[must_use]
pub fn normalize_key(name: &str) -> String {
    let trimmed = name.trim();
    trimmed
        .strip_prefix('@')
        .unwrap_or(trimmed)
        .trim()
        .to_lowercase()
}

/// Parameters keyed case-insensitively by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterMap {
    entries: BTreeMap<String, Parameter>,
}

impl ParameterMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map holds no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if a parameter with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&normalize_key(name))
    }

    /// Looks a parameter up by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.entries.get(&normalize_key(name))
    }

    /// Looks a parameter value up by name.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.get(name).map(|p| &p.value)
    }

    /// Inserts a new parameter, rejecting blank and duplicate names.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::DuplicateName`] if the name is already
    /// present and [`ParameterError::EmptyName`] if it is blank.
    pub fn insert(&mut self, parameter: Parameter) -> Result<(), ParameterError> {
        let key = normalize_key(&parameter.name);
        if key.is_empty() {
            return Err(ParameterError::EmptyName {
                position: self.entries.len(),
            });
        }
        if self.entries.contains_key(&key) {
            return Err(ParameterError::DuplicateName(parameter.name));
        }
        self.entries.insert(key, parameter);
        Ok(())
    }

    /// Inserts the parameter only if the name is free. Never overwrites.
    ///
    /// Returns true if the parameter was added.
    pub fn insert_if_absent(&mut self, parameter: Parameter) -> bool {
        let key = normalize_key(&parameter.name);
        if key.is_empty() || self.entries.contains_key(&key) {
            return false;
        }
        self.entries.insert(key, parameter);
        true
    }

    /// Iterates parameters ordered by normalized name.
    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.entries.values()
    }
}

impl<'a> IntoIterator for &'a ParameterMap {
    type Item = &'a Parameter;
    type IntoIter = std::collections::btree_map::Values<'a, String, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}
