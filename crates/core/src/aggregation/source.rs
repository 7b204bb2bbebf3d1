//! Data-source port and source descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DataSourceError;
use super::table::ResultSet;
use crate::params::ParameterMap;

/// Ordered list of data-source names, invoked once each per execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor(Vec<String>);

impl SourceDescriptor {
    /// Parses the semicolon-delimited source field. Blank entries are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError::InvalidName`] if no source name remains.
    pub fn parse(raw: &str) -> Result<Self, DataSourceError> {
        let names: Vec<String> = raw
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(ToString::to_string)
            .collect();
        Self::new(names)
    }

    /// Creates a descriptor from source names.
    ///
    /// # Errors
    ///
    /// Returns [`DataSourceError::InvalidName`] if the list is empty or
    /// contains a blank name.
    pub fn new(names: Vec<String>) -> Result<Self, DataSourceError> {
        if names.is_empty() {
            return Err(DataSourceError::InvalidName(
                "no data sources configured".to_string(),
            ));
        }
        if names.iter().any(|n| n.trim().is_empty()) {
            return Err(DataSourceError::InvalidName("blank data source name".to_string()));
        }
        Ok(Self(names))
    }

    /// First source, whose declared parameters drive gap-filling.
    #[must_use]
    pub fn primary(&self) -> &str {
        self.0.first().map_or("", String::as_str)
    }

    /// Source names in invocation order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Names joined with `;`, the key of the column-mapping lookup.
    #[must_use]
    pub fn joined(&self) -> String {
        self.0.join(";")
    }
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

/// A parameter declared by a data source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredParameter {
    /// Parameter name, possibly `@`-prefixed.
    pub name: String,
    /// SQL type name as reported by the source.
    pub type_name: String,
    /// Whether the source accepts null.
    pub nullable: bool,
    /// Default expression, if any.
    pub default: Option<String>,
}

impl DeclaredParameter {
    /// Creates a declaration.
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, nullable: bool) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            nullable,
            default: None,
        }
    }
}

/// Executes named data retrieval operations.
///
/// Implemented by the database crate. Implementations apply their own
/// timeouts; parameters not declared by a source are ignored.
pub trait DataSource: Send + Sync {
    /// Invokes a source with the given parameters.
    fn execute(
        &self,
        source: &str,
        params: &ParameterMap,
    ) -> impl std::future::Future<Output = Result<Vec<ResultSet>, DataSourceError>> + Send;

    /// Lists the parameters a source declares.
    fn declared_parameters(
        &self,
        source: &str,
    ) -> impl std::future::Future<Output = Result<Vec<DeclaredParameter>, DataSourceError>> + Send;
}
