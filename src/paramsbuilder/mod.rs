//! Reusable parameter blocks shared by connector builders.
//!
//! Each block owns its own validation rule. A connector's parameter record
//! composes the blocks it needs and runs every rule through
//! [`ValidationErrors::collect`], so callers see all violations at once.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single violated parameter rule.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamsError {
    /// Workspace name is absent or blank
    MissingWorkspace,
    /// API module was set without a usable version
    InvalidModule(String),
}

impl fmt::Display for ParamsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamsError::MissingWorkspace => write!(f, "missing workspace name"),
            ParamsError::InvalidModule(label) => {
                write!(f, "invalid API module '{}': version is required", label)
            }
        }
    }
}

impl std::error::Error for ParamsError {}

/// Every rule violation found in one validation pass, in rule order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationErrors(Vec<ParamsError>);

impl ValidationErrors {
    /// Merge the outcome of several independent rule checks.
    ///
    /// Returns `Ok(())` only when every check passed.
    pub fn collect<I>(results: I) -> Result<(), ValidationErrors>
    where
        I: IntoIterator<Item = Result<(), ValidationErrors>>,
    {
        let mut all = Vec::new();
        for result in results {
            if let Err(ValidationErrors(errs)) = result {
                all.extend(errs);
            }
        }

        if all.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(all))
        }
    }

    pub fn errors(&self) -> &[ParamsError] {
        &self.0
    }

    pub fn contains(&self, err: &ParamsError) -> bool {
        self.0.contains(err)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<ParamsError> for ValidationErrors {
    fn from(err: ParamsError) -> Self {
        ValidationErrors(vec![err])
    }
}

impl From<Vec<ParamsError>> for ValidationErrors {
    fn from(errs: Vec<ParamsError>) -> Self {
        ValidationErrors(errs)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ");
        write!(f, "{}", joined)
    }
}

impl std::error::Error for ValidationErrors {}

/// Local parameter validation. Implementations must not perform I/O.
pub trait ValidateParams {
    fn validate_params(&self) -> Result<(), ValidationErrors>;
}

/// Tenant or instance the connector talks to.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub name: String,
}

impl Workspace {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl ValidateParams for Workspace {
    fn validate_params(&self) -> Result<(), ValidationErrors> {
        if self.name.trim().is_empty() {
            return Err(ParamsError::MissingWorkspace.into());
        }
        Ok(())
    }
}

/// Selects which API surface and version a connector addresses.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiModule {
    /// Human readable surface name, e.g. "api"
    pub label: String,
    /// Version path segment, e.g. "v2"
    pub version: String,
}

impl ApiModule {
    pub fn new(label: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            version: version.into(),
        }
    }

    /// Path prefix for requests against this module (`"v2"`, or `""`).
    pub fn path(&self) -> &str {
        self.version.trim_matches('/')
    }
}

impl ValidateParams for ApiModule {
    fn validate_params(&self) -> Result<(), ValidationErrors> {
        if self.version.trim().is_empty() {
            return Err(ParamsError::InvalidModule(self.label.clone()).into());
        }
        Ok(())
    }
}
