//! Provider metadata registry.
//!
//! Maps a provider identifier plus template substitutions to the
//! connection metadata a connector needs (base URL, OAuth endpoints,
//! provider-specific options).
//!
//! Catalog entries are templates: `{{.workspace}}` and friends are
//! replaced at lookup time.
//!
//! ```
//! use connectors::providers::{Catalog, ProviderRegistry, SALESFORCE};
//! use std::collections::HashMap;
//!
//! let mut subs = HashMap::new();
//! subs.insert("workspace".to_string(), "acme".to_string());
//!
//! let info = Catalog::builtin().read_info(SALESFORCE, &subs).unwrap();
//! assert_eq!(info.base_url, "https://acme.my.salesforce.com");
//! ```

mod catalog;
mod substitute;

pub use catalog::Catalog;
pub use substitute::substitute;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

pub const GONG: &str = "gong";
pub const SALESFORCE: &str = "salesforce";
pub const HUBSPOT: &str = "hubspot";
pub const ZENDESK_SUPPORT: &str = "zendeskSupport";

/// How a provider authenticates requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthType {
    Oauth2,
    ApiKey,
    Basic,
}

/// OAuth 2.0 endpoints published by a provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OAuthEndpoints {
    pub auth_url: String,
    pub token_url: String,
}

/// Resolved connection metadata for one provider.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProviderInfo {
    pub display_name: String,
    pub auth_type: AuthType,
    #[serde(default)]
    pub base_url: String,
    #[serde(default)]
    pub oauth: Option<OAuthEndpoints>,
    /// Provider-specific settings (e.g. alternate API roots)
    #[serde(default)]
    pub options: BTreeMap<String, String>,
}

impl ProviderInfo {
    /// Look up a provider-specific option.
    pub fn option(&self, name: &str) -> Option<&str> {
        self.options.get(name).map(String::as_str)
    }

    /// Apply template substitutions to every templated field.
    fn resolve(&self, substitutions: &HashMap<String, String>) -> Result<Self, ProviderError> {
        let oauth = match &self.oauth {
            Some(endpoints) => Some(OAuthEndpoints {
                auth_url: substitute(&endpoints.auth_url, substitutions)?,
                token_url: substitute(&endpoints.token_url, substitutions)?,
            }),
            None => None,
        };

        let mut options = BTreeMap::new();
        for (key, value) in &self.options {
            options.insert(key.clone(), substitute(value, substitutions)?);
        }

        Ok(Self {
            display_name: self.display_name.clone(),
            auth_type: self.auth_type,
            base_url: substitute(&self.base_url, substitutions)?,
            oauth,
            options,
        })
    }
}

/// Provider metadata lookup errors
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// Provider id not present in the registry
    UnknownProvider(String),
    /// Entry (or its substituted form) has no base URL
    MissingBaseUrl(String),
    /// A template variable had no substitution value
    MissingSubstitution(String),
    /// Catalog source could not be read or parsed
    InvalidCatalog(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::UnknownProvider(p) => {
                write!(f, "provider '{}' is not in the catalog", p)
            }
            ProviderError::MissingBaseUrl(p) => {
                write!(f, "provider '{}' has no base URL", p)
            }
            ProviderError::MissingSubstitution(var) => {
                write!(f, "no substitution supplied for template variable '{}'", var)
            }
            ProviderError::InvalidCatalog(msg) => write!(f, "invalid provider catalog: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Source of provider metadata.
///
/// Implementations must report an unknown provider or an empty base URL
/// as an error, never as a default value.
pub trait ProviderRegistry {
    fn read_info(
        &self,
        provider: &str,
        substitutions: &HashMap<String, String>,
    ) -> Result<ProviderInfo, ProviderError>;
}
