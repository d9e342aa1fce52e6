use super::{
    AuthType, OAuthEndpoints, ProviderError, ProviderInfo, ProviderRegistry, GONG, HUBSPOT,
    SALESFORCE, ZENDESK_SUPPORT,
};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::debug;

/// In-memory provider catalog.
///
/// Loadable from TOML:
///
/// ```toml
/// [providers.gong]
/// display_name = "Gong"
/// auth_type = "oauth2"
/// base_url = "https://api.gong.io"
///
/// [providers.gong.oauth]
/// auth_url = "https://app.gong.io/oauth2/authorize"
/// token_url = "https://app.gong.io/oauth2/generate-customer-token"
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    providers: HashMap<String, ProviderInfo>,
}

impl Catalog {
    /// Catalog with no providers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog of the providers this crate ships connectors or metadata for.
    pub fn builtin() -> Self {
        let mut catalog = Self::new();

        catalog.insert(
            GONG,
            ProviderInfo {
                display_name: "Gong".to_string(),
                auth_type: AuthType::Oauth2,
                base_url: "https://api.gong.io".to_string(),
                oauth: Some(OAuthEndpoints {
                    auth_url: "https://app.gong.io/oauth2/authorize".to_string(),
                    token_url: "https://app.gong.io/oauth2/generate-customer-token".to_string(),
                }),
                options: BTreeMap::new(),
            },
        );

        let mut salesforce_options = BTreeMap::new();
        salesforce_options.insert(
            "restAPIURL".to_string(),
            "https://{{.workspace}}.my.salesforce.com/services/data/v59.0".to_string(),
        );
        catalog.insert(
            SALESFORCE,
            ProviderInfo {
                display_name: "Salesforce".to_string(),
                auth_type: AuthType::Oauth2,
                base_url: "https://{{.workspace}}.my.salesforce.com".to_string(),
                oauth: Some(OAuthEndpoints {
                    auth_url: "https://{{.workspace}}.my.salesforce.com/services/oauth2/authorize"
                        .to_string(),
                    token_url: "https://{{.workspace}}.my.salesforce.com/services/oauth2/token"
                        .to_string(),
                }),
                options: salesforce_options,
            },
        );

        catalog.insert(
            HUBSPOT,
            ProviderInfo {
                display_name: "HubSpot".to_string(),
                auth_type: AuthType::Oauth2,
                base_url: "https://api.hubapi.com".to_string(),
                oauth: Some(OAuthEndpoints {
                    auth_url: "https://app.hubspot.com/oauth/authorize".to_string(),
                    token_url: "https://api.hubapi.com/oauth/v1/token".to_string(),
                }),
                options: BTreeMap::new(),
            },
        );

        catalog.insert(
            ZENDESK_SUPPORT,
            ProviderInfo {
                display_name: "Zendesk Support".to_string(),
                auth_type: AuthType::Oauth2,
                base_url: "https://{{.workspace}}.zendesk.com".to_string(),
                oauth: Some(OAuthEndpoints {
                    auth_url: "https://{{.workspace}}.zendesk.com/oauth/authorizations/new"
                        .to_string(),
                    token_url: "https://{{.workspace}}.zendesk.com/oauth/tokens".to_string(),
                }),
                options: BTreeMap::new(),
            },
        );

        catalog
    }

    /// Parse a catalog from TOML.
    pub fn from_toml_str(contents: &str) -> Result<Self, ProviderError> {
        toml::from_str(contents).map_err(|e| ProviderError::InvalidCatalog(e.to_string()))
    }

    /// Load a catalog from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ProviderError::InvalidCatalog(format!("{}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Add or replace a provider entry.
    pub fn insert(&mut self, provider: impl Into<String>, info: ProviderInfo) {
        self.providers.insert(provider.into(), info);
    }

    /// Overlay `other` on top of this catalog; entries in `other` win.
    pub fn merge(mut self, other: Catalog) -> Self {
        self.providers.extend(other.providers);
        self
    }

    pub fn contains(&self, provider: &str) -> bool {
        self.providers.contains_key(provider)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl ProviderRegistry for Catalog {
    fn read_info(
        &self,
        provider: &str,
        substitutions: &HashMap<String, String>,
    ) -> Result<ProviderInfo, ProviderError> {
        let template = self
            .providers
            .get(provider)
            .ok_or_else(|| ProviderError::UnknownProvider(provider.to_string()))?;

        if template.base_url.trim().is_empty() {
            return Err(ProviderError::MissingBaseUrl(provider.to_string()));
        }

        let info = template.resolve(substitutions)?;
        if info.base_url.trim().is_empty() {
            return Err(ProviderError::MissingBaseUrl(provider.to_string()));
        }

        debug!(provider = %provider, base_url = %info.base_url, "Resolved provider info");

        Ok(info)
    }
}
