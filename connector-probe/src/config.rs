use anyhow::{anyhow, Context, Result};
use connectors::oauth::{OAuthConfig, OAuthToken};
use connectors::paramsbuilder::ApiModule;
use connectors::providers::ProviderInfo;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

pub const DEFAULT_CONFIG_PATH: &str = "connector-probe.toml";

/// Complete probe configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeConfig {
    /// Optional provider catalog overlaid on the built-in one
    #[serde(default)]
    pub catalog_path: Option<String>,
    /// Path (under the API module) to GET once the connector is built
    #[serde(default)]
    pub probe_path: Option<String>,
    #[serde(default)]
    pub connector: ConnectorSection,
    #[serde(default)]
    pub oauth: OAuthSection,
    #[serde(default)]
    pub token: TokenSection,
    #[serde(default)]
    pub substitutions: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectorSection {
    #[serde(default)]
    pub workspace: String,
    #[serde(default = "default_module_version")]
    pub module_version: String,
}

fn default_module_version() -> String {
    "v2".to_string()
}

impl Default for ConnectorSection {
    fn default() -> Self {
        Self {
            workspace: String::new(),
            module_version: default_module_version(),
        }
    }
}

/// OAuth client registration; endpoints fall back to the catalog's
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OAuthSection {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub auth_url: Option<String>,
    #[serde(default)]
    pub token_url: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenSection {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl ProbeConfig {
    /// Load from `path` if it exists, then overlay environment variables.
    ///
    /// A missing file is only an error when `required` is set, so the probe
    /// can run from environment variables alone.
    pub fn load(path: &str, required: bool) -> Result<Self> {
        let mut config = if required || Path::new(path).exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path))?
        } else {
            Self::default()
        };

        config.apply_env();
        Ok(config)
    }

    /// Override fields from `CONNECTOR_PROBE_*` environment variables.
    pub fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("CONNECTOR_PROBE_WORKSPACE") {
            self.connector.workspace = v;
        }
        if let Ok(v) = std::env::var("CONNECTOR_PROBE_CLIENT_ID") {
            self.oauth.client_id = v;
        }
        if let Ok(v) = std::env::var("CONNECTOR_PROBE_CLIENT_SECRET") {
            self.oauth.client_secret = v;
        }
        if let Ok(v) = std::env::var("CONNECTOR_PROBE_ACCESS_TOKEN") {
            self.token.access_token = v;
        }
        if let Ok(v) = std::env::var("CONNECTOR_PROBE_REFRESH_TOKEN") {
            if !v.is_empty() {
                self.token.refresh_token = Some(v);
            }
        }
    }

    pub fn module(&self) -> ApiModule {
        ApiModule::new("api", self.connector.module_version.clone())
    }

    /// OAuth config, taking endpoints missing from the file from `info`.
    pub fn oauth_config(&self, info: &ProviderInfo) -> Result<OAuthConfig> {
        let endpoints = info.oauth.as_ref();

        let auth_url = match (&self.oauth.auth_url, endpoints) {
            (Some(url), _) => url.clone(),
            (None, Some(e)) => e.auth_url.clone(),
            (None, None) => return Err(anyhow!("oauth.auth_url is not set and the catalog has none")),
        };
        let token_url = match (&self.oauth.token_url, endpoints) {
            (Some(url), _) => url.clone(),
            (None, Some(e)) => e.token_url.clone(),
            (None, None) => return Err(anyhow!("oauth.token_url is not set and the catalog has none")),
        };

        Ok(OAuthConfig {
            client_id: self.oauth.client_id.clone(),
            client_secret: self.oauth.client_secret.clone(),
            auth_url,
            token_url,
            scopes: self.oauth.scopes.clone(),
            redirect_url: None,
        })
    }

    pub fn oauth_token(&self) -> OAuthToken {
        OAuthToken {
            access_token: self.token.access_token.clone(),
            refresh_token: self.token.refresh_token.clone(),
            token_type: Some("Bearer".to_string()),
            expiry: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connectors::providers::{AuthType, OAuthEndpoints};
    use std::collections::BTreeMap;
    use std::io::Write;
    use std::sync::Mutex;

    // Serialize all env-var-mutating tests to avoid race conditions between
    // tests that run concurrently but share the process-wide env.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const ENV_VARS: &[&str] = &[
        "CONNECTOR_PROBE_WORKSPACE",
        "CONNECTOR_PROBE_CLIENT_ID",
        "CONNECTOR_PROBE_CLIENT_SECRET",
        "CONNECTOR_PROBE_ACCESS_TOKEN",
        "CONNECTOR_PROBE_REFRESH_TOKEN",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
    }

    fn gong_info() -> ProviderInfo {
        ProviderInfo {
            display_name: "Gong".to_string(),
            auth_type: AuthType::Oauth2,
            base_url: "https://api.gong.io".to_string(),
            oauth: Some(OAuthEndpoints {
                auth_url: "https://app.gong.io/oauth2/authorize".to_string(),
                token_url: "https://app.gong.io/oauth2/generate-customer-token".to_string(),
            }),
            options: BTreeMap::new(),
        }
    }

    #[test]
    fn test_default_config() {
        let config = ProbeConfig::default();
        assert_eq!(config.connector.module_version, "v2");
        assert!(config.connector.workspace.is_empty());
        assert!(config.probe_path.is_none());
    }

    #[test]
    fn test_config_deserialization() {
        let toml = r#"
            probe_path = "users"

            [connector]
            workspace = "acme"
            module_version = "v3"

            [oauth]
            client_id = "cid"
            client_secret = "secret"
            scopes = ["api:users:read"]

            [token]
            access_token = "access"
            refresh_token = "refresh"

            [substitutions]
            region = "eu"
        "#;

        let config: ProbeConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.probe_path.as_deref(), Some("users"));
        assert_eq!(config.connector.workspace, "acme");
        assert_eq!(config.module().version, "v3");
        assert_eq!(config.oauth.scopes, vec!["api:users:read"]);
        assert_eq!(config.token.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(config.substitutions.get("region").map(String::as_str), Some("eu"));
    }

    #[test]
    fn test_partial_config() {
        let toml = r#"
            [connector]
            workspace = "acme"
        "#;

        let config: ProbeConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.connector.module_version, "v2"); // Default
        assert!(config.oauth.client_id.is_empty());
    }

    #[test]
    fn test_load_missing_optional_file_uses_env() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();
        std::env::set_var("CONNECTOR_PROBE_WORKSPACE", "from-env");
        std::env::set_var("CONNECTOR_PROBE_ACCESS_TOKEN", "tok");

        let config = ProbeConfig::load("/nonexistent/probe.toml", false).unwrap();
        assert_eq!(config.connector.workspace, "from-env");
        assert_eq!(config.token.access_token, "tok");

        clear_env();
    }

    #[test]
    fn test_load_missing_required_file() {
        let _lock = ENV_LOCK.lock().unwrap();
        let err = ProbeConfig::load("/nonexistent/probe.toml", true).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/probe.toml"));
    }

    #[test]
    fn test_env_overrides_file() {
        let _lock = ENV_LOCK.lock().unwrap();
        clear_env();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
            [connector]
            workspace = "from-file"

            [token]
            access_token = "file-token"
            "#
        )
        .unwrap();

        std::env::set_var("CONNECTOR_PROBE_WORKSPACE", "from-env");
        std::env::set_var("CONNECTOR_PROBE_REFRESH_TOKEN", "env-refresh");

        let path = file.path().to_str().unwrap();
        let config = ProbeConfig::load(path, true).unwrap();
        assert_eq!(config.connector.workspace, "from-env");
        assert_eq!(config.token.access_token, "file-token");
        assert_eq!(config.token.refresh_token.as_deref(), Some("env-refresh"));

        clear_env();
    }

    #[test]
    fn test_oauth_config_falls_back_to_catalog() {
        let mut config = ProbeConfig::default();
        config.oauth.client_id = "cid".to_string();

        let oauth = config.oauth_config(&gong_info()).unwrap();
        assert_eq!(oauth.token_url, "https://app.gong.io/oauth2/generate-customer-token");
        assert_eq!(oauth.client_id, "cid");

        config.oauth.token_url = Some("https://override.example.com/token".to_string());
        let oauth = config.oauth_config(&gong_info()).unwrap();
        assert_eq!(oauth.token_url, "https://override.example.com/token");
    }

    #[test]
    fn test_oauth_config_without_endpoints() {
        let mut info = gong_info();
        info.oauth = None;

        let err = ProbeConfig::default().oauth_config(&info).unwrap_err();
        assert!(err.to_string().contains("oauth.auth_url"));
    }
}
