//! OAuth 2.0 materials consumed by the authenticated transport.
//!
//! [`OAuthConfig`] describes the client registration, [`OAuthToken`] the
//! tokens obtained for one user. Both are validated locally before a
//! transport is built from them.

mod refresh;

pub use refresh::refresh_token;

use crate::providers::OAuthEndpoints;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tokens expiring within this window are treated as already expired.
const EXPIRY_LEEWAY_SECONDS: i64 = 10;

/// OAuth client registration for one provider.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Authorization endpoint URL
    pub auth_url: String,
    /// Token endpoint URL (used for refresh)
    pub token_url: String,
    #[serde(default)]
    pub scopes: Vec<String>,
    #[serde(default)]
    pub redirect_url: Option<String>,
}

impl OAuthConfig {
    /// Build a config from a provider's published endpoints.
    pub fn from_endpoints(
        endpoints: &OAuthEndpoints,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            auth_url: endpoints.auth_url.clone(),
            token_url: endpoints.token_url.clone(),
            scopes: Vec::new(),
            redirect_url: None,
        }
    }

    /// Build the authorization URL the user is sent to, carrying `state`.
    pub fn auth_code_url(&self, state: &str) -> String {
        let scopes = self.scopes.join(" ");
        let mut url = format!(
            "{}?client_id={}&response_type=code&state={}",
            self.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(state)
        );
        if !scopes.is_empty() {
            url.push_str(&format!("&scope={}", urlencoding::encode(&scopes)));
        }
        if let Some(redirect) = &self.redirect_url {
            url.push_str(&format!("&redirect_uri={}", urlencoding::encode(redirect)));
        }
        url
    }

    /// Check the fields a token refresh depends on.
    pub fn validate(&self) -> Result<(), OAuthError> {
        if self.client_id.trim().is_empty() {
            return Err(OAuthError::MissingClientId);
        }
        if self.token_url.trim().is_empty() {
            return Err(OAuthError::MissingTokenUrl);
        }
        reqwest::Url::parse(&self.token_url)
            .map_err(|e| OAuthError::InvalidTokenUrl(format!("{}: {}", self.token_url, e)))?;
        Ok(())
    }
}

/// Tokens granted to one user.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    /// When the access token expires (UTC); `None` means it never does
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

impl OAuthToken {
    /// True if the access token is unusable without a refresh.
    pub fn is_expired(&self) -> bool {
        if self.access_token.is_empty() {
            return true;
        }
        match self.expiry {
            Some(expiry) => expiry - Duration::seconds(EXPIRY_LEEWAY_SECONDS) <= Utc::now(),
            None => false,
        }
    }

    /// A token is usable if it carries an access token or can obtain one.
    pub fn validate(&self) -> Result<(), OAuthError> {
        let has_refresh = self
            .refresh_token
            .as_deref()
            .map_or(false, |t| !t.is_empty());
        if self.access_token.is_empty() && !has_refresh {
            return Err(OAuthError::MissingToken);
        }
        Ok(())
    }
}

/// OAuth setup and refresh errors
#[derive(Debug, Clone, PartialEq)]
pub enum OAuthError {
    MissingClientId,
    MissingTokenUrl,
    InvalidTokenUrl(String),
    /// Neither an access token nor a refresh token was supplied
    MissingToken,
    /// Access token expired and there is nothing to refresh it with
    TokenExpired,
    /// The token endpoint rejected or failed the refresh
    RefreshFailed(String),
}

impl fmt::Display for OAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OAuthError::MissingClientId => write!(f, "OAuth client id is required"),
            OAuthError::MissingTokenUrl => write!(f, "OAuth token URL is required"),
            OAuthError::InvalidTokenUrl(msg) => write!(f, "invalid OAuth token URL {}", msg),
            OAuthError::MissingToken => {
                write!(f, "an access token or refresh token is required")
            }
            OAuthError::TokenExpired => {
                write!(f, "access token expired and no refresh token is available")
            }
            OAuthError::RefreshFailed(msg) => write!(f, "token refresh failed: {}", msg),
        }
    }
}

impl std::error::Error for OAuthError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> OAuthConfig {
        OAuthConfig {
            client_id: "test_client_id".to_string(),
            client_secret: "test_secret".to_string(),
            auth_url: "https://example.com/oauth/authorize".to_string(),
            token_url: "https://example.com/oauth/token".to_string(),
            scopes: vec!["read".to_string(), "write".to_string()],
            redirect_url: Some("http://localhost:3000/callback".to_string()),
        }
    }

    #[test]
    fn test_auth_code_url() {
        let url = config().auth_code_url("random_state");

        assert!(url.starts_with("https://example.com/oauth/authorize?"));
        assert!(url.contains("client_id=test_client_id"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fcallback"));
        // URL encoding converts spaces to %20
        assert!(url.contains("scope=read%20write"));
        assert!(url.contains("state=random_state"));
        assert!(url.contains("response_type=code"));
    }

    #[test]
    fn test_auth_code_url_without_optional_parts() {
        let mut cfg = config();
        cfg.scopes.clear();
        cfg.redirect_url = None;

        let url = cfg.auth_code_url("s");
        assert!(!url.contains("scope="));
        assert!(!url.contains("redirect_uri="));
    }

    #[test]
    fn test_config_validation() {
        assert!(config().validate().is_ok());

        let mut cfg = config();
        cfg.client_id = " ".to_string();
        assert_eq!(cfg.validate(), Err(OAuthError::MissingClientId));

        let mut cfg = config();
        cfg.token_url = String::new();
        assert_eq!(cfg.validate(), Err(OAuthError::MissingTokenUrl));

        let mut cfg = config();
        cfg.token_url = "not a url".to_string();
        assert!(matches!(cfg.validate(), Err(OAuthError::InvalidTokenUrl(_))));
    }

    #[test]
    fn test_from_endpoints() {
        let endpoints = OAuthEndpoints {
            auth_url: "https://app.gong.io/oauth2/authorize".to_string(),
            token_url: "https://app.gong.io/oauth2/generate-customer-token".to_string(),
        };
        let cfg = OAuthConfig::from_endpoints(&endpoints, "id", "secret");
        assert_eq!(cfg.token_url, endpoints.token_url);
        assert_eq!(cfg.client_id, "id");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_token_expiry() {
        let fresh = OAuthToken {
            access_token: "tok".to_string(),
            expiry: Some(Utc::now() + Duration::hours(1)),
            ..Default::default()
        };
        assert!(!fresh.is_expired());

        let stale = OAuthToken {
            access_token: "tok".to_string(),
            expiry: Some(Utc::now() - Duration::hours(1)),
            ..Default::default()
        };
        assert!(stale.is_expired());

        // Inside the leeway window counts as expired
        let almost = OAuthToken {
            access_token: "tok".to_string(),
            expiry: Some(Utc::now() + Duration::seconds(2)),
            ..Default::default()
        };
        assert!(almost.is_expired());

        let forever = OAuthToken {
            access_token: "tok".to_string(),
            ..Default::default()
        };
        assert!(!forever.is_expired());

        assert!(OAuthToken::default().is_expired());
    }

    #[test]
    fn test_token_validation() {
        assert_eq!(OAuthToken::default().validate(), Err(OAuthError::MissingToken));

        let refresh_only = OAuthToken {
            refresh_token: Some("r".to_string()),
            ..Default::default()
        };
        assert!(refresh_only.validate().is_ok());

        let empty_refresh = OAuthToken {
            refresh_token: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(empty_refresh.validate(), Err(OAuthError::MissingToken));
    }
}
