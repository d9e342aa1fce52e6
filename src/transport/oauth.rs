use super::{AuthenticatedHttpClient, HttpError};
use crate::oauth::{self, OAuthConfig, OAuthError, OAuthToken};
use async_trait::async_trait;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use tokio::sync::Mutex;
use tracing::debug;

/// HTTP client that attaches an OAuth bearer token to every request,
/// refreshing it first when it has expired.
///
/// Concurrent requests share one token; refreshes are serialized so an
/// expired token is exchanged once.
pub struct OAuthHttpClient {
    http: reqwest::Client,
    config: OAuthConfig,
    token: Mutex<OAuthToken>,
}

impl OAuthHttpClient {
    /// Validate the OAuth materials and build the client.
    ///
    /// No network call is made here; the first refresh (if any) happens on
    /// the first request.
    pub fn new(
        http: reqwest::Client,
        config: OAuthConfig,
        token: OAuthToken,
    ) -> Result<Self, OAuthError> {
        config.validate()?;
        token.validate()?;

        Ok(Self {
            http,
            config,
            token: Mutex::new(token),
        })
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Snapshot of the token currently held, without refreshing.
    pub async fn current_token(&self) -> OAuthToken {
        self.token.lock().await.clone()
    }

    /// Return a usable token, refreshing it if it has expired.
    pub async fn token(&self) -> Result<OAuthToken, OAuthError> {
        let mut current = self.token.lock().await;
        if !current.is_expired() {
            return Ok(current.clone());
        }

        let refresh = match current.refresh_token.as_deref() {
            Some(r) if !r.is_empty() => r.to_string(),
            _ => return Err(OAuthError::TokenExpired),
        };

        debug!(token_url = %self.config.token_url, "Access token expired, refreshing");
        let fresh = oauth::refresh_token(&self.http, &self.config, &refresh).await?;
        *current = fresh.clone();

        Ok(fresh)
    }
}

#[async_trait]
impl AuthenticatedHttpClient for OAuthHttpClient {
    async fn execute(&self, mut request: reqwest::Request) -> Result<reqwest::Response, HttpError> {
        let token = self.token().await?;
        let value = HeaderValue::from_str(&format!("Bearer {}", token.access_token))
            .map_err(|e| HttpError::Request(format!("invalid access token header: {}", e)))?;
        request.headers_mut().insert(AUTHORIZATION, value);

        self.http.execute(request).await.map_err(HttpError::from)
    }
}
