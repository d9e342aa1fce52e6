//! Refresh-token grant.

use super::{OAuthConfig, OAuthError, OAuthToken};
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::collections::HashMap;

/// OAuth token response (standard OAuth 2.0)
#[derive(Deserialize, Debug)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    token_type: Option<String>,
}

/// Exchange a refresh token for a new access token.
///
/// The returned token keeps `refresh_token` when the provider does not
/// rotate it.
pub async fn refresh_token(
    http: &reqwest::Client,
    config: &OAuthConfig,
    refresh_token: &str,
) -> Result<OAuthToken, OAuthError> {
    let mut form_data = HashMap::new();
    form_data.insert("grant_type", "refresh_token");
    form_data.insert("refresh_token", refresh_token);
    form_data.insert("client_id", config.client_id.as_str());
    form_data.insert("client_secret", config.client_secret.as_str());

    tracing::debug!("Refreshing access token at {}", config.token_url);

    let response = http
        .post(&config.token_url)
        .header("Accept", "application/json")
        .form(&form_data)
        .send()
        .await
        .map_err(|e| OAuthError::RefreshFailed(format!("request failed: {}", e)))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(OAuthError::RefreshFailed(format!(
            "status {}: {}",
            status, body
        )));
    }

    let token_response: TokenResponse = response
        .json()
        .await
        .map_err(|e| OAuthError::RefreshFailed(format!("invalid token response: {}", e)))?;

    tracing::debug!(
        "Token refresh successful, rotated_refresh_token={}, expires_in={:?}",
        token_response.refresh_token.is_some(),
        token_response.expires_in
    );

    let expiry = token_response
        .expires_in
        .map(|seconds| {
            Duration::try_seconds(seconds)
                .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
                .ok_or_else(|| {
                    OAuthError::RefreshFailed(format!("expires_in out of range: {}", seconds))
                })
        })
        .transpose()?;

    Ok(OAuthToken {
        access_token: token_response.access_token,
        refresh_token: token_response
            .refresh_token
            .or_else(|| Some(refresh_token.to_string())),
        token_type: token_response.token_type,
        expiry,
    })
}
