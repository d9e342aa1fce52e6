use super::{HttpClient, HttpError};
use reqwest::header::HeaderMap;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Response from a [`JsonHttpClient`] call.
#[derive(Debug, Clone)]
pub struct JsonHttpResponse {
    pub code: u16,
    pub headers: HeaderMap,
    /// `None` when the server returned an empty body
    pub body: Option<serde_json::Value>,
}

impl JsonHttpResponse {
    /// Deserialize the body into `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        let body = self
            .body
            .as_ref()
            .ok_or_else(|| HttpError::Decode("response body is empty".to_string()))?;
        serde_json::from_value(body.clone()).map_err(|e| HttpError::Decode(e.to_string()))
    }
}

/// HTTP client speaking JSON on both sides.
#[derive(Debug, Clone)]
pub struct JsonHttpClient {
    pub http: HttpClient,
}

impl JsonHttpClient {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn base(&self) -> &str {
        self.http.base()
    }

    pub async fn get(&self, path: &str) -> Result<JsonHttpResponse, HttpError> {
        self.call(Method::GET, path, None).await
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<JsonHttpResponse, HttpError> {
        let bytes = serde_json::to_vec(body)
            .map_err(|e| HttpError::Request(format!("failed to encode body: {}", e)))?;
        self.call(Method::POST, path, Some(bytes)).await
    }

    pub async fn delete(&self, path: &str) -> Result<JsonHttpResponse, HttpError> {
        self.call(Method::DELETE, path, None).await
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<JsonHttpResponse, HttpError> {
        let response = self.http.send(method, path, body).await?;
        let code = response.status().as_u16();
        let headers = response.headers().clone();
        let bytes = response.bytes().await?;

        let body = if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            None
        } else {
            Some(serde_json::from_slice(&bytes).map_err(|e| HttpError::Decode(e.to_string()))?)
        };

        Ok(JsonHttpResponse {
            code,
            headers,
            body,
        })
    }
}
