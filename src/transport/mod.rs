//! Authenticated HTTP transport used by connectors.
//!
//! ```text
//! JsonHttpClient        JSON bodies in and out
//!      ↓
//! HttpClient            base URL + error interpretation
//!      ↓
//! AuthenticatedHttpClient   attaches credentials (OAuth, or none)
//!      ↓
//! reqwest
//! ```

mod error;
mod json;
mod oauth;

pub use error::{interpret_error, ErrorHandler, HttpError};
pub use json::{JsonHttpClient, JsonHttpResponse};
pub use oauth::OAuthHttpClient;

use async_trait::async_trait;
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, Request, Response, Url};
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// An HTTP client already bound to credentials.
#[async_trait]
pub trait AuthenticatedHttpClient: Send + Sync {
    /// Send `request`, adding whatever credentials this client carries.
    async fn execute(&self, request: Request) -> Result<Response, HttpError>;
}

/// Plain pass-through; for providers that need no credentials, or for
/// credentials already baked into default headers.
#[async_trait]
impl AuthenticatedHttpClient for reqwest::Client {
    async fn execute(&self, request: Request) -> Result<Response, HttpError> {
        reqwest::Client::execute(self, request)
            .await
            .map_err(HttpError::from)
    }
}

/// Authenticated client bound to a base URL and an error handler.
#[derive(Clone)]
pub struct HttpClient {
    base: String,
    client: Arc<dyn AuthenticatedHttpClient>,
    error_handler: ErrorHandler,
}

impl HttpClient {
    /// Wrap `client` with no base URL and the default error interpreter.
    pub fn new(client: Arc<dyn AuthenticatedHttpClient>) -> Self {
        Self {
            base: String::new(),
            client,
            error_handler: interpret_error,
        }
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = base.into();
        self
    }

    pub fn with_error_handler(mut self, handler: ErrorHandler) -> Self {
        self.error_handler = handler;
        self
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Resolve `path` against the base URL. Absolute URLs pass through.
    pub fn url(&self, path: &str) -> Result<Url, HttpError> {
        let full = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.is_empty() {
            self.base.clone()
        } else {
            format!(
                "{}/{}",
                self.base.trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        };

        Url::parse(&full).map_err(|e| HttpError::Request(format!("invalid URL '{}': {}", full, e)))
    }

    /// Send one request. Non-2xx responses are turned into errors by the
    /// configured error handler.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Vec<u8>>,
    ) -> Result<Response, HttpError> {
        let url = self.url(path)?;
        let mut request = Request::new(method, url);
        request
            .headers_mut()
            .insert(ACCEPT, HeaderValue::from_static("application/json"));
        if let Some(body) = body {
            request
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            *request.body_mut() = Some(body.into());
        }

        let response = self.client.execute(request).await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let headers = response.headers().clone();
        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                warn!(status = %status, error = %e, "Failed to read error response body");
                format!("failed to read error body: {}", e).into_bytes()
            }
        };
        Err((self.error_handler)(status, &headers, &body))
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;
    use std::io::Write;

    fn client(base: &str) -> HttpClient {
        HttpClient::new(Arc::new(reqwest::Client::new())).with_base(base)
    }

    #[test]
    fn test_url_joining() {
        let http = client("https://api.gong.io/");
        assert_eq!(
            http.url("/v2/users").unwrap().as_str(),
            "https://api.gong.io/v2/users"
        );
        assert_eq!(
            http.url("v2/users").unwrap().as_str(),
            "https://api.gong.io/v2/users"
        );
        assert_eq!(
            http.url("https://other.example.com/x").unwrap().as_str(),
            "https://other.example.com/x"
        );
    }

    #[test]
    fn test_url_without_base_is_an_error() {
        let http = HttpClient::new(Arc::new(reqwest::Client::new()));
        assert!(matches!(http.url("v2/users"), Err(HttpError::Request(_))));
    }

    #[tokio::test]
    async fn test_send_interprets_errors() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v2/users")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "token expired"}"#)
            .create_async()
            .await;

        let err = client(&server.url())
            .send(Method::GET, "/v2/users", None)
            .await
            .unwrap_err();
        assert_eq!(err, HttpError::AccessTokenInvalid("token expired".to_string()));
    }

    #[tokio::test]
    async fn test_send_keeps_status_when_error_body_is_cut_off() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/v2/calls")
            .with_status(503)
            .with_chunked_body(|w| {
                w.write_all(b"upstream unava")?;
                Err(std::io::Error::new(
                    std::io::ErrorKind::ConnectionReset,
                    "connection dropped",
                ))
            })
            .create_async()
            .await;

        let err = client(&server.url())
            .send(Method::GET, "/v2/calls", None)
            .await
            .unwrap_err();

        match err {
            HttpError::Server { status, message } => {
                assert_eq!(status, 503);
                assert!(message.starts_with("failed to read error body"), "{}", message);
            }
            other => panic!("expected server error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_custom_error_handler() {
        fn always_server(status: reqwest::StatusCode, _: &reqwest::header::HeaderMap, _: &[u8]) -> HttpError {
            HttpError::Server {
                status: status.as_u16(),
                message: "custom".to_string(),
            }
        }

        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/x")
            .with_status(404)
            .create_async()
            .await;

        let err = client(&server.url())
            .with_error_handler(always_server)
            .send(Method::GET, "x", None)
            .await
            .unwrap_err();
        assert_eq!(
            err,
            HttpError::Server {
                status: 404,
                message: "custom".to_string(),
            }
        );
    }
}
