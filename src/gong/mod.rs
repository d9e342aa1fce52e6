//! Gong connector construction.
//!
//! ```no_run
//! use connectors::gong::{self, with_client, with_workspace};
//! use connectors::oauth::{OAuthConfig, OAuthToken};
//!
//! # fn main() -> Result<(), connectors::ConnectorError> {
//! let config = OAuthConfig {
//!     client_id: "client-id".to_string(),
//!     client_secret: "client-secret".to_string(),
//!     auth_url: "https://app.gong.io/oauth2/authorize".to_string(),
//!     token_url: "https://app.gong.io/oauth2/generate-customer-token".to_string(),
//!     ..Default::default()
//! };
//! let token = OAuthToken {
//!     access_token: "access".to_string(),
//!     refresh_token: Some("refresh".to_string()),
//!     ..Default::default()
//! };
//!
//! let connector = gong::new_connector(vec![
//!     with_client(reqwest::Client::new(), config, token),
//!     with_workspace("acme"),
//! ])?;
//! println!("talking to {}", connector.base_url());
//! # Ok(())
//! # }
//! ```

mod params;

pub use params::{
    catalog_substitutions, with_authenticated_client, with_catalog_substitutions, with_client,
    with_module, with_workspace, GongParams, Opt, WORKSPACE_SUBSTITUTION,
};

use crate::error::ConnectorError;
use crate::oauth::OAuthError;
use crate::paramsbuilder::{ApiModule, ValidateParams, ValidationErrors};
use crate::providers::{Catalog, ProviderError, ProviderRegistry, GONG};
use crate::transport::{HttpError, JsonHttpClient};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use tracing::debug;

/// Gong API module used when none is selected.
pub fn default_module() -> ApiModule {
    ApiModule::new("api", "v2")
}

/// A configured Gong connector.
///
/// Immutable once built. Clones share the same underlying transport, so a
/// connector can be handed to several tasks.
#[derive(Debug, Clone)]
pub struct Connector {
    base_url: String,
    module: ApiModule,
    client: JsonHttpClient,
}

impl Connector {
    pub fn provider(&self) -> &'static str {
        GONG
    }

    /// Base URL resolved from the provider catalog.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn module(&self) -> &ApiModule {
        &self.module
    }

    /// Transport for issuing requests; already pointed at [`Self::base_url`].
    pub fn client(&self) -> &JsonHttpClient {
        &self.client
    }

    /// Full URL for `path` under the selected API module.
    pub fn api_url(&self, path: &str) -> Result<reqwest::Url, HttpError> {
        let prefix = self.module.path();
        let path = path.trim_start_matches('/');
        if prefix.is_empty() {
            self.client.http.url(path)
        } else {
            self.client.http.url(&format!("{}/{}", prefix, path))
        }
    }
}

/// Build a connector, resolving provider metadata from the built-in catalog.
pub fn new_connector<I>(opts: I) -> Result<Connector, ConnectorError>
where
    I: IntoIterator<Item = Opt>,
{
    new_connector_with_registry(&Catalog::builtin(), opts)
}

/// Build a connector, resolving provider metadata from `registry`.
///
/// A panic raised while building whose payload is an error value
/// ([`ConnectorError`], one of the crate's component errors, or a boxed
/// `std::error::Error`) is returned as an error. Any other panic, such as a
/// `panic!` with a message, is resumed unchanged.
pub fn new_connector_with_registry<R, I>(registry: &R, opts: I) -> Result<Connector, ConnectorError>
where
    R: ProviderRegistry + ?Sized,
    I: IntoIterator<Item = Opt>,
{
    match panic::catch_unwind(AssertUnwindSafe(move || build(registry, opts))) {
        Ok(result) => result,
        Err(payload) => match recover_error(payload) {
            Ok(err) => Err(err),
            Err(payload) => panic::resume_unwind(payload),
        },
    }
}

/// Turn a panic payload carrying an error value back into a
/// [`ConnectorError`]; hand anything else back untouched.
fn recover_error(payload: Box<dyn Any + Send>) -> Result<ConnectorError, Box<dyn Any + Send>> {
    let payload = match payload.downcast::<ConnectorError>() {
        Ok(err) => return Ok(*err),
        Err(payload) => payload,
    };
    let payload = match payload.downcast::<OAuthError>() {
        Ok(err) => return Ok((*err).into()),
        Err(payload) => payload,
    };
    let payload = match payload.downcast::<ProviderError>() {
        Ok(err) => return Ok((*err).into()),
        Err(payload) => payload,
    };
    let payload = match payload.downcast::<ValidationErrors>() {
        Ok(err) => return Ok((*err).into()),
        Err(payload) => payload,
    };
    match payload.downcast::<Box<dyn std::error::Error + Send + Sync>>() {
        Ok(err) => Ok((*err).into()),
        Err(payload) => Err(payload),
    }
}

fn build<R, I>(registry: &R, opts: I) -> Result<Connector, ConnectorError>
where
    R: ProviderRegistry + ?Sized,
    I: IntoIterator<Item = Opt>,
{
    let mut params = GongParams::from_options(opts)?;

    // A record without a client is unusable regardless of its other fields.
    let client = params.client.take().ok_or(ConnectorError::MissingClient)?;

    params.validate_params()?;

    let info = registry.read_info(GONG, &params.catalog_substitutions())?;

    let client = JsonHttpClient::new(client.http.with_base(info.base_url.clone()));
    let module = params.module.unwrap_or_else(default_module);

    debug!(
        provider = GONG,
        workspace = %params.workspace.name,
        base_url = %info.base_url,
        module = %module.version,
        "Connector constructed"
    );

    Ok(Connector {
        base_url: info.base_url,
        module,
        client,
    })
}
