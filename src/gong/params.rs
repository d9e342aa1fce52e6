use crate::error::ConnectorError;
use crate::oauth::{OAuthConfig, OAuthToken};
use crate::paramsbuilder::{ApiModule, ValidateParams, ValidationErrors, Workspace};
use crate::transport::{AuthenticatedHttpClient, HttpClient, JsonHttpClient, OAuthHttpClient};
use std::collections::HashMap;
use std::sync::Arc;

/// Substitution key the workspace name is published under.
pub const WORKSPACE_SUBSTITUTION: &str = "workspace";

/// Parameters accumulated while building a Gong connector.
///
/// Only the option functions in this module can change it; it is consumed
/// by the builder once construction succeeds.
#[derive(Debug, Default)]
pub struct GongParams {
    pub(super) client: Option<JsonHttpClient>,
    pub(super) workspace: Workspace,
    pub(super) module: Option<ApiModule>,
    pub(super) substitutions: HashMap<String, String>,
}

/// One configuration step. Options run in the order given; when two set
/// the same field the later one wins.
pub type Opt = Box<dyn FnOnce(GongParams) -> Result<GongParams, ConnectorError>>;

impl GongParams {
    /// Apply `opts` in order to a fresh record, stopping at the first error.
    pub(super) fn from_options<I>(opts: I) -> Result<Self, ConnectorError>
    where
        I: IntoIterator<Item = Opt>,
    {
        opts.into_iter()
            .try_fold(GongParams::default(), |params, opt| opt(params))
    }

    /// Caller substitutions with the workspace name layered on top.
    pub(super) fn catalog_substitutions(&self) -> HashMap<String, String> {
        catalog_substitutions(&self.workspace.name, &self.substitutions)
    }
}

/// Substitutions sent to the provider catalog when resolving Gong's
/// metadata: `substitutions` plus the workspace name, which always wins
/// over a caller-supplied `workspace` entry.
pub fn catalog_substitutions(
    workspace: &str,
    substitutions: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut subs = substitutions.clone();
    subs.insert(WORKSPACE_SUBSTITUTION.to_string(), workspace.to_string());
    subs
}

impl ValidateParams for GongParams {
    fn validate_params(&self) -> Result<(), ValidationErrors> {
        ValidationErrors::collect([
            self.workspace.validate_params(),
            self.module
                .as_ref()
                .map_or(Ok(()), |module| module.validate_params()),
        ])
    }
}

/// Set the workspace name. Overwrites any earlier value.
pub fn with_workspace(name: impl Into<String>) -> Opt {
    let workspace = Workspace::new(name);
    Box::new(move |mut params: GongParams| {
        params.workspace = workspace;
        Ok(params)
    })
}

/// Select the API module. Overwrites any earlier value.
pub fn with_module(module: ApiModule) -> Opt {
    Box::new(move |mut params: GongParams| {
        params.module = Some(module);
        Ok(params)
    })
}

/// Use an already authenticated client. Overwrites any earlier client.
pub fn with_authenticated_client(client: Arc<dyn AuthenticatedHttpClient>) -> Opt {
    Box::new(move |mut params: GongParams| {
        params.client = Some(JsonHttpClient::new(HttpClient::new(client)));
        Ok(params)
    })
}

/// Build an OAuth client from `config` and `token` on top of `http`, then
/// use it as with [`with_authenticated_client`].
///
/// Fails with [`ConnectorError::OAuthSetup`] if the OAuth materials are
/// unusable.
pub fn with_client(http: reqwest::Client, config: OAuthConfig, token: OAuthToken) -> Opt {
    Box::new(move |params: GongParams| -> Result<GongParams, ConnectorError> {
        let client = OAuthHttpClient::new(http, config, token)?;
        with_authenticated_client(Arc::new(client))(params)
    })
}

/// Extra template values for the provider catalog lookup. Overwrites any
/// earlier map; the workspace name always takes precedence over a
/// `workspace` key given here.
pub fn with_catalog_substitutions(substitutions: HashMap<String, String>) -> Opt {
    Box::new(move |mut params: GongParams| {
        params.substitutions = substitutions;
        Ok(params)
    })
}
