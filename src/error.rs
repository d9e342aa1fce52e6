use crate::oauth::OAuthError;
use crate::paramsbuilder::ValidationErrors;
use crate::providers::ProviderError;
use std::sync::Arc;

/// Errors returned while constructing a connector.
///
/// Success and failure are exclusive: a builder never hands back a
/// half-configured connector alongside one of these.
#[derive(Debug, Clone)]
pub enum ConnectorError {
    /// No option ever supplied an HTTP client.
    MissingClient,
    /// One or more parameter rules were violated.
    ValidationFailed(ValidationErrors),
    /// Provider metadata could not be resolved.
    ResolutionFailed(ProviderError),
    /// An option building an OAuth transport rejected its materials.
    OAuthSetup(OAuthError),
    /// A build step aborted with an error of a type this crate does not own.
    Aborted(Arc<dyn std::error::Error + Send + Sync>),
}

impl PartialEq for ConnectorError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ConnectorError::MissingClient, ConnectorError::MissingClient) => true,
            (ConnectorError::ValidationFailed(a), ConnectorError::ValidationFailed(b)) => a == b,
            (ConnectorError::ResolutionFailed(a), ConnectorError::ResolutionFailed(b)) => a == b,
            (ConnectorError::OAuthSetup(a), ConnectorError::OAuthSetup(b)) => a == b,
            (ConnectorError::Aborted(a), ConnectorError::Aborted(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl std::fmt::Display for ConnectorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectorError::MissingClient => write!(f, "missing client"),
            ConnectorError::ValidationFailed(errs) => write!(f, "invalid parameters: {}", errs),
            ConnectorError::ResolutionFailed(err) => {
                write!(f, "failed to resolve provider info: {}", err)
            }
            ConnectorError::OAuthSetup(err) => write!(f, "failed to build OAuth client: {}", err),
            ConnectorError::Aborted(err) => write!(f, "connector build aborted: {}", err),
        }
    }
}

impl std::error::Error for ConnectorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConnectorError::MissingClient => None,
            ConnectorError::ValidationFailed(errs) => Some(errs),
            ConnectorError::ResolutionFailed(err) => Some(err),
            ConnectorError::OAuthSetup(err) => Some(err),
            ConnectorError::Aborted(err) => Some(err.as_ref()),
        }
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for ConnectorError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        ConnectorError::Aborted(Arc::from(err))
    }
}

impl From<ValidationErrors> for ConnectorError {
    fn from(errs: ValidationErrors) -> Self {
        ConnectorError::ValidationFailed(errs)
    }
}

impl From<ProviderError> for ConnectorError {
    fn from(err: ProviderError) -> Self {
        ConnectorError::ResolutionFailed(err)
    }
}

impl From<OAuthError> for ConnectorError {
    fn from(err: OAuthError) -> Self {
        ConnectorError::OAuthSetup(err)
    }
}
