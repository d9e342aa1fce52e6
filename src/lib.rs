//! Connector bootstrap - assembles a validated, ready-to-use API connector
//! from composable options.
//!
//! # Architecture
//!
//! ```text
//! caller options (workspace, module, client, substitutions)
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │       Connector builder                  │
//! │  - apply options to a fresh record       │
//! │  - check a client was supplied           │
//! │  - validate parameters (local only)      │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │       Provider registry                  │
//! │  - provider id + substitutions → info    │
//! └─────────────────────────────────────────┘
//!          ↓
//!   Connector (base URL + authenticated transport)
//! ```
//!
//! # Core Types
//!
//! - [`gong::Connector`] - Configured Gong connector
//! - [`ConnectorError`] - Construction errors
//! - [`providers::ProviderRegistry`] - Provider metadata lookup
//! - [`transport::AuthenticatedHttpClient`] - Credential-bearing HTTP client

pub mod error;
pub mod gong;
pub mod oauth;
pub mod paramsbuilder;
pub mod providers;
pub mod transport;

pub use error::ConnectorError;
