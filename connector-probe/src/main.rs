//! Manual end-to-end check of the Gong connector.
//!
//! Builds a connector from `connector-probe.toml` (or the path given as the
//! first argument / `CONNECTOR_PROBE_CONFIG`) plus `CONNECTOR_PROBE_*`
//! environment variables, then optionally GETs `probe_path` through it.

mod config;

use anyhow::{Context, Result};
use config::{ProbeConfig, DEFAULT_CONFIG_PATH};
use connectors::gong::{
    self, catalog_substitutions, with_catalog_substitutions, with_client, with_module,
    with_workspace,
};
use connectors::providers::{Catalog, ProviderRegistry, GONG};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "connector_probe=info,connectors=info".into()),
        )
        .init();

    let explicit_path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("CONNECTOR_PROBE_CONFIG").ok());
    let config_path = explicit_path
        .clone()
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = ProbeConfig::load(&config_path, explicit_path.is_some())?;

    info!(
        config_path = %config_path,
        workspace = %config.connector.workspace,
        module = %config.connector.module_version,
        "Configuration loaded"
    );

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::builtin().merge(
            Catalog::from_file(path).with_context(|| format!("Failed to load catalog {}", path))?,
        ),
        None => Catalog::builtin(),
    };

    // OAuth endpoints come from the catalog unless the config overrides them
    let subs = catalog_substitutions(&config.connector.workspace, &config.substitutions);
    let provider_info = catalog
        .read_info(GONG, &subs)
        .context("Failed to read Gong provider info")?;
    let oauth_config = config.oauth_config(&provider_info)?;

    let connector = gong::new_connector_with_registry(
        &catalog,
        vec![
            with_client(reqwest::Client::new(), oauth_config, config.oauth_token()),
            with_workspace(config.connector.workspace.clone()),
            with_module(config.module()),
            with_catalog_substitutions(config.substitutions.clone()),
        ],
    )
    .context("Failed to build Gong connector")?;

    info!(
        provider = connector.provider(),
        base_url = %connector.base_url(),
        "Connector ready"
    );

    if let Some(path) = &config.probe_path {
        let url = connector.api_url(path)?;
        info!(url = %url, "Probing");

        let response = connector
            .client()
            .get(url.as_str())
            .await
            .with_context(|| format!("GET {} failed", url))?;

        info!(status = response.code, "Probe succeeded");
        println!("{}", serde_json::to_string_pretty(&response.body)?);
    }

    Ok(())
}
