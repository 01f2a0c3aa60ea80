//! Search commands - Provision and operate the Azure AI Search pipeline
//!
//! Provides the `spindex search` CLI subcommands which:
//! 1. `setup`  - Provisions the default vertical (data source, index,
//!    skillset, indexer) and starts the first indexer run.
//! 2. `run`    - Triggers an on-demand indexer run.
//! 3. `status` - Shows indexer status and recent execution history.
//! 4. `list`   - Lists all resources on the service.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use spindex_core::config::Config;
use spindex_core::domain::vertical::VerticalNames;
use spindex_search::{ProvisionContext, SearchClient, VerticalOverrides};
use tracing::info;

use crate::output::{get_formatter, OutputFormat, OutputFormatter};

#[derive(Debug, Subcommand)]
pub enum SearchCommand {
    /// Provision the default search pipeline
    Setup {
        /// Report configuration readiness without provisioning
        #[arg(long)]
        check_config: bool,
    },
    /// Trigger an indexer run
    Run {
        /// Indexer name (defaults to the configured vertical's indexer)
        name: Option<String>,
    },
    /// Show indexer status and execution history
    Status {
        /// Indexer name (defaults to the configured vertical's indexer)
        name: Option<String>,
    },
    /// List all resources on the search service
    List,
}

impl SearchCommand {
    pub async fn execute(&self, format: OutputFormat, config_path: &Path) -> Result<()> {
        let fmt = get_formatter(format);
        let config = Config::load_or_default(config_path);

        match self {
            SearchCommand::Setup { check_config } => {
                if *check_config {
                    return print_readiness(&config, &*fmt, format);
                }
                self.execute_setup(&config, &*fmt, format).await
            }
            SearchCommand::Run { name } => {
                self.execute_run(&config, name.as_deref(), &*fmt).await
            }
            SearchCommand::Status { name } => {
                self.execute_status(&config, name.as_deref(), &*fmt, format)
                    .await
            }
            SearchCommand::List => self.execute_list(&config, &*fmt, format).await,
        }
    }

    async fn execute_setup(
        &self,
        config: &Config,
        fmt: &dyn OutputFormatter,
        format: OutputFormat,
    ) -> Result<()> {
        let client = search_client(config)?;
        let ctx = provision_context(config)?;
        let names = VerticalNames::for_prefix(&config.search.name_prefix)?;

        info!(prefix = %names.prefix, "Provisioning default pipeline");
        fmt.info(&format!("Provisioning vertical '{}'...", names.prefix));

        let handle = client
            .create_vertical(&names, &ctx, &VerticalOverrides::default())
            .await?;

        if format.is_json() {
            let json = serde_json::to_value(&handle).context("Failed to serialize handle")?;
            fmt.print_json(&json);
        } else {
            fmt.success(&format!("Provisioned vertical '{}'", handle.names.prefix));
            fmt.info(&format!("Data source: {}", handle.names.data_source));
            fmt.info(&format!("Index:       {}", handle.names.index));
            fmt.info(&format!("Skillset:    {}", handle.names.skillset));
            fmt.info(&format!("Indexer:     {}", handle.names.indexer));
            if handle.run_started {
                fmt.info("First indexer run started");
            } else {
                fmt.warn("Indexer run not started; the 30-minute schedule will pick it up");
            }
        }

        Ok(())
    }

    async fn execute_run(
        &self,
        config: &Config,
        name: Option<&str>,
        fmt: &dyn OutputFormatter,
    ) -> Result<()> {
        let client = search_client(config)?;
        let name = resolve_indexer_name(config, name)?;

        client.run_indexer(&name).await?;
        fmt.success(&format!("Indexer run started: {name}"));

        Ok(())
    }

    async fn execute_status(
        &self,
        config: &Config,
        name: Option<&str>,
        fmt: &dyn OutputFormatter,
        format: OutputFormat,
    ) -> Result<()> {
        let client = search_client(config)?;
        let name = resolve_indexer_name(config, name)?;

        let status = client.get_indexer_status(&name).await?;

        if format.is_json() {
            let json = serde_json::to_value(&status).context("Failed to serialize status")?;
            fmt.print_json(&json);
        } else {
            fmt.success(&format!("Indexer {name}: {}", status.status));
            if let Some(last) = &status.last_result {
                fmt.info(&format!(
                    "Last run: {} ({} processed, {} failed)",
                    last.status, last.items_processed, last.items_failed
                ));
                if let Some(message) = &last.error_message {
                    fmt.info(&format!("Error:    {message}"));
                }
            } else {
                fmt.info("No executions yet");
            }
            for record in status.execution_history.iter().take(5) {
                fmt.info(&format!(
                    "  {} processed={} failed={}",
                    record.status, record.items_processed, record.items_failed
                ));
            }
        }

        Ok(())
    }

    async fn execute_list(
        &self,
        config: &Config,
        fmt: &dyn OutputFormatter,
        format: OutputFormat,
    ) -> Result<()> {
        let client = search_client(config)?;
        let inventory = client.list_resources().await?;

        if format.is_json() {
            let json = serde_json::to_value(&inventory).context("Failed to serialize listing")?;
            fmt.print_json(&json);
        } else {
            let section = |fmt: &dyn OutputFormatter, label: &str, names: &[String]| {
                if names.is_empty() {
                    fmt.info(&format!("{label}: (none)"));
                } else {
                    fmt.info(&format!("{label}: {}", names.join(", ")));
                }
            };
            section(fmt, "Data sources", &inventory.data_sources);
            section(fmt, "Skillsets   ", &inventory.skillsets);
            section(fmt, "Indexes     ", &inventory.indexes);
            section(fmt, "Indexers    ", &inventory.indexers);
        }

        Ok(())
    }
}

/// Builds a [`SearchClient`] from the search config section
pub(crate) fn search_client(config: &Config) -> Result<SearchClient> {
    let endpoint = config
        .search
        .endpoint
        .clone()
        .context("search.endpoint is not set")?;
    let api_key = config
        .search
        .api_key
        .clone()
        .context("search.api_key is not set")?;

    Ok(
        SearchClient::new(endpoint, api_key, config.search.api_version.clone())
            .with_retry_policy(config.retry_policy()),
    )
}

/// Builds the provisioning context from the storage and OpenAI sections
pub(crate) fn provision_context(config: &Config) -> Result<ProvisionContext> {
    Ok(ProvisionContext {
        storage_connection_string: config
            .search
            .storage_connection_string
            .clone()
            .context("search.storage_connection_string is not set")?,
        container: config.storage.container.clone(),
        openai_endpoint: config
            .openai
            .endpoint
            .clone()
            .context("openai.endpoint is not set")?,
        openai_api_key: config
            .openai
            .api_key
            .clone()
            .context("openai.api_key is not set")?,
        embedding_deployment: config.openai.embedding_deployment.clone(),
        embedding_dimensions: config.openai.embedding_dimensions,
    })
}

/// Resolves the indexer to address: explicit name, or the default vertical's
fn resolve_indexer_name(config: &Config, name: Option<&str>) -> Result<String> {
    match name {
        Some(name) => Ok(name.to_string()),
        None => {
            let names = VerticalNames::for_prefix(&config.search.name_prefix)?;
            Ok(names.indexer)
        }
    }
}

/// Prints readiness for `search setup --check-config`
fn print_readiness(
    config: &Config,
    fmt: &dyn OutputFormatter,
    format: OutputFormat,
) -> Result<()> {
    let connection_ready = config.search.storage_connection_string.is_some();

    if format.is_json() {
        let json = serde_json::json!({
            "search": config.search_ready(),
            "openai": config.openai_ready(),
            "storage_connection_string": connection_ready,
            "name_prefix": config.search.name_prefix,
        });
        fmt.print_json(&json);
    } else {
        let ready = |flag: bool| if flag { "ready" } else { "missing settings" };
        fmt.info(&format!("search:             {}", ready(config.search_ready())));
        fmt.info(&format!("openai:             {}", ready(config.openai_ready())));
        fmt.info(&format!("storage connection: {}", ready(connection_ready)));
        fmt.info(&format!("name prefix:        {}", config.search.name_prefix));
    }

    Ok(())
}
