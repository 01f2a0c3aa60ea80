//! Sync command - Mirror the SharePoint library into blob storage
//!
//! Provides the `spindex sync` CLI command which:
//! 1. Loads configuration and checks subsystem readiness
//! 2. Builds the token cache, Graph change feed and blob store
//! 3. Runs the sync engine and displays the summary

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use crate::output::{get_formatter, OutputFormat, OutputFormatter};

#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Report configuration readiness without syncing
    #[arg(long)]
    pub check_config: bool,
}

impl SyncCommand {
    /// Execute the sync command
    ///
    /// Wires up the adapters, creates the engine, runs one pass, and
    /// displays the summary. Per-item failures surface in the summary;
    /// only page-level failures abort the run.
    pub async fn execute(&self, format: OutputFormat, config_path: &Path) -> Result<()> {
        use spindex_blob::{AzureBlobStore, BlobCredential};
        use spindex_core::config::Config;
        use spindex_core::ports::IAccessTokenProvider;
        use spindex_graph::auth::TokenCache;
        use spindex_graph::client::GraphClient;
        use spindex_graph::feed::GraphChangeFeed;
        use spindex_sync::{FileCursorStore, SyncEngine};

        let formatter = get_formatter(format);

        // Step 1: Load config
        let config = Config::load_or_default(config_path);
        info!(config_path = %config_path.display(), "Loaded configuration");

        if self.check_config {
            return print_readiness(&config, &*formatter, format);
        }

        // Step 2: Resolve required settings
        let authority = config
            .authority()
            .context("auth.tenant_id is not set. Run 'spindex sync --check-config' for details.")?;
        let client_id = config
            .auth
            .client_id
            .clone()
            .context("auth.client_id is not set")?;
        let site_id = config
            .sharepoint
            .site_id
            .clone()
            .context("sharepoint.site_id is not set")?;
        let drive_id = config
            .sharepoint
            .drive_id
            .clone()
            .context("sharepoint.drive_id is not set")?;
        let account_url = config
            .storage
            .account_url
            .clone()
            .context("storage.account_url is not set")?;

        // Step 3: Build the adapters
        let retry = config.retry_policy();
        let tokens: Arc<dyn IAccessTokenProvider> =
            TokenCache::from_settings(&authority, &client_id, config.auth.scopes.clone())?;

        let graph = GraphClient::new(tokens.clone()).with_retry_policy(retry);
        let feed = Arc::new(GraphChangeFeed::new(
            graph,
            site_id,
            drive_id,
            config.sharepoint.folder_path.clone(),
        ));

        let credential = match config.storage.sas_token.clone() {
            Some(sas) => BlobCredential::Sas(sas),
            None => BlobCredential::Bearer(tokens.clone()),
        };
        let store = Arc::new(
            AzureBlobStore::new(account_url, config.storage.container.clone(), credential)
                .with_retry_policy(retry),
        );

        let cursors = Arc::new(FileCursorStore::new(config.sync.cursor_file.clone()));

        // Step 4: Run the engine
        formatter.info("Starting synchronization...");
        let engine = SyncEngine::new(feed, cursors, store);
        let summary = engine.run().await?;

        // Step 5: Display results
        if format.is_json() {
            let json = serde_json::to_value(&summary).context("Failed to serialize summary")?;
            formatter.print_json(&json);
        } else {
            if summary.total == 0 {
                formatter.success("Already up to date");
            } else if summary.is_clean() {
                formatter.success(&format!(
                    "Mirrored {} file{}",
                    summary.processed,
                    if summary.processed == 1 { "" } else { "s" }
                ));
            } else {
                formatter.success(&mirrored_line(&summary));
            }

            if !summary.errors.is_empty() {
                formatter.error(&format!(
                    "{} error{} occurred:",
                    summary.errors.len(),
                    if summary.errors.len() == 1 { "" } else { "s" }
                ));
                for err in &summary.errors {
                    formatter.info(&format!("  - {}", err));
                }
            }
        }

        Ok(())
    }
}

/// Summary line for a partially failed run; `success_rate` is already a
/// percentage.
fn mirrored_line(summary: &spindex_core::domain::SyncSummary) -> String {
    format!(
        "Mirrored {} of {} files ({:.0}%)",
        summary.processed,
        summary.total,
        summary.success_rate()
    )
}

/// Prints per-subsystem readiness for `--check-config`
fn print_readiness(
    config: &spindex_core::config::Config,
    formatter: &dyn OutputFormatter,
    format: OutputFormat,
) -> Result<()> {
    let ready = |flag: bool| if flag { "ready" } else { "missing settings" };

    if format.is_json() {
        let json = serde_json::json!({
            "auth": config.auth_ready(),
            "sharepoint": config.sharepoint_ready(),
            "storage": config.storage_ready(),
            "search": config.search_ready(),
            "openai": config.openai_ready(),
            "cursor_file": config.sync.cursor_file.display().to_string(),
        });
        formatter.print_json(&json);
    } else {
        formatter.info(&format!("auth:       {}", ready(config.auth_ready())));
        formatter.info(&format!("sharepoint: {}", ready(config.sharepoint_ready())));
        formatter.info(&format!("storage:    {}", ready(config.storage_ready())));
        formatter.info(&format!("search:     {}", ready(config.search_ready())));
        formatter.info(&format!("openai:     {}", ready(config.openai_ready())));
        formatter.info(&format!(
            "cursor:     {}",
            config.sync.cursor_file.display()
        ));
    }

    Ok(())
}
