//! Vertical commands - Create and delete named search verticals
//!
//! A vertical is the four-resource bundle (`ds-`, `ss-`, `idx-`, `ix-` plus
//! the prefix) provisioned as a unit. `create` upserts all four and starts a
//! run; `delete` tears them down in reverse order and reports what the
//! server actually answered per resource.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use spindex_core::domain::vertical::VerticalNames;
use spindex_search::VerticalOverrides;
use tracing::info;

use crate::commands::search::{provision_context, search_client};
use crate::output::{get_formatter, OutputFormat, OutputFormatter};

#[derive(Debug, Subcommand)]
pub enum VerticalCommand {
    /// Provision a vertical under the given prefix
    Create {
        /// Name prefix for the four resources (lowercase, digits, dashes)
        #[arg(long)]
        prefix: String,

        /// Split-skill chunk size in characters
        #[arg(long)]
        chunk_size: Option<u32>,

        /// Overlap between adjacent chunks
        #[arg(long)]
        chunk_overlap: Option<u32>,

        /// Comma-separated extensions the indexer should process
        #[arg(long)]
        indexed_extensions: Option<String>,

        /// Comma-separated extensions the indexer should skip
        #[arg(long)]
        excluded_extensions: Option<String>,
    },
    /// Delete a vertical's resources
    Delete {
        /// Name prefix of the vertical to delete
        #[arg(long)]
        prefix: String,
    },
}

impl VerticalCommand {
    pub async fn execute(&self, format: OutputFormat, config_path: &Path) -> Result<()> {
        use spindex_core::config::Config;

        let fmt = get_formatter(format);
        let config = Config::load_or_default(config_path);

        match self {
            VerticalCommand::Create {
                prefix,
                chunk_size,
                chunk_overlap,
                indexed_extensions,
                excluded_extensions,
            } => {
                let overrides = VerticalOverrides {
                    chunk_size: *chunk_size,
                    chunk_overlap: *chunk_overlap,
                    indexed_extensions: indexed_extensions.clone(),
                    excluded_extensions: excluded_extensions.clone(),
                };
                self.execute_create(&config, prefix, &overrides, &*fmt, format)
                    .await
            }
            VerticalCommand::Delete { prefix } => {
                self.execute_delete(&config, prefix, &*fmt, format).await
            }
        }
    }

    async fn execute_create(
        &self,
        config: &spindex_core::config::Config,
        prefix: &str,
        overrides: &VerticalOverrides,
        fmt: &dyn OutputFormatter,
        format: OutputFormat,
    ) -> Result<()> {
        let client = search_client(config)?;
        let ctx = provision_context(config)?;
        let names = VerticalNames::for_prefix(prefix)?;

        info!(prefix, "Creating vertical");
        let handle = client.create_vertical(&names, &ctx, overrides).await?;

        if format.is_json() {
            let json = serde_json::to_value(&handle).context("Failed to serialize handle")?;
            fmt.print_json(&json);
        } else {
            fmt.success(&format!("Created vertical '{prefix}'"));
            fmt.info(&format!("Index:   {}", handle.names.index));
            fmt.info(&format!("Indexer: {}", handle.names.indexer));
            if handle.run_started {
                fmt.info("First indexer run started");
            }
        }

        Ok(())
    }

    async fn execute_delete(
        &self,
        config: &spindex_core::config::Config,
        prefix: &str,
        fmt: &dyn OutputFormatter,
        format: OutputFormat,
    ) -> Result<()> {
        let client = search_client(config)?;
        let names = VerticalNames::for_prefix(prefix)?;

        info!(prefix, "Deleting vertical");
        let report = client.delete_vertical(&names).await;

        if format.is_json() {
            let json = serde_json::to_value(&report).context("Failed to serialize report")?;
            fmt.print_json(&json);
        } else {
            for entry in &report.entries {
                fmt.info(&format!(
                    "{:12} {} - {}",
                    entry.kind.to_string(),
                    entry.name,
                    entry.outcome
                ));
            }
        }

        if !report.all_succeeded() {
            bail!("Some resources of vertical '{prefix}' could not be deleted");
        }

        fmt.success(&format!("Deleted vertical '{prefix}'"));
        Ok(())
    }
}
