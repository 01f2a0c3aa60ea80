//! Vertical lifecycle operations
//!
//! Creates the four resources in dependency order (data source, index,
//! skillset, indexer), deletes them in reverse order, and reports
//! per-resource outcomes honestly: a deletion entry says what the server
//! actually answered, and an absent resource counts as success.

use anyhow::{Context, Result};
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use spindex_core::domain::vertical::{
    DeletionEntry, DeletionReport, DeletionStatus, ResourceKind, VerticalHandle, VerticalNames,
};

use crate::client::SearchClient;
use crate::definitions::{
    data_source_definition, index_definition, indexer_definition, skillset_definition,
    ProvisionContext, VerticalOverrides,
};
use crate::SearchError;

// ============================================================================
// Indexer status
// ============================================================================

/// One indexer execution from the status endpoint's history
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub items_processed: u64,
    #[serde(default)]
    pub items_failed: u64,
}

/// Parsed response of `GET indexers/{name}/status`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexerStatus {
    pub status: String,
    #[serde(default)]
    pub last_result: Option<ExecutionRecord>,
    #[serde(default)]
    pub execution_history: Vec<ExecutionRecord>,
}

impl IndexerStatus {
    /// True when the most recent execution finished without failed items
    #[must_use]
    pub fn last_run_clean(&self) -> bool {
        match &self.last_result {
            Some(result) => result.status == "success" && result.items_failed == 0,
            None => false,
        }
    }
}

/// Names present on the service, one list per resource collection
#[derive(Debug, Clone, Serialize)]
pub struct ResourceInventory {
    pub data_sources: Vec<String>,
    pub skillsets: Vec<String>,
    pub indexes: Vec<String>,
    pub indexers: Vec<String>,
}

// ============================================================================
// Provisioning operations
// ============================================================================

impl SearchClient {
    /// Creates or updates the blob data source
    pub async fn upsert_data_source(&self, name: &str, ctx: &ProvisionContext) -> Result<()> {
        self.upsert(ResourceKind::DataSource, name, &data_source_definition(name, ctx))
            .await
    }

    /// Creates or updates the search index
    pub async fn upsert_index(&self, name: &str, ctx: &ProvisionContext) -> Result<()> {
        self.upsert(ResourceKind::Index, name, &index_definition(name, ctx))
            .await
    }

    /// Creates or updates the chunking and embedding skillset
    pub async fn upsert_skillset(
        &self,
        name: &str,
        ctx: &ProvisionContext,
        overrides: &VerticalOverrides,
    ) -> Result<()> {
        self.upsert(
            ResourceKind::Skillset,
            name,
            &skillset_definition(name, ctx, overrides),
        )
        .await
    }

    /// Creates or updates the indexer
    pub async fn upsert_indexer(
        &self,
        names: &VerticalNames,
        overrides: &VerticalOverrides,
    ) -> Result<()> {
        self.upsert(
            ResourceKind::Indexer,
            &names.indexer,
            &indexer_definition(names, overrides),
        )
        .await
    }

    /// Triggers an on-demand indexer run
    pub async fn run_indexer(&self, name: &str) -> Result<()> {
        self.request(Method::POST, &format!("indexers/{name}/run"), None)
            .await
            .with_context(|| format!("Failed to start indexer '{name}'"))?;
        info!(indexer = name, "Indexer run started");
        Ok(())
    }

    /// Fetches the indexer's current status and execution history
    pub async fn get_indexer_status(&self, name: &str) -> Result<IndexerStatus> {
        let body = self
            .request(Method::GET, &format!("indexers/{name}/status"), None)
            .await
            .with_context(|| format!("Failed to fetch status for indexer '{name}'"))?
            .ok_or_else(|| SearchError::InvalidResponse("empty status response".to_string()))?;

        serde_json::from_value(body)
            .context("Failed to parse indexer status")
            .map_err(Into::into)
    }

    /// Provisions the full vertical and starts its first indexer run
    ///
    /// All four creates are idempotent upserts; rerunning converges the
    /// service to the current definitions. The indexer run failing does not
    /// fail provisioning, since the 30-minute schedule will pick it up.
    pub async fn create_vertical(
        &self,
        names: &VerticalNames,
        ctx: &ProvisionContext,
        overrides: &VerticalOverrides,
    ) -> Result<VerticalHandle> {
        info!(prefix = %names.prefix, "Provisioning search vertical");

        self.upsert_data_source(&names.data_source, ctx).await?;
        self.upsert_index(&names.index, ctx).await?;
        self.upsert_skillset(&names.skillset, ctx, overrides).await?;
        self.upsert_indexer(names, overrides).await?;

        let run_started = match self.run_indexer(&names.indexer).await {
            Ok(()) => true,
            Err(e) => {
                warn!(
                    indexer = %names.indexer,
                    "Indexer run could not be started, the schedule will retry: {e:#}"
                );
                false
            }
        };

        Ok(VerticalHandle {
            names: names.clone(),
            run_started,
        })
    }

    /// Deletes the vertical's resources in reverse dependency order
    ///
    /// Always attempts all four deletions and reports what the server
    /// answered for each one; the caller decides based on the report.
    pub async fn delete_vertical(&self, names: &VerticalNames) -> DeletionReport {
        info!(prefix = %names.prefix, "Deleting search vertical");

        let order = [
            ResourceKind::Indexer,
            ResourceKind::Skillset,
            ResourceKind::Index,
            ResourceKind::DataSource,
        ];

        let mut entries = Vec::with_capacity(order.len());
        for kind in order {
            let name = names.name_for(kind);
            let outcome = self.delete_resource(kind, name).await;
            info!(%kind, name, outcome = %outcome, "Resource deletion");
            entries.push(DeletionEntry {
                kind,
                name: name.to_string(),
                outcome,
            });
        }

        DeletionReport {
            prefix: names.prefix.clone(),
            entries,
        }
    }

    /// Lists all resource names on the service, per collection
    pub async fn list_resources(&self) -> Result<ResourceInventory> {
        Ok(ResourceInventory {
            data_sources: self.list_names(ResourceKind::DataSource).await?,
            skillsets: self.list_names(ResourceKind::Skillset).await?,
            indexes: self.list_names(ResourceKind::Index).await?,
            indexers: self.list_names(ResourceKind::Indexer).await?,
        })
    }

    async fn upsert(&self, kind: ResourceKind, name: &str, definition: &serde_json::Value) -> Result<()> {
        self.request(
            Method::PUT,
            &format!("{}/{}", kind.collection(), name),
            Some(definition),
        )
        .await
        .with_context(|| format!("Failed to provision {kind} '{name}'"))?;
        info!(%kind, name, "Resource provisioned");
        Ok(())
    }

    async fn delete_resource(&self, kind: ResourceKind, name: &str) -> DeletionStatus {
        let path = format!("{}/{}", kind.collection(), name);
        match self.request(Method::DELETE, &path, None).await {
            Ok(_) => DeletionStatus::Deleted,
            Err(e) => match e.downcast_ref::<SearchError>() {
                Some(SearchError::NotFound(_)) => DeletionStatus::NotFound,
                _ => DeletionStatus::Failed(format!("{e:#}")),
            },
        }
    }

    async fn list_names(&self, kind: ResourceKind) -> Result<Vec<String>> {
        let body = self
            .request(Method::GET, kind.collection(), None)
            .await
            .with_context(|| format!("Failed to list {}", kind.collection()))?
            .ok_or_else(|| SearchError::InvalidResponse("empty list response".to_string()))?;

        let names = body["value"]
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item["name"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();
        Ok(names)
    }
}
