//! Configuration module for Spindex.
//!
//! Provides typed configuration structs that map to the YAML configuration file,
//! with loading, validation, defaults, and a builder pattern for programmatic use.
//!
//! Most fields are optional at load time: validation only checks structural
//! sanity, while the per-subsystem readiness helpers (`sharepoint_ready`,
//! `storage_ready`, ...) tell a command whether the settings it needs are
//! actually present.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for Spindex.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub auth: AuthConfig,
    pub sharepoint: SharePointConfig,
    pub storage: StorageConfig,
    pub search: SearchConfig,
    pub openai: OpenAiConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// Authentication / OAuth settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Entra ID tenant ID (GUID or domain).
    pub tenant_id: Option<String>,
    /// Application (client) ID of the registered public client.
    pub client_id: Option<String>,
    /// Delegated scopes requested during the device-code flow.
    pub scopes: Vec<String>,
}

/// SharePoint source settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharePointConfig {
    /// Graph site ID of the SharePoint site.
    pub site_id: Option<String>,
    /// Drive ID of the document library to sync.
    pub drive_id: Option<String>,
    /// Folder path inside the library that roots the sync tree.
    pub folder_path: String,
}

/// Blob storage target settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage account URL, e.g. `https://myaccount.blob.core.windows.net`.
    pub account_url: Option<String>,
    /// Container that receives mirrored content.
    pub container: String,
    /// SAS token for container access (alternative to bearer auth).
    pub sas_token: Option<String>,
}

/// Azure AI Search settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Search service endpoint, e.g. `https://mysvc.search.windows.net`.
    pub endpoint: Option<String>,
    /// Admin API key for the service.
    pub api_key: Option<String>,
    /// REST API version used for all management calls.
    pub api_version: String,
    /// Name prefix for the default vertical's resources.
    pub name_prefix: String,
    /// Storage connection string handed to the indexer data source.
    pub storage_connection_string: Option<String>,
}

/// Azure OpenAI embedding settings for integrated vectorization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// Azure OpenAI resource endpoint.
    pub endpoint: Option<String>,
    /// API key for the resource.
    pub api_key: Option<String>,
    /// Embedding model deployment name.
    pub embedding_deployment: String,
    /// Output dimensionality of the embedding model.
    pub embedding_dimensions: u32,
}

/// Sync engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Path of the file holding the persisted delta cursor.
    pub cursor_file: PathBuf,
    /// Total attempts per network operation, including the first.
    pub retry_max_attempts: u32,
    /// Seconds to wait before the first retry.
    pub retry_base_delay_secs: u64,
    /// Upper bound in seconds on any single retry wait.
    pub retry_max_delay_secs: u64,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            tenant_id: None,
            client_id: None,
            scopes: vec![
                "Files.Read.All".to_string(),
                "Sites.Read.All".to_string(),
                "offline_access".to_string(),
            ],
        }
    }
}

impl Default for SharePointConfig {
    fn default() -> Self {
        Self {
            site_id: None,
            drive_id: None,
            folder_path: "Shared Documents".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            account_url: None,
            container: "spofiles".to_string(),
            sas_token: None,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            api_version: "2024-07-01".to_string(),
            name_prefix: "spo".to_string(),
            storage_connection_string: None,
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            embedding_deployment: "text-embedding-3-small".to_string(),
            embedding_dimensions: 1536,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            cursor_file: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("~/.local/share"))
                .join("spindex")
                .join("cursor.json"),
            retry_max_attempts: 3,
            retry_base_delay_secs: 4,
            retry_max_delay_secs: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/spindex/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("spindex")
            .join("config.yaml")
    }

    /// Token endpoint authority for the configured tenant.
    ///
    /// Returns `None` until `auth.tenant_id` is set.
    pub fn authority(&self) -> Option<String> {
        self.auth
            .tenant_id
            .as_deref()
            .map(|tenant| format!("https://login.microsoftonline.com/{tenant}"))
    }
}

// ---------------------------------------------------------------------------
// Readiness
// ---------------------------------------------------------------------------

impl Config {
    /// True when the settings needed for the device-code flow are present.
    pub fn auth_ready(&self) -> bool {
        self.auth.tenant_id.is_some() && self.auth.client_id.is_some()
    }

    /// True when the SharePoint source can be addressed.
    pub fn sharepoint_ready(&self) -> bool {
        self.auth_ready()
            && self.sharepoint.site_id.is_some()
            && self.sharepoint.drive_id.is_some()
    }

    /// True when mirrored content can be written to blob storage.
    pub fn storage_ready(&self) -> bool {
        self.storage.account_url.is_some() && !self.storage.container.is_empty()
    }

    /// True when the search service can be managed.
    pub fn search_ready(&self) -> bool {
        self.search.endpoint.is_some() && self.search.api_key.is_some()
    }

    /// True when integrated vectorization can be provisioned.
    pub fn openai_ready(&self) -> bool {
        self.openai.endpoint.is_some() && self.openai.api_key.is_some()
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"sync.retry_max_attempts"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid. Optional credentials
    /// being absent is not an error here; commands check readiness themselves.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- auth ---
        if self.auth.scopes.is_empty() {
            errors.push(ValidationError {
                field: "auth.scopes".into(),
                message: "at least one scope is required".into(),
            });
        }

        // --- sharepoint ---
        if self.sharepoint.folder_path.trim().is_empty() {
            errors.push(ValidationError {
                field: "sharepoint.folder_path".into(),
                message: "must not be empty".into(),
            });
        }

        // --- storage ---
        if self.storage.container.trim().is_empty() {
            errors.push(ValidationError {
                field: "storage.container".into(),
                message: "must not be empty".into(),
            });
        }
        if let Some(url) = &self.storage.account_url {
            if !url.starts_with("https://") {
                errors.push(ValidationError {
                    field: "storage.account_url".into(),
                    message: "must be an https:// URL".into(),
                });
            }
        }

        // --- search ---
        if self.search.api_version.trim().is_empty() {
            errors.push(ValidationError {
                field: "search.api_version".into(),
                message: "must not be empty".into(),
            });
        }
        if let Some(endpoint) = &self.search.endpoint {
            if !endpoint.starts_with("https://") {
                errors.push(ValidationError {
                    field: "search.endpoint".into(),
                    message: "must be an https:// URL".into(),
                });
            }
        }

        // --- openai ---
        if self.openai.embedding_dimensions == 0 {
            errors.push(ValidationError {
                field: "openai.embedding_dimensions".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.openai.embedding_deployment.trim().is_empty() {
            errors.push(ValidationError {
                field: "openai.embedding_deployment".into(),
                message: "must not be empty".into(),
            });
        }

        // --- sync ---
        if self.sync.retry_max_attempts == 0 {
            errors.push(ValidationError {
                field: "sync.retry_max_attempts".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.sync.retry_base_delay_secs > self.sync.retry_max_delay_secs {
            errors.push(ValidationError {
                field: "sync.retry_base_delay_secs".into(),
                message: format!(
                    "base delay ({}) must not exceed max delay ({})",
                    self.sync.retry_base_delay_secs, self.sync.retry_max_delay_secs
                ),
            });
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        errors
    }

    /// Retry policy built from the sync section.
    pub fn retry_policy(&self) -> crate::retry::RetryPolicy {
        crate::retry::RetryPolicy {
            max_attempts: self.sync.retry_max_attempts,
            base_delay: std::time::Duration::from_secs(self.sync.retry_base_delay_secs),
            max_delay: std::time::Duration::from_secs(self.sync.retry_max_delay_secs),
        }
    }
}

// ---------------------------------------------------------------------------
// ConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for constructing a [`Config`] programmatically.
///
/// Starts from [`Config::default`] and allows selective overrides.
///
/// # Example
///
/// ```rust,no_run
/// use spindex_core::config::ConfigBuilder;
///
/// let config = ConfigBuilder::new()
///     .auth_tenant_id("contoso.onmicrosoft.com")
///     .auth_client_id("00000000-0000-0000-0000-000000000000")
///     .sharepoint_site_id("contoso.sharepoint.com,guid1,guid2")
///     .logging_level("debug")
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder initialised with [`Config::default`] values.
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    // --- auth ---

    pub fn auth_tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.config.auth.tenant_id = Some(tenant_id.into());
        self
    }

    pub fn auth_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.config.auth.client_id = Some(client_id.into());
        self
    }

    pub fn auth_scopes(mut self, scopes: Vec<String>) -> Self {
        self.config.auth.scopes = scopes;
        self
    }

    // --- sharepoint ---

    pub fn sharepoint_site_id(mut self, site_id: impl Into<String>) -> Self {
        self.config.sharepoint.site_id = Some(site_id.into());
        self
    }

    pub fn sharepoint_drive_id(mut self, drive_id: impl Into<String>) -> Self {
        self.config.sharepoint.drive_id = Some(drive_id.into());
        self
    }

    pub fn sharepoint_folder_path(mut self, folder_path: impl Into<String>) -> Self {
        self.config.sharepoint.folder_path = folder_path.into();
        self
    }

    // --- storage ---

    pub fn storage_account_url(mut self, account_url: impl Into<String>) -> Self {
        self.config.storage.account_url = Some(account_url.into());
        self
    }

    pub fn storage_container(mut self, container: impl Into<String>) -> Self {
        self.config.storage.container = container.into();
        self
    }

    pub fn storage_sas_token(mut self, sas_token: impl Into<String>) -> Self {
        self.config.storage.sas_token = Some(sas_token.into());
        self
    }

    // --- search ---

    pub fn search_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.search.endpoint = Some(endpoint.into());
        self
    }

    pub fn search_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.search.api_key = Some(api_key.into());
        self
    }

    pub fn search_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.config.search.api_version = api_version.into();
        self
    }

    pub fn search_name_prefix(mut self, name_prefix: impl Into<String>) -> Self {
        self.config.search.name_prefix = name_prefix.into();
        self
    }

    pub fn search_storage_connection_string(mut self, conn: impl Into<String>) -> Self {
        self.config.search.storage_connection_string = Some(conn.into());
        self
    }

    // --- openai ---

    pub fn openai_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.openai.endpoint = Some(endpoint.into());
        self
    }

    pub fn openai_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.openai.api_key = Some(api_key.into());
        self
    }

    pub fn openai_embedding_deployment(mut self, deployment: impl Into<String>) -> Self {
        self.config.openai.embedding_deployment = deployment.into();
        self
    }

    pub fn openai_embedding_dimensions(mut self, dims: u32) -> Self {
        self.config.openai.embedding_dimensions = dims;
        self
    }

    // --- sync ---

    pub fn sync_cursor_file(mut self, path: PathBuf) -> Self {
        self.config.sync.cursor_file = path;
        self
    }

    pub fn sync_retry_max_attempts(mut self, n: u32) -> Self {
        self.config.sync.retry_max_attempts = n;
        self
    }

    // --- logging ---

    pub fn logging_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    // --- build ---

    /// Consume the builder and return the finished [`Config`].
    pub fn build(self) -> Config {
        self.config
    }

    /// Build and validate in one step. Returns `Err` with the list of
    /// validation errors if the configuration is invalid.
    pub fn build_validated(self) -> Result<Config, Vec<ValidationError>> {
        let config = self.build();
        let errors = config.validate();
        if errors.is_empty() {
            Ok(config)
        } else {
            Err(errors)
        }
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
