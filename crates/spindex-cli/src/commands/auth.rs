//! Auth commands - Login, Logout, and Status for Microsoft Graph access
//!
//! Provides the `spindex auth` CLI subcommands which:
//! 1. `login`  - Runs the OAuth2 device code flow, stores tokens in the
//!    system keyring under the application client ID.
//! 2. `logout` - Clears tokens from the keyring.
//! 3. `status` - Shows token presence and validity.

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::output::{get_formatter, OutputFormat, OutputFormatter};

#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Authenticate with Microsoft Graph via the device code flow
    Login,
    /// Remove stored credentials
    Logout,
    /// Check authentication status
    Status,
}

impl AuthCommand {
    pub async fn execute(&self, format: OutputFormat, config_path: &Path) -> Result<()> {
        let fmt = get_formatter(format);
        match self {
            AuthCommand::Login => self.execute_login(&*fmt, config_path).await,
            AuthCommand::Logout => self.execute_logout(&*fmt, config_path).await,
            AuthCommand::Status => self.execute_status(&*fmt, format, config_path).await,
        }
    }

    /// Execute the login flow:
    /// 1. Load config to get tenant, client ID and scopes
    /// 2. Request a device code and show the prompt
    /// 3. Poll the token endpoint until approval (Ctrl-C cancels)
    /// 4. Store tokens in the keyring
    async fn execute_login(&self, fmt: &dyn OutputFormatter, config_path: &Path) -> Result<()> {
        use spindex_core::config::Config;
        use spindex_graph::auth::{DeviceCodeFlow, KeyringTokenStorage};

        let config = Config::load_or_default(config_path);

        let authority = config
            .authority()
            .context("auth.tenant_id is not set. Add it to the config file first.")?;
        let client_id = config
            .auth
            .client_id
            .clone()
            .context("auth.client_id is not set. Add it to the config file first.")?;

        info!(client_id = %client_id, "Starting device code login");

        let flow = DeviceCodeFlow::new(&authority, &client_id, config.auth.scopes.clone())?;
        let (prompt, details) = flow.start().await?;

        fmt.info(&format!(
            "To sign in, open {} and enter the code {}",
            prompt.verification_uri, prompt.user_code
        ));
        fmt.info(&format!(
            "The code expires in {} seconds.",
            prompt.expires_in
        ));

        if webbrowser::open(&prompt.verification_uri).is_ok() {
            fmt.info("Opened the verification page in your browser.");
        }

        // Ctrl-C aborts the poll instead of leaving it hanging.
        let cancel = CancellationToken::new();
        let signal_cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                signal_cancel.cancel();
            }
        });

        let tokens = flow.wait_for_tokens(details, &cancel).await?;
        KeyringTokenStorage::store(&client_id, &tokens)
            .context("Failed to store tokens in keyring")?;

        fmt.success("Authenticated with Microsoft Graph");
        fmt.info("Tokens stored in the system keyring");
        if tokens.refresh_token.is_some() {
            fmt.info("Offline access granted; future runs refresh automatically");
        }

        Ok(())
    }

    /// Execute logout: clear keyring tokens for the configured client
    async fn execute_logout(&self, fmt: &dyn OutputFormatter, config_path: &Path) -> Result<()> {
        use spindex_core::config::Config;
        use spindex_graph::auth::KeyringTokenStorage;

        let config = Config::load_or_default(config_path);
        let client_id = match config.auth.client_id {
            Some(id) => id,
            None => {
                fmt.info("auth.client_id is not configured. Nothing to log out.");
                return Ok(());
            }
        };

        info!(client_id = %client_id, "Logging out");
        KeyringTokenStorage::clear(&client_id).context("Failed to clear tokens from keyring")?;

        fmt.success("Logged out successfully");
        fmt.info("Credentials removed from keyring");

        Ok(())
    }

    /// Execute status check: report token presence and validity
    async fn execute_status(
        &self,
        fmt: &dyn OutputFormatter,
        format: OutputFormat,
        config_path: &Path,
    ) -> Result<()> {
        use spindex_core::config::Config;
        use spindex_graph::auth::KeyringTokenStorage;

        let config = Config::load_or_default(config_path);

        let client_id = match config.auth.client_id.as_deref() {
            Some(id) => id,
            None => {
                fmt.info("Authentication status: Not configured");
                fmt.info("Set auth.tenant_id and auth.client_id, then run 'spindex auth login'");
                return Ok(());
            }
        };

        let (authenticated, token_status, can_refresh) = match KeyringTokenStorage::load(client_id)
        {
            Ok(Some(tokens)) => {
                let status = if tokens.is_expired() { "Expired" } else { "Valid" };
                (true, status, tokens.refresh_token.is_some())
            }
            Ok(None) => (false, "Not found", false),
            Err(_) => (false, "Error reading keyring", false),
        };

        if format.is_json() {
            let json = serde_json::json!({
                "authenticated": authenticated,
                "client_id": client_id,
                "token_status": token_status,
                "can_refresh": can_refresh,
                "tenant_id": config.auth.tenant_id,
                "scopes": config.auth.scopes,
            });
            fmt.print_json(&json);
        } else if authenticated {
            fmt.success(&format!("Credentials present for client {client_id}"));
            fmt.info(&format!("Token status:   {token_status}"));
            fmt.info(&format!(
                "Refresh token:  {}",
                if can_refresh { "Present" } else { "Absent" }
            ));
            fmt.info(&format!("Scopes:         {}", config.auth.scopes.join(", ")));
        } else {
            fmt.info(&format!("Authentication status: {token_status}"));
            fmt.info("Run 'spindex auth login' to authenticate");
        }

        Ok(())
    }
}
