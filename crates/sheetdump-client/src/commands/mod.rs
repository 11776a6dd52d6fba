//! Subcommand implementations.

pub mod auth;
pub mod config;
pub mod export;
pub mod logout;

use sheetdump_providers::google::CredentialManager;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Builds the credential manager for the configured token and secret files.
fn credential_manager(config: &ClientConfig) -> ClientResult<CredentialManager> {
    let google_config = config.to_google_config().map_err(ClientError::Config)?;
    Ok(CredentialManager::new(google_config)?)
}
