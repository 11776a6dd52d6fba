//! Google Sheets implementation.
//!
//! This module provides [`SheetsClient`], a [`SpreadsheetSource`] backed by
//! the Google Sheets API v4, and [`CredentialManager`], which obtains the
//! OAuth credential the client needs.
//!
//! # Authorization Flow
//!
//! 1. The user provides an OAuth client-secret file (`credentials.json`)
//! 2. A stored credential (`token.json`) is reused while its access token is valid
//! 3. An expired access token is renewed with the stored refresh token
//! 4. Otherwise the browser consent flow runs with a loopback redirect
//! 5. The resulting credential is persisted for the next run
//!
//! # Example
//!
//! ```ignore
//! use sheetdump_providers::google::{CredentialManager, GoogleConfig, SheetsClient};
//!
//! let config = GoogleConfig::new();
//! let manager = CredentialManager::new(config.clone())?;
//! let credential = manager.authorize().await?;
//!
//! let client = SheetsClient::new(&credential, &config);
//! let titles = client.list_worksheets("1AbC...").await?;
//! ```
//!
//! [`SpreadsheetSource`]: crate::SpreadsheetSource

mod client;
mod config;
mod credential;
mod manager;
mod oauth;

pub use client::SheetsClient;
pub use config::{GoogleConfig, OAuthCredentials};
pub use credential::{Credential, CredentialStore};
pub use manager::CredentialManager;
pub use oauth::{OAuthClient, PkceFlow, RefreshedToken};
