//! Command-line interface definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// sheetdump - Copy every worksheet of a Google spreadsheet into an xlsx file
#[derive(Debug, Parser)]
#[command(name = "sheetdump")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, global = true, env = "SHEETDUMP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    // --- Source ---
    /// Identifier of the spreadsheet to export
    #[arg(long, global = true, env = "SHEETDUMP_SPREADSHEET_ID")]
    pub spreadsheet_id: Option<String>,

    /// Cell range read from every worksheet, anchored at A1 (e.g. A1:Z1000)
    #[arg(long, global = true)]
    pub range: Option<String>,

    // --- Files ---
    /// Output xlsx file
    #[arg(long, short, global = true)]
    pub output: Option<PathBuf>,

    /// OAuth client-secret JSON file from the Google Cloud Console
    #[arg(long, global = true, env = "SHEETDUMP_CREDENTIALS_FILE")]
    pub credentials_file: Option<PathBuf>,

    /// Where the user credential is stored between runs
    #[arg(long, global = true, env = "SHEETDUMP_TOKEN_PATH")]
    pub token_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Export all worksheets (the default)
    Export,

    /// Authorize access to Google Sheets and store the credential
    Auth {
        /// Discard the stored credential and run the browser flow again
        #[arg(long, short)]
        force: bool,
    },

    /// Delete the stored credential
    Logout,

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration as TOML
    Dump,
    /// Print the configuration file path
    Path,
}
