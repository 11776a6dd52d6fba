//! CLI, configuration and the export command.
//!
//! This crate provides the `sheetdump` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod transcribe;

pub use cli::Cli;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use transcribe::{collect_worksheets, transcribe};
