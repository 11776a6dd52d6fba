//! Spreadsheet sources for sheetdump.
//!
//! This crate provides the read side of a transcription:
//!
//! - [`SpreadsheetSource`] - The trait every spreadsheet backend implements
//! - [`MemorySource`] - An in-memory backend
//! - [`google`] - The Google Sheets backend and its OAuth credential handling
//! - [`ProviderError`] - Error types for provider operations
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐    ┌──────────────┐
//! │  Google Sheets API  │    │  in memory   │
//! └──────────┬──────────┘    └──────┬───────┘
//!            │                      │
//!            ▼                      ▼
//! ┌─────────────────────┐    ┌──────────────┐
//! │    SheetsClient     │    │ MemorySource │
//! └──────────┬──────────┘    └──────┬───────┘
//!            │                      │
//!            │  SpreadsheetSource   │
//!            └──────────┬───────────┘
//!                       │
//!                       ▼
//!                ┌─────────────┐
//!                │  Worksheet  │
//!                └─────────────┘
//! ```

pub mod error;
#[cfg(feature = "google")]
pub mod google;
pub mod source;

// Re-export main types at crate root
pub use error::{ProviderError, ProviderErrorCode, ProviderResult};
pub use source::{BoxFuture, MemorySource, SpreadsheetSource};
