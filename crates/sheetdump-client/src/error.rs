//! Client error types.

use std::fmt;

use sheetdump_core::OutputError;
use sheetdump_providers::{ProviderError, ProviderErrorCode};

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error (bad settings or client-secret file).
    Config(String),
    /// Authorization failed or the stored credential was rejected.
    Auth(ProviderError),
    /// The spreadsheet API rejected a request or could not be reached.
    Remote(ProviderError),
    /// IO error.
    Io(std::io::Error),
    /// The output workbook could not be written.
    Output(OutputError),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Auth(err) => write!(f, "authorization failed: {}", err),
            Self::Remote(err) if err.is_retryable() => {
                write!(f, "remote error: {} (temporary failure, try again later)", err)
            }
            Self::Remote(err) => write!(f, "remote error: {}", err),
            Self::Io(err) => write!(f, "IO error: {}", err),
            Self::Output(err) => write!(f, "output error: {}", err),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(_) => None,
            Self::Auth(err) | Self::Remote(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::Output(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ClientError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<OutputError> for ClientError {
    fn from(err: OutputError) -> Self {
        Self::Output(err)
    }
}

impl From<ProviderError> for ClientError {
    fn from(err: ProviderError) -> Self {
        match err.code() {
            ProviderErrorCode::AuthenticationFailed => Self::Auth(err),
            ProviderErrorCode::ConfigurationError => Self::Config(err.message().to_string()),
            ProviderErrorCode::StorageError => Self::Io(std::io::Error::other(err)),
            ProviderErrorCode::AuthorizationFailed
            | ProviderErrorCode::NetworkError
            | ProviderErrorCode::ServerError
            | ProviderErrorCode::InvalidResponse
            | ProviderErrorCode::NotFound
            | ProviderErrorCode::BadRequest
            | ProviderErrorCode::InternalError => Self::Remote(err),
        }
    }
}
