//! Google Sheets provider configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// OAuth 2.0 client credentials for Google API access.
///
/// These identify the application, not the user. They come from the
/// client-secret file downloaded from the Google Cloud Console.
#[derive(Debug, Clone)]
pub struct OAuthCredentials {
    /// The OAuth 2.0 client ID from Google Cloud Console.
    pub client_id: String,
    /// The OAuth 2.0 client secret from Google Cloud Console.
    pub client_secret: String,
}

/// Structure of Google's OAuth client-secret JSON file.
///
/// Supports multiple formats:
/// 1. Google Cloud Console format with "installed" or "web" section
/// 2. Flat format with client_id and client_secret at root level (e.g., from gcloud)
#[derive(Debug, Deserialize)]
pub struct GoogleCredentialsFile {
    /// Credentials for installed (desktop) applications.
    pub installed: Option<NestedCredentials>,
    /// Credentials for web applications.
    pub web: Option<NestedCredentials>,
    /// Direct client_id (flat format).
    pub client_id: Option<String>,
    /// Direct client_secret (flat format).
    pub client_secret: Option<String>,
}

/// OAuth credentials within a nested section of the client-secret file.
#[derive(Debug, Deserialize)]
pub struct NestedCredentials {
    /// The OAuth 2.0 client ID.
    pub client_id: String,
    /// The OAuth 2.0 client secret.
    pub client_secret: String,
}

impl OAuthCredentials {
    /// Creates new OAuth credentials.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Loads OAuth credentials from a Google Cloud Console JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read client secret file {}: {}", path.display(), e))?;
        Self::from_json(&content)
    }

    /// Parses OAuth credentials from a Google client-secret JSON string.
    ///
    /// Supports multiple formats:
    /// 1. Google Cloud Console format: `{"installed": {"client_id": "...", "client_secret": "..."}}`
    /// 2. Flat format: `{"client_id": "...", "client_secret": "..."}`
    pub fn from_json(json: &str) -> Result<Self, String> {
        let file: GoogleCredentialsFile = serde_json::from_str(json)
            .map_err(|e| format!("failed to parse client secret JSON: {}", e))?;

        if let Some(creds) = file.installed.or(file.web) {
            return Ok(Self::new(creds.client_id, creds.client_secret));
        }

        if let (Some(client_id), Some(client_secret)) = (file.client_id, file.client_secret) {
            return Ok(Self::new(client_id, client_secret));
        }

        Err("client secret file must contain 'installed'/'web' section or 'client_id'/'client_secret' at root level".to_string())
    }

    /// Validates that the credentials appear to be correctly formatted.
    ///
    /// This checks that:
    /// - Client ID ends with `.apps.googleusercontent.com`
    /// - Client secret is non-empty
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.client_id.is_empty() {
            return Err("client_id is required");
        }
        if !self.client_id.ends_with(".apps.googleusercontent.com") {
            return Err("client_id should end with .apps.googleusercontent.com");
        }
        if self.client_secret.is_empty() {
            return Err("client_secret is required");
        }
        Ok(())
    }
}

/// Configuration for the Google Sheets provider.
///
/// The client-secret file is only read when interactive authorization is
/// needed, so a run with a valid stored credential works without it.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Path to the OAuth client-secret JSON file.
    ///
    /// Defaults to `credentials.json` in the working directory.
    pub credentials_file: PathBuf,

    /// Path to store the user credential.
    ///
    /// Defaults to `token.json` in the working directory.
    pub token_path: PathBuf,

    /// Request timeout for API and token calls.
    pub timeout: Duration,

    /// How long to wait for the browser redirect during authorization.
    pub callback_timeout: Duration,

    /// User agent string for API requests.
    pub user_agent: String,

    /// Port range for the loopback OAuth server.
    ///
    /// `(0, 0)` (the default) lets the OS pick an ephemeral port.
    pub loopback_port_range: (u16, u16),

    /// OAuth scopes to request.
    ///
    /// Defaults to `["https://www.googleapis.com/auth/spreadsheets.readonly"]`.
    pub scopes: Vec<String>,

    /// Authorization endpoint (consent page).
    pub auth_url: String,

    /// Token endpoint (code exchange and refresh).
    pub token_url: String,

    /// Base URL of the Sheets API, without trailing slash.
    pub api_base: String,
}

impl GoogleConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Default time to wait for the OAuth redirect, in seconds.
    pub const DEFAULT_CALLBACK_TIMEOUT_SECS: u64 = 300;

    /// Default OAuth scope for read-only spreadsheet access.
    pub const DEFAULT_SCOPE: &'static str =
        "https://www.googleapis.com/auth/spreadsheets.readonly";

    /// Google's OAuth consent endpoint.
    pub const GOOGLE_AUTH_URL: &'static str = "https://accounts.google.com/o/oauth2/v2/auth";

    /// Google's OAuth token endpoint.
    pub const GOOGLE_TOKEN_URL: &'static str = "https://oauth2.googleapis.com/token";

    /// Base URL for Google Sheets API v4.
    pub const SHEETS_API_BASE: &'static str = "https://sheets.googleapis.com/v4";

    /// Creates a configuration with the default file locations and endpoints.
    pub fn new() -> Self {
        Self {
            credentials_file: PathBuf::from("credentials.json"),
            token_path: PathBuf::from("token.json"),
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            callback_timeout: Duration::from_secs(Self::DEFAULT_CALLBACK_TIMEOUT_SECS),
            user_agent: format!("sheetdump/{}", env!("CARGO_PKG_VERSION")),
            loopback_port_range: (0, 0),
            scopes: vec![Self::DEFAULT_SCOPE.to_string()],
            auth_url: Self::GOOGLE_AUTH_URL.to_string(),
            token_url: Self::GOOGLE_TOKEN_URL.to_string(),
            api_base: Self::SHEETS_API_BASE.to_string(),
        }
    }

    /// Sets the client-secret file path.
    pub fn with_credentials_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.credentials_file = path.into();
        self
    }

    /// Sets the credential storage path.
    pub fn with_token_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.token_path = path.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets how long to wait for the OAuth redirect.
    pub fn with_callback_timeout(mut self, timeout: Duration) -> Self {
        self.callback_timeout = timeout;
        self
    }

    /// Sets the loopback port range for OAuth.
    pub fn with_loopback_port_range(mut self, start: u16, end: u16) -> Self {
        self.loopback_port_range = (start, end);
        self
    }

    /// Sets the OAuth scopes.
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// Points the OAuth endpoints somewhere other than Google.
    pub fn with_oauth_endpoints(
        mut self,
        auth_url: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        self.auth_url = auth_url.into();
        self.token_url = token_url.into();
        self
    }

    /// Points the Sheets API somewhere other than Google.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Loads the OAuth client credentials from [`Self::credentials_file`].
    pub fn load_credentials(&self) -> Result<OAuthCredentials, String> {
        let credentials = OAuthCredentials::from_file(&self.credentials_file)?;
        credentials
            .validate()
            .map_err(|e| format!("invalid client secret file: {}", e))?;
        Ok(credentials)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.scopes.is_empty() {
            return Err("at least one OAuth scope is required".to_string());
        }

        if self.loopback_port_range.0 > self.loopback_port_range.1 {
            return Err("invalid loopback port range".to_string());
        }

        if self.timeout.is_zero() || self.callback_timeout.is_zero() {
            return Err("timeouts must be greater than zero".to_string());
        }

        Ok(())
    }
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self::new()
    }
}
