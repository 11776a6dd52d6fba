//! Client configuration.
//!
//! Settings come from an optional `sheetdump.toml` in the working directory
//! (or the file given with `--config`), then command-line flags. With neither,
//! the defaults export the translations spreadsheet to `translations.xlsx`
//! using `credentials.json` and `token.json` from the working directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sheetdump_core::BoundingRange;
use sheetdump_providers::google::GoogleConfig;

use crate::cli::Cli;

/// The spreadsheet exported when none is configured.
pub const DEFAULT_SPREADSHEET_ID: &str = "1h5pehiIn1lvYS8s9hSD3Vdp7YtrHzlA-Aa6a-9ky0tQ";

/// Configuration for the sheetdump client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Identifier of the spreadsheet to export.
    pub spreadsheet_id: String,

    /// Output xlsx file.
    pub output: PathBuf,

    /// OAuth client-secret file.
    pub credentials_file: PathBuf,

    /// Stored user credential.
    pub token_path: PathBuf,

    /// Cell range read from every worksheet.
    pub range: String,

    /// Timeout for API and token requests, in seconds.
    pub timeout_secs: u64,

    /// How long to wait for the browser redirect, in seconds.
    pub callback_timeout_secs: u64,

    /// Debug mode.
    pub debug: bool,

    /// Endpoint overrides, for pointing the client at a test server.
    #[serde(skip_serializing_if = "Endpoints::is_default")]
    pub endpoints: Endpoints,
}

/// Optional replacements for Google's URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    /// OAuth consent page.
    pub auth_url: Option<String>,
    /// OAuth token endpoint.
    pub token_url: Option<String>,
    /// Sheets API base URL.
    pub api_base: Option<String>,
}

impl Endpoints {
    fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: DEFAULT_SPREADSHEET_ID.to_string(),
            output: PathBuf::from("translations.xlsx"),
            credentials_file: PathBuf::from("credentials.json"),
            token_path: PathBuf::from("token.json"),
            range: BoundingRange::default().to_string(),
            timeout_secs: GoogleConfig::DEFAULT_TIMEOUT_SECS,
            callback_timeout_secs: GoogleConfig::DEFAULT_CALLBACK_TIMEOUT_SECS,
            debug: false,
            endpoints: Endpoints::default(),
        }
    }
}

impl ClientConfig {
    /// Loads configuration from the default path, if the file exists.
    pub fn load() -> Result<Self, String> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
        toml::from_str(&content)
            .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        PathBuf::from("sheetdump.toml")
    }

    /// Applies command-line overrides.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(ref id) = cli.spreadsheet_id {
            self.spreadsheet_id = id.clone();
        }
        if let Some(ref output) = cli.output {
            self.output = output.clone();
        }
        if let Some(ref path) = cli.credentials_file {
            self.credentials_file = path.clone();
        }
        if let Some(ref path) = cli.token_path {
            self.token_path = path.clone();
        }
        if let Some(ref range) = cli.range {
            self.range = range.clone();
        }
        if cli.debug {
            self.debug = true;
        }
    }

    /// Parses the configured cell range.
    pub fn bounding_range(&self) -> Result<BoundingRange, String> {
        self.range
            .parse()
            .map_err(|e| format!("invalid range {:?}: {}", self.range, e))
    }

    /// Builds the Google provider configuration.
    pub fn to_google_config(&self) -> Result<GoogleConfig, String> {
        let mut config = GoogleConfig::new()
            .with_credentials_file(&self.credentials_file)
            .with_token_path(&self.token_path)
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_callback_timeout(Duration::from_secs(self.callback_timeout_secs));

        if self.endpoints.auth_url.is_some() || self.endpoints.token_url.is_some() {
            let auth_url = self.endpoints.auth_url.clone().unwrap_or(config.auth_url.clone());
            let token_url = self
                .endpoints
                .token_url
                .clone()
                .unwrap_or(config.token_url.clone());
            config = config.with_oauth_endpoints(auth_url, token_url);
        }
        if let Some(ref api_base) = self.endpoints.api_base {
            config = config.with_api_base(api_base);
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks the settings that can be checked without network access.
    pub fn validate(&self) -> Result<(), String> {
        if self.spreadsheet_id.trim().is_empty() {
            return Err("spreadsheet_id must not be empty".to_string());
        }
        if self.output.as_os_str().is_empty() {
            return Err("output must not be empty".to_string());
        }
        self.bounding_range()?;
        self.to_google_config()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.spreadsheet_id, DEFAULT_SPREADSHEET_ID);
        assert_eq!(config.output, PathBuf::from("translations.xlsx"));
        assert_eq!(config.credentials_file, PathBuf::from("credentials.json"));
        assert_eq!(config.token_path, PathBuf::from("token.json"));
        assert_eq!(config.range, "A1:Z1000");
        assert_eq!(config.bounding_range().unwrap(), BoundingRange::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_toml_roundtrip() {
        let config = ClientConfig {
            spreadsheet_id: "abc".to_string(),
            debug: true,
            ..Default::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(!toml_str.contains("endpoints"));

        let parsed: ClientConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let toml_content = r#"
spreadsheet_id = "other-doc"
output = "out/export.xlsx"
"#;
        let config: ClientConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.spreadsheet_id, "other-doc");
        assert_eq!(config.output, PathBuf::from("out/export.xlsx"));
        assert_eq!(config.token_path, PathBuf::from("token.json"));
        assert_eq!(config.timeout_secs, GoogleConfig::DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sheetdump.toml");
        std::fs::write(&path, "range = \"A1:C5\"\n").unwrap();

        let config = ClientConfig::load_from(&path).unwrap();
        assert_eq!(config.bounding_range().unwrap(), BoundingRange::new(3, 5).unwrap());

        std::fs::write(&path, "range = [").unwrap();
        assert!(ClientConfig::load_from(&path).unwrap_err().contains("parse"));

        let missing = ClientConfig::load_from(&dir.path().join("nope.toml"));
        assert!(missing.unwrap_err().contains("failed to read"));
    }

    #[test]
    fn cli_overrides_config() {
        let cli = Cli::try_parse_from([
            "sheetdump",
            "--spreadsheet-id",
            "from-cli",
            "--output",
            "cli.xlsx",
            "--token-path",
            "/tmp/t.json",
        ])
        .unwrap();

        let mut config = ClientConfig {
            spreadsheet_id: "from-file".to_string(),
            range: "A1:B2".to_string(),
            ..Default::default()
        };
        config.apply_cli(&cli);

        assert_eq!(config.spreadsheet_id, "from-cli");
        assert_eq!(config.output, PathBuf::from("cli.xlsx"));
        assert_eq!(config.token_path, PathBuf::from("/tmp/t.json"));
        assert_eq!(config.range, "A1:B2");
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let bad_range = ClientConfig {
            range: "B2:C3".to_string(),
            ..Default::default()
        };
        assert!(bad_range.validate().unwrap_err().contains("B2:C3"));

        let no_id = ClientConfig {
            spreadsheet_id: " ".to_string(),
            ..Default::default()
        };
        assert!(no_id.validate().is_err());

        let zero_timeout = ClientConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(zero_timeout.validate().is_err());
    }

    #[test]
    fn google_config_uses_endpoint_overrides() {
        let config = ClientConfig {
            token_path: PathBuf::from("state/token.json"),
            endpoints: Endpoints {
                auth_url: None,
                token_url: Some("http://127.0.0.1:9/token".to_string()),
                api_base: Some("http://127.0.0.1:9/v4/".to_string()),
            },
            ..Default::default()
        };

        let google = config.to_google_config().unwrap();
        assert_eq!(google.token_path, PathBuf::from("state/token.json"));
        assert_eq!(google.token_url, "http://127.0.0.1:9/token");
        assert_eq!(google.auth_url, GoogleConfig::GOOGLE_AUTH_URL);
        assert_eq!(google.api_base, "http://127.0.0.1:9/v4");
    }
}
