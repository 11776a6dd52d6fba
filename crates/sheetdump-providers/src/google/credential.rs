//! User credential and its file-backed store.
//!
//! A [`Credential`] is the access/refresh token pair obtained from the OAuth
//! flow. [`CredentialStore`] persists it as JSON so later runs can skip the
//! browser step until the refresh token stops working.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderResult};

/// Seconds subtracted from the server-reported lifetime so the token is
/// refreshed before the API starts rejecting it.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// An OAuth access/refresh token pair for the current user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// The access token for API requests.
    pub access_token: String,

    /// The refresh token for obtaining new access tokens.
    pub refresh_token: Option<String>,

    /// When the access token expires.
    pub expires_at: Option<DateTime<Utc>>,

    /// The OAuth scopes that were granted.
    #[serde(default)]
    pub scopes: Vec<String>,

    /// When the access token was last obtained.
    pub last_refresh: DateTime<Utc>,
}

impl Credential {
    /// Creates a credential from token endpoint data.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: Option<i64>,
        scopes: Vec<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            expires_at: expires_in_secs.map(expiry_from_now),
            scopes,
            last_refresh: Utc::now(),
        }
    }

    /// Returns true if the access token is expired or about to expire.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now() >= expires_at,
            // No expiry reported: treat as valid until the API says otherwise
            None => false,
        }
    }

    /// Returns true if the credential can authorize requests right now.
    pub fn is_valid(&self) -> bool {
        !self.access_token.is_empty() && !self.is_expired()
    }

    /// Returns true if an expired access token can be renewed.
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Returns true if the credential was granted all `required` scopes.
    pub fn has_scopes(&self, required: &[String]) -> bool {
        required.iter().all(|scope| self.scopes.contains(scope))
    }

    /// Applies the result of a refresh.
    ///
    /// Google usually keeps the refresh token, but when a new one is issued
    /// it replaces the old one.
    pub fn apply_refresh(
        &mut self,
        access_token: impl Into<String>,
        expires_in_secs: Option<i64>,
        refresh_token: Option<String>,
    ) {
        self.access_token = access_token.into();
        self.expires_at = expires_in_secs.map(expiry_from_now);
        if let Some(token) = refresh_token {
            self.refresh_token = Some(token);
        }
        self.last_refresh = Utc::now();
    }

    /// Returns the time until the token expires, if known.
    pub fn time_until_expiry(&self) -> Option<Duration> {
        self.expires_at.map(|expires_at| expires_at - Utc::now())
    }
}

fn expiry_from_now(secs: i64) -> DateTime<Utc> {
    Utc::now() + Duration::seconds(secs) - Duration::seconds(EXPIRY_MARGIN_SECS)
}

/// File-backed storage for a single [`Credential`].
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Creates a store at the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the storage path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored credential.
    ///
    /// Returns `None` when there is no file or it cannot be read or parsed;
    /// a broken file only means the user has to authorize again.
    pub fn load(&self) -> Option<Credential> {
        if !self.path.exists() {
            debug!("no credential file at {:?}", self.path);
            return None;
        }

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) => {
                warn!("ignoring unreadable credential file {:?}: {}", self.path, e);
                return None;
            }
        };

        match serde_json::from_str::<Credential>(&content) {
            Ok(credential) => {
                info!("loaded credential from {:?}", self.path);
                Some(credential)
            }
            Err(e) => {
                warn!("ignoring malformed credential file {:?}: {}", self.path, e);
                None
            }
        }
    }

    /// Writes `credential` to disk, replacing any previous one.
    pub fn save(&self, credential: &Credential) -> ProviderResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| {
                ProviderError::storage(format!("failed to create credential directory: {}", e))
                    .with_source(e)
            })?;
        }

        // Write to temp file first, then rename for atomicity
        let temp_path = self.path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(credential).map_err(|e| {
            ProviderError::internal(format!("failed to serialize credential: {}", e))
        })?;

        fs::write(&temp_path, &content).map_err(|e| {
            ProviderError::storage(format!("failed to write credential file: {}", e))
                .with_source(e)
        })?;

        fs::rename(&temp_path, &self.path).map_err(|e| {
            ProviderError::storage(format!("failed to rename credential file: {}", e))
                .with_source(e)
        })?;

        // Set restrictive permissions on Unix
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = fs::Permissions::from_mode(0o600);
            let _ = fs::set_permissions(&self.path, perms);
        }

        debug!("saved credential to {:?}", self.path);
        Ok(())
    }

    /// Deletes the stored credential, if any.
    pub fn clear(&self) -> ProviderResult<()> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|e| {
                ProviderError::storage(format!("failed to remove credential file: {}", e))
                    .with_source(e)
            })?;
            info!("cleared credential at {:?}", self.path);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &tempfile::TempDir) -> CredentialStore {
        CredentialStore::new(dir.path().join("token.json"))
    }

    #[test]
    fn credential_creation() {
        let cred = Credential::new(
            "access-token",
            Some("refresh-token".to_string()),
            Some(3600),
            vec!["scope1".to_string()],
        );

        assert_eq!(cred.access_token, "access-token");
        assert!(cred.expires_at.is_some());
        assert!(!cred.is_expired());
        assert!(cred.is_valid());
        assert!(cred.can_refresh());
    }

    #[test]
    fn expiry_keeps_a_margin() {
        let cred = Credential::new("access", None, Some(3600), vec![]);
        let remaining = cred.time_until_expiry().unwrap();
        assert!(remaining <= Duration::seconds(3600 - EXPIRY_MARGIN_SECS));
        assert!(remaining > Duration::seconds(3400));

        let short = Credential::new("access", None, Some(30), vec![]);
        assert!(short.is_expired());
    }

    #[test]
    fn expired_credential_is_invalid() {
        let mut cred = Credential::new("access", None, Some(3600), vec![]);
        cred.expires_at = Some(Utc::now() - Duration::hours(1));
        assert!(cred.is_expired());
        assert!(!cred.is_valid());
        assert!(!cred.can_refresh());
    }

    #[test]
    fn credential_without_expiry_is_valid() {
        let cred = Credential::new("access", None, None, vec![]);
        assert!(cred.is_valid());

        let empty = Credential::new("", None, None, vec![]);
        assert!(!empty.is_valid());
    }

    #[test]
    fn apply_refresh_extends_expiry() {
        let mut cred = Credential::new("old", Some("refresh".to_string()), Some(3600), vec![]);
        cred.expires_at = Some(Utc::now() - Duration::minutes(5));
        let before = cred.expires_at;

        cred.apply_refresh("new", Some(3600), None);
        assert_eq!(cred.access_token, "new");
        assert_eq!(cred.refresh_token.as_deref(), Some("refresh"));
        assert!(cred.expires_at > before);
        assert!(cred.is_valid());

        cred.apply_refresh("newer", Some(3600), Some("rotated".to_string()));
        assert_eq!(cred.refresh_token.as_deref(), Some("rotated"));
    }

    #[test]
    fn scope_check() {
        let cred = Credential::new("a", None, None, vec!["s1".to_string(), "s2".to_string()]);
        assert!(cred.has_scopes(&["s1".to_string()]));
        assert!(!cred.has_scopes(&["s3".to_string()]));
    }

    #[test]
    fn store_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        let cred = Credential::new(
            "access-token",
            Some("refresh-token".to_string()),
            Some(3600),
            vec!["scope1".to_string()],
        );
        store.save(&cred).unwrap();
        assert!(store.path().exists());

        let loaded = CredentialStore::new(store.path()).load().unwrap();
        assert_eq!(loaded, cred);
    }

    #[test]
    fn store_overwrites_previous_credential() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);

        store.save(&Credential::new("first", None, None, vec![])).unwrap();
        store.save(&Credential::new("second", None, None, vec![])).unwrap();

        assert_eq!(store.load().unwrap().access_token, "second");
    }

    #[cfg(unix)]
    #[test]
    fn store_file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&Credential::new("a", None, None, vec![])).unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn store_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store_in(&dir).load().is_none());
    }

    #[test]
    fn store_malformed_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "not json").unwrap();
        assert!(store.load().is_none());
    }

    #[test]
    fn store_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir);
        store.save(&Credential::new("a", None, None, vec![])).unwrap();

        store.clear().unwrap();
        assert!(!store.path().exists());
        assert!(store.load().is_none());

        // Clearing twice is fine
        store.clear().unwrap();
    }
}
