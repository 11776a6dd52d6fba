//! Obtaining a valid user credential.
//!
//! [`CredentialManager::authorize`] decides between reusing the stored
//! credential, refreshing it, and running the browser consent flow:
//!
//! ```text
//! load ──► valid? ──yes──────────────────────────────► done
//!            │no
//!            ▼
//!      refresh token? ──no──► interactive ──► persist ──► done
//!            │yes
//!            ▼
//!         refresh ──ok──► persist ──► done
//!            │rejected
//!            ▼
//!      clear store, fail (next run is interactive)
//! ```

use tracing::{debug, info, warn};

use crate::error::{ProviderError, ProviderResult};

use super::config::GoogleConfig;
use super::credential::{Credential, CredentialStore};
use super::oauth::OAuthClient;

/// Loads, refreshes and persists the user credential.
#[derive(Debug)]
pub struct CredentialManager {
    config: GoogleConfig,
    store: CredentialStore,
}

impl CredentialManager {
    /// Creates a manager storing its credential at `config.token_path`.
    pub fn new(config: GoogleConfig) -> ProviderResult<Self> {
        config.validate().map_err(ProviderError::configuration)?;
        let store = CredentialStore::new(&config.token_path);
        Ok(Self { config, store })
    }

    /// Returns the provider configuration.
    pub fn config(&self) -> &GoogleConfig {
        &self.config
    }

    /// Returns the credential store.
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    /// Reads the stored credential, if there is a usable one.
    pub fn load(&self) -> Option<Credential> {
        self.store.load()
    }

    /// Renews the access token of `credential` in place.
    ///
    /// # Errors
    ///
    /// Returns an authentication error if the credential has no refresh token
    /// or the token endpoint rejects it.
    pub async fn refresh(&self, credential: &mut Credential) -> ProviderResult<()> {
        let refresh_token = credential
            .refresh_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                ProviderError::authentication("no refresh token, re-authorization required")
            })?;

        debug!("refreshing expired access token");
        let refreshed = self.oauth_client()?.refresh_token(refresh_token).await?;
        if refreshed.refresh_token.is_some() {
            debug!("token endpoint rotated the refresh token");
        }
        credential.apply_refresh(
            refreshed.access_token,
            refreshed.expires_in,
            refreshed.refresh_token,
        );
        Ok(())
    }

    /// Runs the browser consent flow and returns the new credential.
    pub async fn interactive_authorize(&self) -> ProviderResult<Credential> {
        info!("starting Google authorization flow");
        self.oauth_client()?
            .authorize(
                &self.config.scopes,
                self.config.loopback_port_range,
                self.config.callback_timeout,
            )
            .await
    }

    /// Saves `credential` for later runs.
    pub fn persist(&self, credential: &Credential) -> ProviderResult<()> {
        self.store.save(credential)
    }

    /// Deletes the stored credential.
    pub fn clear(&self) -> ProviderResult<()> {
        self.store.clear()
    }

    /// Returns a credential that can authorize API requests right now.
    ///
    /// A refresh token rejected by the server clears the store and fails;
    /// any other refresh failure keeps the stored credential for a retry.
    pub async fn authorize(&self) -> ProviderResult<Credential> {
        let stored = self
            .load()
            .filter(|credential| self.covers_scopes(credential));

        let credential = match stored {
            Some(credential) if credential.is_valid() => {
                debug!(
                    "stored credential is valid, expires in {:?}",
                    credential.time_until_expiry()
                );
                return Ok(credential);
            }
            Some(mut credential) if credential.can_refresh() => {
                match self.refresh(&mut credential).await {
                    Ok(()) => credential,
                    Err(e) if e.is_authentication() => {
                        warn!("refresh token rejected, clearing stored credential: {}", e);
                        self.clear()?;
                        return Err(ProviderError::authentication(format!(
                            "stored credential was rejected ({}); run again to re-authorize",
                            e.message()
                        ))
                        .with_provider("google")
                        .with_source(e));
                    }
                    Err(e) => return Err(e),
                }
            }
            _ => self.interactive_authorize().await?,
        };

        self.persist(&credential)?;
        info!("authorization successful");
        Ok(credential)
    }

    /// Builds the OAuth client, reading the client-secret file.
    fn oauth_client(&self) -> ProviderResult<OAuthClient> {
        let credentials = self
            .config
            .load_credentials()
            .map_err(ProviderError::configuration)?;
        Ok(OAuthClient::new(credentials, &self.config))
    }

    fn covers_scopes(&self, credential: &Credential) -> bool {
        // Credentials saved without scope information are trusted as-is.
        if credential.scopes.is_empty() || credential.has_scopes(&self.config.scopes) {
            return true;
        }
        info!("stored credential lacks required scopes, re-authorizing");
        false
    }
}
