//! Authorization command.

use tracing::info;

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Makes sure a usable credential is stored.
///
/// A valid stored credential is kept unless `force` is set, in which case it
/// is discarded and the browser flow runs again.
pub async fn run(config: &ClientConfig, force: bool) -> ClientResult<()> {
    let manager = super::credential_manager(config)?;

    if force {
        manager.clear()?;
    } else if manager.load().is_some_and(|c| c.is_valid()) {
        println!("Already authorized ({}).", manager.store().path().display());
        println!("Use --force to re-authorize.");
        return Ok(());
    }

    println!("Authorizing access to Google Sheets...");
    println!("A browser window will open if consent is needed.");

    let credential = manager.authorize().await?;

    info!("authorization complete");
    println!();
    println!("Authorization successful!");
    println!("Credential saved to {}", manager.store().path().display());
    if let Some(remaining) = credential.time_until_expiry() {
        println!("Access token valid for {} minutes.", remaining.num_minutes());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use sheetdump_providers::google::{Credential, CredentialStore};

    fn config_in(dir: &tempfile::TempDir) -> ClientConfig {
        ClientConfig {
            credentials_file: dir.path().join("credentials.json"),
            token_path: dir.path().join("token.json"),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn valid_credential_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        let stored = Credential::new("access", Some("refresh".into()), Some(3600), vec![]);
        CredentialStore::new(&config.token_path).save(&stored).unwrap();

        run(&config, false).await.unwrap();
        assert_eq!(CredentialStore::new(&config.token_path).load(), Some(stored));
    }

    #[tokio::test]
    async fn force_discards_the_stored_credential() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(&dir);
        let stored = Credential::new("access", Some("refresh".into()), Some(3600), vec![]);
        CredentialStore::new(&config.token_path).save(&stored).unwrap();

        // Without a client-secret file the browser flow cannot start
        let err = run(&config, true).await.unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
        assert!(!config.token_path.exists());
    }
}
