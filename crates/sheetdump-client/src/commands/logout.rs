//! Logout command.

use crate::config::ClientConfig;
use crate::error::ClientResult;

/// Deletes the stored credential.
pub fn run(config: &ClientConfig) -> ClientResult<()> {
    let manager = super::credential_manager(config)?;
    let path = manager.store().path().to_path_buf();

    if !path.exists() {
        println!("No stored credential at {}.", path.display());
        return Ok(());
    }

    manager.clear()?;
    println!("Removed stored credential {}.", path.display());
    Ok(())
}
