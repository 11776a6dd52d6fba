//! Configuration commands.

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Dump the effective configuration to stdout.
pub fn dump(config: &ClientConfig) -> ClientResult<()> {
    println!("{}", render(config)?);
    Ok(())
}

/// Show the configuration file path.
pub fn path() -> ClientResult<()> {
    let config_path = ClientConfig::default_path();
    let state = if config_path.exists() {
        "found"
    } else {
        "not found, using defaults"
    };
    println!("config: {} ({})", config_path.display(), state);
    Ok(())
}

fn render(config: &ClientConfig) -> ClientResult<String> {
    let toml_str = toml::to_string_pretty(config)
        .map_err(|e| ClientError::Config(format!("failed to serialize config: {}", e)))?;
    Ok(format!(
        "# {}\n{}",
        ClientConfig::default_path().display(),
        toml_str
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendered_config_parses_back() {
        let config = ClientConfig {
            spreadsheet_id: "doc-42".to_string(),
            ..Default::default()
        };
        let rendered = render(&config).unwrap();
        assert!(rendered.starts_with("# sheetdump.toml\n"));
        assert!(rendered.contains("spreadsheet_id = \"doc-42\""));

        let parsed: ClientConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(parsed, config);
    }
}
