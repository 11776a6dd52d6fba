//! Log output for the sheetdump binary.
//!
//! Library code only emits events through the `tracing` macros; the binary
//! installs the subscriber once with [`init_tracing`]. Logs go to stderr so
//! that stdout carries nothing but command output.
//!
//! ```ignore
//! use sheetdump_core::tracing::{init_tracing, TracingConfig};
//!
//! let config = if debug { TracingConfig::cli_debug() } else { TracingConfig::default() };
//! init_tracing(config)?;
//! ```

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Crates whose events are shown when `RUST_LOG` is not set.
const LOG_TARGETS: [&str; 3] = ["sheetdump", "sheetdump_core", "sheetdump_providers"];

/// The subscriber could not be installed.
#[derive(Debug, Error)]
#[error("failed to set global tracing subscriber: {0}")]
pub struct TracingError(#[from] tracing::subscriber::SetGlobalDefaultError);

/// How much the binary logs, and with which decorations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level for the sheetdump crates when `RUST_LOG` is not set.
    pub level: Level,
    /// Prefix lines with timestamp, module path and source location.
    pub detailed: bool,
}

impl Default for TracingConfig {
    /// `info` and above, bare messages.
    fn default() -> Self {
        Self {
            level: Level::INFO,
            detailed: false,
        }
    }
}

impl TracingConfig {
    /// `debug` and above, with timestamps and source locations (`--debug`).
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            level: Level::DEBUG,
            detailed: true,
        }
    }

    /// Filter directive used when `RUST_LOG` is absent or unparsable.
    pub fn default_directive(&self) -> String {
        LOG_TARGETS
            .iter()
            .map(|target| format!("{}={}", target, self.level))
            .collect::<Vec<_>>()
            .join(",")
    }

    fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.default_directive()))
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the configured level.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let layer = fmt::layer()
        .compact()
        .with_writer(std::io::stderr)
        .with_file(config.detailed)
        .with_line_number(config.detailed)
        .with_target(config.detailed);
    let layer = if config.detailed {
        layer.boxed()
    } else {
        layer.without_time().boxed()
    };

    let subscriber = tracing_subscriber::registry()
        .with(config.filter())
        .with(layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_quiet() {
        let config = TracingConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert!(!config.detailed);
        assert_eq!(
            config.default_directive(),
            "sheetdump=INFO,sheetdump_core=INFO,sheetdump_providers=INFO"
        );
    }

    #[test]
    fn debug_preset_is_detailed() {
        let config = TracingConfig::cli_debug();
        assert_eq!(config.level, Level::DEBUG);
        assert!(config.detailed);
        assert!(EnvFilter::try_new(config.default_directive()).is_ok());
    }
}
