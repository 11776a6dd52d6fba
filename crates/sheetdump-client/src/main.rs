//! sheetdump CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use sheetdump_client::cli::{Cli, Command, ConfigAction};
use sheetdump_client::commands;
use sheetdump_client::config::ClientConfig;
use sheetdump_client::error::{ClientError, ClientResult};
use sheetdump_core::{TracingConfig, init_tracing};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Initialize tracing
    let tracing_config = if config.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::default()
    };
    if let Err(e) = init_tracing(tracing_config) {
        eprintln!("warning: failed to initialize logging: {}", e);
    }

    // Run the command
    match run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> ClientResult<ClientConfig> {
    let mut config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path),
        None => ClientConfig::load(),
    }
    .map_err(ClientError::Config)?;

    config.apply_cli(cli);
    Ok(config)
}

async fn run(command: Option<Command>, config: &ClientConfig) -> ClientResult<()> {
    match command {
        None | Some(Command::Export) => {
            let summary = commands::export::run(config).await?;
            println!(
                "Wrote {} worksheets ({} cells) to {}",
                summary.sheet_names.len(),
                summary.cells,
                config.output.display()
            );
            if summary.truncated > 0 {
                eprintln!(
                    "warning: {} cells exceeded the xlsx limit and were truncated",
                    summary.truncated
                );
            }
            Ok(())
        }
        Some(Command::Auth { force }) => commands::auth::run(config, force).await,
        Some(Command::Logout) => commands::logout::run(config),
        Some(Command::Config { action }) => match action {
            ConfigAction::Dump => commands::config::dump(config),
            ConfigAction::Path => commands::config::path(),
        },
    }
}
