//! authform command-line host
//!
//! Usage:
//!     authform render --config form.json --set email=ada@example.com
//!     authform submit --config form.json --url https://example.com/login --set email=... --set password=...

mod args;
mod commands;
mod error;
mod paths;

use std::fs;
use std::fs::File;
use std::process::ExitCode;

use clap::Parser;
use log::info;
use simplelog::Config;
use simplelog::WriteLogger;

use args::Cli;
use args::Command;
use error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("Warning: {e}");
    }

    match run(cli.command).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(CliError::Invalid(errors)) => {
            for error in &errors {
                eprintln!("{}: {}", error.field, error.message);
            }
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<String, CliError> {
    match command {
        Command::Render(args) => commands::render(&args),
        Command::Submit(args) => {
            let body = commands::submit(&args).await?;
            Ok(format!("{body:#}"))
        }
    }
}

fn init_logging(cli: &Cli) -> Result<(), CliError> {
    let Some(path) = cli.log_file.clone().or_else(paths::log_file) else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| CliError::Logging(e.to_string()))?;
    }
    let file = File::create(&path).map_err(|e| CliError::Logging(e.to_string()))?;
    WriteLogger::init(cli.log_level.filter(), Config::default(), file)
        .map_err(|e| CliError::Logging(e.to_string()))?;
    info!("Logging to {}", path.display());
    Ok(())
}
