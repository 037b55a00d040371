//! Command-line arguments

use std::path::PathBuf;
use std::str::FromStr;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use simplelog::LevelFilter;

use crate::error::CliError;

#[derive(Parser, Debug)]
#[command(name = "authform", version, about = "Render and submit configuration-driven login forms")]
pub struct Cli {
    /// Log file (defaults to the platform cache directory)
    #[arg(long, global = true, env = "AUTHFORM_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Log verbosity
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info, env = "AUTHFORM_LOG_LEVEL")]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the form as HTML
    Render(RenderArgs),
    /// Validate the form and send it
    Submit(SubmitArgs),
}

/// Where the form comes from and what it holds.
#[derive(Args, Debug, Default)]
pub struct FormArgs {
    /// JSON array of field descriptors (defaults to the email/password form)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Field value as name=value (repeatable)
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub values: Vec<Assignment>,

    /// File field as name=path (repeatable)
    #[arg(long = "file", value_name = "NAME=PATH")]
    pub files: Vec<Assignment>,
}

#[derive(Args, Debug, Default)]
pub struct RenderArgs {
    #[command(flatten)]
    pub form: FormArgs,
}

#[derive(Args, Debug, Default)]
pub struct SubmitArgs {
    #[command(flatten)]
    pub form: FormArgs,

    /// JSON request configuration (method, url, headers, timeoutMs)
    #[arg(long, conflicts_with = "url")]
    pub request: Option<PathBuf>,

    /// Target URL for a plain POST
    #[arg(long)]
    pub url: Option<String>,

    /// Require human verification with this site key
    #[arg(long)]
    pub challenge_site_key: Option<String>,

    /// Token from a solved challenge
    #[arg(long, requires = "challenge_site_key")]
    pub challenge_token: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn filter(self) -> LevelFilter {
        match self {
            Self::Off => LevelFilter::Off,
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
            Self::Trace => LevelFilter::Trace,
        }
    }
}

/// A `name=value` pair from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub name: String,
    pub value: String,
}

impl FromStr for Assignment {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((name, value)) if !name.is_empty() => Ok(Self {
                name: name.to_string(),
                value: value.to_string(),
            }),
            _ => Err(CliError::Assignment(s.to_string())),
        }
    }
}
