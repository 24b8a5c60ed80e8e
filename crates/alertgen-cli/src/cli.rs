//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Default location of the generator configuration.
pub const DEFAULT_CONFIG_PATH: &str = "config/alerts_config.json";

/// Default directory the provisioning files are written to.
pub const DEFAULT_OUTPUT_DIR: &str = "config";

/// alertgen - generate Grafana alert provisioning files.
#[derive(Parser, Debug, Clone)]
#[command(name = "alertgen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table, global = true)]
    pub format: Format,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Format {
    /// Human-readable text.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Generate alert_rules.yml and notification_policies.yml.
    Generate(GenerateArgs),

    /// Validate the configuration and show what would be generated.
    Check(CheckArgs),
}

/// Arguments for the generate command.
#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Path to alerts_config.json.
    #[arg(short, long, env = "ALERTGEN_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Directory to write the provisioning files into.
    #[arg(short, long, env = "ALERTGEN_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,
}

/// Arguments for the check command.
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Path to alerts_config.json.
    #[arg(short, long, env = "ALERTGEN_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,
}
