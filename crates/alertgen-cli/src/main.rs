//! alertgen binary entrypoint.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use alertgen_cli::cli::{Cli, Commands};
use alertgen_cli::commands::{CheckCommand, GenerateCommand};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), alertgen_cli::CliError> {
    let mut stdout = io::stdout().lock();

    match &cli.command {
        Commands::Generate(args) => GenerateCommand::new(args).execute(&mut stdout, cli.format),
        Commands::Check(args) => CheckCommand::new(args).execute(&mut stdout, cli.format),
    }
}
