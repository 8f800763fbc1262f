//! Sauceprobe CLI: run Saucedemo journeys from the command line
//!
//! ## Usage
//!
//! ```bash
//! sauceprobe run purchase --persona standard_user   # Drive Chromium
//! sauceprobe run images -p problem_user --simulate  # No browser needed
//! sauceprobe run login --report target/login.json   # Write a JSON report
//! sauceprobe journeys                               # List journeys
//! sauceprobe config > sauceprobe.yaml               # Default config
//! ```

use clap::Parser;
use sauceprobe_cli::{handlers, init_tracing, Cli, CliConfig, CliResult, Commands, JourneyCommand};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();

    let config = build_config(&cli);
    init_tracing(&config);

    match cli.command {
        Commands::Run(args) => JourneyCommand::new(config).run(&args).map(|_| ()),
        Commands::Journeys(args) => {
            print!("{}", handlers::journeys(&args)?);
            Ok(())
        }
        Commands::Personas => {
            print!("{}", handlers::personas());
            Ok(())
        }
        Commands::Catalog(args) => {
            println!("{}", handlers::catalog(&args)?.trim_end());
            Ok(())
        }
        Commands::Config(args) => {
            print!("{}", handlers::config(&args)?);
            Ok(())
        }
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    CliConfig::new()
        .with_verbosity(sauceprobe_cli::Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(cli.color.clone().into())
        .with_log_format(cli.log_format.clone().into())
}
