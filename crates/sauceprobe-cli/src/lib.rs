//! Sauceprobe CLI Library
//!
//! Command-line interface for running Saucedemo persona journeys.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::format_push_string)] // String building is clear and correct
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
pub mod handlers;
mod logging;
mod output;
mod runner;

pub use commands::{
    CatalogArgs, Cli, ColorArg, Commands, ConfigArgs, JourneysArgs, LogFormatArg, RunArgs,
};
pub use config::{CliConfig, ColorChoice, LogFormat, Verbosity};
pub use error::{CliError, CliResult};
pub use logging::{default_filter, init_tracing};
pub use output::ProgressReporter;
pub use runner::{load_suite, resolve_journey, JourneyCommand};
