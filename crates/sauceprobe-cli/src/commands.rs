//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Sauceprobe: persona journeys against the Saucedemo storefront
#[derive(Parser, Debug)]
#[command(name = "sauceprobe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Log line format
    #[arg(long, default_value = "text", global = true, env = "SAUCEPROBE_LOG_FORMAT")]
    pub log_format: LogFormatArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a journey as a persona
    Run(RunArgs),

    /// List built-in and configured journeys
    Journeys(JourneysArgs),

    /// List personas and their policies
    Personas,

    /// Print the page locator catalog
    Catalog(CatalogArgs),

    /// Print or check suite configuration
    Config(ConfigArgs),
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Journey name (built-in or from the config file)
    #[arg(default_value = "purchase")]
    pub journey: String,

    /// Persona to run as
    #[arg(short, long, default_value = "standard_user", env = "SAUCEPROBE_PERSONA")]
    pub persona: String,

    /// Suite configuration file (YAML)
    #[arg(short, long, env = "SAUCEPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Run against the in-process simulated storefront
    #[arg(long)]
    pub simulate: bool,

    /// Show the browser window
    #[arg(long)]
    pub headed: bool,

    /// Browser viewport size
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_viewport)]
    pub viewport: Option<(u32, u32)>,

    /// Chromium executable to launch
    #[arg(long)]
    pub chromium_path: Option<PathBuf>,

    /// Launch Chromium without its sandbox (containers, CI)
    #[arg(long)]
    pub no_sandbox: bool,

    /// Sampler seed for product selection
    #[arg(long)]
    pub seed: Option<u64>,

    /// Override the storefront URL
    #[arg(long, env = "SAUCEPROBE_BASE_URL")]
    pub base_url: Option<String>,

    /// Write the journey report as JSON
    #[arg(short, long)]
    pub report: Option<PathBuf>,

    /// Directory for failure screenshots
    #[arg(long)]
    pub screenshots: Option<PathBuf>,
}

impl RunArgs {
    /// Whether any option only a real browser honours was given
    #[must_use]
    pub const fn has_browser_options(&self) -> bool {
        self.headed || self.no_sandbox || self.viewport.is_some() || self.chromium_path.is_some()
    }
}

fn parse_viewport(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let parse = |dim: &str| {
        dim.trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| format!("invalid viewport dimension '{dim}'"))
    };
    Ok((parse(width)?, parse(height)?))
}

/// Arguments for the journeys command
#[derive(Parser, Debug)]
pub struct JourneysArgs {
    /// Also list journeys defined in this config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Arguments for the catalog command
#[derive(Parser, Debug)]
pub struct CatalogArgs {
    /// Only show this page
    #[arg(long)]
    pub page: Option<String>,

    /// Print as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Validate a config file instead of printing the defaults
    #[arg(long)]
    pub check: Option<PathBuf>,
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

/// Log format argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormatArg {
    /// Human-readable lines
    #[default]
    Text,
    /// JSON lines
    Json,
}

impl From<LogFormatArg> for crate::config::LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Text => Self::Text,
            LogFormatArg::Json => Self::Json,
        }
    }
}
