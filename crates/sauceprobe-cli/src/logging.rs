//! Tracing subscriber setup

use crate::config::{CliConfig, LogFormat};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is unset
#[must_use]
pub fn default_filter(config: &CliConfig) -> String {
    let level = config.verbosity.log_directive();
    format!("warn,sauceprobe={level},sauceprobe_cli={level}")
}

/// Install the global subscriber; logs go to stderr so stdout stays clean
pub fn init_tracing(config: &CliConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(config)));
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.log_format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Text => registry
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(config.color.should_color()),
            )
            .try_init(),
    };
    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Verbosity;

    #[test]
    fn test_default_filter_follows_verbosity() {
        let config = CliConfig::new().with_verbosity(Verbosity::Verbose);
        assert_eq!(
            default_filter(&config),
            "warn,sauceprobe=info,sauceprobe_cli=info"
        );
        assert!(EnvFilter::try_new(default_filter(&config)).is_ok());
    }

    #[test]
    fn test_init_twice_is_harmless() {
        let config = CliConfig::new();
        init_tracing(&config);
        init_tracing(&config);
    }
}
