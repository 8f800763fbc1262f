//! Journey execution for the `run` command

use crate::commands::RunArgs;
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use sauceprobe::{
    Actor, BrowserDriver, BrowserSettings, BuiltinJourney, Journey, JourneyReport, JourneyRunner,
    Persona, StorefrontSim, SuiteConfig,
};

/// Resolves, runs and reports one journey
#[derive(Debug)]
pub struct JourneyCommand {
    config: CliConfig,
    reporter: ProgressReporter,
}

impl JourneyCommand {
    /// Create a command runner
    #[must_use]
    pub fn new(config: CliConfig) -> Self {
        let reporter =
            ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
        Self { config, reporter }
    }

    /// Run the journey named in `args`
    ///
    /// # Errors
    ///
    /// Returns error if configuration or setup fails, or
    /// [`CliError::JourneyFailed`] when a step fails
    pub fn run(&mut self, args: &RunArgs) -> CliResult<JourneyReport> {
        let suite = load_suite(args)?;
        let persona = Persona::parse(&args.persona);
        let journey = resolve_journey(&args.journey, &persona, &suite)?;

        self.reporter.header(&format!(
            "{} as {} ({})",
            journey.name(),
            persona,
            if args.simulate { "simulated" } else { "chromium" }
        ));
        if args.simulate && args.has_browser_options() {
            self.reporter
                .warning("browser options have no effect with --simulate");
        }
        if self.config.verbosity.is_verbose() {
            for (i, step) in journey.steps().iter().enumerate() {
                self.reporter.info(&format!("{}. {step}", i + 1));
            }
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        self.reporter
            .start_progress(journey.steps().len() as u64, journey.name());
        let report = runtime.block_on(self.execute(&journey, &suite, args));
        self.reporter.finish();
        let report = report?;
        self.reporter.summary(&report);

        if let Some(path) = &args.report {
            report
                .save_json(path)
                .map_err(|e| CliError::report_generation(e.to_string()))?;
            self.reporter
                .success(&format!("report written to {}", path.display()));
        }

        match report.failed_step() {
            Some(step) => Err(CliError::JourneyFailed {
                journey: report.journey.clone(),
                step: step.index + 1,
                message: step.error.clone().unwrap_or_default(),
            }),
            None => Ok(report),
        }
    }

    async fn execute(
        &self,
        journey: &Journey,
        suite: &SuiteConfig,
        args: &RunArgs,
    ) -> CliResult<JourneyReport> {
        let driver = open_driver(args.simulate, suite).await?;
        let mut actor = Actor::from_config("shopper", driver, suite);
        tracing::info!(seed = actor.seed().value(), "actor ready");

        let mut runner = JourneyRunner::new();
        if let Some(dir) = &args.screenshots {
            runner = runner.with_screenshot_dir(dir);
        }
        let reporter = &self.reporter;
        let report = runner
            .run_with(journey, &mut actor, |step| reporter.step(step))
            .await;

        if let Err(e) = actor.close().await {
            tracing::warn!(error = %e, "closing the browser failed");
        }
        Ok(report)
    }
}

/// Load the suite config and apply command-line overrides
///
/// # Errors
///
/// Returns error if the file cannot be read or the result is invalid
pub fn load_suite(args: &RunArgs) -> CliResult<SuiteConfig> {
    let mut suite = match &args.config {
        Some(path) => SuiteConfig::load(path)?,
        None => SuiteConfig::default(),
    };
    if let Some(url) = &args.base_url {
        suite = suite.with_base_url(url.clone());
    }
    if let Some(seed) = args.seed {
        suite = suite.with_seed(seed);
    }
    let browser = browser_settings(suite.browser.clone(), args);
    suite = suite.with_browser(browser);
    suite.validate()?;
    Ok(suite)
}

fn browser_settings(mut browser: BrowserSettings, args: &RunArgs) -> BrowserSettings {
    if args.headed {
        browser = browser.with_headless(false);
    }
    if let Some((width, height)) = args.viewport {
        browser = browser.with_viewport(width, height);
    }
    if let Some(path) = &args.chromium_path {
        browser = browser.with_chromium_path(path.clone());
    }
    if args.no_sandbox {
        browser = browser.with_no_sandbox();
    }
    browser
}

/// Find a journey by name: config-defined journeys shadow built-ins
///
/// # Errors
///
/// Returns error for unknown journey names, unparseable step text, or
/// a built-in journey requested for an unknown persona
pub fn resolve_journey(name: &str, persona: &Persona, suite: &SuiteConfig) -> CliResult<Journey> {
    if let Some(lines) = suite.journeys.get(name) {
        tracing::debug!(journey = name, "using journey from config");
        return Ok(Journey::from_step_text(name, lines.as_slice(), &suite.checkout)?);
    }
    let builtin = BuiltinJourney::from_name(name).ok_or_else(|| {
        CliError::invalid_argument(format!(
            "unknown journey '{name}' (see `sauceprobe journeys`)"
        ))
    })?;
    Ok(builtin.build(persona, &suite.password, &suite.checkout, &suite.policies())?)
}

async fn open_driver(simulate: bool, suite: &SuiteConfig) -> CliResult<Box<dyn BrowserDriver>> {
    if simulate {
        return Ok(Box::new(StorefrontSim::new(suite.site_root())));
    }
    #[cfg(feature = "browser")]
    {
        let driver = sauceprobe::ChromiumDriver::launch(&suite.browser).await?;
        Ok(Box::new(driver))
    }
    #[cfg(not(feature = "browser"))]
    {
        Err(CliError::invalid_argument(
            "built without the `browser` feature; pass --simulate or rebuild with --features browser",
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::commands::{Cli, Commands};
    use clap::Parser;

    fn run_args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["sauceprobe", "run"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Run(args) => args,
            other => panic!("expected Run, got {other:?}"),
        }
    }

    #[test]
    fn test_overrides_apply() {
        let args = run_args(&["--seed", "5", "--base-url", "http://localhost:3000/", "--headed"]);
        let suite = load_suite(&args).unwrap();
        assert_eq!(suite.seed, Some(5));
        assert_eq!(suite.site_root(), "http://localhost:3000");
        assert!(!suite.browser.headless);
    }

    #[test]
    fn test_browser_options_apply() {
        let args = run_args(&[
            "--viewport",
            "1024x768",
            "--chromium-path",
            "/opt/chromium/chrome",
            "--no-sandbox",
        ]);
        let suite = load_suite(&args).unwrap();
        assert_eq!(suite.browser.viewport_width, 1024);
        assert_eq!(suite.browser.viewport_height, 768);
        assert_eq!(
            suite.browser.chromium_path.as_deref(),
            Some(std::path::Path::new("/opt/chromium/chrome"))
        );
        assert!(!suite.browser.sandbox);
        assert!(suite.browser.headless);
    }

    #[test]
    fn test_bad_base_url_rejected() {
        let args = run_args(&["--base-url", "ftp://example.com"]);
        assert!(matches!(load_suite(&args), Err(CliError::Probe(_))));
    }

    #[test]
    fn test_resolve_builtin() {
        let suite = SuiteConfig::default();
        let journey = resolve_journey("login", &Persona::StandardUser, &suite).unwrap();
        assert_eq!(journey.name(), "login");
        assert_eq!(journey.steps().len(), 1);
    }

    #[test]
    fn test_resolve_unknown_journey() {
        let suite = SuiteConfig::default();
        let err = resolve_journey("checkout-only", &Persona::StandardUser, &suite).unwrap_err();
        assert!(err.to_string().contains("unknown journey"));
    }

    #[test]
    fn test_resolve_builtin_unknown_persona() {
        let suite = SuiteConfig::default();
        let err = resolve_journey("purchase", &Persona::parse("visual_user"), &suite).unwrap_err();
        assert!(err.to_string().contains("Unknown user type"));
    }

    #[test]
    fn test_config_journey_shadows_builtin() {
        let suite = SuiteConfig::default().with_journey(
            "login",
            vec![
                "Given the user opens the storefront".to_string(),
                "the user authenticates as \"problem_user\" with password \"secret_sauce\""
                    .to_string(),
            ],
        );
        let journey = resolve_journey("login", &Persona::StandardUser, &suite).unwrap();
        assert_eq!(journey.steps().len(), 2);
        assert!(journey.persona().is_none());
    }

    #[test]
    fn test_simulated_run_passes() {
        let args = run_args(&["login", "--simulate", "--seed", "1"]);
        let mut command = JourneyCommand::new(
            CliConfig::new().with_verbosity(crate::config::Verbosity::Quiet),
        );
        let report = command.run(&args).unwrap();
        assert!(report.passed());
        assert_eq!(report.seed, 1);
    }

    #[test]
    fn test_simulated_failure_is_journey_failed() {
        let dir = tempfile::tempdir().unwrap();
        let report_path = dir.path().join("run.json");
        let config_path = dir.path().join("suite.yaml");
        let brisk = SuiteConfig::default().with_timings(sauceprobe::Timings::brisk());
        std::fs::write(&config_path, brisk.to_yaml().unwrap()).unwrap();
        // problem_user's last name never sticks, so step two is never reached
        let args = run_args(&[
            "purchase",
            "--simulate",
            "--persona",
            "problem_user",
            "--config",
            config_path.to_str().unwrap(),
            "--report",
            report_path.to_str().unwrap(),
        ]);
        let mut command = JourneyCommand::new(
            CliConfig::new().with_verbosity(crate::config::Verbosity::Quiet),
        );
        let err = command.run(&args).unwrap_err();
        assert!(matches!(err, CliError::JourneyFailed { .. }), "{err}");
        assert!(report_path.exists());
    }
}
