//! Output formatting and progress reporting

use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use sauceprobe::{JourneyReport, StepReport, StepStatus};

/// Progress reporter for journey runs
#[derive(Debug)]
pub struct ProgressReporter {
    term: Term,
    progress_bar: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl ProgressReporter {
    /// Create a new progress reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            progress_bar: None,
            use_color,
            quiet,
        }
    }

    /// Start a progress bar over the journey's steps
    pub fn start_progress(&mut self, total: u64, message: &str) {
        if self.quiet {
            return;
        }

        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb.set_message(message.to_string());
        self.progress_bar = Some(pb);
    }

    /// Report one finished step and advance the bar
    pub fn step(&self, step: &StepReport) {
        let line = format!("{}. {} ({}ms)", step.index + 1, step.text, step.duration_ms);
        let message = match (&step.status, &step.error) {
            (StepStatus::Failed, Some(error)) => format!("{line}: {error}"),
            _ => line,
        };
        match step.status {
            StepStatus::Passed => self.success(&message),
            StepStatus::Failed => self.failure(&message),
            StepStatus::Skipped => self.println(&self.prefixed("-", "SKIP", Color::Yellow, &message)),
        }
        if let Some(ref pb) = self.progress_bar {
            pb.inc(1);
        }
    }

    /// Finish progress bar
    pub fn finish(&self) {
        if let Some(ref pb) = self.progress_bar {
            pb.finish_and_clear();
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        self.println(&self.prefixed("✓", "PASS", Color::Green, message));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        self.println_always(&self.prefixed("✗", "FAIL", Color::Red, message));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        self.println(&self.prefixed("⚠", "WARN", Color::Yellow, message));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        self.println(&self.prefixed("ℹ", "INFO", Color::Blue, message));
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }

        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };

        self.println("");
        self.println(&styled);
    }

    /// Print the journey summary
    pub fn summary(&self, report: &JourneyReport) {
        let failed = report.count(StepStatus::Failed);
        if self.quiet && failed == 0 {
            return;
        }

        let passed = report.count(StepStatus::Passed);
        let skipped = report.count(StepStatus::Skipped);
        let secs = report.duration_ms as f64 / 1000.0;
        let verdict = if report.passed() { "PASSED" } else { "FAILED" };

        let line = if self.use_color {
            let passed_style = Style::new().green().bold();
            let failed_style = Style::new().red().bold();
            let skipped_style = Style::new().yellow();
            let status = if report.passed() {
                passed_style.apply_to(verdict)
            } else {
                failed_style.apply_to(verdict)
            };
            format!(
                "{} {} in {:.2}s ({} passed, {} failed, {} skipped) seed={}",
                status,
                report.journey,
                secs,
                passed_style.apply_to(passed),
                if failed > 0 {
                    failed_style.apply_to(failed).to_string()
                } else {
                    failed.to_string()
                },
                skipped_style.apply_to(skipped),
                report.seed,
            )
        } else {
            format!(
                "{verdict} {} in {secs:.2}s ({passed} passed, {failed} failed, {skipped} skipped) seed={}",
                report.journey, report.seed
            )
        };

        self.println_always("");
        self.println_always(&line);
    }

    fn prefixed(&self, symbol: &str, word: &str, color: Color, message: &str) -> String {
        let prefix = if self.use_color {
            let styled = style(symbol).bold();
            let colored = match color {
                Color::Green => styled.green(),
                Color::Red => styled.red(),
                Color::Yellow => styled.yellow(),
                Color::Blue => styled.blue(),
            };
            colored.to_string()
        } else {
            word.to_string()
        };
        format!("{prefix} {message}")
    }

    fn println(&self, line: &str) {
        if !self.quiet {
            self.println_always(line);
        }
    }

    fn println_always(&self, line: &str) {
        let _ = match self.progress_bar {
            Some(ref pb) if !pb.is_finished() => {
                pb.println(line);
                Ok(())
            }
            _ => self.term.write_line(line),
        };
    }
}

#[derive(Debug, Clone, Copy)]
enum Color {
    Green,
    Red,
    Yellow,
    Blue,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn report() -> JourneyReport {
        let mut report = JourneyReport::start("login", Some("standard_user".to_string()), 7);
        report.steps.push(StepReport::passed(
            0,
            "the user opens the storefront",
            Duration::from_millis(3),
        ));
        report.steps.push(StepReport::failed(
            1,
            "the user validates item images",
            Duration::from_millis(2),
            "Precondition failed: no product images found",
        ));
        report.steps.push(StepReport::skipped(2, "the user should be able to logout"));
        report.finish(Duration::from_millis(5));
        report
    }

    #[test]
    fn test_new_reporter() {
        let reporter = ProgressReporter::new(true, false);
        assert!(reporter.use_color);
        assert!(!reporter.quiet);
    }

    #[test]
    fn test_prefix_without_color() {
        let reporter = ProgressReporter::new(false, false);
        assert_eq!(
            reporter.prefixed("✓", "PASS", Color::Green, "done"),
            "PASS done"
        );
    }

    #[test]
    fn test_step_lines() {
        let mut reporter = ProgressReporter::new(false, false);
        let report = report();
        reporter.start_progress(report.steps.len() as u64, "login");
        for step in &report.steps {
            reporter.step(step);
        }
        reporter.finish();
        reporter.summary(&report);
        // No panic = success
    }

    #[test]
    fn test_quiet_mode_suppresses_output() {
        let mut reporter = ProgressReporter::new(false, true);
        reporter.start_progress(3, "login");
        assert!(reporter.progress_bar.is_none());
        reporter.success("hidden");
        reporter.warning("hidden");
        reporter.info("hidden");
        reporter.header("hidden");
        // Failure is still printed
        reporter.failure("shown");
    }
}
