//! Terminal output for run summaries. Everything goes to stderr so stdout
//! stays free for the dataset JSON.

use crate::driver::{RunReport, TaskOutcome};
use std::io::IsTerminal;

/// Check if color output is enabled.
pub fn color_enabled() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    std::io::stderr().is_terminal()
}

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Colored string builder.
pub struct Styled {
    use_color: bool,
}

impl Styled {
    pub fn new() -> Self {
        Self {
            use_color: color_enabled(),
        }
    }

    pub fn plain() -> Self {
        Self { use_color: false }
    }

    /// Green checkmark symbol.
    pub fn ok_sym(&self) -> &str {
        if self.use_color {
            "\x1b[32m\u{2713}\x1b[0m"
        } else {
            "OK"
        }
    }

    /// Red X symbol.
    pub fn fail_sym(&self) -> &str {
        if self.use_color {
            "\x1b[31m\u{2717}\x1b[0m"
        } else {
            "!!"
        }
    }

    /// Yellow warning symbol.
    pub fn warn_sym(&self) -> &str {
        if self.use_color {
            "\x1b[33m\u{26a0}\x1b[0m"
        } else {
            "??"
        }
    }

    fn paint(&self, code: &str, s: &str) -> String {
        if self.use_color {
            format!("{code}{s}{RESET}")
        } else {
            s.to_string()
        }
    }

    pub fn green(&self, s: &str) -> String {
        self.paint(GREEN, s)
    }

    pub fn red(&self, s: &str) -> String {
        self.paint(RED, s)
    }

    pub fn yellow(&self, s: &str) -> String {
        self.paint(YELLOW, s)
    }

    pub fn dim(&self, s: &str) -> String {
        self.paint(DIM, s)
    }

    pub fn bold(&self, s: &str) -> String {
        self.paint(BOLD, s)
    }
}

impl Default for Styled {
    fn default() -> Self {
        Self::new()
    }
}

/// Print a branded header for CLI output.
pub fn print_header(s: &Styled) {
    eprintln!(
        "  {} {}",
        s.bold("statscrawl"),
        s.dim(&format!("v{}", env!("CARGO_PKG_VERSION")))
    );
    eprintln!();
}

/// Format a duration in seconds into human-readable (e.g., "2h 14m").
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        let m = secs / 60;
        let s = secs % 60;
        format!("{m}m {s}s")
    } else {
        let h = secs / 3600;
        let m = (secs % 3600) / 60;
        format!("{h}h {m}m")
    }
}

/// One line per task.
pub fn task_line(s: &Styled, task: &str, outcome: &TaskOutcome) -> String {
    match outcome {
        TaskOutcome::Extracted { rows, variant, .. } => {
            let via = variant
                .map(|v| format!(" via {v:?}").to_lowercase())
                .unwrap_or_default();
            format!("    {} {task:<24} {rows} rows{}", s.ok_sym(), s.dim(&via))
        }
        TaskOutcome::NoData { attempted } => format!(
            "    {} {task:<24} {}",
            s.warn_sym(),
            s.yellow(&format!("no data ({} urls tried)", attempted.len()))
        ),
        TaskOutcome::Aborted { reason, .. } => {
            format!("    {} {task:<24} {}", s.fail_sym(), s.red(reason))
        }
    }
}

/// Print the per-task outcomes and the run totals.
pub fn print_summary(s: &Styled, report: &RunReport, elapsed_secs: u64) {
    eprintln!("  {}", s.bold("Tasks"));
    for result in &report.results {
        eprintln!("{}", task_line(s, &result.task.to_string(), &result.outcome));
    }
    eprintln!();

    let dataset = &report.consolidation.dataset;
    eprintln!("  {}", s.bold("Dataset"));
    for category in dataset.categories() {
        let periods = dataset.periods(category).map_or(0, |p| p.len());
        eprintln!("    {category:<24} {periods} periods");
    }
    for category in &report.consolidation.empty_categories {
        eprintln!(
            "    {category:<24} {}",
            s.yellow("no data in any period")
        );
    }
    eprintln!();

    let status = format!(
        "{} extracted, {} no data, {} aborted, {} rows in {}",
        report.count("extracted"),
        report.count("no_data"),
        report.count("aborted"),
        dataset.total_rows(),
        format_duration(elapsed_secs)
    );
    let status = if report.count("aborted") > 0 || report.fatal.is_some() {
        s.yellow(&status)
    } else {
        s.green(&status)
    };
    eprintln!("  {}: {status}", s.bold("Status"));
    if let Some(e) = &report.fatal {
        eprintln!(
            "  {}: {}",
            s.bold("Stopped"),
            s.red(&format!("fetch session lost ({e}); later tasks did not run"))
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cartography::url_variants::VariantKind;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(42), "42s");
        assert_eq!(format_duration(125), "2m 5s");
        assert_eq!(format_duration(7_260), "2h 1m");
    }

    #[test]
    fn test_task_line_plain() {
        let s = Styled::plain();
        let line = task_line(
            &s,
            "batting 2015",
            &TaskOutcome::Extracted {
                url: "u".into(),
                variant: Some(VariantKind::Range),
                rows: 12,
            },
        );
        assert!(line.contains("OK batting 2015"));
        assert!(line.contains("12 rows via range"));

        let line = task_line(
            &s,
            "fielding 2008",
            &TaskOutcome::NoData {
                attempted: vec!["a".into(), "b".into()],
            },
        );
        assert!(line.contains("?? fielding 2008"));
        assert!(line.contains("no data (2 urls tried)"));
    }
}
