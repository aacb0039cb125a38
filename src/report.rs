//! Output formatting for lint results.
//!
//! Two formats: colored terminal output for humans, and JSON for
//! programmatic consumption. Successful runs print one timestamped
//! progress line per check and a final banner; a failing check prints a
//! pluralized header, the enumerated violations, and its remediation
//! hint.

use std::time::Duration;

use colored::*;
use serde::Serialize;

use crate::checks::{CheckResult, RunReport};

/// Timestamped per-check progress line.
pub fn progress(name: &str, scanned: usize, elapsed: Duration) {
    println!(
        "{} {} {}",
        format!("[{:>7.2}s]", elapsed.as_secs_f64()).dimmed(),
        name.cyan(),
        format!("({} files)", scanned).dimmed()
    );
}

/// Print every failing check of a report.
pub fn write_failures(report: &RunReport) {
    for check in report.checks.iter().filter(|c| c.failed()) {
        write_failure(check);
    }
}

fn write_failure(check: &CheckResult) {
    let count = check.violations.len();
    let plural = if count == 1 { "violation" } else { "violations" };
    println!();
    println!(
        "{}",
        format!("Found {} {} in {}:", count, plural, check.name)
            .red()
            .bold()
    );
    for violation in &check.violations {
        print!("  {} {}", "•".red(), violation.file.blue());
        if violation.line > 0 {
            print!("{}", format!(":{}", violation.line).dimmed());
        }
        println!(": {}", violation.message);
    }
    if let Some(hint) = &check.hint {
        println!("  {}", hint.dimmed());
    }
}

/// Final banner for a clean run.
pub fn write_success(elapsed: Duration) {
    println!();
    println!(
        "{} {}",
        "All checks passed".green().bold(),
        format!("({:.2}s)", elapsed.as_secs_f64()).dimmed()
    );
}

#[derive(Serialize)]
struct JsonReport<'a> {
    version: &'static str,
    passed: bool,
    violations: usize,
    checks: &'a [CheckResult],
}

/// Write the whole report as pretty-printed JSON on stdout.
pub fn write_json(report: &RunReport) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&JsonReport {
        version: env!("CARGO_PKG_VERSION"),
        passed: !report.failed(),
        violations: report.total_violations(),
        checks: &report.checks,
    })?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::Violation;

    #[test]
    fn test_json_report_shape() {
        let mut check = CheckResult::new("trailing whitespace");
        check.push(Violation::new("a.dart", 3, "line ends in trailing whitespace"));
        let report = RunReport {
            checks: vec![check],
        };

        let json = serde_json::to_value(&JsonReport {
            version: "0.0.0",
            passed: !report.failed(),
            violations: report.total_violations(),
            checks: &report.checks,
        })
        .unwrap();

        assert_eq!(json["passed"], false);
        assert_eq!(json["violations"], 1);
        assert_eq!(json["checks"][0]["name"], "trailing whitespace");
        assert_eq!(json["checks"][0]["violations"][0]["line"], 3);
    }
}
