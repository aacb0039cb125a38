//! The check battery: per-rule scanning passes and their runner.

mod binary;
mod deprecation;
mod imports;
mod license;
mod runner;
mod test_imports;
mod to_string;
mod whitespace;

pub use binary::check_binary_content;
pub use deprecation::check_deprecation_notices;
pub use imports::check_import_graph;
pub use license::check_license_headers;
pub use runner::{RunReport, Runner};
pub use test_imports::check_test_imports;
pub use to_string::check_string_conversions;
pub use whitespace::check_trailing_whitespace;

use serde::Serialize;

/// A single rule breach at a file location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub file: String,
    /// 1-based; 0 when the violation is not tied to a line.
    pub line: usize,
    pub message: String,
}

impl Violation {
    pub fn new(file: impl Into<String>, line: usize, message: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line,
            message: message.into(),
        }
    }
}

/// Outcome of one named check: an ordered violation list plus the number
/// of files it scanned.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: &'static str,
    pub violations: Vec<Violation>,
    pub scanned: usize,
    /// Remediation hint printed under the violation list.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl CheckResult {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            violations: Vec::new(),
            scanned: 0,
            hint: None,
        }
    }

    pub fn with_hint(name: &'static str, hint: impl Into<String>) -> Self {
        Self {
            hint: Some(hint.into()),
            ..Self::new(name)
        }
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn failed(&self) -> bool {
        !self.violations.is_empty()
    }

    /// Sort violations by (file, line, message) so parallel scans report
    /// deterministically.
    pub fn sort(&mut self) {
        self.violations
            .sort_by(|a, b| (&a.file, a.line, &a.message).cmp(&(&b.file, b.line, &b.message)));
    }
}
