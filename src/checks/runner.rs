//! The check battery runner.
//!
//! Runs the checks in a fixed, documented order: the binary gate first
//! (later passes assume non-UTF-8 content is already policed), then the
//! line-pattern rules, then the import graph, then the generated-source
//! diff. Each check is independent; the only shared state is the
//! read-only tracked-file listing computed once per run.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{Aggregation, Config};
use crate::enumerate::Enumerator;
use crate::process;
use crate::report;

use super::{
    check_binary_content, check_deprecation_notices, check_import_graph, check_license_headers,
    check_string_conversions, check_test_imports, check_trailing_whitespace, CheckResult,
};

/// Aggregated outcome of a battery run.
#[derive(Debug)]
pub struct RunReport {
    pub checks: Vec<CheckResult>,
}

impl RunReport {
    pub fn failed(&self) -> bool {
        self.checks.iter().any(|c| c.failed())
    }

    pub fn total_violations(&self) -> usize {
        self.checks.iter().map(|c| c.violations.len()).sum()
    }
}

/// Executes the check battery against a repository root.
pub struct Runner<'a> {
    root: &'a Path,
    config: &'a Config,
    tracked: &'a HashSet<PathBuf>,
    verbose: bool,
}

impl<'a> Runner<'a> {
    pub fn new(root: &'a Path, config: &'a Config, tracked: &'a HashSet<PathBuf>) -> Self {
        Self {
            root,
            config,
            tracked,
            verbose: false,
        }
    }

    /// Print a timestamped progress line as each check completes.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Run the battery. With `Aggregation::FailFast` the first check
    /// that finds violations ends the run; with `CollectAll` every check
    /// runs and the report carries the union.
    pub fn run(&self) -> anyhow::Result<RunReport> {
        let started = Instant::now();
        let enumerator = Enumerator::new(self.root, self.tracked, self.config);
        let source_ext = self.config.package.source_extension.clone();
        let source_min = self.config.minimum_for(&source_ext);

        let mut report = RunReport { checks: Vec::new() };

        let checks: Vec<Box<dyn Fn() -> anyhow::Result<CheckResult> + '_>> = vec![
            Box::new(|| {
                let files = enumerator.files(None, 0)?;
                check_binary_content(&files, self.config)
            }),
            Box::new(|| {
                let mut merged = CheckResult::new("license headers");
                for template in &self.config.licenses {
                    let minimum = self.config.minimum_for(&template.extension);
                    let files = enumerator.files(Some(template.extension.as_str()), minimum)?;
                    let mut partial = check_license_headers(&files, template)?;
                    merged.violations.append(&mut partial.violations);
                    merged.scanned += partial.scanned;
                    merged.hint = partial.hint;
                }
                merged.sort();
                Ok(merged)
            }),
            Box::new(|| {
                let files = enumerator.files(None, 0)?;
                check_trailing_whitespace(&files, self.config)
            }),
            Box::new(|| {
                let files = enumerator.files(Some(source_ext.as_str()), source_min)?;
                check_deprecation_notices(&files, self.config)
            }),
            Box::new(|| {
                let files = enumerator.files(Some(source_ext.as_str()), source_min)?;
                check_string_conversions(&files, self.config)
            }),
            Box::new(|| {
                let files = enumerator.files(Some(source_ext.as_str()), source_min)?;
                check_test_imports(self.root, &files, self.config)
            }),
            Box::new(|| {
                let files = enumerator.files(Some(source_ext.as_str()), source_min)?;
                check_import_graph(self.root, &files, self.config)
            }),
            Box::new(|| process::check_generated_sources(self.root, &self.config.codegen)),
        ];

        for check in checks {
            let result = check()?;
            if self.verbose {
                report::progress(result.name, result.scanned, started.elapsed());
            }
            let failed = result.failed();
            report.checks.push(result);
            if failed && self.config.aggregation == Aggregation::FailFast {
                break;
            }
        }

        Ok(report)
    }
}
