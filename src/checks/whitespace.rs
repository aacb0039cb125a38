//! Trailing-whitespace enforcement.
//!
//! Runs over nearly all tracked files. Assumes the binary gate already
//! passed, so anything that is not valid UTF-8 here was either
//! deny-listed or allow-listed and is simply skipped.

use rayon::prelude::*;

use crate::config::Config;
use crate::enumerate::TrackedFile;

use super::{CheckResult, Violation};

/// Check that no line ends in a space or tab and that no file ends with
/// a trailing blank line.
pub fn check_trailing_whitespace(
    files: &[TrackedFile],
    config: &Config,
) -> anyhow::Result<CheckResult> {
    let mut result = CheckResult::new("trailing whitespace");

    let candidates: Vec<&TrackedFile> = files
        .iter()
        .filter(|f| !is_excluded(f, &config.whitespace_exclusions))
        .collect();

    let per_file: Vec<Vec<Violation>> = candidates
        .par_iter()
        .map(|file| scan_file(file))
        .collect::<anyhow::Result<Vec<_>>>()?;

    result.scanned = candidates.len();
    result.violations = per_file.into_iter().flatten().collect();
    result.sort();
    Ok(result)
}

fn scan_file(file: &TrackedFile) -> anyhow::Result<Vec<Violation>> {
    let bytes = std::fs::read(&file.path)?;
    let Ok(raw) = std::str::from_utf8(&bytes) else {
        return Ok(Vec::new());
    };
    // `\r\n` line endings are normalized so the trailing-blank-line test
    // sees the same shape either way.
    let content = raw.replace("\r\n", "\n");

    let path = file.path.display().to_string();
    let mut violations = Vec::new();
    let mut line_count = 0;

    for (index, line) in content.lines().enumerate() {
        line_count = index + 1;
        if line.ends_with(' ') || line.ends_with('\t') {
            violations.push(Violation::new(
                path.clone(),
                line_count,
                "line ends in trailing whitespace",
            ));
        }
    }

    // `lines()` drops the empty segment after a final newline, so a
    // trailing blank line is detected on the raw content. A file whose
    // last line is non-empty but lacks a final newline is fine.
    if content.ends_with("\n\n") || content == "\n" {
        violations.push(Violation::new(
            path,
            line_count + 1,
            "file ends with a trailing blank line",
        ));
    }

    Ok(violations)
}

fn is_excluded(file: &TrackedFile, exclusions: &[String]) -> bool {
    let name = file.file_name();
    exclusions.iter().any(|entry| {
        if let Some(ext) = entry.strip_prefix('.') {
            file.extension == ext
        } else {
            name == entry
        }
    })
}
