//! External process orchestration.
//!
//! Invocations are synchronous and sequential: the driver blocks until
//! each subprocess exits, and a non-zero exit is fatal for that step
//! with the tool's captured stdout/stderr surfaced immediately. The
//! invoked tools are expected to be read-only against the checked-out
//! tree.

use std::path::Path;
use std::process::Command;

use thiserror::Error;
use walkdir::WalkDir;

use crate::checks::{CheckResult, Violation};
use crate::config::{AnalyzerCommand, CodegenTarget};

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}\nstdout:\n{stdout}\nstderr:\n{stderr}")]
    Failed {
        program: String,
        status: String,
        stdout: String,
        stderr: String,
    },
}

/// Run a command to completion and return its stdout. A non-zero exit
/// becomes an error carrying the captured output.
pub fn run_capture(program: &str, args: &[String], cwd: &Path) -> Result<String, ProcessError> {
    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .output()
        .map_err(|source| ProcessError::Launch {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(ProcessError::Failed {
            program: program.to_string(),
            status: output.status.to_string(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Diff each codegen target's stdout against its checked-in file.
pub fn check_generated_sources(
    root: &Path,
    targets: &[CodegenTarget],
) -> anyhow::Result<CheckResult> {
    let mut result = CheckResult::new("generated sources");

    for target in targets {
        let generated = run_capture(&target.program, &target.args, root)?;
        let expected_path = root.join(&target.expected_file);
        let checked_in = std::fs::read_to_string(&expected_path)?;

        let generated = generated.trim();
        let checked_in = checked_in.trim();
        if generated == checked_in {
            result.scanned += 1;
            continue;
        }

        let (line, diff) = first_difference(checked_in, generated);
        result.push(Violation::new(
            expected_path.display().to_string(),
            line,
            format!(
                "generated output for '{}' does not match the checked-in file; {}\n{}",
                target.name, target.regenerate_hint, diff
            ),
        ));
        result.scanned += 1;
    }

    result.sort();
    Ok(result)
}

/// Line number of the first differing line plus a short unified-diff
/// style excerpt.
fn first_difference(expected: &str, actual: &str) -> (usize, String) {
    const CONTEXT_LIMIT: usize = 10;

    let expected_lines: Vec<&str> = expected.lines().collect();
    let actual_lines: Vec<&str> = actual.lines().collect();
    let total = expected_lines.len().max(actual_lines.len());

    let mut first = 1;
    let mut excerpt = vec!["--- checked in".to_string(), "+++ regenerated".to_string()];
    let mut shown = 0;

    for i in 0..total {
        let old = expected_lines.get(i).copied();
        let new = actual_lines.get(i).copied();
        if old == new {
            continue;
        }
        if shown == 0 {
            first = i + 1;
        }
        if shown < CONTEXT_LIMIT {
            if let Some(old) = old {
                excerpt.push(format!("-{}", old));
            }
            if let Some(new) = new {
                excerpt.push(format!("+{}", new));
            }
        }
        shown += 1;
    }
    if shown > CONTEXT_LIMIT {
        excerpt.push(format!("... ({} more differing lines)", shown - CONTEXT_LIMIT));
    }

    (first, excerpt.join("\n"))
}

/// Run the wrapped analyzer: once plainly against the repository root,
/// and (when a sample app is configured) once in benchmark mode against
/// a synthetically inflated copy built in a temporary directory.
pub fn run_analyzer_suite(
    root: &Path,
    analyzer: &AnalyzerCommand,
    extra_args: &[String],
) -> anyhow::Result<()> {
    let mut args = analyzer.args.clone();
    args.extend(extra_args.iter().cloned());
    run_capture(&analyzer.program, &args, root)?;

    if let Some(sample) = &analyzer.sample_app {
        let corpus = tempfile::tempdir()?;
        inflate_sample(&root.join(sample), corpus.path(), analyzer.inflate_copies)?;

        let mut args = analyzer.benchmark_args.clone();
        args.extend(extra_args.iter().cloned());
        run_capture(&analyzer.program, &args, corpus.path())?;
    }

    Ok(())
}

/// Duplicate a sample application `copies` times under `dest` to build
/// a stress-test corpus for the analyzer.
fn inflate_sample(sample: &Path, dest: &Path, copies: usize) -> anyhow::Result<()> {
    for copy in 0..copies {
        let target_root = dest.join(format!("copy_{:03}", copy));
        for entry in WalkDir::new(sample) {
            let entry = entry?;
            let relative = entry.path().strip_prefix(sample)?;
            let target = target_root.join(relative);
            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&target)?;
            } else if entry.file_type().is_file() {
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::copy(entry.path(), &target)?;
            }
        }
    }
    Ok(())
}
