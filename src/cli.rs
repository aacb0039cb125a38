//! Command-line interface for treelint.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;

use crate::checks::Runner;
use crate::config::{Aggregation, Config};
use crate::process;
use crate::report;
use crate::vcs;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Repository hygiene linter.
///
/// Treelint runs an ordered battery of structural checks over the
/// version-control-tracked files of a repository: license headers,
/// trailing whitespace, deprecation-notice grammar, binary-file
/// exclusion, internal import-graph acyclicity, and generated-source
/// consistency. Any violation fails the run.
#[derive(Parser)]
#[command(name = "treelint")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Repository root to lint
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Run every check before reporting instead of stopping at the
    /// first failing check
    #[arg(long)]
    pub collect_all: bool,

    /// Skip the wrapped analyzer invocations
    #[arg(long)]
    pub skip_analyzer: bool,

    /// Skip the generated-source diff targets
    #[arg(long)]
    pub skip_codegen: bool,

    /// Extra arguments forwarded verbatim to the analyzer
    #[arg(last = true)]
    pub analyzer_args: Vec<String>,
}

/// Run the lint battery and the wrapped analyzer.
pub fn run(cli: &Cli) -> anyhow::Result<i32> {
    if cli.format != "pretty" && cli.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            cli.format
        );
        return Ok(EXIT_ERROR);
    }

    let root = cli
        .root
        .canonicalize()
        .map_err(|e| anyhow::anyhow!("cannot access path {:?}: {}", cli.root, e))?;

    let mut config = Config::default();
    if cli.collect_all {
        config.aggregation = Aggregation::CollectAll;
    }
    if cli.skip_analyzer {
        config.analyzer = None;
    }
    if cli.skip_codegen {
        config.codegen.clear();
    }

    // The allow-list is a closed table; refuse to run if it was edited
    // without updating its checksum.
    config.binary_allow_list.validate()?;

    let started = Instant::now();
    let tracked = vcs::tracked_files(&root)?;

    let runner = Runner::new(&root, &config, &tracked).verbose(cli.format == "pretty");
    let run_report = runner.run()?;

    if run_report.failed() {
        match cli.format.as_str() {
            "json" => report::write_json(&run_report)?,
            _ => report::write_failures(&run_report),
        }
        return Ok(EXIT_FAILED);
    }

    if let Some(analyzer) = &config.analyzer {
        if let Err(e) = process::run_analyzer_suite(&root, analyzer, &cli.analyzer_args) {
            eprintln!("{:#}", e);
            return Ok(EXIT_FAILED);
        }
    }

    match cli.format.as_str() {
        "json" => report::write_json(&run_report)?,
        _ => report::write_success(started.elapsed()),
    }
    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_analyzer_args_are_pass_through() {
        let cli = Cli::parse_from(["treelint", ".", "--", "--fatal-infos", "--no-pub"]);
        assert_eq!(cli.analyzer_args, vec!["--fatal-infos", "--no-pub"]);
    }
}
