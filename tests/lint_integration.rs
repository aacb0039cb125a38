//! End-to-end runs of the lint battery against synthetic repositories.
//!
//! These tests exercise the real pipeline: git tracked-file listing,
//! enumeration, and the full check battery. They are skipped on hosts
//! without a git executable.

use std::path::{Path, PathBuf};
use std::process::Command;

use treelint::checks::Runner;
use treelint::config::{Aggregation, Config};
use treelint::vcs;

struct Repo {
    temp: tempfile::TempDir,
}

impl Repo {
    fn new() -> Self {
        let temp = tempfile::TempDir::new().unwrap();
        git(temp.path(), &["init", "-q"]);
        Self { temp }
    }

    fn root(&self) -> &Path {
        self.temp.path()
    }

    fn file(&self, rel: &str, content: &[u8]) -> &Self {
        let path = self.temp.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, content).unwrap();
        git(self.temp.path(), &["add", rel]);
        self
    }
}

fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(args)
        .output()
        .expect("git should launch");
    assert!(output.status.success(), "git {:?} failed", args);
}

fn licensed(config: &Config, body: &str) -> String {
    let header = &config.license_for("dart").unwrap().header;
    format!("{}\n\n{}", header, body)
}

#[test]
fn test_clean_repository_passes() {
    if !vcs::available() {
        return;
    }
    let mut config = Config::for_tests();
    config.licenses = Config::default().licenses;

    let repo = Repo::new();
    repo.file(
        "lib/base.dart",
        licensed(&config, "export 'src/base/core.dart';\n").as_bytes(),
    );
    repo.file(
        "lib/src/base/core.dart",
        licensed(&config, "void core() {}\n").as_bytes(),
    );

    let tracked = vcs::tracked_files(repo.root()).unwrap();
    let report = Runner::new(repo.root(), &config, &tracked).run().unwrap();
    assert!(!report.failed(), "violations: {:?}", report.checks);
}

#[test]
fn test_untracked_junk_is_invisible_to_checks() {
    if !vcs::available() {
        return;
    }
    let mut config = Config::for_tests();
    config.licenses.clear();

    let repo = Repo::new();
    repo.file("lib/base.dart", b"void main() {}\n");
    // Present on disk with trailing whitespace, but never added to git.
    std::fs::write(repo.root().join("scratch.dart"), "bad \n").unwrap();

    let tracked = vcs::tracked_files(repo.root()).unwrap();
    let report = Runner::new(repo.root(), &config, &tracked).run().unwrap();
    assert!(!report.failed());
}

#[test]
fn test_binary_file_fails_the_utf8_gate() {
    if !vcs::available() {
        return;
    }
    let mut config = Config::for_tests();
    config.licenses.clear();

    let repo = Repo::new();
    repo.file("assets/blob.bin", &[0x00, 0xff, 0xfe, 0xc0]);

    let tracked = vcs::tracked_files(repo.root()).unwrap();
    let report = Runner::new(repo.root(), &config, &tracked).run().unwrap();
    assert!(report.failed());
    let binary = report
        .checks
        .iter()
        .find(|c| c.name == "binary content")
        .unwrap();
    assert_eq!(binary.violations.len(), 1);
    assert!(binary.violations[0].message.contains("not valid UTF-8"));
}

#[test]
fn test_fail_fast_reports_only_the_first_failing_check() {
    if !vcs::available() {
        return;
    }
    let mut config = Config::for_tests();
    config.licenses.clear();
    config.aggregation = Aggregation::FailFast;

    let repo = Repo::new();
    // Trailing whitespace plus a test-file cross-import; fail-fast must
    // stop at the whitespace check.
    repo.file(
        "lib/widget.dart",
        b"import 'helpers_test.dart'; \nvoid main() {}\n",
    );

    let tracked = vcs::tracked_files(repo.root()).unwrap();
    let report = Runner::new(repo.root(), &config, &tracked).run().unwrap();
    assert!(report.failed());
    let failing: Vec<&str> = report
        .checks
        .iter()
        .filter(|c| c.failed())
        .map(|c| c.name)
        .collect();
    assert_eq!(failing, vec!["trailing whitespace"]);
}

#[test]
fn test_collect_all_reports_every_failing_check() {
    if !vcs::available() {
        return;
    }
    let mut config = Config::for_tests();
    config.licenses.clear();
    config.aggregation = Aggregation::CollectAll;

    let repo = Repo::new();
    repo.file(
        "lib/widget.dart",
        b"import 'helpers_test.dart'; \nvoid main() {}\n",
    );

    let tracked = vcs::tracked_files(repo.root()).unwrap();
    let report = Runner::new(repo.root(), &config, &tracked).run().unwrap();
    let failing: Vec<&str> = report
        .checks
        .iter()
        .filter(|c| c.failed())
        .map(|c| c.name)
        .collect();
    assert_eq!(failing, vec!["trailing whitespace", "test imports"]);
}

#[test]
fn test_test_tree_may_import_test_helpers() {
    if !vcs::available() {
        return;
    }
    let mut config = Config::for_tests();
    config.licenses.clear();

    let repo = Repo::new();
    repo.file("lib/base.dart", b"void main() {}\n");
    repo.file(
        "test/widgets/tree_test.dart",
        b"import 'common_matchers_test.dart';\nvoid main() {}\n",
    );
    repo.file("test/widgets/common_matchers_test.dart", b"void noop() {}\n");

    let tracked = vcs::tracked_files(repo.root()).unwrap();
    let report = Runner::new(repo.root(), &config, &tracked).run().unwrap();
    assert!(!report.failed(), "violations: {:?}", report.checks);
}

#[test]
fn test_dependency_cycle_is_reported_shortest_first() {
    if !vcs::available() {
        return;
    }
    let mut config = Config::for_tests();
    config.licenses.clear();

    let repo = Repo::new();
    repo.file("lib/a.dart", b"");
    repo.file("lib/b.dart", b"");
    repo.file("lib/c.dart", b"");
    repo.file("lib/d.dart", b"");
    // d imports into the a->b->c->a cycle without being part of it.
    repo.file("lib/src/a/a.dart", b"import 'package:app/src/b/b.dart';\n");
    repo.file("lib/src/b/b.dart", b"import 'package:app/src/c/c.dart';\n");
    repo.file("lib/src/c/c.dart", b"import 'package:app/src/a/a.dart';\n");
    repo.file("lib/src/d/d.dart", b"import 'package:app/src/a/a.dart';\n");

    let tracked = vcs::tracked_files(repo.root()).unwrap();
    let report = Runner::new(repo.root(), &config, &tracked).run().unwrap();
    let graph = report
        .checks
        .iter()
        .find(|c| c.name == "import graph")
        .unwrap();
    assert_eq!(graph.violations.len(), 1);
    assert!(graph.violations[0]
        .message
        .contains("a depends on b depends on c depends on a"));
}

#[test]
fn test_missing_source_corpus_trips_the_canary() {
    if !vcs::available() {
        return;
    }
    let mut config = Config::for_tests();
    config.licenses.clear();
    config.enforce_minimums = true;
    config.minimum_counts = vec![("dart".to_string(), 2000)];

    let repo = Repo::new();
    repo.file("README.md", b"hello\n");

    let tracked = vcs::tracked_files(repo.root()).unwrap();
    let err = Runner::new(repo.root(), &config, &tracked)
        .run()
        .unwrap_err();
    assert!(err.to_string().contains("at least 2000"));
}

#[test]
fn test_paths_are_rooted_in_the_repository() {
    if !vcs::available() {
        return;
    }
    let mut config = Config::for_tests();
    config.licenses.clear();

    let repo = Repo::new();
    repo.file("lib/widget.dart", b"trailing \n");

    let tracked = vcs::tracked_files(repo.root()).unwrap();
    let report = Runner::new(repo.root(), &config, &tracked).run().unwrap();
    let whitespace = report
        .checks
        .iter()
        .find(|c| c.name == "trailing whitespace")
        .unwrap();
    assert_eq!(whitespace.violations.len(), 1);
    assert_eq!(
        PathBuf::from(&whitespace.violations[0].file),
        repo.root().join("lib/widget.dart")
    );
}
