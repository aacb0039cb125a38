//! Internal import-graph validation for the designated package.
//!
//! Three rules: the public top-level export files must correspond 1:1
//! with the implementation sub-directories under the src root; every
//! internal import must target a declared sub-package (and never the
//! importing sub-package itself); and the resulting dependency graph
//! must be acyclic. Imports of the general annotation library are only
//! allowed from the designated leaf sub-package; everyone else goes
//! through its facade.

use std::collections::BTreeSet;
use std::path::Path;

use regex::Regex;

use crate::config::Config;
use crate::enumerate::TrackedFile;
use crate::graph::DependencyGraph;

use super::{CheckResult, Violation};

/// Validate the designated package's internal import graph.
pub fn check_import_graph(
    root: &Path,
    files: &[TrackedFile],
    config: &Config,
) -> anyhow::Result<CheckResult> {
    let mut result = CheckResult::with_hint(
        "import graph",
        "internal sub-packages must form an acyclic dependency graph",
    );

    let layout = &config.package;
    let lib_dir = root.join(&layout.lib_dir);
    let src_dir = root.join(&layout.src_dir);
    if !src_dir.is_dir() {
        return Ok(result);
    }

    let import_pattern = Regex::new(&format!(
        r"import\s+'package:{}/src/(?P<unit>[^/']+)/",
        regex::escape(&layout.package)
    ))?;
    let annotation_import = Regex::new(&layout.annotation_import)?;

    // 1:1 correspondence between public export files and sub-directories.
    let exports: BTreeSet<String> = files
        .iter()
        .filter(|f| f.path.parent() == Some(lib_dir.as_path()))
        .filter(|f| f.extension == layout.source_extension)
        .filter_map(|f| f.path.file_stem().and_then(|s| s.to_str()))
        .map(String::from)
        .collect();
    let subdirs: BTreeSet<String> = std::fs::read_dir(&src_dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(String::from))
        .collect();

    if exports != subdirs {
        result.push(Violation::new(
            lib_dir.display().to_string(),
            0,
            format!(
                "public exports and src sub-directories do not correspond: \
                 exports [{}] vs sub-directories [{}]",
                join(&exports),
                join(&subdirs)
            ),
        ));
    }

    // Build the graph from internal imports, validating targets as we go.
    let mut graph = DependencyGraph::new();
    for name in &subdirs {
        graph.node(name);
    }

    for file in files {
        let Ok(relative) = file.path.strip_prefix(&src_dir) else {
            continue;
        };
        let Some(unit) = relative
            .components()
            .next()
            .and_then(|c| c.as_os_str().to_str())
        else {
            continue;
        };
        if !subdirs.contains(unit) {
            continue;
        }
        if file.extension != layout.source_extension {
            continue;
        }

        let content = std::fs::read_to_string(&file.path)?;
        let path = file.path.display().to_string();
        for (index, line) in content.lines().enumerate() {
            if annotation_import.is_match(line) && unit != layout.leaf {
                result.push(Violation::new(
                    path.clone(),
                    index + 1,
                    format!(
                        "'{}' must not import the annotation library directly; \
                         use the '{}' facade instead",
                        unit, layout.leaf
                    ),
                ));
            }
            let Some(caps) = import_pattern.captures(line) else {
                continue;
            };
            let target = &caps["unit"];
            if target == unit {
                result.push(Violation::new(
                    path.clone(),
                    index + 1,
                    format!("'{}' imports itself", unit),
                ));
            } else if !graph.contains(target) {
                result.push(Violation::new(
                    path.clone(),
                    index + 1,
                    format!(
                        "'{}' imports an undeclared unit '{}'; valid units are: {}",
                        unit,
                        target,
                        graph.sorted_names().join(", ")
                    ),
                ));
            } else {
                let from = graph.node(unit);
                let to = graph.node(target);
                graph.add_edge(from, to);
            }
        }
        result.scanned += 1;
    }

    graph.sort_edges();
    if let Some(cycle) = graph.find_cycle() {
        result.push(Violation::new(
            src_dir.display().to_string(),
            0,
            format!("dependency cycle detected: {}", cycle.join(" depends on ")),
        ));
    }

    result.sort();
    Ok(result)
}

fn join(set: &BTreeSet<String>) -> String {
    set.iter().cloned().collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Fixture {
        temp: TempDir,
        files: Vec<TrackedFile>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                temp: TempDir::new().unwrap(),
                files: Vec::new(),
            }
        }

        fn file(&mut self, rel: &str, content: &str) -> &mut Self {
            let path = self.temp.path().join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, content).unwrap();
            self.files.push(TrackedFile::new(path));
            self
        }

        fn dir(&mut self, rel: &str) -> &mut Self {
            std::fs::create_dir_all(self.temp.path().join(rel)).unwrap();
            self
        }

        fn run(&self) -> CheckResult {
            let mut files = self.files.clone();
            files.sort_by(|a, b| a.path.cmp(&b.path));
            check_import_graph(self.temp.path(), &files, &Config::for_tests()).unwrap()
        }

        fn root(&self) -> PathBuf {
            self.temp.path().to_path_buf()
        }
    }

    #[test]
    fn test_missing_package_is_skipped() {
        let fixture = Fixture::new();
        let result = fixture.run();
        assert!(!result.failed());
        assert_eq!(result.scanned, 0);
    }

    #[test]
    fn test_well_formed_package_passes() {
        let mut fixture = Fixture::new();
        fixture
            .file("lib/base.dart", "export 'src/base/core.dart';\n")
            .file("lib/widgets.dart", "export 'src/widgets/tree.dart';\n")
            .file("lib/src/base/core.dart", "void core() {}\n")
            .file(
                "lib/src/widgets/tree.dart",
                "import 'package:app/src/base/core.dart';\n",
            );
        assert!(!fixture.run().failed());
    }

    #[test]
    fn test_export_subdirectory_mismatch_is_flagged() {
        let mut fixture = Fixture::new();
        fixture
            .file("lib/base.dart", "export 'src/base/core.dart';\n")
            .file("lib/src/base/core.dart", "void core() {}\n")
            .dir("lib/src/extra");
        let result = fixture.run();
        assert_eq!(result.violations.len(), 1);
        assert!(result.violations[0]
            .message
            .contains("exports [base] vs sub-directories [base, extra]"));
    }

    #[test]
    fn test_undeclared_import_target_is_flagged() {
        let mut fixture = Fixture::new();
        fixture
            .file("lib/base.dart", "")
            .file(
                "lib/src/base/core.dart",
                "import 'package:app/src/missing/thing.dart';\n",
            );
        let result = fixture.run();
        assert_eq!(result.violations.len(), 1);
        assert!(result.violations[0]
            .message
            .contains("imports an undeclared unit 'missing'"));
        assert!(result.violations[0].message.contains("valid units are: base"));
    }

    #[test]
    fn test_self_import_is_flagged() {
        let mut fixture = Fixture::new();
        fixture
            .file("lib/base.dart", "")
            .file(
                "lib/src/base/core.dart",
                "import 'package:app/src/base/other.dart';\n",
            );
        let result = fixture.run();
        assert_eq!(result.violations.len(), 1);
        assert!(result.violations[0].message.contains("'base' imports itself"));
    }

    #[test]
    fn test_cycle_is_reported_as_a_closed_chain() {
        let mut fixture = Fixture::new();
        fixture
            .file("lib/a.dart", "")
            .file("lib/b.dart", "")
            .file("lib/c.dart", "")
            .file("lib/src/a/a.dart", "import 'package:app/src/b/b.dart';\n")
            .file("lib/src/b/b.dart", "import 'package:app/src/c/c.dart';\n")
            .file("lib/src/c/c.dart", "import 'package:app/src/a/a.dart';\n");
        let result = fixture.run();
        assert_eq!(result.violations.len(), 1);
        assert!(result.violations[0]
            .message
            .contains("dependency cycle detected: a depends on b depends on c depends on a"));
        assert!(result.violations[0].file.starts_with(
            fixture.root().join("lib/src").to_string_lossy().as_ref()
        ));
    }

    #[test]
    fn test_annotation_import_outside_leaf_is_flagged() {
        let mut fixture = Fixture::new();
        fixture
            .file("lib/base.dart", "")
            .file("lib/widgets.dart", "")
            .file(
                "lib/src/base/core.dart",
                "import 'package:meta/meta.dart';\n",
            )
            .file(
                "lib/src/widgets/tree.dart",
                "import 'package:meta/meta.dart';\n",
            );
        let result = fixture.run();
        // `base` is the designated leaf; only `widgets` is in breach.
        assert_eq!(result.violations.len(), 1);
        assert!(result.violations[0].file.contains("widgets"));
        assert!(result.violations[0].message.contains("'base' facade"));
    }
}
