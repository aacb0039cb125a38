//! The test-file cross-import ban.
//!
//! Library sources must not import files with the test suffix; test
//! scaffolding belongs under the test tree. Only files under the package
//! library directory are scanned, so test files importing sibling test
//! helpers stay legal. A small exemption set covers known test-utility
//! re-export modules.

use std::path::Path;

use regex::Regex;

use crate::config::Config;
use crate::enumerate::TrackedFile;

use super::{CheckResult, Violation};

/// Check that no library source imports a test-suffixed file.
pub fn check_test_imports(
    root: &Path,
    files: &[TrackedFile],
    config: &Config,
) -> anyhow::Result<CheckResult> {
    let mut result = CheckResult::with_hint(
        "test imports",
        "library sources must not import test files; move shared helpers into the library",
    );

    let import = Regex::new(&config.test_imports.import_pattern)?;
    let lib_dir = Path::new(&config.package.lib_dir);

    for file in files {
        match file.path.strip_prefix(root) {
            Ok(relative) if relative.starts_with(lib_dir) => {}
            _ => continue,
        }

        let name = file.file_name().to_string();
        if config.test_imports.exempt_files.iter().any(|f| {
            f == &name || file.path.ends_with(f)
        }) {
            continue;
        }

        let content = std::fs::read_to_string(&file.path)?;
        for (index, line) in content.lines().enumerate() {
            if import.is_match(line) {
                result.push(Violation::new(
                    file.path.display().to_string(),
                    index + 1,
                    format!("library source imports a test file: {}", line.trim()),
                ));
            }
        }
        result.scanned += 1;
    }

    result.sort();
    Ok(result)
}
