//! File enumeration.
//!
//! Walks the repository root, keeps only version-control-tracked files,
//! and applies the configured exclusion rules. Every check starts from
//! this enumeration, so the exclusions apply uniformly.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::Config;

/// A file selected for scanning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedFile {
    pub path: PathBuf,
    /// Lower-cased extension without the dot; empty when absent.
    pub extension: String,
}

impl TrackedFile {
    pub fn new(path: PathBuf) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        Self { path, extension }
    }

    pub fn file_name(&self) -> &str {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
    }
}

/// Enumerates tracked files under a root with the configured exclusions.
pub struct Enumerator<'a> {
    root: &'a Path,
    tracked: &'a HashSet<PathBuf>,
    config: &'a Config,
}

impl<'a> Enumerator<'a> {
    pub fn new(root: &'a Path, tracked: &'a HashSet<PathBuf>, config: &'a Config) -> Self {
        Self {
            root,
            tracked,
            config,
        }
    }

    /// Enumerate files, optionally restricted to one extension.
    ///
    /// `minimum` is a canary against silent scope shrinkage: finding
    /// fewer matches than expected signals a broken exclusion rule or a
    /// corrupted checkout, and is a fatal error rather than a lint
    /// violation. The canary is skipped when `enforce_minimums` is off.
    pub fn files(
        &self,
        extension: Option<&str>,
        minimum: usize,
    ) -> anyhow::Result<Vec<TrackedFile>> {
        let mut found = Vec::new();

        let walker = WalkDir::new(self.root).into_iter().filter_entry(|entry| {
            if !entry.file_type().is_dir() {
                return true;
            }
            let name = entry.file_name().to_string_lossy();
            if self.config.excluded_dirs.iter().any(|d| d == name.as_ref()) {
                return false;
            }
            // Subtrees opt out of scanning with a sentinel marker file.
            if entry.path().join(&self.config.ignore_marker).is_file() {
                return false;
            }
            true
        });

        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if !self.tracked.contains(path) {
                continue;
            }
            let file = TrackedFile::new(path.to_path_buf());
            if self.is_excluded(&file) {
                continue;
            }
            if let Some(ext) = extension {
                if file.extension != ext {
                    continue;
                }
            }
            found.push(file);
        }

        found.sort_by(|a, b| a.path.cmp(&b.path));

        if self.config.enforce_minimums && found.len() < minimum {
            anyhow::bail!(
                "expected at least {} file(s) matching extension {:?} under {} but found {}; \
                 an exclusion rule is likely hiding files it should not",
                minimum,
                extension.unwrap_or("*"),
                self.root.display(),
                found.len()
            );
        }

        Ok(found)
    }

    fn is_excluded(&self, file: &TrackedFile) -> bool {
        let name = file.file_name();
        if self.config.excluded_files.iter().any(|f| f == name) {
            return true;
        }
        self.config
            .excluded_suffixes
            .iter()
            .any(|suffix| name.ends_with(suffix.as_str()))
    }
}
