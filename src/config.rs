//! Immutable configuration for a lint run.
//!
//! Every rule table the checks consume lives here: license header
//! templates, exclusion lists, minimum file counts, exemption sets, and
//! the external command lines. Checks receive a shared `&Config` at
//! construction and never mutate it, so there is no hidden coupling
//! between checks and tests can inject synthetic rule sets.

use std::path::PathBuf;

use crate::fingerprint::AllowList;

/// How violations across the check battery are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Stop after the first check that finds violations (default).
    FailFast,
    /// Run every check, then report all violations jointly.
    CollectAll,
}

/// Expected license header for one file extension.
#[derive(Debug, Clone)]
pub struct LicenseTemplate {
    /// Extension without the leading dot, e.g. `"dart"`.
    pub extension: String,
    /// The full expected comment block, `\n`-joined, without a trailing
    /// newline.
    pub header: String,
    /// Whether the header must be followed by exactly one blank line.
    pub blank_line_after: bool,
}

impl LicenseTemplate {
    /// Build a template by prefixing each line of `text` with the
    /// extension's line-comment syntax.
    pub fn new(extension: &str, comment_prefix: &str, text: &str, blank_line_after: bool) -> Self {
        let header = text
            .lines()
            .map(|line| {
                if line.is_empty() {
                    comment_prefix.trim_end().to_string()
                } else {
                    format!("{} {}", comment_prefix, line)
                }
            })
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            extension: extension.to_string(),
            header,
            blank_line_after,
        }
    }
}

/// Exemption markers for the deprecation-notice grammar check.
#[derive(Debug, Clone)]
pub struct DeprecationRules {
    /// Inline comment that exempts a single annotation from the grammar.
    pub exemption_marker: String,
    /// Regex matching a linked-issue comment that exempts the annotation.
    pub issue_pattern: String,
}

/// Rules for the self-referential string-formatting ban.
#[derive(Debug, Clone)]
pub struct StringConversionRules {
    /// Regex matching the opening line of a string-conversion method.
    pub signature_pattern: String,
    /// Regex matching a reference to the object's own dynamic type name.
    pub forbidden_pattern: String,
}

/// Rules for the test-file cross-import ban.
#[derive(Debug, Clone)]
pub struct TestImportRules {
    /// Regex matching an import of a test-suffixed file.
    pub import_pattern: String,
    /// Library-relative paths of known test-utility re-export modules.
    pub exempt_files: Vec<String>,
}

/// Layout of the designated package checked by the import-graph pass.
#[derive(Debug, Clone)]
pub struct PackageLayout {
    /// Package name as it appears in import URIs.
    pub package: String,
    /// Directory holding the public top-level export files.
    pub lib_dir: String,
    /// Directory holding the internal implementation sub-directories.
    pub src_dir: String,
    /// Extension of the package's source files, without the dot.
    pub source_extension: String,
    /// The one sub-package allowed to import the annotation library
    /// directly; everyone else must go through its facade.
    pub leaf: String,
    /// Regex matching a direct import of the annotation library.
    pub annotation_import: String,
}

/// The wrapped analyzer invocation.
#[derive(Debug, Clone)]
pub struct AnalyzerCommand {
    pub program: String,
    /// Arguments for the plain run against the repository root.
    pub args: Vec<String>,
    /// Arguments for the benchmark run against the inflated sample app.
    pub benchmark_args: Vec<String>,
    /// Sample application to inflate for the benchmark run, relative to
    /// the repository root. `None` disables the benchmark run.
    pub sample_app: Option<PathBuf>,
    /// How many copies of the sample app the benchmark corpus contains.
    pub inflate_copies: usize,
}

/// One generated-source target checked by the codegen diff.
#[derive(Debug, Clone)]
pub struct CodegenTarget {
    pub name: String,
    pub program: String,
    pub args: Vec<String>,
    /// Checked-in file whose content must equal the command's stdout.
    pub expected_file: PathBuf,
    /// Operator instruction printed on a mismatch.
    pub regenerate_hint: String,
}

/// Immutable configuration for a whole run.
#[derive(Debug, Clone)]
pub struct Config {
    pub aggregation: Aggregation,
    /// Whether the minimum-file-count canary is enforced. Disabled in
    /// test environments that run against small synthetic trees.
    pub enforce_minimums: bool,
    /// Minimum expected file count per extension. Extensions not listed
    /// default to zero.
    pub minimum_counts: Vec<(String, usize)>,
    /// A directory containing a file with this name is skipped entirely.
    pub ignore_marker: String,
    /// Directory names excluded from the walk (VCS metadata, IDE and
    /// build caches).
    pub excluded_dirs: Vec<String>,
    /// Exact file names excluded everywhere (generated registrants,
    /// wrapper scripts, OS metadata).
    pub excluded_files: Vec<String>,
    /// File-name suffixes excluded everywhere (template placeholders).
    pub excluded_suffixes: Vec<String>,
    /// Names or `.ext` entries of known binaries skipped by the UTF-8
    /// gate (fonts, images, archives, the encrypted secrets blob).
    pub binary_deny_list: Vec<String>,
    /// Fingerprints of legacy binaries that predate the no-binaries
    /// policy.
    pub binary_allow_list: AllowList,
    pub licenses: Vec<LicenseTemplate>,
    /// Names or `.ext` entries skipped by the whitespace check.
    pub whitespace_exclusions: Vec<String>,
    pub deprecation: DeprecationRules,
    pub string_conversion: StringConversionRules,
    pub test_imports: TestImportRules,
    pub package: PackageLayout,
    /// `None` skips the analyzer step.
    pub analyzer: Option<AnalyzerCommand>,
    pub codegen: Vec<CodegenTarget>,
}

/// Default license text, commented per extension by `LicenseTemplate`.
const LICENSE_TEXT: &str = "Copyright 2014 The project authors. All rights reserved.\n\
Use of this source code is governed by a BSD-style license that can be\n\
found in the LICENSE file.";

impl Config {
    /// Minimum expected file count for an extension (zero if unlisted).
    pub fn minimum_for(&self, extension: &str) -> usize {
        self.minimum_counts
            .iter()
            .find(|(ext, _)| ext == extension)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    /// License template registered for an extension, if any.
    pub fn license_for(&self, extension: &str) -> Option<&LicenseTemplate> {
        self.licenses.iter().find(|t| t.extension == extension)
    }

    /// A configuration suitable for unit tests: no count canary, no
    /// external subprocesses, collect-all reporting.
    pub fn for_tests() -> Self {
        Self {
            aggregation: Aggregation::CollectAll,
            enforce_minimums: false,
            analyzer: None,
            codegen: Vec::new(),
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            aggregation: Aggregation::FailFast,
            enforce_minimums: true,
            minimum_counts: vec![
                ("dart".to_string(), 2000),
                ("java".to_string(), 10),
                ("sh".to_string(), 5),
                ("gradle".to_string(), 0),
            ],
            ignore_marker: ".treelint-ignore".to_string(),
            excluded_dirs: vec![
                ".git".to_string(),
                ".idea".to_string(),
                ".vscode".to_string(),
                ".dart_tool".to_string(),
                ".gradle".to_string(),
                "build".to_string(),
            ],
            excluded_files: vec![
                "gradlew".to_string(),
                "gradlew.bat".to_string(),
                ".DS_Store".to_string(),
                "GeneratedPluginRegistrant.java".to_string(),
                "GeneratedPluginRegistrant.m".to_string(),
                "GeneratedPluginRegistrant.h".to_string(),
                "generated_plugin_registrant.dart".to_string(),
            ],
            excluded_suffixes: vec![".tmpl".to_string()],
            binary_deny_list: vec![
                ".ttf".to_string(),
                ".otf".to_string(),
                ".png".to_string(),
                ".jpg".to_string(),
                ".gif".to_string(),
                ".ico".to_string(),
                ".zip".to_string(),
                ".jar".to_string(),
                ".enc".to_string(),
            ],
            binary_allow_list: AllowList::legacy(),
            licenses: vec![
                LicenseTemplate::new("dart", "//", LICENSE_TEXT, true),
                LicenseTemplate::new("java", "//", LICENSE_TEXT, true),
                LicenseTemplate::new("sh", "#", LICENSE_TEXT, true),
            ],
            whitespace_exclusions: vec![
                ".ttf".to_string(),
                ".otf".to_string(),
                ".png".to_string(),
                ".jpg".to_string(),
                ".gif".to_string(),
                ".ico".to_string(),
                ".zip".to_string(),
                ".jar".to_string(),
                ".enc".to_string(),
                ".snapshot".to_string(),
            ],
            deprecation: DeprecationRules {
                exemption_marker: "// treelint: ignore-deprecation".to_string(),
                issue_pattern: r"// see https://\S+/issues/\d+".to_string(),
            },
            string_conversion: StringConversionRules {
                signature_pattern: r"^\s*String toString\(".to_string(),
                forbidden_pattern: r"\$runtimeType|\bruntimeType\b".to_string(),
            },
            test_imports: TestImportRules {
                import_pattern: r"import\s+'[^']*_test\.dart'".to_string(),
                exempt_files: Vec::new(),
            },
            package: PackageLayout {
                package: "app".to_string(),
                lib_dir: "lib".to_string(),
                src_dir: "lib/src".to_string(),
                source_extension: "dart".to_string(),
                leaf: "base".to_string(),
                annotation_import: r"import\s+'package:meta/meta\.dart'".to_string(),
            },
            analyzer: Some(AnalyzerCommand {
                program: "dart".to_string(),
                args: vec!["analyze".to_string(), "--dartdocs".to_string()],
                benchmark_args: vec![
                    "analyze".to_string(),
                    "--dartdocs".to_string(),
                    "--benchmark".to_string(),
                ],
                sample_app: None,
                inflate_copies: 20,
            }),
            codegen: Vec::new(),
        }
    }
}
