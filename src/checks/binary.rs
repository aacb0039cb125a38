//! The binary/UTF-8 content gate.
//!
//! Every tracked file outside a short explicit deny-list of known
//! binaries must decode as strict UTF-8. Files that fail to decode are
//! fingerprinted and checked against the legacy allow-list; anything
//! else is a violation naming the first invalid byte offset.

use rayon::prelude::*;

use crate::config::Config;
use crate::enumerate::TrackedFile;
use crate::fingerprint::Fingerprint;

use super::{CheckResult, Violation};

/// Check that all tracked files are valid UTF-8 or allow-listed binaries.
pub fn check_binary_content(files: &[TrackedFile], config: &Config) -> anyhow::Result<CheckResult> {
    let mut result = CheckResult::with_hint(
        "binary content",
        "binary files must not be added to the repository; the legacy allow-list is closed",
    );

    let candidates: Vec<&TrackedFile> = files
        .iter()
        .filter(|f| !is_denied(f, &config.binary_deny_list))
        .collect();

    let violations: Vec<Violation> = candidates
        .par_iter()
        .map(|file| scan_file(file, config))
        .collect::<anyhow::Result<Vec<Option<Violation>>>>()?
        .into_iter()
        .flatten()
        .collect();

    result.scanned = candidates.len();
    result.violations = violations;
    result.sort();
    Ok(result)
}

fn scan_file(file: &TrackedFile, config: &Config) -> anyhow::Result<Option<Violation>> {
    let bytes = std::fs::read(&file.path)?;
    let Err(err) = std::str::from_utf8(&bytes) else {
        return Ok(None);
    };

    let fingerprint = Fingerprint::of_bytes(&bytes);
    if config.binary_allow_list.contains(&fingerprint) {
        return Ok(None);
    }

    Ok(Some(Violation::new(
        file.path.display().to_string(),
        0,
        format!(
            "file is not valid UTF-8; first invalid byte sequence at offset {} (fingerprint {})",
            err.valid_up_to(),
            fingerprint
        ),
    )))
}

/// Whether a file is on the known-binary deny-list (by exact name or by
/// `.ext` entry).
fn is_denied(file: &TrackedFile, deny_list: &[String]) -> bool {
    let name = file.file_name();
    deny_list.iter().any(|entry| {
        if let Some(ext) = entry.strip_prefix('.') {
            file.extension == ext
        } else {
            name == entry
        }
    })
}
