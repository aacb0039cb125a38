//! License header enforcement.

use crate::config::LicenseTemplate;
use crate::enumerate::TrackedFile;

use super::{CheckResult, Violation};

/// Check that every file of a registered extension starts with the exact
/// expected header block, followed by a blank line where the template
/// requires one. Empty files are exempt.
pub fn check_license_headers(
    files: &[TrackedFile],
    template: &LicenseTemplate,
) -> anyhow::Result<CheckResult> {
    let mut result = CheckResult::with_hint(
        "license headers",
        format!(
            "each .{} file must start with the standard license comment block",
            template.extension
        ),
    );

    for file in files {
        let content = std::fs::read_to_string(&file.path)?;
        if let Some(message) = header_problem(&content, template) {
            result.push(Violation::new(file.path.display().to_string(), 1, message));
        }
        result.scanned += 1;
    }

    result.sort();
    Ok(result)
}

/// Why a file's header is wrong, or `None` when it conforms. Content is
/// normalized to `\n` line endings before comparison.
fn header_problem(content: &str, template: &LicenseTemplate) -> Option<String> {
    let normalized = content.replace("\r\n", "\n");
    if normalized.is_empty() {
        return None;
    }

    let rest = match normalized.strip_prefix(&template.header) {
        Some(rest) => rest,
        None => return Some("license header is missing or incorrect".to_string()),
    };

    if template.blank_line_after {
        // The header line's own newline, then one empty line.
        if !(rest.starts_with("\n\n") || rest == "\n") {
            return Some("license header must be followed by a blank line".to_string());
        }
    } else if !(rest.starts_with('\n') || rest.is_empty()) {
        return Some("license header must end its line".to_string());
    }

    None
}
