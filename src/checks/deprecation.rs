//! Deprecation-notice grammar enforcement.
//!
//! A deprecation annotation must open a structured multi-line notice:
//!
//! ```text
//! @Deprecated(
//!   'Use replacementFeature instead. '
//!   'This feature was deprecated after v1.2.0-3.4.pre.'
//! )
//! ```
//!
//! One or more single-quoted message lines (first starts uppercase, the
//! message ends in terminal punctuation), then a version line naming a
//! dev-branch version, then the closing parenthesis at the opening
//! indent. A malformed notice produces one precise file:line error and
//! scanning continues with the next candidate.

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::Config;
use crate::enumerate::TrackedFile;

use super::{CheckResult, Violation};

lazy_static! {
    /// Any line that looks like a deprecation annotation.
    static ref CANDIDATE: Regex = Regex::new(r"(?i)^\s*@deprecated\b").unwrap();
    /// The only accepted opening form.
    static ref OPENING: Regex = Regex::new(r"^(?P<indent> *)@Deprecated\($").unwrap();
    /// A single-quoted message or version line.
    static ref QUOTED: Regex = Regex::new(r"^ *'(?P<text>.*)'$").unwrap();
    /// The common mistake the hint is for.
    static ref DOUBLE_QUOTED: Regex = Regex::new(r#"^ *""#).unwrap();
    /// The complete version sentence, dev-branch suffix included.
    static ref VERSION: Regex =
        Regex::new(r"^This feature was deprecated after v\d+\.\d+\.\d+-\d+\.\d+\.pre\.$").unwrap();
    /// A version sentence for a published release, which is not allowed:
    /// deprecations land on the dev branch.
    static ref RELEASE_VERSION: Regex =
        Regex::new(r"^This feature was deprecated after v\d+\.\d+\.\d+\.$").unwrap();
    /// The closing parenthesis, indent captured for comparison.
    static ref CLOSING: Regex = Regex::new(r"^(?P<indent> *)\)").unwrap();
}

/// Check deprecation-notice grammar across the package's source files.
pub fn check_deprecation_notices(
    files: &[TrackedFile],
    config: &Config,
) -> anyhow::Result<CheckResult> {
    let mut result = CheckResult::with_hint(
        "deprecation notices",
        "deprecation messages must be single-quoted sentences ending with a \
         'This feature was deprecated after v<dev version>.' line",
    );

    let issue_exemption = Regex::new(&config.deprecation.issue_pattern)?;

    for file in files {
        let content = std::fs::read_to_string(&file.path)?;
        let lines: Vec<&str> = content.lines().collect();
        let path = file.path.display().to_string();

        let mut i = 0;
        while i < lines.len() {
            if !CANDIDATE.is_match(lines[i]) {
                i += 1;
                continue;
            }
            if is_exempt(&lines, i, config, &issue_exemption) {
                i += 1;
                continue;
            }
            match parse_notice(&lines, i) {
                Ok(consumed) => i += consumed,
                Err((line_index, reason)) => {
                    result.push(Violation::new(path.clone(), line_index + 1, reason));
                    i += 1;
                }
            }
        }
        result.scanned += 1;
    }

    result.sort();
    Ok(result)
}

fn is_exempt(lines: &[&str], index: usize, config: &Config, issue: &Regex) -> bool {
    if lines[index].contains(&config.deprecation.exemption_marker) {
        return true;
    }
    if issue.is_match(lines[index]) {
        return true;
    }
    index > 0 && issue.is_match(lines[index - 1])
}

/// Validate one notice starting at `start`. Returns the number of lines
/// consumed, or the first malformation as `(line_index, reason)`.
fn parse_notice(lines: &[&str], start: usize) -> Result<usize, (usize, String)> {
    let caps = OPENING.captures(lines[start]).ok_or_else(|| {
        let mut reason =
            "deprecation annotation does not match the required pattern '@Deprecated('".to_string();
        if lines[start].contains('"') {
            reason.push_str("; use single quotes, not double quotes, for the message");
        }
        (start, reason)
    })?;
    let indent = caps.name("indent").map(|m| m.as_str().len()).unwrap_or(0);

    // Collect the quoted lines: the message, then the version sentence.
    let mut texts: Vec<(usize, String)> = Vec::new();
    let mut j = start + 1;
    while j < lines.len() {
        if let Some(caps) = QUOTED.captures(lines[j]) {
            texts.push((j, caps["text"].to_string()));
            j += 1;
            continue;
        }
        if DOUBLE_QUOTED.is_match(lines[j]) {
            return Err((
                j,
                "deprecation messages must use single quotes, not double quotes".to_string(),
            ));
        }
        break;
    }

    let Some((version_index, version_text)) = texts.last().cloned() else {
        return Err((
            start + 1,
            "deprecation notice is missing its quoted message".to_string(),
        ));
    };
    let message = &texts[..texts.len() - 1];
    if message.is_empty() {
        return Err((
            version_index,
            "deprecation notice is missing an explanatory message before the version line"
                .to_string(),
        ));
    }

    let first_char = message[0].1.chars().next().unwrap_or(' ');
    if !first_char.is_uppercase() {
        return Err((
            message[0].0,
            "deprecation message should be a grammatically correct sentence starting with a \
             capital letter"
                .to_string(),
        ));
    }

    // All but the last message line continue the sentence and must end
    // with a space so the concatenated text reads correctly.
    for (index, text) in &message[..message.len() - 1] {
        if !text.ends_with(' ') {
            return Err((
                *index,
                "deprecation message continuation lines must end with a space".to_string(),
            ));
        }
    }
    let (last_index, last_text) = &message[message.len() - 1];
    let trimmed = last_text.trim_end();
    if !(trimmed.ends_with('.') || trimmed.ends_with('!') || trimmed.ends_with('?')) {
        return Err((
            *last_index,
            "deprecation message should end with terminal punctuation".to_string(),
        ));
    }

    if !VERSION.is_match(&version_text) {
        if RELEASE_VERSION.is_match(&version_text) {
            return Err((
                version_index,
                "deprecation version does not accurately indicate a dev branch version; \
                 expected the form vMAJOR.MINOR.PATCH-NUM.NUM.pre"
                    .to_string(),
            ));
        }
        return Err((
            version_index,
            "deprecation version line does not match the required pattern \
             'This feature was deprecated after vMAJOR.MINOR.PATCH-NUM.NUM.pre.'"
                .to_string(),
        ));
    }

    let closing_index = j;
    let close_ok = closing_index < lines.len()
        && CLOSING
            .captures(lines[closing_index])
            .map(|caps| caps["indent"].len() == indent)
            .unwrap_or(false);
    if !close_ok {
        return Err((
            closing_index.min(lines.len() - 1),
            "end of deprecation notice does not match the required pattern: expected ')' at \
             the annotation's indentation"
                .to_string(),
        ));
    }

    Ok(closing_index - start + 1)
}
