//! The self-referential string-formatting ban.
//!
//! A string-conversion method must not build its description from the
//! object's own dynamic type name; descriptions must stay meaningful
//! when the type is renamed or minified. The scan is line-based: it
//! finds a signature match, then balances braces across lines (or takes
//! a single-expression arrow body up to its semicolon) to delimit the
//! method body.

use regex::Regex;

use crate::config::Config;
use crate::enumerate::TrackedFile;

use super::{CheckResult, Violation};

/// Check string-conversion method bodies for dynamic type references.
pub fn check_string_conversions(
    files: &[TrackedFile],
    config: &Config,
) -> anyhow::Result<CheckResult> {
    let mut result = CheckResult::with_hint(
        "string conversions",
        "string-conversion methods must not reference the object's own runtime type",
    );

    let signature = Regex::new(&config.string_conversion.signature_pattern)?;
    let forbidden = Regex::new(&config.string_conversion.forbidden_pattern)?;

    for file in files {
        let content = std::fs::read_to_string(&file.path)?;
        let lines: Vec<&str> = content.lines().collect();
        let path = file.path.display().to_string();

        let mut i = 0;
        while i < lines.len() {
            if !signature.is_match(lines[i]) {
                i += 1;
                continue;
            }
            let body_end = find_body_end(&lines, i);
            for (offset, line) in lines[i..=body_end].iter().enumerate() {
                if forbidden.is_match(line) {
                    result.push(Violation::new(
                        path.clone(),
                        i + offset + 1,
                        "string-conversion method references the object's own dynamic type name",
                    ));
                }
            }
            i = body_end + 1;
        }
        result.scanned += 1;
    }

    result.sort();
    Ok(result)
}

/// Index of the last line of a method body starting at `start`.
///
/// A braced body ends when the brace depth returns to zero; an arrow
/// body ends at the first statement-terminating semicolon. Braces and
/// semicolons inside quoted strings are ignored.
fn find_body_end(lines: &[&str], start: usize) -> usize {
    let mut depth = 0usize;
    let mut seen_brace = false;

    for (index, line) in lines.iter().enumerate().skip(start) {
        for ch in significant_chars(line) {
            match ch {
                '{' => {
                    depth += 1;
                    seen_brace = true;
                }
                '}' => {
                    depth = depth.saturating_sub(1);
                    if seen_brace && depth == 0 {
                        return index;
                    }
                }
                ';' => {
                    if !seen_brace {
                        // Arrow body: a single expression up to `;`.
                        return index;
                    }
                }
                _ => {}
            }
        }
    }
    lines.len() - 1
}

/// Characters of a line with single- and double-quoted string contents
/// removed, so literal braces and semicolons do not skew the balance.
fn significant_chars(line: &str) -> impl Iterator<Item = char> + '_ {
    let mut in_string: Option<char> = None;
    let mut escaped = false;
    line.chars().filter(move |&ch| {
        if escaped {
            escaped = false;
            return false;
        }
        match in_string {
            Some(delimiter) => {
                if ch == '\\' {
                    escaped = true;
                } else if ch == delimiter {
                    in_string = None;
                }
                false
            }
            None => {
                if ch == '\'' || ch == '"' {
                    in_string = Some(ch);
                    false
                } else {
                    true
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn run(content: &str) -> CheckResult {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("widget.dart");
        std::fs::write(&path, content).unwrap();
        let files = vec![TrackedFile::new(path)];
        check_string_conversions(&files, &Config::for_tests()).unwrap()
    }

    #[test]
    fn test_clean_braced_body_passes() {
        let result = run("\
class Thing {
  String toString() {
    return 'Thing(<$value>)';
  }
}
");
        assert!(!result.failed());
    }

    #[test]
    fn test_runtime_type_in_braced_body_is_flagged() {
        let result = run("\
class Thing {
  String toString() {
    return '$runtimeType($value)';
  }
}
");
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].line, 3);
    }

    #[test]
    fn test_arrow_body_is_delimited_by_semicolon() {
        let result = run("\
class Thing {
  String toString() => '$runtimeType';
  void other() {
    use(runtimeType);
  }
}
");
        // Only the arrow body is in scope; `other` is a different method.
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].line, 2);
    }

    #[test]
    fn test_multi_line_body_brace_balancing() {
        let result = run("\
class Thing {
  String toString() {
    if (condition) {
      return describe(runtimeType);
    }
    return 'Thing';
  }
  void after() {
    use(runtimeType);
  }
}
");
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].line, 4);
    }

    #[test]
    fn test_braces_inside_strings_do_not_end_the_body() {
        let result = run("\
class Thing {
  String toString() {
    final text = '}}}';
    return describe(runtimeType);
  }
}
");
        assert_eq!(result.violations.len(), 1);
        assert_eq!(result.violations[0].line, 4);
    }

    #[test]
    fn test_runtime_type_outside_to_string_is_allowed() {
        let result = run("\
class Thing {
  void log() {
    print(runtimeType);
  }
}
");
        assert!(!result.failed());
    }
}
