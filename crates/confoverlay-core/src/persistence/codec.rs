//! Sectioned key/value text codec for [`ConfigDocument`].
//!
//! Text format:
//! ```text
//! # comment
//! topdirs = ~/docs ~/projects
//! skippedNames+ = build
//!
//! [/home/me/tmp]
//! skippedNames- = tmp*
//! followLinks = 1
//! ```
//!
//! Keys before the first header belong to the global scope.  A header
//! `[scope]` starts the section for that scope.  Blank lines and lines
//! starting with `#` are ignored.  A line ending in `\` continues on the next
//! physical line.  Serialization is deterministic: global keys first, then
//! sections in scope order, keys sorted within each section.

use thiserror::Error;

use super::document::ConfigDocument;
use crate::domain::scope::{validate_scope, GLOBAL_SCOPE};

/// Errors produced while parsing configuration text.
#[derive(Debug, Error, PartialEq)]
pub enum FormatError {
    /// A non-blank, non-comment line that is neither a header nor `key = value`.
    #[error("line {line}: expected `key = value` or `[section]`, got {content:?}")]
    MalformedLine { line: usize, content: String },

    /// A `[` header without its closing `]`.
    #[error("line {line}: unterminated section header")]
    UnterminatedSection { line: usize },

    /// A header naming a scope that cannot be represented.
    #[error("line {line}: invalid section name: {reason}")]
    InvalidSection { line: usize, reason: String },
}

/// Parses configuration text into a document.
///
/// # Errors
///
/// Returns [`FormatError`] for the first malformed line, with its 1-based
/// line number (the first physical line of a continued logical line).
pub fn parse_document(text: &str) -> Result<ConfigDocument, FormatError> {
    let mut doc = ConfigDocument::new();
    let mut scope = GLOBAL_SCOPE.to_string();

    for (line_no, logical) in logical_lines(text) {
        let trimmed = logical.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix('[') {
            let name = rest
                .strip_suffix(']')
                .ok_or(FormatError::UnterminatedSection { line: line_no })?
                .trim();
            validate_scope(name).map_err(|e| FormatError::InvalidSection {
                line: line_no,
                reason: e.to_string(),
            })?;
            doc.ensure_section(name);
            scope = name.to_string();
            continue;
        }

        match trimmed.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                doc.set(&scope, key.trim(), value.trim());
            }
            _ => {
                return Err(FormatError::MalformedLine {
                    line: line_no,
                    content: trimmed.to_string(),
                })
            }
        }
    }

    Ok(doc)
}

/// Serializes a document to configuration text.
pub fn serialize_document(doc: &ConfigDocument) -> String {
    let mut out = String::new();

    if let Some(global) = doc.section(GLOBAL_SCOPE) {
        for (key, value) in global {
            push_entry(&mut out, key, value);
        }
    }

    for (scope, section) in doc.sections().filter(|(name, _)| *name != GLOBAL_SCOPE) {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push('[');
        out.push_str(scope);
        out.push_str("]\n");
        for (key, value) in section {
            push_entry(&mut out, key, value);
        }
    }

    out
}

fn push_entry(out: &mut String, key: &str, value: &str) {
    out.push_str(key);
    if value.is_empty() {
        out.push_str(" =\n");
    } else {
        out.push_str(" = ");
        out.push_str(value);
        out.push('\n');
    }
}

/// Joins backslash-continued physical lines, yielding `(first_line_no, text)`.
///
/// A comment line never continues, even when it ends with a backslash.
fn logical_lines(text: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, raw) in text.lines().enumerate() {
        if pending.is_none() && raw.trim_start().starts_with('#') {
            lines.push((idx + 1, raw.to_string()));
            continue;
        }
        let (start, mut acc) = pending.take().unwrap_or((idx + 1, String::new()));
        match raw.strip_suffix('\\') {
            Some(head) => {
                acc.push_str(head);
                pending = Some((start, acc));
            }
            None => {
                acc.push_str(raw);
                lines.push((start, acc));
            }
        }
    }
    if let Some(last) = pending {
        lines.push(last);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_and_sections() {
        // Arrange
        let text = "\
# indexer configuration
topdirs = ~/docs
skippedNames+ = build

[/home/me/tmp]
skippedNames- = tmp*
followLinks = 1
";

        // Act
        let doc = parse_document(text).expect("valid document");

        // Assert
        assert_eq!(doc.get("", "topdirs"), Some("~/docs"));
        assert_eq!(doc.get("", "skippedNames+"), Some("build"));
        assert_eq!(doc.get("/home/me/tmp", "skippedNames-"), Some("tmp*"));
        assert_eq!(doc.get("/home/me/tmp", "followLinks"), Some("1"));
    }

    #[test]
    fn test_parse_keeps_empty_values_and_empty_sections() {
        let doc = parse_document("noContentSuffixes- =\n[/empty]\n").unwrap();
        assert_eq!(doc.get("", "noContentSuffixes-"), Some(""));
        assert!(doc.has_section("/empty"));
    }

    #[test]
    fn test_parse_joins_continuation_lines() {
        let doc = parse_document("skippedPaths = /a \\\n  /b\nloglevel = 2\n").unwrap();
        assert_eq!(doc.get("", "skippedPaths"), Some("/a   /b"));
        assert_eq!(doc.get("", "loglevel"), Some("2"));
    }

    #[test]
    fn test_parse_comment_ending_in_backslash_does_not_swallow_next_line() {
        // Arrange
        let text = "# old path C:\\\nloglevel = 3\n";

        // Act
        let doc = parse_document(text).unwrap();

        // Assert
        assert_eq!(doc.get("", "loglevel"), Some("3"));
    }

    #[test]
    fn test_parse_value_may_contain_equals_sign() {
        let doc = parse_document("unac_except_trans = ßss æae = x\n").unwrap();
        assert_eq!(doc.get("", "unac_except_trans"), Some("ßss æae = x"));
    }

    #[test]
    fn test_parse_rejects_line_without_equals() {
        let err = parse_document("topdirs = ~\njust some words\n").unwrap_err();
        assert_eq!(
            err,
            FormatError::MalformedLine {
                line: 2,
                content: "just some words".to_string()
            }
        );
    }

    #[test]
    fn test_parse_rejects_empty_key() {
        let err = parse_document(" = value\n").unwrap_err();
        assert!(matches!(err, FormatError::MalformedLine { line: 1, .. }));
    }

    #[test]
    fn test_parse_rejects_unterminated_header() {
        let err = parse_document("[/home/me\nk = v\n").unwrap_err();
        assert_eq!(err, FormatError::UnterminatedSection { line: 1 });
    }

    #[test]
    fn test_parse_rejects_header_with_nested_bracket() {
        let err = parse_document("[a[b]\n").unwrap_err();
        assert!(matches!(err, FormatError::InvalidSection { line: 1, .. }));
    }

    #[test]
    fn test_serialize_writes_global_first_then_sorted_sections() {
        // Arrange
        let mut doc = ConfigDocument::new();
        doc.set("/z", "followLinks", "1");
        doc.set("", "topdirs", "~");
        doc.set("/a", "skippedNames+", "");

        // Act
        let text = serialize_document(&doc);

        // Assert
        assert_eq!(
            text,
            "topdirs = ~\n\n[/a]\nskippedNames+ =\n\n[/z]\nfollowLinks = 1\n"
        );
    }

    #[test]
    fn test_serialized_text_parses_back_to_same_document() {
        let mut doc = ConfigDocument::new();
        doc.set("", "skippedNames", "#* CVS .git \"My Stuff\"");
        doc.set("/home/me/tmp", "skippedNames-", "tmp*");
        doc.ensure_section("/home/me/empty");

        let restored = parse_document(&serialize_document(&doc)).unwrap();

        assert_eq!(restored, doc);
    }
}
