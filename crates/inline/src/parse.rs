//! Declaration-List Parser
//!
//! Parses a raw CSS declaration-list string (as found in an inline `style`
//! attribute) into an ordered sequence of entries. Declarations wrapped in
//! `/* ... */` comments are the "disabled declaration" convention and are
//! extracted with the same inner syntax, flagged as commented.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// One parsed declaration, in raw-text left-to-right order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationEntry {
    /// Property name, trimmed; custom (`--*`) and vendor names allowed
    pub property: String,
    /// Value text up to the next unescaped `;`, trimmed
    pub value: String,
    /// Whether the declaration sat inside a comment (disabled)
    pub commented: bool,
}

impl DeclarationEntry {
    /// Create an entry
    pub fn new(property: impl Into<String>, value: impl Into<String>, commented: bool) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            commented,
        }
    }
}

/// Parse a declaration-list string into ordered entries.
///
/// Empty `;;` runs produce no entries, duplicate properties are all
/// retained in source order, and embedded newlines inside a value collapse
/// to single spaces.
pub fn parse_declarations(text: &str) -> Vec<DeclarationEntry> {
    let mut entries = Vec::new();
    for (span, commented) in split_comment_spans(text) {
        for piece in split_unescaped(span) {
            if let Some(entry) = parse_piece(piece, commented) {
                entries.push(entry);
            }
        }
    }
    entries
}

/// Split text into alternating plain and comment spans, in order
fn split_comment_spans(text: &str) -> SmallVec<[(&str, bool); 8]> {
    let mut spans: SmallVec<[(&str, bool); 8]> = SmallVec::new();
    let mut rest = text;
    while let Some(start) = rest.find("/*") {
        if start > 0 {
            spans.push((&rest[..start], false));
        }
        let after = &rest[start + 2..];
        match after.find("*/") {
            Some(end) => {
                spans.push((&after[..end], true));
                rest = &after[end + 2..];
            }
            None => {
                // unterminated comment: the remainder is all disabled text
                spans.push((after, true));
                rest = "";
            }
        }
    }
    if !rest.is_empty() {
        spans.push((rest, false));
    }
    spans
}

/// Split a span on `;` separators, honoring backslash escapes
fn split_unescaped(span: &str) -> SmallVec<[&str; 8]> {
    let mut pieces: SmallVec<[&str; 8]> = SmallVec::new();
    let mut start = 0;
    let mut escaped = false;
    for (index, character) in span.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match character {
            '\\' => escaped = true,
            ';' => {
                pieces.push(&span[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    pieces.push(&span[start..]);
    pieces
}

/// Parse a single `prop: value` piece; empty or malformed pieces yield nothing
fn parse_piece(piece: &str, commented: bool) -> Option<DeclarationEntry> {
    if piece.trim().is_empty() {
        return None;
    }
    let Some((raw_property, raw_value)) = piece.split_once(':') else {
        log::debug!("skipping malformed declaration piece: {:?}", piece);
        return None;
    };
    let property = raw_property.trim();
    let value = normalize_newlines(raw_value);
    let value = value.trim();
    if property.is_empty() || value.is_empty() {
        return None;
    }
    Some(DeclarationEntry::new(property, value, commented))
}

/// Collapse embedded newlines to single spaces
fn normalize_newlines(value: &str) -> String {
    value
        .replace("\r\n", " ")
        .replace(['\n', '\r'], " ")
}
