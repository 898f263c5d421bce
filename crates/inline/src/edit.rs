//! Index-Addressed Declaration Editing
//!
//! Produces a new declaration-list string from an existing one. The index
//! space is the existing `;`-split segment list: comments and real
//! declarations each occupy exactly one slot, which is what lets the
//! editor's toggle and remove actions target the correct slot.

use crate::parse::{parse_declarations, DeclarationEntry};

/// How an indexed edit applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    /// Splice a new segment before the addressed slot
    Insert,
    /// Replace the addressed slot in place
    Edit,
}

/// Build the updated declaration-list text.
///
/// With `at_index = None` the new declaration is appended unconditionally
/// and `mode` is ignored. Otherwise the existing text is split into
/// `;`-delimited segments (blank segments dropped) and the new segment is
/// spliced at (`Insert`) or written over (`Edit`) the addressed slot.
/// Out-of-range indices clamp to append; this never panics. The result
/// always ends with `;`.
///
/// A commented segment reads `;/* prop: value */;` in context and
/// round-trips through the parser as one disabled entry in one slot.
pub fn build_updated_text(
    css_text: &str,
    property: &str,
    value: &str,
    at_index: Option<usize>,
    commented: bool,
    mode: EditMode,
) -> String {
    let segment = render_segment(property, value, commented);

    let Some(index) = at_index else {
        return format!("{}{};", css_text, segment);
    };

    let mut segments: Vec<String> = css_text
        .split(';')
        .filter(|existing| !existing.trim().is_empty())
        .map(str::to_string)
        .collect();

    match mode {
        EditMode::Insert => {
            let slot = index.min(segments.len());
            segments.insert(slot, segment);
        }
        EditMode::Edit => {
            if index < segments.len() {
                segments[index] = segment;
            } else {
                segments.push(segment);
            }
        }
    }

    join_segments(&segments)
}

/// Remove the declaration occupying the addressed slot.
///
/// Re-parses the text, drops the entry at `at_index` (out-of-range indices
/// leave the list unchanged), and re-serializes; commented entries are
/// wrapped back into comment form. The result ends with `;` unless empty.
pub fn remove_declaration_at(css_text: &str, at_index: usize) -> String {
    let mut entries = parse_declarations(css_text);
    if at_index < entries.len() {
        entries.remove(at_index);
    }
    serialize_entries(&entries)
}

/// Serialize entries back into declaration-list text
fn serialize_entries(entries: &[DeclarationEntry]) -> String {
    if entries.is_empty() {
        return String::new();
    }
    let segments: Vec<String> = entries
        .iter()
        .map(|entry| render_segment(&entry.property, &entry.value, entry.commented))
        .collect();
    join_segments(&segments)
}

fn render_segment(property: &str, value: &str, commented: bool) -> String {
    if commented {
        format!("/* {}: {} */", property, value)
    } else {
        format!(" {}: {}", property, value)
    }
}

fn join_segments(segments: &[String]) -> String {
    let mut out = segments.join(";");
    out.push(';');
    out
}
