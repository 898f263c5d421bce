//! CSS Custom Property Resolution
//!
//! Resolves `var(--x, fallback)` reference chains against computed values,
//! with cycle protection.

use rustc_hash::FxHashSet;

/// Split a `var()` reference into the variable name and optional fallback.
///
/// The fallback is everything after the first top-level comma. A comma as
/// the very first character of the inner region yields an empty name and
/// the remainder as fallback.
pub fn extract_variable_name(reference: &str) -> (String, Option<String>) {
    let inner = reference
        .trim()
        .strip_prefix("var(")
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(reference);

    match top_level_comma(inner) {
        Some(position) => (
            inner[..position].trim().to_string(),
            Some(inner[position + 1..].trim().to_string()),
        ),
        None => (inner.trim().to_string(), None),
    }
}

/// First comma outside parentheses, if any
fn top_level_comma(text: &str) -> Option<usize> {
    let mut depth = 0;
    for (index, character) in text.char_indices() {
        match character {
            '(' => depth += 1,
            ')' => depth -= 1,
            ',' if depth == 0 => return Some(index),
            _ => {}
        }
    }
    None
}

/// Resolve a `var()` reference to its effective value.
///
/// Looks up the variable's computed value; when empty, recursively
/// resolves the fallback. `seen` guards against reference cycles: a
/// fallback naming an already-seen variable is returned textually instead
/// of being chased further.
pub fn resolve_variable(
    reference: &str,
    lookup: &dyn Fn(&str) -> Option<String>,
    seen: &mut FxHashSet<String>,
) -> String {
    let (name, fallback) = extract_variable_name(reference);
    seen.insert(name.clone());

    let computed = lookup(&name).unwrap_or_default().trim().to_string();
    if !computed.is_empty() {
        return computed;
    }

    let Some(fallback) = fallback else {
        return computed;
    };
    if fallback.starts_with("var(") {
        let (fallback_name, _) = extract_variable_name(&fallback);
        if seen.contains(&fallback_name) {
            return fallback;
        }
        return resolve_variable(&fallback, lookup, seen);
    }
    fallback
}

/// All complete `var(...)` references appearing in a value string
pub fn find_var_references(value: &str) -> Vec<String> {
    let mut references = Vec::new();
    let mut rest = value;
    while let Some(start) = rest.find("var(") {
        let mut depth = 0;
        let mut end = None;
        for (index, character) in rest[start..].char_indices() {
            match character {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(start + index);
                        break;
                    }
                }
                _ => {}
            }
        }
        let Some(end) = end else {
            break;
        };
        references.push(rest[start..=end].to_string());
        rest = &rest[end + 1..];
    }
    references
}
