//! Cascade Layer Ordering
//!
//! Full layer-name qualification and the ordering rule for nested layer
//! names discovered during style-sheet traversal.

use std::rc::Rc;

use smallvec::SmallVec;

use crate::model::AncestorRule;

/// Full dot-qualified name of a layer, walking its enclosing layer chain.
///
/// A top-level layer's full name equals its own name. Media nodes in the
/// chain are skipped. Returns an empty string for a media node with no
/// layer ancestors.
pub fn full_layer_name(ancestor: &AncestorRule) -> String {
    let mut names: SmallVec<[&str; 4]> = SmallVec::new();
    let mut current = Some(ancestor);
    while let Some(node) = current {
        if let AncestorRule::Layer { name, .. } = node {
            names.push(name.as_str());
        }
        current = node.parent().map(Rc::as_ref);
    }
    names.reverse();
    names.join(".")
}

/// Reorder discovered layer names so nested layers precede their parent.
///
/// For every dot-qualified name `p.c`, the output places `p.c` immediately
/// before the first occurrence of `p`; when `p` has not been seen, `p.c`
/// stays at the end in discovery order. Inputs with no nesting come back
/// unchanged. This models the hoisting of nested layers declared before
/// their parent completes.
pub fn reorder_nested_layers(names: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        match name.rsplit_once('.') {
            Some((parent, _)) => {
                if let Some(pos) = out.iter().position(|existing| existing == parent) {
                    out.insert(pos, name.clone());
                } else {
                    out.push(name.clone());
                }
            }
            None => out.push(name.clone()),
        }
    }
    out
}
