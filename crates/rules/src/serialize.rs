//! Rule Serialization
//!
//! Converts raw rule records into the immutable rule model, deduplicating
//! shared ancestors through a per-pass identity cache.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::model::{AncestorRule, Declaration, RuleSource, StyleRule};
use crate::raw::{classify, RawRule, RuleKind};

/// Per-pass memo of already-serialized grouping rules
///
/// Keyed by raw-rule identity so that repeated ancestors resolve to one
/// shared node and parent links stay consistent within a pass. Construct a
/// fresh cache per inspection pass; entries must not leak across passes.
#[derive(Debug, Default)]
pub struct SerializeCache {
    nodes: FxHashMap<u64, Rc<AncestorRule>>,
}

impl SerializeCache {
    /// Create an empty cache for one inspection pass
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached grouping rules
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Serialize a grouping rule (@media or @layer block) into an ancestor node.
///
/// Returns `None` for kinds that cannot enclose style rules; unknown kinds
/// log a warning. The same raw rule always yields the same `Rc` node within
/// one cache's lifetime.
pub fn serialize_ancestor(
    raw: &RawRule,
    parent: Option<Rc<AncestorRule>>,
    cache: &mut SerializeCache,
) -> Option<Rc<AncestorRule>> {
    if let Some(node) = cache.nodes.get(&raw.id) {
        return Some(Rc::clone(node));
    }

    let node = match classify(raw) {
        RuleKind::Media => Rc::new(AncestorRule::Media {
            query: raw.condition_text.clone().unwrap_or_default(),
            parent,
        }),
        RuleKind::LayerBlock => Rc::new(AncestorRule::Layer {
            name: raw.layer_name.clone().unwrap_or_default(),
            parent,
        }),
        RuleKind::Style | RuleKind::LayerStatement => return None,
        RuleKind::Unknown => {
            log::warn!("skipping unclassifiable grouping rule (id {})", raw.id);
            return None;
        }
    };

    cache.nodes.insert(raw.id, Rc::clone(&node));
    Some(node)
}

/// Serialize a raw style rule into the rule model.
///
/// Declarations with empty values are dropped (the property is not actually
/// set); custom properties (`--*`) are always kept. `!important` is
/// preserved as a literal suffix on the stored value string. Non-style
/// kinds yield `None` with a warning.
pub fn serialize_style_rule(
    raw: &RawRule,
    parent: Option<Rc<AncestorRule>>,
    source: &RuleSource,
) -> Option<StyleRule> {
    if classify(raw) != RuleKind::Style {
        log::warn!("expected a style rule, got {:?} (id {})", classify(raw), raw.id);
        return None;
    }

    let selector = raw.selector_text.clone().unwrap_or_default();
    let declarations = raw
        .declarations
        .iter()
        .filter(|decl| !decl.value.trim().is_empty() || decl.property.starts_with("--"))
        .map(|decl| Declaration::new(decl.property.clone(), decl.value.clone(), decl.important))
        .collect();

    Some(StyleRule {
        selector,
        declarations,
        source: source.clone(),
        parent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::RawDeclaration;

    #[test]
    fn test_style_rule_filters_unset_declarations() {
        let raw = RawRule::style(
            1,
            ".a",
            vec![
                RawDeclaration::new("color", "red", false),
                RawDeclaration::new("margin", "", false),
                RawDeclaration::new("--accent", "", false),
            ],
        );
        let rule = serialize_style_rule(&raw, None, &RuleSource::StyleTag).unwrap();
        assert_eq!(rule.declarations.len(), 2);
        assert_eq!(rule.declarations[0].property, "color");
        // custom properties survive even when empty
        assert_eq!(rule.declarations[1].property, "--accent");
    }

    #[test]
    fn test_style_rule_keeps_important_suffix() {
        let raw = RawRule::style(1, ".a", vec![RawDeclaration::new("color", "red", true)]);
        let rule = serialize_style_rule(&raw, None, &RuleSource::StyleTag).unwrap();
        assert_eq!(rule.declarations[0].value, "red !important");
        assert!(rule.declarations[0].important);
    }

    #[test]
    fn test_non_style_rule_yields_none() {
        let raw = RawRule::media(1, "screen", vec![]);
        assert!(serialize_style_rule(&raw, None, &RuleSource::StyleTag).is_none());
    }

    #[test]
    fn test_ancestor_cache_dedupes() {
        let mut cache = SerializeCache::new();
        let raw = RawRule::media(7, "(min-width: 600px)", vec![]);
        let first = serialize_ancestor(&raw, None, &mut cache).unwrap();
        let second = serialize_ancestor(&raw, None, &mut cache).unwrap();
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_ancestor_unknown_kind() {
        let mut cache = SerializeCache::new();
        assert!(serialize_ancestor(&RawRule::default(), None, &mut cache).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_ancestor_chain_built_bottom_up() {
        let mut cache = SerializeCache::new();
        let outer_raw = RawRule::layer(1, "theme", vec![]);
        let inner_raw = RawRule::media(2, "screen", vec![]);
        let outer = serialize_ancestor(&outer_raw, None, &mut cache).unwrap();
        let inner = serialize_ancestor(&inner_raw, Some(Rc::clone(&outer)), &mut cache).unwrap();
        assert!(Rc::ptr_eq(inner.parent().unwrap(), &outer));
    }
}
