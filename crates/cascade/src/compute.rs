//! Cascade Aggregation
//!
//! Aggregates matched style rules into a single winning value per property,
//! applies longhand/shorthand compaction, and groups the result by layer
//! and/or media for presentation, with substring filtering.

use std::cmp::Ordering;
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use stylelens_rules::StyleRule;

use crate::compact::{compact_css, longhands_of};

/// Grouping key for rules outside any `@media` block
pub const NO_MEDIA: &str = "no media";

/// Grouping key for rules outside any `@layer` block
pub const NO_LAYER: &str = "no layer";

/// Selectors of well-known universal resets, droppable on request
static RESET_SELECTORS: &[&str] = &[
    "*",
    "*, *::before, *::after",
    "*, ::before, ::after",
    "*, :after, :before",
];

/// Options for a cascade computation pass
#[derive(Debug, Clone, Default)]
pub struct ComputeOptions {
    /// Case-insensitive substring filter over per-property search blobs
    pub filter: Option<String>,
    /// Place synthesized shorthand entries first in the order
    pub sort_implicit_first: bool,
    /// Drop rules whose selector is a known universal reset
    pub hide_reset_styles: bool,
}

/// A style rule projected for one property it declares
///
/// Ephemeral: rebuilt on every cascade computation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRuleWithProp {
    /// The owning rule
    pub rule: Rc<StyleRule>,
    /// The projected property
    pub prop: String,
    /// Lowercased blob of everything substring filtering may match
    pub search: String,
}

impl StyleRuleWithProp {
    /// Project a rule for one property, building its search blob
    pub fn new(rule: Rc<StyleRule>, prop: &str, value: &str) -> Self {
        let mut parts: SmallVec<[String; 8]> = SmallVec::new();
        parts.push(prop.to_string());
        let camel = camel_case(prop);
        if camel != prop {
            parts.push(camel);
        }
        parts.push(value.to_string());
        parts.push(rule.selector.clone());
        let unescaped = rule.selector.replace('\\', "");
        if unescaped != rule.selector {
            parts.push(unescaped);
        }
        parts.push(rule.source.to_string());
        let layer = rule.layer_name();
        if !layer.is_empty() {
            parts.push(layer);
        }
        let media = rule.media_text();
        if !media.is_empty() {
            parts.push(media);
        }
        let search = parts.join(" ").to_lowercase();
        Self {
            rule,
            prop: prop.to_string(),
            search,
        }
    }
}

/// Result of one cascade computation pass
///
/// Constructed fresh on every pass and replaced wholesale, never mutated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CascadeResult {
    /// Winning value per property, including synthesized shorthands
    pub styles: FxHashMap<String, String>,
    /// Owning rule projection per property
    pub rule_by_prop: FxHashMap<String, StyleRuleWithProp>,
    /// Visible property keys, most-recently-declared first
    pub order: Vec<String>,
    /// Visible properties grouped by media text, "no media" last
    pub rules_in_media: Vec<(String, Vec<StyleRuleWithProp>)>,
    /// Visible properties grouped by qualified layer name
    pub rules_by_layer: Vec<(String, Vec<StyleRuleWithProp>)>,
    /// Visible properties grouped by layer, then by media within each layer
    pub rules_by_layer_in_media: Vec<(String, Vec<(String, Vec<StyleRuleWithProp>)>)>,
}

/// Aggregate matched rules into the presentation-ready cascade result.
///
/// Later rules in the input shadow earlier ones for the same property.
/// The substring filter affects visibility only: compaction always runs
/// over the unfiltered winning-value map, so folding decisions do not
/// change as the user types.
pub fn compute_styles(rules: &[Rc<StyleRule>], options: &ComputeOptions) -> CascadeResult {
    let considered: Vec<&Rc<StyleRule>> = rules
        .iter()
        .filter(|rule| {
            if options.hide_reset_styles && is_reset_selector(&rule.selector) {
                log::trace!("dropping reset rule {:?}", rule.selector);
                return false;
            }
            true
        })
        .collect();

    // last-wins value map, remembering first-seen insertion order
    let mut applied: FxHashMap<String, String> = FxHashMap::default();
    let mut rule_by_prop: FxHashMap<String, StyleRuleWithProp> = FxHashMap::default();
    let mut first_seen: Vec<String> = Vec::new();
    for rule in &considered {
        for decl in &rule.declarations {
            if !applied.contains_key(&decl.property) {
                first_seen.push(decl.property.clone());
            }
            applied.insert(decl.property.clone(), decl.value.clone());
            rule_by_prop.insert(
                decl.property.clone(),
                StyleRuleWithProp::new(Rc::clone(rule), &decl.property, &decl.value),
            );
        }
    }

    let needle = options
        .filter
        .as_ref()
        .map(|filter| filter.trim().to_lowercase())
        .filter(|filter| !filter.is_empty());
    let visible: FxHashSet<String> = match &needle {
        Some(needle) => first_seen
            .iter()
            .filter(|prop| rule_by_prop[*prop].search.contains(needle))
            .cloned()
            .collect(),
        None => first_seen.iter().cloned().collect(),
    };

    let mut styles = applied.clone();
    let compaction = compact_css(&mut styles);
    let picked: FxHashSet<&str> = compaction.pick.iter().map(String::as_str).collect();

    // shorthands synthesized by compaction surface through a winning longhand
    let mut synthesized: Vec<String> = Vec::new();
    for name in &compaction.pick {
        if applied.contains_key(name) {
            continue;
        }
        let Some(longhands) = longhands_of(name) else {
            continue;
        };
        if !longhands.iter().any(|longhand| visible.contains(*longhand)) {
            continue;
        }
        if let Some(owner) = longhands
            .iter()
            .find_map(|longhand| rule_by_prop.get(*longhand))
        {
            let value = styles.get(name).cloned().unwrap_or_default();
            let projection = StyleRuleWithProp::new(Rc::clone(&owner.rule), name, &value);
            rule_by_prop.insert(name.clone(), projection);
            synthesized.push(name.clone());
        }
    }

    let declared: Vec<String> = first_seen
        .iter()
        .rev()
        .filter(|prop| picked.contains(prop.as_str()) && visible.contains(*prop))
        .cloned()
        .collect();
    let order: Vec<String> = if options.sort_implicit_first {
        synthesized.iter().chain(declared.iter()).cloned().collect()
    } else {
        declared.iter().chain(synthesized.iter()).cloned().collect()
    };

    let mut rules_in_media: Vec<(String, Vec<StyleRuleWithProp>)> = Vec::new();
    let mut rules_by_layer: Vec<(String, Vec<StyleRuleWithProp>)> = Vec::new();
    let mut rules_by_layer_in_media: Vec<(String, Vec<(String, Vec<StyleRuleWithProp>)>)> =
        Vec::new();

    for prop in &order {
        let Some(entry) = rule_by_prop.get(prop) else {
            continue;
        };
        let media_text = entry.rule.media_text();
        let media_key = if media_text.is_empty() {
            NO_MEDIA.to_string()
        } else {
            media_text
        };
        let layer_name = entry.rule.layer_name();
        let layer_key = if layer_name.is_empty() {
            NO_LAYER.to_string()
        } else {
            layer_name
        };

        push_bucket(&mut rules_in_media, &media_key, entry.clone());
        push_bucket(&mut rules_by_layer, &layer_key, entry.clone());
        let layer_buckets = find_or_insert(&mut rules_by_layer_in_media, &layer_key);
        push_bucket(layer_buckets, &media_key, entry.clone());
    }

    rules_in_media.sort_by(|left, right| compare_media_keys(&left.0, &right.0));
    for (_, buckets) in &mut rules_by_layer_in_media {
        buckets.sort_by(|left, right| compare_media_keys(&left.0, &right.0));
    }

    CascadeResult {
        styles,
        rule_by_prop,
        order,
        rules_in_media,
        rules_by_layer,
        rules_by_layer_in_media,
    }
}

/// Whether a selector is one of the known universal resets.
///
/// Comparison is comma-set equivalence, so selector-list order and spacing
/// do not matter.
pub fn is_reset_selector(selector: &str) -> bool {
    let parts: FxHashSet<&str> = selector.split(',').map(str::trim).collect();
    RESET_SELECTORS.iter().any(|reset| {
        let reset_parts: FxHashSet<&str> = reset.split(',').map(str::trim).collect();
        parts == reset_parts
    })
}

/// Hyphenated property name to its camel-case form (`padding-top` → `paddingTop`)
fn camel_case(property: &str) -> String {
    if property.starts_with("--") {
        return property.to_string();
    }
    let mut out = String::with_capacity(property.len());
    let mut upper_next = false;
    for character in property.chars() {
        if character == '-' {
            upper_next = true;
        } else if upper_next {
            out.extend(character.to_uppercase());
            upper_next = false;
        } else {
            out.push(character);
        }
    }
    out
}

/// Media keys ordered by a feature-count comparator, "no media" last
fn compare_media_keys(left: &str, right: &str) -> Ordering {
    match (left == NO_MEDIA, right == NO_MEDIA) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let feature_count = |query: &str| query.matches('(').count();
            feature_count(right)
                .cmp(&feature_count(left))
                .then_with(|| left.cmp(right))
        }
    }
}

fn push_bucket(
    buckets: &mut Vec<(String, Vec<StyleRuleWithProp>)>,
    key: &str,
    entry: StyleRuleWithProp,
) {
    match buckets.iter_mut().find(|(existing, _)| existing == key) {
        Some((_, bucket)) => bucket.push(entry),
        None => buckets.push((key.to_string(), vec![entry])),
    }
}

fn find_or_insert<'buckets>(
    buckets: &'buckets mut Vec<(String, Vec<(String, Vec<StyleRuleWithProp>)>)>,
    key: &str,
) -> &'buckets mut Vec<(String, Vec<StyleRuleWithProp>)> {
    if let Some(position) = buckets.iter().position(|(existing, _)| existing == key) {
        return &mut buckets[position].1;
    }
    buckets.push((key.to_string(), Vec::new()));
    let last = buckets.len() - 1;
    &mut buckets[last].1
}

#[cfg(test)]
mod tests {
    use super::*;
    use stylelens_rules::{AncestorRule, Declaration, RuleSource};

    fn rule(selector: &str, declarations: &[(&str, &str)]) -> Rc<StyleRule> {
        Rc::new(StyleRule::new(
            selector,
            declarations
                .iter()
                .map(|(property, value)| Declaration::new(*property, *value, false))
                .collect(),
            RuleSource::StyleTag,
        ))
    }

    fn rule_in(
        selector: &str,
        declarations: &[(&str, &str)],
        parent: Rc<AncestorRule>,
    ) -> Rc<StyleRule> {
        let mut built = StyleRule::new(
            selector,
            declarations
                .iter()
                .map(|(property, value)| Declaration::new(*property, *value, false))
                .collect(),
            RuleSource::StyleTag,
        );
        built.parent = Some(parent);
        Rc::new(built)
    }

    fn media(query: &str) -> Rc<AncestorRule> {
        Rc::new(AncestorRule::Media {
            query: query.to_string(),
            parent: None,
        })
    }

    fn layer(name: &str) -> Rc<AncestorRule> {
        Rc::new(AncestorRule::Layer {
            name: name.to_string(),
            parent: None,
        })
    }

    #[test]
    fn test_later_rules_shadow_earlier() {
        let rules = vec![
            rule(".a", &[("color", "red")]),
            rule(".b", &[("color", "blue")]),
        ];
        let result = compute_styles(&rules, &ComputeOptions::default());
        assert_eq!(result.styles.get("color").map(String::as_str), Some("blue"));
        assert_eq!(result.rule_by_prop["color"].rule.selector, ".b");
    }

    #[test]
    fn test_order_is_reversed_first_seen() {
        let rules = vec![
            rule(".a", &[("color", "red"), ("margin", "0")]),
            rule(".b", &[("color", "blue")]),
        ];
        let result = compute_styles(&rules, &ComputeOptions::default());
        assert_eq!(result.order, vec!["margin", "color"]);
    }

    #[test]
    fn test_filter_limits_visibility() {
        let rules = vec![rule(".a", &[("color", "red"), ("margin", "0")])];
        let options = ComputeOptions {
            filter: Some("margin".into()),
            ..ComputeOptions::default()
        };
        let result = compute_styles(&rules, &options);
        assert_eq!(result.order, vec!["margin"]);
        // the unfiltered winning map is untouched by visibility
        assert_eq!(result.styles.get("color").map(String::as_str), Some("red"));
    }

    #[test]
    fn test_filter_matches_camel_case_and_selector() {
        let rules = vec![rule(".sidebar", &[("padding-top", "4px")])];
        let by_camel = ComputeOptions {
            filter: Some("paddingTop".into()),
            ..ComputeOptions::default()
        };
        assert_eq!(compute_styles(&rules, &by_camel).order, vec!["padding-top"]);
        let by_selector = ComputeOptions {
            filter: Some("sidebar".into()),
            ..ComputeOptions::default()
        };
        assert_eq!(
            compute_styles(&rules, &by_selector).order,
            vec!["padding-top"]
        );
    }

    #[test]
    fn test_compaction_folds_longhands() {
        let rules = vec![rule(
            ".a",
            &[
                ("padding-top", "0px"),
                ("padding-right", "0px"),
                ("padding-bottom", "0px"),
                ("padding-left", "0px"),
            ],
        )];
        let result = compute_styles(&rules, &ComputeOptions::default());
        assert_eq!(result.order, vec!["padding"]);
        assert_eq!(result.styles.get("padding").map(String::as_str), Some("0px"));
        // the synthesized entry projects through the declaring rule
        assert_eq!(result.rule_by_prop["padding"].rule.selector, ".a");
    }

    #[test]
    fn test_filter_does_not_change_compaction() {
        let rules = vec![rule(
            ".a",
            &[
                ("padding-top", "0px"),
                ("padding-right", "0px"),
                ("padding-bottom", "0px"),
                ("padding-left", "0px"),
            ],
        )];
        let options = ComputeOptions {
            filter: Some("padding-top".into()),
            ..ComputeOptions::default()
        };
        let result = compute_styles(&rules, &options);
        // padding-top stays folded away; the shorthand carries visibility
        assert_eq!(result.order, vec!["padding"]);
    }

    #[test]
    fn test_sort_implicit_first() {
        let rules = vec![rule(
            ".a",
            &[
                ("color", "red"),
                ("overflow-x", "hidden"),
                ("overflow-y", "hidden"),
            ],
        )];
        let default_order = compute_styles(&rules, &ComputeOptions::default());
        assert_eq!(default_order.order, vec!["color", "overflow"]);
        let implicit_first = compute_styles(
            &rules,
            &ComputeOptions {
                sort_implicit_first: true,
                ..ComputeOptions::default()
            },
        );
        assert_eq!(implicit_first.order, vec!["overflow", "color"]);
    }

    #[test]
    fn test_hide_reset_styles() {
        let rules = vec![
            rule("*, *::before, *::after", &[("margin", "0")]),
            rule(".a", &[("color", "red")]),
        ];
        let hidden = compute_styles(
            &rules,
            &ComputeOptions {
                hide_reset_styles: true,
                ..ComputeOptions::default()
            },
        );
        assert_eq!(hidden.order, vec!["color"]);
        let shown = compute_styles(&rules, &ComputeOptions::default());
        assert_eq!(shown.order, vec!["color", "margin"]);
    }

    #[test]
    fn test_reset_selector_comma_set_equivalence() {
        assert!(is_reset_selector("*"));
        assert!(is_reset_selector("*::after, *, *::before"));
        assert!(!is_reset_selector(".a, *"));
    }

    #[test]
    fn test_grouping_by_media_and_layer() {
        let rules = vec![
            rule(".a", &[("color", "red")]),
            rule_in(".b", &[("margin", "0")], media("(min-width: 600px)")),
            rule_in(".c", &[("padding", "1px")], layer("theme")),
        ];
        let result = compute_styles(&rules, &ComputeOptions::default());

        let media_keys: Vec<&str> = result
            .rules_in_media
            .iter()
            .map(|(key, _)| key.as_str())
            .collect();
        assert_eq!(media_keys, vec!["(min-width: 600px)", NO_MEDIA]);

        let layer_keys: Vec<&str> = result
            .rules_by_layer
            .iter()
            .map(|(key, _)| key.as_str())
            .collect();
        // first-encounter order over `order` (most recent first)
        assert_eq!(layer_keys, vec!["theme", NO_LAYER]);

        let no_media_bucket = &result
            .rules_in_media
            .iter()
            .find(|(key, _)| key == NO_MEDIA)
            .unwrap()
            .1;
        let props: Vec<&str> = no_media_bucket
            .iter()
            .map(|entry| entry.prop.as_str())
            .collect();
        assert_eq!(props, vec!["padding", "color"]);
    }

    #[test]
    fn test_media_keys_sorted_by_feature_count() {
        let rules = vec![
            rule_in(".a", &[("color", "red")], media("(min-width: 600px)")),
            rule_in(
                ".b",
                &[("margin", "0")],
                media("(min-width: 600px) and (max-width: 900px)"),
            ),
        ];
        let result = compute_styles(&rules, &ComputeOptions::default());
        let keys: Vec<&str> = result
            .rules_in_media
            .iter()
            .map(|(key, _)| key.as_str())
            .collect();
        assert_eq!(
            keys,
            vec![
                "(min-width: 600px) and (max-width: 900px)",
                "(min-width: 600px)"
            ]
        );
    }

    #[test]
    fn test_important_suffix_survives_aggregation() {
        let rules = vec![Rc::new(StyleRule::new(
            ".a",
            vec![Declaration::new("color", "red", true)],
            RuleSource::StyleTag,
        ))];
        let result = compute_styles(&rules, &ComputeOptions::default());
        assert_eq!(
            result.styles.get("color").map(String::as_str),
            Some("red !important")
        );
    }
}
