//! Inspection Orchestrator
//!
//! Gathers matching rules from all reachable style sheets, discovers layer
//! declarations, and assembles the snapshot for one inspected element.

use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet};

use stylelens_cascade::{compute_styles, filter_by_env, ComputeOptions};
use stylelens_inline::{parse_declarations, DeclarationEntry};
use stylelens_rules::{
    classify, full_layer_name, reorder_nested_layers, serialize_ancestor, serialize_style_rule,
    AncestorRule, Declaration, RawRule, RuleKind, RuleSource, SerializeCache, StyleRule,
};

use crate::snapshot::InspectionSnapshot;
use crate::source::DocumentSource;
use crate::variables::{extract_variable_name, find_var_references, resolve_variable};

/// Selector label under which the `style` attribute shows in the cascade
const INLINE_SELECTOR: &str = "element.style";

/// Inspect one element against its document.
///
/// Enumerates reachable style sheets (inaccessible ones are skipped),
/// descends media/layer blocks depth-first collecting matching rules and
/// declared layer names, orders the matched list by layer, folds in the
/// inline style, and computes the cascade over the rules active under the
/// document's environment. Returns `None` when there is nothing to show.
pub fn inspect(source: &dyn DocumentSource, options: &ComputeOptions) -> Option<InspectionSnapshot> {
    let env = source.environment();
    let mut collector = Collector::new(source);

    for sheet in source.style_sheets() {
        let rules = match source.sheet_rules(sheet) {
            Ok(rules) => rules,
            Err(error) => {
                log::debug!("skipping style sheet {:?}: {}", sheet, error);
                continue;
            }
        };
        let sheet_source = source.sheet_source(sheet);
        collector.collect(&rules, None, &sheet_source);
    }

    let Collector {
        mut matched,
        layer_names,
        ..
    } = collector;

    let layer_order = reorder_nested_layers(&layer_names);
    if !layer_order.is_empty() {
        sort_by_layer_order(&mut matched, &layer_order);
    }

    let inline_entries: Vec<DeclarationEntry> = source
        .inline_style_text()
        .map(|text| parse_declarations(&text))
        .unwrap_or_default();
    if matched.is_empty() && inline_entries.is_empty() {
        return None;
    }

    if let Some(inline_rule) = build_inline_rule(&inline_entries) {
        matched.push(Rc::new(inline_rule));
    }

    let active = filter_by_env(&matched, &env);
    let cascade = compute_styles(&active, options);
    let variables = resolve_rule_variables(&active, source);

    Some(InspectionSnapshot {
        env,
        rules: matched,
        layer_order,
        inline_entries,
        cascade,
        variables,
    })
}

/// Depth-first rule collection state for one pass
struct Collector<'src> {
    source: &'src dyn DocumentSource,
    cache: SerializeCache,
    matched: Vec<Rc<StyleRule>>,
    layer_names: Vec<String>,
    seen_layers: FxHashSet<String>,
}

impl<'src> Collector<'src> {
    fn new(source: &'src dyn DocumentSource) -> Self {
        Self {
            source,
            cache: SerializeCache::new(),
            matched: Vec::new(),
            layer_names: Vec::new(),
            seen_layers: FxHashSet::default(),
        }
    }

    /// Collect matching rules and layer declarations from one rule list
    fn collect(
        &mut self,
        raws: &[RawRule],
        parent: Option<Rc<AncestorRule>>,
        sheet_source: &RuleSource,
    ) {
        for raw in raws {
            match classify(raw) {
                RuleKind::Style => {
                    let selector = raw.selector_text.as_deref().unwrap_or("");
                    if self.source.selector_matches(selector) {
                        if let Some(rule) =
                            serialize_style_rule(raw, parent.clone(), sheet_source)
                        {
                            self.matched.push(Rc::new(rule));
                        }
                    }
                }
                RuleKind::Media | RuleKind::LayerBlock => {
                    if let Some(node) = serialize_ancestor(raw, parent.clone(), &mut self.cache) {
                        if matches!(node.as_ref(), AncestorRule::Layer { .. }) {
                            self.record_layer(full_layer_name(&node));
                        }
                        self.collect(&raw.children, Some(node), sheet_source);
                    }
                }
                RuleKind::LayerStatement => {
                    let prefix = parent
                        .as_deref()
                        .map(full_layer_name)
                        .unwrap_or_default();
                    if let Some(names) = &raw.statement_names {
                        for name in names {
                            self.record_layer(qualify_layer(&prefix, name));
                        }
                    }
                }
                RuleKind::Unknown => {
                    log::debug!("skipping unsupported rule kind (id {})", raw.id);
                }
            }
        }
    }

    fn record_layer(&mut self, name: String) {
        if name.is_empty() {
            return;
        }
        if self.seen_layers.insert(name.clone()) {
            self.layer_names.push(name);
        }
    }
}

/// Qualify a declared layer name against the enclosing layer prefix
fn qualify_layer(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

/// Stable sort by discovered layer order; unlayered rules sort first
fn sort_by_layer_order(matched: &mut [Rc<StyleRule>], layer_order: &[String]) {
    matched.sort_by_key(|rule| {
        let name = rule.layer_name();
        if name.is_empty() {
            -1
        } else {
            layer_order
                .iter()
                .position(|layer| *layer == name)
                .map_or(i64::MAX, |index| index as i64)
        }
    });
}

/// The `style` attribute rendered as a rule, enabled declarations only
fn build_inline_rule(entries: &[DeclarationEntry]) -> Option<StyleRule> {
    let declarations: Vec<Declaration> = entries
        .iter()
        .filter(|entry| !entry.commented)
        .map(|entry| {
            let important = entry.value.ends_with("!important");
            Declaration::new(entry.property.clone(), entry.value.clone(), important)
        })
        .collect();
    if declarations.is_empty() {
        return None;
    }
    Some(StyleRule::new(
        INLINE_SELECTOR,
        declarations,
        RuleSource::Inline,
    ))
}

/// Resolve every custom property referenced by the active rules
fn resolve_rule_variables(
    rules: &[Rc<StyleRule>],
    source: &dyn DocumentSource,
) -> FxHashMap<String, String> {
    let lookup = |name: &str| source.computed_value(name);
    let mut variables: FxHashMap<String, String> = FxHashMap::default();
    for rule in rules {
        for decl in &rule.declarations {
            for reference in find_var_references(&decl.value) {
                let (name, _) = extract_variable_name(&reference);
                if name.is_empty() || variables.contains_key(&name) {
                    continue;
                }
                let mut seen = FxHashSet::default();
                let resolved = resolve_variable(&reference, &lookup, &mut seen);
                variables.insert(name, resolved);
            }
        }
    }
    variables
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{SheetHandle, SourceError};
    use stylelens_media::Environment;
    use stylelens_rules::RawDeclaration;

    /// In-memory document source: `None` sheet bodies are inaccessible
    struct MockDocument {
        sheets: Vec<(RuleSource, Option<Vec<RawRule>>)>,
        matching: Vec<&'static str>,
        computed: Vec<(&'static str, &'static str)>,
        inline: Option<String>,
        env: Environment,
    }

    impl MockDocument {
        fn new() -> Self {
            Self {
                sheets: Vec::new(),
                matching: Vec::new(),
                computed: Vec::new(),
                inline: None,
                env: Environment::new(800.0, 600.0),
            }
        }

        fn with_sheet(mut self, source: RuleSource, rules: Vec<RawRule>) -> Self {
            self.sheets.push((source, Some(rules)));
            self
        }

        fn with_inaccessible_sheet(mut self, source: RuleSource) -> Self {
            self.sheets.push((source, None));
            self
        }

        fn matching(mut self, selectors: &[&'static str]) -> Self {
            self.matching = selectors.to_vec();
            self
        }
    }

    impl DocumentSource for MockDocument {
        fn style_sheets(&self) -> Vec<SheetHandle> {
            (0..self.sheets.len()).map(SheetHandle).collect()
        }

        fn sheet_source(&self, sheet: SheetHandle) -> RuleSource {
            self.sheets[sheet.0].0.clone()
        }

        fn sheet_rules(&self, sheet: SheetHandle) -> Result<Vec<RawRule>, SourceError> {
            self.sheets[sheet.0]
                .1
                .clone()
                .ok_or(SourceError::Inaccessible)
        }

        fn selector_matches(&self, selector: &str) -> bool {
            self.matching.iter().any(|known| *known == selector)
        }

        fn computed_value(&self, property: &str) -> Option<String> {
            self.computed
                .iter()
                .find(|(name, _)| *name == property)
                .map(|(_, value)| value.to_string())
        }

        fn inline_style_text(&self) -> Option<String> {
            self.inline.clone()
        }

        fn environment(&self) -> Environment {
            self.env
        }
    }

    fn decl(property: &str, value: &str) -> RawDeclaration {
        RawDeclaration::new(property, value, false)
    }

    #[test]
    fn test_collects_matching_rules_only() {
        let doc = MockDocument::new()
            .with_sheet(
                RuleSource::StyleTag,
                vec![
                    RawRule::style(1, ".a", vec![decl("color", "red")]),
                    RawRule::style(2, ".other", vec![decl("color", "blue")]),
                ],
            )
            .matching(&[".a"]);
        let snapshot = inspect(&doc, &ComputeOptions::default()).unwrap();
        assert_eq!(snapshot.rules.len(), 1);
        assert_eq!(snapshot.rules[0].selector, ".a");
        assert_eq!(
            snapshot.cascade.styles.get("color").map(String::as_str),
            Some("red")
        );
    }

    #[test]
    fn test_no_matches_yields_none() {
        let doc = MockDocument::new()
            .with_sheet(
                RuleSource::StyleTag,
                vec![RawRule::style(1, ".other", vec![decl("color", "blue")])],
            )
            .matching(&[".a"]);
        assert!(inspect(&doc, &ComputeOptions::default()).is_none());
    }

    #[test]
    fn test_inaccessible_sheet_skipped() {
        let doc = MockDocument::new()
            .with_inaccessible_sheet(RuleSource::Sheet("https://cdn.example/x.css".into()))
            .with_sheet(
                RuleSource::StyleTag,
                vec![RawRule::style(1, ".a", vec![decl("color", "red")])],
            )
            .matching(&[".a"]);
        let snapshot = inspect(&doc, &ComputeOptions::default()).unwrap();
        assert_eq!(snapshot.rules.len(), 1);
    }

    #[test]
    fn test_media_and_layer_context_attached() {
        let doc = MockDocument::new()
            .with_sheet(
                RuleSource::StyleTag,
                vec![RawRule::layer(
                    1,
                    "theme",
                    vec![RawRule::media(
                        2,
                        "(min-width: 600px)",
                        vec![RawRule::style(3, ".a", vec![decl("color", "red")])],
                    )],
                )],
            )
            .matching(&[".a"]);
        let snapshot = inspect(&doc, &ComputeOptions::default()).unwrap();
        let rule = &snapshot.rules[0];
        assert_eq!(rule.layer_name(), "theme");
        assert_eq!(rule.media_text(), "(min-width: 600px)");
        assert_eq!(snapshot.layer_order, vec!["theme"]);
    }

    #[test]
    fn test_inactive_media_rule_kept_but_not_winning() {
        // viewport is 800px wide; the narrow rule is inactive
        let doc = MockDocument::new()
            .with_sheet(
                RuleSource::StyleTag,
                vec![
                    RawRule::style(1, ".a", vec![decl("color", "red")]),
                    RawRule::media(
                        2,
                        "(max-width: 400px)",
                        vec![RawRule::style(3, ".a", vec![decl("color", "blue")])],
                    ),
                ],
            )
            .matching(&[".a"]);
        let snapshot = inspect(&doc, &ComputeOptions::default()).unwrap();
        assert_eq!(snapshot.rules.len(), 2);
        assert_eq!(
            snapshot.cascade.styles.get("color").map(String::as_str),
            Some("red")
        );
    }

    #[test]
    fn test_layer_statement_and_sorting() {
        // @layer base, theme; then rules in theme, base, and unlayered
        let doc = MockDocument::new()
            .with_sheet(
                RuleSource::StyleTag,
                vec![
                    RawRule::layer_statement(1, &["base", "theme"]),
                    RawRule::layer(
                        2,
                        "theme",
                        vec![RawRule::style(3, ".a", vec![decl("color", "purple")])],
                    ),
                    RawRule::layer(
                        4,
                        "base",
                        vec![RawRule::style(5, ".a", vec![decl("color", "gray")])],
                    ),
                    RawRule::style(6, ".a", vec![decl("color", "red")]),
                ],
            )
            .matching(&[".a"]);
        let snapshot = inspect(&doc, &ComputeOptions::default()).unwrap();
        assert_eq!(snapshot.layer_order, vec!["base", "theme"]);
        // unlayered first, then base, then theme
        let layers: Vec<String> = snapshot
            .rules
            .iter()
            .map(|rule| rule.layer_name())
            .collect();
        assert_eq!(layers, vec!["", "base", "theme"]);
    }

    #[test]
    fn test_nested_layer_discovery_reordered() {
        let doc = MockDocument::new()
            .with_sheet(
                RuleSource::StyleTag,
                vec![
                    RawRule::layer(
                        1,
                        "a",
                        vec![RawRule::layer_statement(2, &["b"])],
                    ),
                    RawRule::style(3, ".x", vec![decl("color", "red")]),
                ],
            )
            .matching(&[".x"]);
        let snapshot = inspect(&doc, &ComputeOptions::default()).unwrap();
        // a.b is declared inside a, so it hoists immediately before a
        assert_eq!(snapshot.layer_order, vec!["a.b", "a"]);
    }

    #[test]
    fn test_inline_style_wins_cascade() {
        let doc = {
            let mut doc = MockDocument::new()
                .with_sheet(
                    RuleSource::StyleTag,
                    vec![RawRule::style(1, ".a", vec![decl("color", "red")])],
                )
                .matching(&[".a"]);
            doc.inline = Some("color: green; /* margin: 0 */".to_string());
            doc
        };
        let snapshot = inspect(&doc, &ComputeOptions::default()).unwrap();
        assert_eq!(
            snapshot.cascade.styles.get("color").map(String::as_str),
            Some("green")
        );
        // disabled declarations stay out of the cascade but in the entries
        assert!(!snapshot.cascade.styles.contains_key("margin"));
        assert_eq!(snapshot.inline_entries.len(), 2);
        assert!(snapshot.inline_entries[1].commented);
        let inline_rule = snapshot.rules.last().unwrap();
        assert_eq!(inline_rule.selector, INLINE_SELECTOR);
        assert_eq!(inline_rule.source, RuleSource::Inline);
    }

    #[test]
    fn test_variables_resolved_through_fallbacks() {
        let doc = {
            let mut doc = MockDocument::new()
                .with_sheet(
                    RuleSource::StyleTag,
                    vec![RawRule::style(
                        1,
                        ".a",
                        vec![
                            decl("color", "var(--accent)"),
                            decl("background", "var(--missing, white)"),
                        ],
                    )],
                )
                .matching(&[".a"]);
            doc.computed = vec![("--accent", "#f00")];
            doc
        };
        let snapshot = inspect(&doc, &ComputeOptions::default()).unwrap();
        assert_eq!(
            snapshot.variables.get("--accent").map(String::as_str),
            Some("#f00")
        );
        assert_eq!(
            snapshot.variables.get("--missing").map(String::as_str),
            Some("white")
        );
    }

    #[test]
    fn test_snapshot_serializes() {
        let doc = MockDocument::new()
            .with_sheet(
                RuleSource::StyleTag,
                vec![RawRule::media(
                    1,
                    "(min-width: 600px)",
                    vec![RawRule::style(2, ".a", vec![decl("color", "red")])],
                )],
            )
            .matching(&[".a"]);
        let snapshot = inspect(&doc, &ComputeOptions::default()).unwrap();
        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("(min-width: 600px)"));
        assert!(json.contains("\"color\""));
    }
}
