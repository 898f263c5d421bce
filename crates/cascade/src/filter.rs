//! Environment-Based Rule Filtering
//!
//! Decides whether a rule nested in `@media` wrappers is currently active.
//! Layers never gate activation; they only affect cascade order.

use std::rc::Rc;

use stylelens_media::{media_matches, Environment};
use stylelens_rules::{AncestorRule, StyleRule};

/// Whether a rule is active under the given environment.
///
/// A rule with no enclosing grouping rules is always active. Every `@media`
/// ancestor must match the environment; `@layer` ancestors are skipped.
pub fn is_rule_applied(rule: &StyleRule, env: &Environment) -> bool {
    let mut current = rule.parent.as_deref();
    while let Some(ancestor) = current {
        if let AncestorRule::Media { query, .. } = ancestor {
            if !media_matches(query, env) {
                return false;
            }
        }
        current = ancestor.parent().map(Rc::as_ref);
    }
    true
}

/// Order-preserving subsequence of the rules active under `env`
pub fn filter_by_env(rules: &[Rc<StyleRule>], env: &Environment) -> Vec<Rc<StyleRule>> {
    rules
        .iter()
        .filter(|rule| is_rule_applied(rule, env))
        .map(Rc::clone)
        .collect()
}
