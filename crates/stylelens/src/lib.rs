//! Stylelens
//!
//! Core of a devtools style inspector: reconstructs which CSS rules apply
//! to a DOM element across style sheets, `@media` queries, `@layer` blocks,
//! and inline styles, and supports declaration-level editing of inline
//! style text.
//!
//! The editing surface consumed by the presentation layer lives here:
//! parsing and index-addressed mutation of inline-style text, cascade
//! aggregation and compaction, layer ordering, and environment-based rule
//! activation.

pub use stylelens_cascade::{
    compact_css, compute_styles, filter_by_env, is_rule_applied, CascadeResult, Compaction,
    ComputeOptions, StyleRuleWithProp, NO_LAYER, NO_MEDIA,
};
pub use stylelens_inline::{
    build_updated_text, parse_declarations, remove_declaration_at, DeclarationEntry, EditMode,
};
pub use stylelens_inspect::{
    extract_variable_name, find_var_references, inspect, resolve_variable, DocumentSource,
    InspectionSnapshot, SheetHandle, SourceError,
};
pub use stylelens_media::{media_matches, Environment, MediaQueryList};
pub use stylelens_rules::{
    classify, full_layer_name, reorder_nested_layers, serialize_ancestor, serialize_style_rule,
    AncestorRule, Declaration, RawDeclaration, RawRule, RuleKind, RuleSource, SerializeCache,
    StyleRule,
};
