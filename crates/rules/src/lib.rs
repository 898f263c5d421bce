//! Stylelens Rule Model
//!
//! Tagged rule representation, raw-rule classification and serialization,
//! and cascade-layer naming/ordering.

pub mod layers;
pub mod model;
pub mod raw;
pub mod serialize;

pub use layers::{full_layer_name, reorder_nested_layers};
pub use model::{AncestorRule, Declaration, RuleSource, StyleRule};
pub use raw::{classify, RawDeclaration, RawRule, RuleKind};
pub use serialize::{serialize_ancestor, serialize_style_rule, SerializeCache};
