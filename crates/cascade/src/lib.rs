//! Stylelens Cascade
//!
//! Environment-based rule filtering, cascade aggregation, and
//! longhand/shorthand compaction for the inspector's property list.

pub mod compact;
pub mod compute;
pub mod filter;

pub use compact::{compact_css, Compaction};
pub use compute::{
    compute_styles, CascadeResult, ComputeOptions, StyleRuleWithProp, NO_LAYER, NO_MEDIA,
};
pub use filter::{filter_by_env, is_rule_applied};
