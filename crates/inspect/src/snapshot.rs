//! Inspection Snapshot
//!
//! The serializable result of one inspection pass, shaped for the
//! devtools panel on the other side of the RPC boundary.

use std::rc::Rc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use stylelens_cascade::CascadeResult;
use stylelens_inline::DeclarationEntry;
use stylelens_media::Environment;
use stylelens_rules::StyleRule;

/// Everything the panel needs to render one inspected element
///
/// Built fresh per inspection; a stale snapshot is simply discarded when
/// the environment changes mid-flight.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionSnapshot {
    /// The environment the pass evaluated media queries against
    pub env: Environment,
    /// All matched rules in cascade order (layer-sorted, inline last)
    pub rules: Vec<Rc<StyleRule>>,
    /// Discovered layer names after nested-layer reordering
    pub layer_order: Vec<String>,
    /// Parsed entries of the element's `style` attribute
    pub inline_entries: Vec<DeclarationEntry>,
    /// Aggregated, compacted, grouped cascade over the active rules
    pub cascade: CascadeResult,
    /// Resolved values of custom properties referenced by matched rules
    pub variables: FxHashMap<String, String>,
}
