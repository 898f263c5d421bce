//! Document Source Boundary
//!
//! The black-box CSSOM/DOM interface the orchestrator reads from. The
//! browser side hands over raw rule records and a native selector-matching
//! primitive; nothing here owns live DOM objects.

use thiserror::Error;

use stylelens_media::Environment;
use stylelens_rules::{RawRule, RuleSource};

/// Opaque handle to one style sheet of the inspected document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SheetHandle(pub usize);

/// Errors reading from the document source
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Style sheet is not accessible (cross-origin)")]
    Inaccessible,

    #[error("Style sheet is detached from the document")]
    Detached,
}

/// Read access to the inspected element's document
///
/// Implementations cover the live browser document as well as same-origin
/// iframes and shadow roots; the orchestrator only sees the flattened
/// sheet list in document order.
pub trait DocumentSource {
    /// Reachable style sheets, in document order
    fn style_sheets(&self) -> Vec<SheetHandle>;

    /// Origin descriptor for a sheet
    fn sheet_source(&self, sheet: SheetHandle) -> RuleSource;

    /// Top-level rules of a sheet
    ///
    /// Cross-origin sheets report [`SourceError::Inaccessible`]; the
    /// orchestrator skips them and continues with partial results.
    fn sheet_rules(&self, sheet: SheetHandle) -> Result<Vec<RawRule>, SourceError>;

    /// Whether the inspected element matches a selector (native primitive)
    fn selector_matches(&self, selector: &str) -> bool;

    /// Computed value of a property on the inspected element
    fn computed_value(&self, property: &str) -> Option<String>;

    /// Raw text of the element's `style` attribute, if present
    fn inline_style_text(&self) -> Option<String>;

    /// Viewport/device snapshot for media evaluation
    fn environment(&self) -> Environment;
}
