//! Stylelens Inspector
//!
//! Ties the rule model, media evaluation, cascade computation, and the
//! inline-style codec together against an abstract document source, and
//! serializes a snapshot consumable by the presentation layer.

pub mod orchestrate;
pub mod snapshot;
pub mod source;
pub mod variables;

pub use orchestrate::inspect;
pub use snapshot::InspectionSnapshot;
pub use source::{DocumentSource, SheetHandle, SourceError};
pub use variables::{extract_variable_name, find_var_references, resolve_variable};
