//! Raw Rule Records
//!
//! Loosely-typed rule records as handed over by the CSSOM boundary, and
//! their classification into the tagged rule kinds.

/// A raw declaration as read from a native declaration block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDeclaration {
    /// Property name
    pub property: String,
    /// Value text; may be empty when the property is not actually set
    pub value: String,
    /// Whether !important was specified
    pub important: bool,
}

impl RawDeclaration {
    /// Create a raw declaration
    pub fn new(property: impl Into<String>, value: impl Into<String>, important: bool) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
            important,
        }
    }
}

/// A rule record as read from the CSSOM boundary
///
/// Native rule objects may originate from a different realm (for example an
/// iframe's global), so nothing here relies on nominal identity: the record
/// is a plain bag of optional capabilities, and [`classify`] decides the
/// kind from which fields are populated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRule {
    /// Identity of the native rule within one inspection pass
    pub id: u64,
    /// Selector text (style rules)
    pub selector_text: Option<String>,
    /// Condition text (@media rules)
    pub condition_text: Option<String>,
    /// Block name (@layer blocks; empty string for anonymous layers)
    pub layer_name: Option<String>,
    /// Declared names (@layer statements)
    pub statement_names: Option<Vec<String>>,
    /// Declaration block (style rules)
    pub declarations: Vec<RawDeclaration>,
    /// Nested rules (@media and @layer blocks)
    pub children: Vec<RawRule>,
}

impl RawRule {
    /// A style rule record
    pub fn style(id: u64, selector: &str, declarations: Vec<RawDeclaration>) -> Self {
        Self {
            id,
            selector_text: Some(selector.to_string()),
            declarations,
            ..Self::default()
        }
    }

    /// An @media block record
    pub fn media(id: u64, condition: &str, children: Vec<RawRule>) -> Self {
        Self {
            id,
            condition_text: Some(condition.to_string()),
            children,
            ..Self::default()
        }
    }

    /// An @layer block record
    pub fn layer(id: u64, name: &str, children: Vec<RawRule>) -> Self {
        Self {
            id,
            layer_name: Some(name.to_string()),
            children,
            ..Self::default()
        }
    }

    /// An @layer statement record (`@layer a, b.c;`)
    pub fn layer_statement(id: u64, names: &[&str]) -> Self {
        Self {
            id,
            statement_names: Some(names.iter().map(|name| name.to_string()).collect()),
            ..Self::default()
        }
    }
}

/// Classified rule kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// A style rule (selector { declarations })
    Style,
    /// An @media block
    Media,
    /// An @layer block with nested rules
    LayerBlock,
    /// An @layer statement declaring names only
    LayerStatement,
    /// Anything else (@supports, @font-face, ...)
    Unknown,
}

/// Classify a raw rule record by structural predicates, in priority order:
/// style, media, layer block, layer statement, unknown.
pub fn classify(raw: &RawRule) -> RuleKind {
    if raw.selector_text.is_some() {
        RuleKind::Style
    } else if raw.condition_text.is_some() {
        RuleKind::Media
    } else if raw.layer_name.is_some() {
        RuleKind::LayerBlock
    } else if raw.statement_names.is_some() {
        RuleKind::LayerStatement
    } else {
        RuleKind::Unknown
    }
}
