//! Rule Model
//!
//! Immutable rule representation used by the cascade and the inspector.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Where a rule came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleSource {
    /// An external style sheet, identified by URL
    Sheet(String),
    /// An inline `<style>` tag
    StyleTag,
    /// The element's own `style` attribute
    Inline,
}

impl fmt::Display for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sheet(url) => write!(f, "{}", url),
            Self::StyleTag => write!(f, "<style> tag"),
            Self::Inline => write!(f, "inline style attribute"),
        }
    }
}

/// A grouping rule that may enclose a style rule
///
/// Parent chains contain only media and layer nodes and terminate at `None`;
/// the chain is built bottom-up from finalized nodes, so it is acyclic by
/// construction. Shared ancestors are the same `Rc` node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AncestorRule {
    /// An `@media` block with its raw query text
    Media {
        query: String,
        parent: Option<Rc<AncestorRule>>,
    },
    /// An `@layer` block with its own (unqualified) name
    Layer {
        name: String,
        parent: Option<Rc<AncestorRule>>,
    },
}

impl AncestorRule {
    /// The syntactically enclosing grouping rule, if any
    pub fn parent(&self) -> Option<&Rc<AncestorRule>> {
        match self {
            Self::Media { parent, .. } | Self::Layer { parent, .. } => parent.as_ref(),
        }
    }
}

/// A CSS declaration (property: value)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// Property name (hyphenated source form)
    pub property: String,
    /// Value as an opaque string; carries a trailing ` !important` when set
    pub value: String,
    /// Whether !important was specified
    pub important: bool,
}

impl Declaration {
    /// Create a declaration, appending the priority suffix to the value
    pub fn new(property: impl Into<String>, value: impl Into<String>, important: bool) -> Self {
        let mut value = value.into();
        if important && !value.ends_with("!important") {
            value.push_str(" !important");
        }
        Self {
            property: property.into(),
            value,
            important,
        }
    }
}

/// A style rule matched against the inspected element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRule {
    /// Selector text
    pub selector: String,
    /// Declarations in source order
    pub declarations: Vec<Declaration>,
    /// Origin descriptor
    pub source: RuleSource,
    /// Enclosing media/layer chain, innermost first
    pub parent: Option<Rc<AncestorRule>>,
}

impl StyleRule {
    /// Create a rule with no enclosing media/layer context
    pub fn new(selector: impl Into<String>, declarations: Vec<Declaration>, source: RuleSource) -> Self {
        Self {
            selector: selector.into(),
            declarations,
            source,
            parent: None,
        }
    }

    /// Look up the value declared for a property, if any
    pub fn property_value(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .find(|decl| decl.property == property)
            .map(|decl| decl.value.as_str())
    }

    /// Full dot-qualified layer name, empty when the rule is unlayered
    pub fn layer_name(&self) -> String {
        let mut names: SmallVec<[&str; 4]> = SmallVec::new();
        let mut current = self.parent.as_deref();
        while let Some(ancestor) = current {
            if let AncestorRule::Layer { name, .. } = ancestor {
                names.push(name.as_str());
            }
            current = ancestor.parent().map(Rc::as_ref);
        }
        names.reverse();
        names.join(".")
    }

    /// Enclosing media query text, outermost first, empty when unconditioned
    pub fn media_text(&self) -> String {
        let mut queries: SmallVec<[&str; 4]> = SmallVec::new();
        let mut current = self.parent.as_deref();
        while let Some(ancestor) = current {
            if let AncestorRule::Media { query, .. } = ancestor {
                queries.push(query.as_str());
            }
            current = ancestor.parent().map(Rc::as_ref);
        }
        queries.reverse();
        queries.join(" and ")
    }
}
