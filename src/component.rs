//! Component data model.
//!
//! A component is a tree of [`Node`]s plus a component-level reactive state
//! map. Trees usually arrive as JSON, so the types deserialize with every
//! field defaulted: a missing `bindings` map is an empty map, not an error.
//! Ordered maps keep attribute emission deterministic; child order is
//! rendering order.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reserved key holding literal text content (in `properties`) or a
/// text-content expression (in `bindings`).
pub const TEXT_KEY: &str = "_text";
/// Reserved binding key holding the iteration collection expression.
pub const FOR_EACH_BINDING: &str = "each";
/// Reserved binding key holding the iteration element name.
pub const FOR_NAME_BINDING: &str = "_forName";
/// Reserved binding key holding the visibility condition expression.
pub const SHOW_WHEN_BINDING: &str = "when";
/// Reserved binding key marking an attribute spread (unsupported).
pub const SPREAD_BINDING: &str = "_spread";
/// Reserved binding key marking an element reference.
pub const REF_BINDING: &str = "ref";
/// Reserved binding key carrying per-node CSS.
pub const CSS_BINDING: &str = "css";

/// Tag name of the wrapperless fragment marker.
pub const FRAGMENT_TAG: &str = "Fragment";
/// Tag name of the iteration construct.
pub const FOR_TAG: &str = "For";
/// Tag name of the conditional-visibility construct.
pub const SHOW_TAG: &str = "Show";

/// One node of a component tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Node {
    /// Tag name: a markup element, a component, or one of the reserved
    /// construct names ([`FRAGMENT_TAG`], [`FOR_TAG`], [`SHOW_TAG`]).
    pub name: String,
    /// Static attributes, emitted literally as `key="value"`.
    pub properties: BTreeMap<String, String>,
    /// Dynamic attribute/event bindings: name → source expression text.
    pub bindings: BTreeMap<String, String>,
    /// Child nodes in rendering order.
    pub children: Vec<Node>,
}

/// A component: reactive state plus the top-level node tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Component {
    /// State key → literal initial value.
    pub state: BTreeMap<String, serde_json::Value>,
    /// Top-level nodes in rendering order.
    pub children: Vec<Node>,
}

/// The closed set of shapes a node can compile as.
///
/// Classification is mutually exclusive and checked in a fixed precedence
/// order: the fragment marker wins over everything, literal text wins over
/// dynamic text, and the structural constructs are recognized by tag name
/// before falling through to the generic element case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind<'a> {
    /// Wrapperless marker: children render newline-joined, no element.
    Fragment,
    /// Pure literal text leaf, rendered verbatim.
    StaticText(&'a str),
    /// Text content driven by an expression; renders a placeholder element.
    DynamicText(&'a str),
    /// Iteration construct; renders an inert template wrapper.
    For { item: &'a str, each: &'a str },
    /// Conditional-visibility construct.
    Show { when: &'a str },
    /// Any other tag: a generic markup element.
    Element,
}

impl Node {
    /// Classify this node. See [`NodeKind`] for the precedence rules.
    pub fn kind(&self) -> NodeKind<'_> {
        if self.name == FRAGMENT_TAG {
            return NodeKind::Fragment;
        }
        if let Some(text) = self.properties.get(TEXT_KEY) {
            return NodeKind::StaticText(text);
        }
        if let Some(expr) = self.bindings.get(TEXT_KEY) {
            return NodeKind::DynamicText(expr);
        }
        match self.name.as_str() {
            FOR_TAG => NodeKind::For {
                item: self.binding_or_undefined(FOR_NAME_BINDING),
                each: self.binding_or_undefined(FOR_EACH_BINDING),
            },
            SHOW_TAG => NodeKind::Show {
                when: self.binding_or_undefined(SHOW_WHEN_BINDING),
            },
            _ => NodeKind::Element,
        }
    }

    // A missing structural binding renders as the literal text `undefined`,
    // which keeps the generated attribute/script text valid.
    fn binding_or_undefined(&self, key: &str) -> &str {
        self.bindings.get(key).map(String::as_str).unwrap_or("undefined")
    }
}

/// Components are distinguished from plain markup elements by an uppercase
/// first letter in the tag name.
pub fn is_component(node: &Node) -> bool {
    node.name
        .chars()
        .next()
        .map(|c| c.is_uppercase())
        .unwrap_or(false)
}
