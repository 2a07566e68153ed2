//! Style aggregation across a component tree.
//!
//! Walks the (already cloned) tree, turning every node-level `css` binding
//! into a stylesheet rule under a generated class name. The class name is
//! appended to the node's `class` property so the emitted markup picks it
//! up; the binding itself stays in place and is skipped by the node
//! compiler.

use crate::case::dash_case;
use crate::component::{Component, Node, CSS_BINDING};

/// Aggregate all node-level CSS in `component` into one stylesheet string.
///
/// Returns an empty string when no node carries CSS. Rules appear in
/// traversal order, joined with blank lines. The CSS text is spliced
/// verbatim; binding values are trusted source text.
pub fn collect_css(component: &mut Component) -> String {
    let mut rules = Vec::new();
    let mut seq = 0usize;
    for child in &mut component.children {
        collect_node_css(child, &mut rules, &mut seq);
    }
    rules.join("\n\n")
}

fn collect_node_css(node: &mut Node, rules: &mut Vec<String>, seq: &mut usize) {
    if let Some(css) = node.bindings.get(CSS_BINDING) {
        let css = css.trim();
        if !css.is_empty() {
            let class_name = format!("{}-styles-{}", dash_case(&node.name), seq);
            *seq += 1;
            rules.push(format!(".{} {{\n  {}\n}}", class_name, css));
            match node.properties.get_mut("class") {
                Some(existing) => {
                    existing.push(' ');
                    existing.push_str(&class_name);
                }
                None => {
                    node.properties.insert("class".to_string(), class_name);
                }
            }
        }
    }
    for child in &mut node.children {
        collect_node_css(child, rules, seq);
    }
}
