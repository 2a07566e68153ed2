//! Node-to-markup compiler.
//!
//! The recursive core: one pass over the node tree producing the markup
//! string while threading a [`CompileContext`] that accumulates per-node
//! update code and free-standing event-handler functions, from which the
//! runtime script is later synthesized. Every dynamic binding is
//! correlated with its rendered element through a `data-uid` attribute
//! whose value the update script uses as a document query.

use lazy_static::lazy_static;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

use crate::case::{camel_case, dash_case};
use crate::component::{is_component, Node, NodeKind, CSS_BINDING, REF_BINDING, SPREAD_BINDING};

/// Attribute correlating an emitted element with its update code.
pub const CORRELATION_ATTR: &str = "data-uid";

lazy_static! {
    /// Tag names that close with ` />` and never render children.
    pub static ref SELF_CLOSING_TAGS: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("area");
        s.insert("base");
        s.insert("br");
        s.insert("col");
        s.insert("embed");
        s.insert("hr");
        s.insert("img");
        s.insert("input");
        s.insert("link");
        s.insert("meta");
        s.insert("param");
        s.insert("source");
        s.insert("track");
        s.insert("wbr");
        s
    };
}

/// Update-code registry: node identifier → accumulated update code.
///
/// Entries are created lazily on first [`append`](Self::append) and only
/// ever appended to, never overwritten. Iteration order is key insertion
/// order, which the script synthesizer relies on.
#[derive(Debug, Default)]
pub struct UpdateJsRegistry {
    entries: Vec<(String, String)>,
}

impl UpdateJsRegistry {
    /// Concatenate `code` onto the entry for `id`, creating it if absent.
    pub fn append(&mut self, id: &str, code: &str) {
        match self.entries.iter_mut().find(|(key, _)| key == id) {
            Some((_, existing)) => existing.push_str(code),
            None => self.entries.push((id.to_string(), code.to_string())),
        }
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(id, code)| (id.as_str(), code.as_str()))
    }

    /// Accumulated code for `id`, if an entry exists.
    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, code)| code.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Mutable compilation state threaded through one top-level compile call.
///
/// Exclusively owned by that call; siblings and descendants share it via
/// `&mut`, so the registry observes nodes in traversal order.
#[derive(Debug, Default)]
pub struct CompileContext {
    /// Update-code registry keyed by correlation identifier.
    pub update_js: UpdateJsRegistry,
    /// Free-standing function declarations, appended as event bindings are
    /// compiled and spliced verbatim into the runtime script.
    pub js: String,
    id_seq: u64,
}

impl CompileContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the correlation identifier for a node named `name`.
    ///
    /// Dash-cased tag plus a short digest over the tag and the allocation
    /// sequence number. The sequence number makes the identifier unique
    /// within one compilation; hashing instead of a raw counter keeps the
    /// suffix opaque while staying deterministic, so the same tree always
    /// compiles to the same document.
    fn next_id(&mut self, name: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        hasher.update(self.id_seq.to_be_bytes());
        self.id_seq += 1;
        let digest = format!("{:x}", hasher.finalize());
        format!("{}-{}", dash_case(name), &digest[..6])
    }
}

/// Compile one node to its markup fragment.
///
/// Side effects on `ctx`: update code registered under the node's
/// correlation identifier, and free-standing handler functions appended for
/// event bindings. Static subtrees leave `ctx` untouched.
pub fn node_to_html(node: &Node, ctx: &mut CompileContext) -> String {
    match node.kind() {
        NodeKind::Fragment => children_to_html(&node.children, ctx),
        NodeKind::StaticText(text) => text.to_string(),
        NodeKind::DynamicText(expr) => {
            let id = ctx.next_id(&node.name);
            ctx.update_js
                .append(&id, &format!("el.innerText = {};\n", expr));
            format!("<span {}=\"{}\"></span>", CORRELATION_ATTR, id)
        }
        NodeKind::For { item, each } => format!(
            "<template data-for=\"{} in {}\">{}</template>",
            item,
            each,
            children_to_html(&node.children, ctx)
        ),
        NodeKind::Show { when } => {
            let id = ctx.next_id(&node.name);
            ctx.update_js.append(
                &id,
                &format!("el.style.display = {} ? 'inline' : 'none';\n", when),
            );
            format!(
                "<span {}=\"{}\">{}</span>",
                CORRELATION_ATTR,
                id,
                children_to_html(&node.children, ctx)
            )
        }
        NodeKind::Element => element_to_html(node, ctx),
    }
}

fn children_to_html(children: &[Node], ctx: &mut CompileContext) -> String {
    children
        .iter()
        .map(|child| node_to_html(child, ctx))
        .collect::<Vec<_>>()
        .join("\n")
}

fn element_to_html(node: &Node, ctx: &mut CompileContext) -> String {
    let mut out = String::new();
    out.push('<');
    out.push_str(&node.name);

    // Only nodes with dynamic bindings get a correlation identifier;
    // fully static elements stay anonymous.
    if !node.bindings.is_empty() {
        let id = ctx.next_id(&node.name);
        out.push_str(&format!(" {}=\"{}\"", CORRELATION_ATTR, id));
        compile_bindings(node, &id, ctx);
    }

    for (key, value) in &node.properties {
        out.push_str(&format!(" {}=\"{}\"", key, value));
    }

    if SELF_CLOSING_TAGS.contains(node.name.as_str()) {
        out.push_str(" />");
        return out;
    }

    out.push('>');
    out.push_str(&children_to_html(&node.children, ctx));
    out.push_str(&format!("</{}>", node.name));
    out
}

/// Classify and register every dynamic binding of a generic element.
fn compile_bindings(node: &Node, id: &str, ctx: &mut CompileContext) {
    for (key, value) in &node.bindings {
        if key == SPREAD_BINDING || key == REF_BINDING || key == CSS_BINDING {
            continue;
        }

        if let Some(event) = key.strip_prefix("on") {
            let mut event = event.to_lowercase();
            // `change` on a plain element resolves to the native `input`
            // event; components keep their declared event name.
            if !is_component(node) && event == "change" {
                event = "input".to_string();
            }
            let fn_name = camel_case(&format!("on-{}-{}", id, event));
            ctx.js.push_str(&format!(
                "\nfunction {}(event) {{\n  {}\n}}\n",
                fn_name, value
            ));
            // Remove-before-add keeps listener attachment idempotent
            // across repeated update-script runs.
            ctx.update_js.append(
                id,
                &format!(
                    "el.removeEventListener('{0}', {1});\nel.addEventListener('{0}', {1});\n",
                    event, fn_name
                ),
            );
        } else if key.contains('-') {
            ctx.update_js
                .append(id, &format!("el.setAttribute('{}', {});\n", key, value));
        } else {
            ctx.update_js
                .append(id, &format!("el.{} = {};\n", key, value));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::TEXT_KEY;
    use pretty_assertions::assert_eq;

    fn node(name: &str) -> Node {
        Node {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn registry_entries_initialize_lazily_and_append() {
        let mut registry = UpdateJsRegistry::default();
        registry.append("a", "");
        registry.append("b", "x");
        registry.append("a", "y");
        assert_eq!(registry.get("a"), Some("y"));
        assert_eq!(registry.len(), 2);
        let order: Vec<&str> = registry.iter().map(|(id, _)| id).collect();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn nodes_without_bindings_stay_anonymous() {
        let mut div = node("div");
        div.properties
            .insert("class".to_string(), "card".to_string());
        let mut ctx = CompileContext::new();
        let html = node_to_html(&div, &mut ctx);
        assert_eq!(html, "<div class=\"card\"></div>");
        assert!(ctx.update_js.is_empty());
        assert!(ctx.js.is_empty());
    }

    #[test]
    fn dynamic_text_allocates_one_placeholder_and_entry() {
        let mut span = node("span");
        span.bindings
            .insert(TEXT_KEY.to_string(), "state.greeting".to_string());
        let mut ctx = CompileContext::new();
        let html = node_to_html(&span, &mut ctx);

        assert_eq!(ctx.update_js.len(), 1);
        let (id, code) = ctx.update_js.iter().next().unwrap();
        assert!(id.starts_with("span-"));
        assert_eq!(code, "el.innerText = state.greeting;\n");
        assert_eq!(html, format!("<span data-uid=\"{}\"></span>", id));
    }

    #[test]
    fn identifiers_are_deterministic_across_contexts() {
        let mut div = node("div");
        div.bindings
            .insert("onClick".to_string(), "go()".to_string());
        let mut first = CompileContext::new();
        let mut second = CompileContext::new();
        assert_eq!(
            node_to_html(&div, &mut first),
            node_to_html(&div, &mut second)
        );
    }

    #[test]
    fn event_bindings_synthesize_named_handlers() {
        let mut div = node("div");
        div.bindings
            .insert("onClick".to_string(), "doThing()".to_string());
        let mut ctx = CompileContext::new();
        node_to_html(&div, &mut ctx);

        let (id, code) = ctx.update_js.iter().next().unwrap();
        let fn_name = camel_case(&format!("on-{}-click", id));
        assert!(ctx.js.contains(&format!("function {}(event)", fn_name)));
        assert!(ctx.js.contains("doThing()"));
        assert!(code.contains(&format!("el.removeEventListener('click', {});", fn_name)));
        assert!(code.contains(&format!("el.addEventListener('click', {});", fn_name)));
    }

    #[test]
    fn event_names_lowercase_after_the_prefix() {
        let mut div = node("div");
        div.bindings
            .insert("onMouseOver".to_string(), "peek()".to_string());
        let mut ctx = CompileContext::new();
        node_to_html(&div, &mut ctx);
        let (_, code) = ctx.update_js.iter().next().unwrap();
        assert!(code.contains("addEventListener('mouseover'"));
    }

    #[test]
    fn self_closing_tags_terminate_after_attributes() {
        let br = node("br");
        let mut ctx = CompileContext::new();
        assert_eq!(node_to_html(&br, &mut ctx), "<br />");
    }
}
