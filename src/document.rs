//! Component compiler: document assembly and runtime script synthesis.
//!
//! Orchestrates the node compiler over a component's top-level children and
//! assembles the final self-contained document: markup, an optional inline
//! `<style>` block, and, when the component declares state, an inline
//! `<script>` block wiring that state to the rendered elements.

use log::warn;
use serde_json::Value;
use std::collections::BTreeMap;

use crate::codegen::{node_to_html, CompileContext, UpdateJsRegistry, CORRELATION_ATTR};
use crate::component::Component;
use crate::format::format_markup;
use crate::styles::collect_css;

/// Options for [`component_to_html`].
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Run the cosmetic formatting pass over the final document.
    pub pretty: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// Compile `component` into a self-contained markup document.
///
/// The input tree is cloned up front and never mutated. Formatting
/// failures degrade to the unformatted document with a logged warning;
/// compilation itself cannot fail.
pub fn component_to_html(component: &Component, options: &CompileOptions) -> String {
    let mut json = component.clone();
    let has_state = !json.state.is_empty();
    let css = collect_css(&mut json);

    let mut ctx = CompileContext::new();
    let mut out = json
        .children
        .iter()
        .map(|child| node_to_html(child, &mut ctx))
        .collect::<Vec<_>>()
        .join("\n");

    if !css.trim().is_empty() {
        out.push_str(&format!("\n<style>\n{}\n</style>", css));
    }

    if has_state {
        out.push_str(&format!(
            "\n<script>\n{}\n</script>",
            render_runtime_script(&json.state, &ctx)
        ));
    }

    if options.pretty {
        match format_markup(&out) {
            Ok(formatted) => out = formatted,
            Err(err) => warn!(
                "skipping format pass, keeping output as emitted: {}\n{}",
                err, out
            ),
        }
    }

    out
}

/// Synthesize the reactive runtime script for a stateful component.
///
/// The script is self-contained: it declares every name it references and
/// is safe to inline next to the markup it targets through `data-uid`
/// queries. Structure is fixed: raw state literal, observer list and
/// write-intercepting proxy, change registration over the update registry,
/// one immediate observer run so initial bindings apply before any write,
/// the accumulated handler functions, and the dispatch declarations.
fn render_runtime_script(state: &BTreeMap<String, Value>, ctx: &CompileContext) -> String {
    format!(
        r#"var rawState = {state};

var observers = [];
var state = new Proxy(rawState, {{
  set(target, key, value, receiver) {{
    Reflect.set(target, key, value, receiver);
    runObservers(key, value, receiver);
  }},
}});

onChange(function () {{
{blocks}
}});
runObservers();
{js}
function runObservers(key, value, receiver) {{
  observers.forEach(function (cb) {{
    cb(key, value, receiver);
  }});
}}
function onChange(cb) {{
  observers.push(cb);
}}"#,
        state = state_object_literal(state),
        blocks = update_dispatch_blocks(&ctx.update_js),
        js = ctx.js,
    )
}

/// One correlated-query block per registry identifier with non-empty
/// accumulated code, in registry insertion order.
fn update_dispatch_blocks(registry: &UpdateJsRegistry) -> String {
    registry
        .iter()
        .filter(|(_, code)| !code.is_empty())
        .map(|(id, code)| {
            format!(
                "  document.querySelectorAll(\"[{}='{}']\").forEach(function (el) {{\n{}  }});",
                CORRELATION_ATTR,
                id,
                indent_lines(code, "    ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn indent_lines(code: &str, pad: &str) -> String {
    code.lines()
        .map(|line| format!("{}{}\n", pad, line))
        .collect()
}

/// Render the state map as JavaScript object-literal source.
///
/// Values render as JSON, which is valid literal JS. Identifier-safe keys
/// render bare; anything else renders quoted (JSON string quoting is valid
/// JS string quoting).
fn state_object_literal(state: &BTreeMap<String, Value>) -> String {
    if state.is_empty() {
        return "{}".to_string();
    }
    let fields = state
        .iter()
        .map(|(key, value)| {
            let key = if is_js_identifier(key) {
                key.clone()
            } else {
                Value::String(key.clone()).to_string()
            };
            format!("  {}: {}", key, value)
        })
        .collect::<Vec<_>>()
        .join(",\n");
    format!("{{\n{}\n}}", fields)
}

fn is_js_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn state_literal_quotes_only_exotic_keys() {
        let state: BTreeMap<String, Value> =
            serde_json::from_value(json!({ "count": 0, "my-key": true })).unwrap();
        let literal = state_object_literal(&state);
        assert!(literal.contains("  count: 0"));
        assert!(literal.contains("  \"my-key\": true"));
    }

    #[test]
    fn empty_state_renders_an_empty_literal() {
        assert_eq!(state_object_literal(&BTreeMap::new()), "{}");
    }

    #[test]
    fn dispatch_blocks_skip_empty_entries() {
        let mut registry = UpdateJsRegistry::default();
        registry.append("b-1", "");
        registry.append("a-2", "el.title = x;\n");
        let blocks = update_dispatch_blocks(&registry);
        assert!(!blocks.contains("b-1"));
        assert!(blocks.contains("[data-uid='a-2']"));
        assert!(blocks.contains("    el.title = x;"));
    }

    #[test]
    fn dispatch_blocks_keep_insertion_order() {
        let mut registry = UpdateJsRegistry::default();
        registry.append("z-1", "el.a = 1;\n");
        registry.append("a-2", "el.b = 2;\n");
        let blocks = update_dispatch_blocks(&registry);
        let first = blocks.find("z-1").unwrap();
        let second = blocks.find("a-2").unwrap();
        assert!(first < second);
    }
}
