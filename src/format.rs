//! Cosmetic formatting pass over emitted documents.
//!
//! Parses the compiled markup as an HTML5 fragment and re-emits it with
//! two-space indentation. Formatting never changes content: if the parser
//! records any parse error (misnesting, orphaned table parts, truncated
//! tags), the HTML5 algorithm would have repaired the tree by moving or
//! dropping nodes, so the pass refuses and the caller keeps the
//! unformatted document.

use std::cell::RefCell;

use html5ever::tendril::TendrilSink;
use html5ever::{local_name, namespace_url, ns, parse_fragment, Attribute, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use tendril::StrTendril;
use thiserror::Error;

use crate::codegen::SELF_CLOSING_TAGS;

/// Why a formatting pass was refused.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The markup did not parse cleanly as an HTML5 fragment.
    #[error("markup does not parse cleanly: {0}")]
    Parse(String),
}

/// Re-emit `markup` with two-space indentation.
///
/// `<script>`/`<style>` text is preserved verbatim, `<template>` contents
/// are walked, void elements re-emit self-closing, whitespace-only text is
/// dropped, and an element with a single short text child renders inline.
pub fn format_markup(markup: &str) -> Result<String, FormatError> {
    let dom = parse_fragment(
        RcDom::default(),
        ParseOpts::default(),
        QualName::new(None, ns!(html), local_name!("div")),
        vec![],
    )
    .one(StrTendril::from(markup));

    if !dom.errors.is_empty() {
        return Err(FormatError::Parse(dom.errors.join("; ")));
    }

    let mut out = String::new();
    for child in fragment_children(&dom) {
        write_node(&child, &mut out, 0);
    }
    Ok(out.trim_end().to_string())
}

// parse_fragment roots the parsed nodes under a synthetic <html> element.
fn fragment_children(dom: &RcDom) -> Vec<Handle> {
    let document = dom.document.children.borrow();
    match document.first() {
        Some(root) => root.children.borrow().clone(),
        None => Vec::new(),
    }
}

fn write_node(node: &Handle, out: &mut String, depth: usize) {
    match &node.data {
        NodeData::Text { contents } => {
            let text = contents.borrow();
            for line in text.split('\n') {
                let line = line.trim();
                if !line.is_empty() {
                    push_line(out, depth, line);
                }
            }
        }
        NodeData::Element {
            name,
            attrs,
            template_contents,
            ..
        } => write_element(node, name, attrs, template_contents, out, depth),
        NodeData::Comment { contents } => {
            push_line(out, depth, &format!("<!--{}-->", contents));
        }
        NodeData::Doctype { name, .. } => {
            push_line(out, depth, &format!("<!DOCTYPE {}>", name));
        }
        _ => {}
    }
}

fn write_element(
    node: &Handle,
    name: &QualName,
    attrs: &RefCell<Vec<Attribute>>,
    template_contents: &RefCell<Option<Handle>>,
    out: &mut String,
    depth: usize,
) {
    let tag: &str = &name.local;

    let mut open = format!("<{}", tag);
    for attr in attrs.borrow().iter() {
        open.push_str(&format!(" {}=\"{}\"", attr.name.local, attr.value));
    }

    if SELF_CLOSING_TAGS.contains(tag) {
        open.push_str(" />");
        push_line(out, depth, &open);
        return;
    }
    open.push('>');

    // Script and style text passes through verbatim.
    if tag == "script" || tag == "style" {
        push_line(out, depth, &open);
        for child in node.children.borrow().iter() {
            if let NodeData::Text { contents } = &child.data {
                let text = contents.borrow();
                let text = text.trim_matches('\n');
                if !text.is_empty() {
                    out.push_str(text);
                    out.push('\n');
                }
            }
        }
        push_line(out, depth, &format!("</{}>", tag));
        return;
    }

    // Template children live in the parsed template contents.
    let children: Vec<Handle> = match template_contents.borrow().as_ref() {
        Some(contents) => contents.children.borrow().clone(),
        None => node.children.borrow().clone(),
    };
    let rendered: Vec<&Handle> = children.iter().filter(|child| is_rendered(child)).collect();

    if rendered.is_empty() {
        push_line(out, depth, &format!("{}</{}>", open, tag));
        return;
    }

    // A lone single-line text child stays inline.
    if rendered.len() == 1 {
        if let NodeData::Text { contents } = &rendered[0].data {
            let text = contents.borrow();
            let text = text.trim();
            if !text.contains('\n') {
                push_line(out, depth, &format!("{}{}</{}>", open, text, tag));
                return;
            }
        }
    }

    push_line(out, depth, &open);
    for child in rendered {
        write_node(child, out, depth + 1);
    }
    push_line(out, depth, &format!("</{}>", tag));
}

fn is_rendered(node: &Handle) -> bool {
    match &node.data {
        NodeData::Text { contents } => !contents.borrow().trim().is_empty(),
        NodeData::ProcessingInstruction { .. } => false,
        _ => true,
    }
}

fn push_line(out: &mut String, depth: usize, line: &str) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str(line);
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn nested_elements_indent_two_spaces() {
        let formatted =
            format_markup("<div><section><span>Hi</span></section></div>").unwrap();
        assert_eq!(
            formatted,
            "<div>\n  <section>\n    <span>Hi</span>\n  </section>\n</div>"
        );
    }

    #[test]
    fn void_elements_stay_self_closing() {
        let formatted = format_markup("<img src=\"x.png\" />").unwrap();
        assert_eq!(formatted, "<img src=\"x.png\" />");
    }

    #[test]
    fn script_text_is_preserved_verbatim() {
        let formatted = format_markup("<script>\nvar x = 1;\n</script>").unwrap();
        assert_eq!(formatted, "<script>\nvar x = 1;\n</script>");
    }

    #[test]
    fn template_contents_are_walked() {
        let formatted =
            format_markup("<template data-for=\"item in items\"><span>x</span></template>")
                .unwrap();
        assert_eq!(
            formatted,
            "<template data-for=\"item in items\">\n  <span>x</span>\n</template>"
        );
    }

    #[test]
    fn whitespace_only_text_is_dropped() {
        let formatted = format_markup("<div>\n   \n<span>a</span>\n</div>").unwrap();
        assert_eq!(formatted, "<div>\n  <span>a</span>\n</div>");
    }

    #[test]
    fn unrepresentable_markup_is_refused() {
        assert!(format_markup("<td>boom</td>").is_err());
    }
}
