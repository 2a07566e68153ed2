//! Compiles declarative UI component trees into self-contained HTML
//! documents.
//!
//! The input is a [`Component`]: a tree of typed nodes carrying static
//! properties, dynamic value bindings, event bindings, and component-level
//! reactive state. The output is a single document: markup, an optional
//! inline stylesheet, and an optional inline script that wires the
//! declared state to the rendered elements with no runtime framework.
//!
//! Pipeline: the component is cloned, node-level CSS is collected, the
//! node compiler walks the tree emitting markup while accumulating
//! per-node update code in a [`CompileContext`], and the component
//! compiler assembles the final document, synthesizing the reactive
//! runtime script when state is present.
//!
//! Ground rules the compiler keeps:
//!
//! 1. The caller's tree is never mutated; compilation works on a clone.
//! 2. Only nodes with dynamic bindings receive a correlation identifier.
//! 3. Identifiers are deterministic: the same tree compiles to the same
//!    document, byte for byte.
//! 4. Property values and binding expressions are spliced verbatim;
//!    input is trusted source text, and no escaping is applied.
//! 5. Compilation never fails; the cosmetic formatting pass may, in which
//!    case the unformatted document is returned.

mod case;
mod codegen;
mod component;
mod document;
mod format;
mod styles;


pub use case::{camel_case, dash_case};
pub use codegen::{
    node_to_html, CompileContext, UpdateJsRegistry, CORRELATION_ATTR, SELF_CLOSING_TAGS,
};
pub use component::*;
pub use document::{component_to_html, CompileOptions};
pub use format::{format_markup, FormatError};
pub use styles::collect_css;
