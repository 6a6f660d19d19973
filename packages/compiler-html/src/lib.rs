//! # Scribe HTML compiler
//!
//! Serializes a document tree to the HTML string the editor persists.
//!
//! Every text leaf is wrapped in its mark tags, innermost first in the fixed order
//! code, quote, bold, italic, underline, strike, highlight, and then in a styling
//! `<span>` carrying the effective font size and color. The fixed order keeps the
//! output byte-stable across runs.

mod compiler;

pub use compiler::{
    escape_html, serialize, serialize_nodes, serialize_nodes_with, serialize_text,
    SerializeOptions,
};

#[cfg(test)]
mod tests;
