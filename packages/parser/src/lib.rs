//! # Scribe Parser
//!
//! Turns HTML into document nodes. Parsing is done by html5ever, so any input
//! (pasted fragments, full pages, broken markup) yields a tree; the
//! [`deserialize`] pass then maps tags onto elements and marks.
//!
//! ```rust,ignore
//! let blocks = scribe_parser::deserialize_html("<p>Hello <strong>world</strong></p>")?;
//! ```

mod deserializer;
mod dom;
mod error;
mod style;
mod tags;

pub use deserializer::{deserialize, deserialize_html, into_document, Deserialized};
pub use dom::{parse_html, HtmlDocument};
pub use error::{ParseError, ParseResult};
pub use style::InlineStyle;
pub use tags::{ElementTag, TextTag, HEADING_SIZES};
