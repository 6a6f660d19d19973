//! # Scribe Model
//!
//! Tree-shaped document representation shared by the HTML codec and the editor.
//!
//! ```text
//! Document
//!  └─ Element { type: "Paragraph", children }
//!      ├─ Text { text: "Go to ", marks }
//!      ├─ Element { type: "Link", url, children: [Text] }
//!      └─ Text { text: " now", marks }
//! ```
//!
//! Every change to a document is expressed as an [`Operation`]. Operations are
//! invertible (undo) and can re-base [`Path`]s, [`Point`]s and [`Range`]s that
//! were computed before they were applied.

mod document;
mod element_type;
mod error;
mod marks;
mod node;
mod operation;
mod path;
mod point;

pub use document::Document;
pub use element_type::{ElementType, UnknownElementType, ALIGNMENT_TYPES, GROUP_TYPES};
pub use error::{MutationError, MutationResult};
pub use marks::{Mark, MarkKind, Marks, DEFAULT_FONT_COLOR, DEFAULT_FONT_SIZE};
pub use node::{image_display_style, Element, ElementAttrs, Node, Properties, Text};
pub use operation::Operation;
pub use path::{Affinity, Path};
pub use point::{Point, Range};
