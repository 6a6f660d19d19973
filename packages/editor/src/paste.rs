//! Pasted and dropped content.
//!
//! HTML is deserialized and inserted as a fragment, so formatting survives
//! the paste. Plain text is typed line by line with a block break between
//! lines.

use crate::plugin::{EditorPlugin, Handled};
use crate::{Editor, EditorResult};
use scribe_model::Node;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

pub const HTML_MIME: &str = "text/html";
pub const PLAIN_TEXT_MIME: &str = "text/plain";

/// Clipboard or drag payload, keyed by mime type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTransfer {
    items: BTreeMap<String, String>,
}

impl DataTransfer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn html(html: impl Into<String>) -> Self {
        Self::new().with(HTML_MIME, html)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new().with(PLAIN_TEXT_MIME, text)
    }

    pub fn with(mut self, mime: impl Into<String>, data: impl Into<String>) -> Self {
        self.items.insert(mime.into(), data.into());
        self
    }

    pub fn get(&self, mime: &str) -> Option<&str> {
        self.items
            .get(mime)
            .map(String::as_str)
            .filter(|data| !data.is_empty())
    }

    pub fn plain_text(&self) -> Option<&str> {
        self.get(PLAIN_TEXT_MIME)
    }
}

/// Document blocks for a pasted HTML string
pub fn fragment_from_html(html: &str) -> EditorResult<Vec<Node>> {
    Ok(scribe_parser::deserialize_html(html)?)
}

/// Type `text` at the selection, splitting the block at each newline
pub fn insert_plain_text(editor: &mut Editor, text: &str) -> EditorResult<()> {
    editor.without_normalizing(|editor| {
        let normalized = text.replace("\r\n", "\n");
        for (index, line) in normalized.split('\n').enumerate() {
            if index > 0 {
                editor.insert_break()?;
            }
            editor.insert_text(line)?;
        }
        Ok(())
    })
}

#[derive(Debug, Default)]
pub struct HtmlPastePlugin;

impl EditorPlugin for HtmlPastePlugin {
    fn name(&self) -> &'static str {
        "html-paste"
    }

    fn insert_data(&self, editor: &mut Editor, data: &DataTransfer) -> EditorResult<Handled> {
        let Some(html) = data.get(HTML_MIME) else {
            return Ok(Handled::No);
        };
        let fragment = fragment_from_html(html)?;
        debug!(blocks = fragment.len(), "pasting html");
        editor.insert_fragment(fragment)?;
        Ok(Handled::Yes)
    }
}
