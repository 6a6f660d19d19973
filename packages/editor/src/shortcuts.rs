//! Markdown-style autoformat: typing a trigger at the start of a block and
//! then a space formats the block instead of inserting the space.
//!
//! | trigger | result |
//! |---|---|
//! | `*` `-` `+` | Unordered List of List Items |
//! | `1.` | Ordered List of List Items |
//! | `>` | Quote Block |
//! | ```` ``` ```` | Code Block |
//! | `#` .. `######` | bold heading-size text from here on |

use crate::commands::retyped;
use crate::plugin::{EditorPlugin, Handled};
use crate::{DeleteOptions, Editor, EditorResult, Location, NodeOptions};
use scribe_model::{Element, ElementType, Mark, Node, Range};
use scribe_parser::HEADING_SIZES;
use tracing::debug;

/// History label of the batch a shortcut produces
pub const AUTOFORMAT_BATCH: &str = "autoformat";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shortcut {
    /// Retype the block to `item` and wrap it in `group`
    Block { group: ElementType, item: ElementType },
    /// Type bold text at this font size
    Heading { font_size: f64 },
}

/// The shortcut `trigger` stands for, if any
pub fn shortcut_for(trigger: &str) -> Option<Shortcut> {
    let block = |group, item| Some(Shortcut::Block { group, item });
    match trigger {
        "*" | "-" | "+" => block(ElementType::UnorderedList, ElementType::ListItem),
        "1." => block(ElementType::OrderedList, ElementType::ListItem),
        ">" => block(ElementType::QuoteBlock, ElementType::Paragraph),
        "```" => block(ElementType::CodeBlock, ElementType::Paragraph),
        _ => {
            let level = trigger.len();
            let heading = (1..=HEADING_SIZES.len()).contains(&level)
                && trigger.bytes().all(|byte| byte == b'#');
            heading.then(|| Shortcut::Heading {
                font_size: HEADING_SIZES[level - 1],
            })
        }
    }
}

/// Replace the trigger before the caret with the formatting it stands for
pub fn apply_shortcut(editor: &mut Editor, trigger: Range, shortcut: Shortcut) -> EditorResult<()> {
    editor.select(trigger)?;
    editor.delete(DeleteOptions::new())?;
    editor.describe_batch(AUTOFORMAT_BATCH);
    match shortcut {
        Shortcut::Block { group, item } => {
            editor.set_nodes(&|node: &Node| retyped(node, item), NodeOptions::new())?;
            editor.wrap_nodes(Element::wrapper(group), NodeOptions::new())
        }
        Shortcut::Heading { font_size } => {
            editor.add_mark(Mark::FontSize(font_size))?;
            editor.add_mark(Mark::Bold)
        }
    }
}

#[derive(Debug, Default)]
pub struct ShortcutsPlugin;

impl EditorPlugin for ShortcutsPlugin {
    fn name(&self) -> &'static str {
        "shortcuts"
    }

    fn insert_text(&self, editor: &mut Editor, text: &str) -> EditorResult<Handled> {
        if text != " " {
            return Ok(Handled::No);
        }
        let Some(caret) = editor
            .selection()
            .filter(|selection| selection.is_collapsed())
            .map(|selection| selection.anchor.clone())
        else {
            return Ok(Handled::No);
        };
        let Some(start) = editor
            .block_at(&caret.path)
            .and_then(|(block, _)| editor.start(&block))
        else {
            return Ok(Handled::No);
        };

        let trigger = Range::new(caret, start);
        let before = editor.string(&Location::Range(trigger.clone()));
        let Some(shortcut) = shortcut_for(&before) else {
            return Ok(Handled::No);
        };
        debug!(trigger = %before, ?shortcut, "autoformat");
        apply_shortcut(editor, trigger, shortcut)?;
        Ok(Handled::Yes)
    }
}
