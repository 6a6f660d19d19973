//! # Editor plugins
//!
//! Input reaches the editor as three kinds of event: typed text, pasted or
//! dropped data, and key presses. Plugins get a chance to handle each event
//! before the editor's default behavior runs.
//!
//! ## Design
//!
//! - Plugins run in registration order.
//! - The first plugin that returns [`Handled::Yes`] stops the chain.
//! - Input no plugin handles falls through to the default: text is typed,
//!   data is pasted as plain text, and Backspace, Delete and Enter edit.
//!
//! Void and inline behavior is not a plugin concern; it is fixed per element
//! type by `ElementType::is_void` and `ElementType::is_inline`.

use crate::hotkeys::{HotkeyPlugin, KeyEvent};
use crate::paste::{insert_plain_text, DataTransfer, HtmlPastePlugin};
use crate::shortcuts::ShortcutsPlugin;
use crate::{Editor, EditorConfig, EditorResult};
use tracing::trace;

/// Whether a plugin consumed an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Yes,
    No,
}

/// Hook into editor input. Every hook defaults to not handling the event.
pub trait EditorPlugin: std::fmt::Debug {
    fn name(&self) -> &'static str;

    fn insert_text(&self, _editor: &mut Editor, _text: &str) -> EditorResult<Handled> {
        Ok(Handled::No)
    }

    fn insert_data(&self, _editor: &mut Editor, _data: &DataTransfer) -> EditorResult<Handled> {
        Ok(Handled::No)
    }

    fn key_down(&self, _editor: &mut Editor, _event: &KeyEvent) -> EditorResult<Handled> {
        Ok(Handled::No)
    }
}

/// Ordered set of plugins with the default behavior behind them
#[derive(Debug)]
pub struct PluginChain {
    plugins: Vec<Box<dyn EditorPlugin>>,
}

impl PluginChain {
    /// Chain with no plugins; only default behavior runs
    pub fn empty() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Chain with the built-in plugins enabled by `config`
    pub fn new(config: &EditorConfig) -> Self {
        let mut chain = Self::empty();
        chain.register(HtmlPastePlugin);
        if config.shortcuts {
            chain.register(ShortcutsPlugin);
        }
        chain.register(HotkeyPlugin::new());
        chain
    }

    pub fn register(&mut self, plugin: impl EditorPlugin + 'static) {
        self.plugins.push(Box::new(plugin));
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(|plugin| plugin.name()).collect()
    }

    pub fn insert_text(&self, editor: &mut Editor, text: &str) -> EditorResult<()> {
        for plugin in &self.plugins {
            if plugin.insert_text(editor, text)? == Handled::Yes {
                trace!(plugin = plugin.name(), "insert_text handled");
                return Ok(());
            }
        }
        editor.insert_text(text)
    }

    pub fn insert_data(&self, editor: &mut Editor, data: &DataTransfer) -> EditorResult<()> {
        for plugin in &self.plugins {
            if plugin.insert_data(editor, data)? == Handled::Yes {
                trace!(plugin = plugin.name(), "insert_data handled");
                return Ok(());
            }
        }
        match data.plain_text() {
            Some(text) => insert_plain_text(editor, text),
            None => Ok(()),
        }
    }

    pub fn key_down(&self, editor: &mut Editor, event: &KeyEvent) -> EditorResult<()> {
        for plugin in &self.plugins {
            if plugin.key_down(editor, event)? == Handled::Yes {
                trace!(plugin = plugin.name(), key = %event.key, "key_down handled");
                return Ok(());
            }
        }
        if event.has_modifiers() {
            return Ok(());
        }
        match event.key.as_str() {
            "Backspace" => editor.delete_backward(),
            "Delete" => editor.delete_forward(),
            "Enter" => editor.insert_break(),
            _ => Ok(()),
        }
    }
}

impl Default for PluginChain {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_model::{Node, Point};

    #[derive(Debug)]
    struct Uppercase;

    impl EditorPlugin for Uppercase {
        fn name(&self) -> &'static str {
            "uppercase"
        }

        fn insert_text(&self, editor: &mut Editor, text: &str) -> EditorResult<Handled> {
            editor.insert_text(&text.to_uppercase())?;
            Ok(Handled::Yes)
        }
    }

    fn editor_at_end(text: &str) -> Editor {
        let mut editor = Editor::from_nodes(vec![Node::paragraph(text)]);
        editor.select(Point::new([0, 0], text.len())).unwrap();
        editor
    }

    #[test]
    fn test_default_chain_order() {
        let chain = PluginChain::default();
        assert_eq!(chain.names(), vec!["html-paste", "shortcuts", "hotkeys"]);

        let config = EditorConfig {
            shortcuts: false,
            ..EditorConfig::default()
        };
        assert_eq!(PluginChain::new(&config).names(), vec!["html-paste", "hotkeys"]);
    }

    #[test]
    fn test_handled_input_stops_the_chain() {
        let mut chain = PluginChain::empty();
        chain.register(Uppercase);
        let mut editor = editor_at_end("a");
        chain.insert_text(&mut editor, "b").unwrap();
        assert_eq!(editor.document().string(), "aB");
    }

    #[test]
    fn test_unhandled_keys_fall_through() {
        let chain = PluginChain::empty();
        let mut editor = editor_at_end("ab");
        chain.key_down(&mut editor, &KeyEvent::new("Backspace")).unwrap();
        assert_eq!(editor.document().string(), "a");

        chain.key_down(&mut editor, &KeyEvent::new("Enter")).unwrap();
        assert_eq!(editor.children().len(), 2);

        chain.key_down(&mut editor, &KeyEvent::new("x").ctrl()).unwrap();
        assert_eq!(editor.children().len(), 2);
    }
}
