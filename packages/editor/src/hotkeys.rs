//! Keyboard shortcuts for formatting and history.
//!
//! A [`Hotkey`] is written the way toolbars document it, e.g. `mod+alt+h`,
//! where `mod` is Ctrl or Cmd. Modifiers must match exactly, so `mod+z` does
//! not fire for `mod+shift+z`.

use crate::commands::{get_active_block, toggle_block, toggle_mark, ActiveBlock};
use crate::plugin::{EditorPlugin, Handled};
use crate::{Editor, EditorError, EditorResult};
use scribe_model::{ElementType, Mark, GROUP_TYPES};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// A key press as reported by the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyEvent {
    /// Key name (`"b"`, `"Backspace"`, `"Enter"`, ...)
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    /// Ctrl or Cmd
    pub fn has_mod(&self) -> bool {
        self.ctrl || self.meta
    }

    /// Any modifier other than Shift
    pub fn has_modifiers(&self) -> bool {
        self.has_mod() || self.alt
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hotkey {
    key: String,
    modifier: bool,
    alt: bool,
    shift: bool,
}

impl Hotkey {
    pub fn parse(spec: &str) -> EditorResult<Self> {
        let invalid = || EditorError::InvalidHotkey(spec.to_string());
        let mut key: Option<String> = None;
        let (mut modifier, mut alt, mut shift) = (false, false, false);

        for part in spec.split('+') {
            match part.trim().to_ascii_lowercase().as_str() {
                "" => return Err(invalid()),
                "mod" | "ctrl" | "control" | "cmd" | "meta" => modifier = true,
                "alt" | "option" => alt = true,
                "shift" => shift = true,
                name if key.is_none() => key = Some(name.to_string()),
                _ => return Err(invalid()),
            }
        }

        Ok(Self {
            key: key.ok_or_else(invalid)?,
            modifier,
            alt,
            shift,
        })
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        event.has_mod() == self.modifier
            && event.alt == self.alt
            && event.shift == self.shift
            && event.key.eq_ignore_ascii_case(&self.key)
    }
}

impl FromStr for Hotkey {
    type Err = EditorError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        Self::parse(spec)
    }
}

/// What a bound hotkey does
#[derive(Debug, Clone, PartialEq)]
pub enum HotkeyAction {
    ToggleMark(Mark),
    ToggleBlock(ElementType),
    Undo,
    Redo,
}

/// The built-in bindings
pub fn default_hotkeys() -> Vec<(Hotkey, HotkeyAction)> {
    let bindings = [
        ("mod+b", HotkeyAction::ToggleMark(Mark::Bold)),
        ("mod+i", HotkeyAction::ToggleMark(Mark::Italic)),
        ("mod+u", HotkeyAction::ToggleMark(Mark::Underline)),
        ("mod+alt+h", HotkeyAction::ToggleMark(Mark::Highlight)),
        ("mod+alt+c", HotkeyAction::ToggleMark(Mark::Code)),
        ("mod+q", HotkeyAction::ToggleMark(Mark::Quote)),
        ("mod+l", HotkeyAction::ToggleBlock(ElementType::AlignLeft)),
        ("mod+e", HotkeyAction::ToggleBlock(ElementType::AlignCenter)),
        ("mod+r", HotkeyAction::ToggleBlock(ElementType::AlignRight)),
        ("mod+j", HotkeyAction::ToggleBlock(ElementType::Justify)),
        ("mod+z", HotkeyAction::Undo),
        ("mod+shift+z", HotkeyAction::Redo),
    ];
    bindings
        .into_iter()
        .filter_map(|(spec, action)| Some((Hotkey::parse(spec).ok()?, action)))
        .collect()
}

pub fn run_action(editor: &mut Editor, action: &HotkeyAction) -> EditorResult<()> {
    match action {
        HotkeyAction::ToggleMark(mark) => toggle_mark(editor, mark.clone()),
        HotkeyAction::ToggleBlock(kind) => toggle_block(editor, *kind, None),
        HotkeyAction::Undo => editor.undo().map(|_| ()),
        HotkeyAction::Redo => editor.redo().map(|_| ()),
    }
}

/// Runs bound hotkeys, and turns Backspace at the start of a block inside a
/// list, quote or code block into leaving that group
#[derive(Debug)]
pub struct HotkeyPlugin {
    bindings: Vec<(Hotkey, HotkeyAction)>,
}

impl HotkeyPlugin {
    pub fn new() -> Self {
        Self::with_bindings(default_hotkeys())
    }

    pub fn with_bindings(bindings: Vec<(Hotkey, HotkeyAction)>) -> Self {
        Self { bindings }
    }

    fn leave_group(&self, editor: &mut Editor) -> EditorResult<Handled> {
        let Some(caret) = editor
            .selection()
            .filter(|selection| selection.is_collapsed())
            .map(|selection| selection.anchor.clone())
        else {
            return Ok(Handled::No);
        };
        let at_block_start = editor
            .block_at(&caret.path)
            .is_some_and(|(block, _)| editor.is_start(&caret, &block));
        if !at_block_start {
            return Ok(Handled::No);
        }
        match get_active_block(editor, &GROUP_TYPES) {
            Some(ActiveBlock::Block(group)) => {
                debug!(%group, "backspace leaves group");
                toggle_block(editor, group, None)?;
                Ok(Handled::Yes)
            }
            _ => Ok(Handled::No),
        }
    }
}

impl Default for HotkeyPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorPlugin for HotkeyPlugin {
    fn name(&self) -> &'static str {
        "hotkeys"
    }

    fn key_down(&self, editor: &mut Editor, event: &KeyEvent) -> EditorResult<Handled> {
        if event.key == "Backspace" && !event.has_modifiers() && !event.shift {
            return self.leave_group(editor);
        }
        let Some((_, action)) = self.bindings.iter().find(|(hotkey, _)| hotkey.matches(event)) else {
            return Ok(Handled::No);
        };
        debug!(?action, "hotkey");
        run_action(editor, action)?;
        Ok(Handled::Yes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_model::{Node, Point, Range};

    #[test]
    fn test_parse_and_match() {
        let hotkey = Hotkey::parse("mod+alt+h").unwrap();
        assert!(hotkey.matches(&KeyEvent::new("h").ctrl().alt()));
        assert!(hotkey.matches(&KeyEvent::new("H").meta().alt()));
        assert!(!hotkey.matches(&KeyEvent::new("h").ctrl()));
        assert!(!hotkey.matches(&KeyEvent::new("h").ctrl().alt().shift()));

        let undo: Hotkey = "mod+z".parse().unwrap();
        assert!(!undo.matches(&KeyEvent::new("z").ctrl().shift()));
    }

    #[test]
    fn test_parse_rejects_bad_specs() {
        assert!(Hotkey::parse("").is_err());
        assert!(Hotkey::parse("mod+").is_err());
        assert!(Hotkey::parse("mod+shift").is_err());
        assert!(Hotkey::parse("a+b").is_err());
    }

    #[test]
    fn test_every_default_binding_parses() {
        assert_eq!(default_hotkeys().len(), 12);
    }

    #[test]
    fn test_mod_b_toggles_bold() {
        let mut editor = Editor::from_nodes(vec![Node::paragraph("hi")]);
        editor
            .select(Range::new(Point::new([0, 0], 0), Point::new([0, 0], 2)))
            .unwrap();
        let plugin = HotkeyPlugin::new();

        let handled = plugin.key_down(&mut editor, &KeyEvent::new("b").ctrl()).unwrap();
        assert_eq!(handled, Handled::Yes);
        let text = editor.children()[0].children().unwrap()[0].as_text().unwrap();
        assert!(text.marks.bold);
    }

    #[test]
    fn test_backspace_at_start_of_list_item_leaves_list() {
        let mut editor = Editor::from_nodes(vec![Node::element(
            ElementType::UnorderedList,
            vec![Node::element(ElementType::ListItem, vec![Node::text("a")])],
        )]);
        editor.select(Point::new([0, 0, 0], 0)).unwrap();

        let handled = HotkeyPlugin::new()
            .key_down(&mut editor, &KeyEvent::new("Backspace"))
            .unwrap();
        assert_eq!(handled, Handled::Yes);
        assert_eq!(editor.children(), &[Node::paragraph("a")]);
    }

    #[test]
    fn test_backspace_inside_text_is_not_handled() {
        let mut editor = Editor::from_nodes(vec![Node::element(
            ElementType::UnorderedList,
            vec![Node::element(ElementType::ListItem, vec![Node::text("ab")])],
        )]);
        editor.select(Point::new([0, 0, 0], 1)).unwrap();
        let handled = HotkeyPlugin::new()
            .key_down(&mut editor, &KeyEvent::new("Backspace"))
            .unwrap();
        assert_eq!(handled, Handled::No);
    }
}
