//! # Editor Session
//!
//! One mounted editor instance, as a host component sees it.
//!
//! The session owns the [`Editor`], its plugins and its [`Scheduler`], and
//! turns host events into edits:
//!
//! ```text
//!   host event ──▶ plugins / default ──▶ commit
//!                                          ├─ flush ops (one undo step)
//!                                          ├─ change callback
//!                                          ├─ autolink check (typing only)
//!                                          ├─ deferred tasks (+ flush, change)
//!                                          └─ restart debounce
//!   tick(now) ──▶ debounce due? ──▶ html callback
//!   blur      ──▶ html callback, unless focus went to the toolbar
//! ```
//!
//! Focus state lives here rather than in any global, so several sessions can
//! coexist.

use crate::autolink::identify_links_in_text_if_any;
use crate::hotkeys::KeyEvent;
use crate::paste::DataTransfer;
use crate::{
    Editor, EditorConfig, EditorError, EditorResult, PluginChain, Scheduler, UndoStack,
};
use scribe_model::{Document, Node, Range};
use std::time::Instant;
use tracing::{debug, info, instrument};

pub type ChangeCallback = Box<dyn FnMut(&[Node])>;
pub type HtmlCallback = Box<dyn FnMut(&str)>;
pub type Clock = Box<dyn Fn() -> Instant>;

/// Kind of event being committed; only typing can complete a url
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    Typing,
    Other,
}

pub struct EditorSession {
    editor: Editor,
    plugins: PluginChain,
    scheduler: Scheduler,
    config: EditorConfig,

    mounted: bool,
    focused: bool,

    /// A toolbar control took the pointer; the blur that follows keeps the
    /// edit session open instead of emitting html
    toolbar_active: bool,

    on_change: Option<ChangeCallback>,
    on_html: Option<HtmlCallback>,
    clock: Clock,
}

impl EditorSession {
    /// Session over an empty document
    pub fn new(config: EditorConfig) -> Self {
        Self::with_nodes(config, Vec::new())
    }

    pub fn with_nodes(config: EditorConfig, nodes: Vec<Node>) -> Self {
        let history = UndoStack::with_max_levels(config.history_levels);
        Self {
            editor: Editor::with_history(Document::new(nodes), history),
            plugins: PluginChain::new(&config),
            scheduler: Scheduler::new(config.debounce()),
            config,
            mounted: false,
            focused: false,
            toolbar_active: false,
            on_change: None,
            on_html: None,
            clock: Box::new(Instant::now),
        }
    }

    pub fn with_html(config: EditorConfig, html: &str) -> EditorResult<Self> {
        let nodes = scribe_parser::deserialize_html(html)?;
        Ok(Self::with_nodes(config, nodes))
    }

    pub fn on_change(mut self, callback: impl FnMut(&[Node]) + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    /// Called with serialized html when edits settle and on blur
    pub fn on_html(mut self, callback: impl FnMut(&str) + 'static) -> Self {
        self.on_html = Some(Box::new(callback));
        self
    }

    pub fn with_clock(mut self, clock: impl Fn() -> Instant + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn plugins_mut(&mut self) -> &mut PluginChain {
        &mut self.plugins
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// The document serialized as html
    pub fn html(&self) -> String {
        scribe_compiler_html::serialize_nodes(self.editor.children())
    }

    pub fn mount(&mut self) {
        debug!("mount");
        self.mounted = true;
    }

    /// Stop the session; pending deferred work and the debounce are dropped
    pub fn unmount(&mut self) {
        debug!("unmount");
        self.scheduler.cancel();
        self.mounted = false;
        self.focused = false;
        self.toolbar_active = false;
    }

    /// Replace the document with external html. History is cleared and no
    /// callbacks fire: the content did not come from the user.
    #[instrument(skip(self, html), fields(len = html.len()))]
    pub fn set_html(&mut self, html: &str) -> EditorResult<()> {
        let nodes = scribe_parser::deserialize_html(html)?;
        self.editor.reset(Document::new(nodes));
        self.editor.flush();
        self.scheduler.cancel();
        Ok(())
    }

    pub fn insert_text(&mut self, text: &str) -> EditorResult<()> {
        self.handle(Input::Typing, |editor, plugins| plugins.insert_text(editor, text))
    }

    pub fn insert_data(&mut self, data: &DataTransfer) -> EditorResult<()> {
        self.handle(Input::Other, |editor, plugins| plugins.insert_data(editor, data))
    }

    pub fn key_down(&mut self, event: &KeyEvent) -> EditorResult<()> {
        self.handle(Input::Other, |editor, plugins| plugins.key_down(editor, event))
    }

    pub fn select(&mut self, range: Option<Range>) -> EditorResult<()> {
        self.handle(Input::Other, |editor, _| editor.set_selection(range))
    }

    /// Run a toolbar or dialog command as one event
    pub fn command(
        &mut self,
        command: impl FnOnce(&mut Editor) -> EditorResult<()>,
    ) -> EditorResult<()> {
        self.handle(Input::Other, |editor, _| command(editor))
    }

    /// Queue work to run after the next committed event
    pub fn defer(&mut self, task: impl FnOnce(&mut Editor) -> EditorResult<()> + 'static) {
        self.scheduler.defer(task);
    }

    pub fn focus(&mut self) {
        self.focused = true;
        self.toolbar_active = false;
    }

    pub fn toolbar_pointer_down(&mut self) {
        self.toolbar_active = true;
    }

    /// Focus left the editor. Unless it went to the toolbar, the document is
    /// emitted right away and the pending debounce is dropped.
    pub fn blur(&mut self) {
        self.focused = false;
        if std::mem::take(&mut self.toolbar_active) || !self.mounted {
            return;
        }
        self.scheduler.cancel();
        self.emit_html();
    }

    /// Advance time. Returns the html emitted when the debounce fired.
    pub fn tick(&mut self, now: Instant) -> Option<String> {
        if !self.mounted || !self.scheduler.due(now) {
            return None;
        }
        Some(self.emit_html())
    }

    fn handle(
        &mut self,
        input: Input,
        event: impl FnOnce(&mut Editor, &PluginChain) -> EditorResult<()>,
    ) -> EditorResult<()> {
        if !self.mounted {
            return Err(EditorError::NotMounted);
        }
        let result = event(&mut self.editor, &self.plugins);
        let committed = self.commit(input);
        result.and(committed)
    }

    fn commit(&mut self, input: Input) -> EditorResult<()> {
        if self.editor.flush().is_none() {
            return Ok(());
        }
        self.emit_change();

        if self.config.autolink && input == Input::Typing {
            identify_links_in_text_if_any(&self.editor, &mut self.scheduler);
        }
        if self.scheduler.has_deferred() {
            let result = self.scheduler.run_deferred(&mut self.editor);
            if self.editor.flush().is_some() {
                self.emit_change();
            }
            result?;
        }

        self.scheduler.touch((self.clock)());
        Ok(())
    }

    fn emit_change(&mut self) {
        if let Some(callback) = self.on_change.as_mut() {
            callback(self.editor.children());
        }
    }

    fn emit_html(&mut self) -> String {
        let html = self.html();
        info!(len = html.len(), "emitting html");
        if let Some(callback) = self.on_html.as_mut() {
            callback(&html);
        }
        html
    }
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl std::fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EditorSession")
            .field("editor", &self.editor)
            .field("plugins", &self.plugins)
            .field("scheduler", &self.scheduler)
            .field("mounted", &self.mounted)
            .field("focused", &self.focused)
            .finish_non_exhaustive()
    }
}
