//! # Scribe Editor
//!
//! Structural editing for scribe documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ session: host events, focus, callbacks      │
//! │  - plugins: paste, shortcuts, hotkeys       │
//! │  - scheduler: deferred tasks + debounce     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ commands: toggle block/mark, links, images  │
//! │ autolink: url + space → link                │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ engine: Editor                              │
//! │  - transforms + queries over the tree       │
//! │  - refs re-based through every operation    │
//! │  - normalization, undo/redo history         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ model: nodes, paths, invertible operations  │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **One entry point**: every change is an operation through `Editor::apply`
//! 2. **Always normalized**: transforms leave a tree the rest of the crate can trust
//! 3. **One event, one undo step**: a session commits the ops of each event as a batch
//! 4. **No clocks inside**: time is passed in, so debounce behavior is testable
//!
//! ## Usage
//!
//! ### Driving the engine directly
//!
//! ```rust,ignore
//! use scribe_editor::{commands, Editor};
//! use scribe_model::{ElementType, Mark, Node, Point, Range};
//!
//! let mut editor = Editor::from_nodes(vec![Node::paragraph("Hello world")]);
//! editor.select(Range::new(Point::new([0, 0], 6), Point::new([0, 0], 11)))?;
//! commands::toggle_mark(&mut editor, Mark::Bold)?;
//! commands::toggle_block(&mut editor, ElementType::QuoteBlock, None)?;
//! ```
//!
//! ### Hosting an editor
//!
//! ```rust,ignore
//! use scribe_editor::{EditorConfig, EditorSession, KeyEvent};
//!
//! let mut session = EditorSession::with_html(EditorConfig::default(), "<p>Hi</p>")?
//!     .on_html(|html| save(html));
//! session.mount();
//! session.insert_text("!")?;
//! session.key_down(&KeyEvent::new("b").ctrl())?;
//!
//! // Later, from the host's timer
//! session.tick(Instant::now());
//! ```

pub mod autolink;
pub mod commands;
mod config;
pub mod engine;
mod errors;
pub mod hotkeys;
mod normalize;
pub mod paste;
pub mod plugin;
mod queries;
mod refs;
mod scheduler;
mod session;
pub mod shortcuts;
mod transforms;
mod undo_stack;

pub use commands::{ActiveBlock, ImageField, LinkState};
pub use config::EditorConfig;
pub use engine::Editor;
pub use errors::{EditorError, EditorResult};
pub use hotkeys::{Hotkey, HotkeyAction, KeyEvent};
pub use paste::DataTransfer;
pub use plugin::{EditorPlugin, Handled, PluginChain};
pub use queries::{is_block, is_inline, is_text, is_void, Location, Matcher, Mode, NodeOptions};
pub use refs::{PathRef, PointRef, RangeRef};
pub use scheduler::{DeferredTask, Scheduler};
pub use session::{ChangeCallback, EditorSession, HtmlCallback};
pub use transforms::{DeleteOptions, Edge, SplitOptions};
pub use undo_stack::{OperationBatch, UndoStack};
