//! # Editing engine
//!
//! [`Editor`] owns the document, the selection and the pending marks, and is
//! the only thing allowed to change them: every edit is an [`Operation`]
//! pushed through [`Editor::apply`]. That single entry point is what keeps
//! refs, the selection and the history consistent with the tree.
//!
//! Transforms (in `transforms.rs`) and queries (in `queries.rs`) are the
//! primitives commands are written against. Each public transform runs inside
//! [`Editor::without_normalizing`], so the tree is normalized once when the
//! outermost transform finishes rather than after every intermediate step.

use crate::refs::{unseen, PathRef, PointRef, RangeRef};
use crate::{EditorResult, UndoStack};
use scribe_model::{Affinity, Document, Marks, Node, Operation, Path, Point, Range};
use tracing::{debug, trace, warn};

pub struct Editor {
    pub(crate) document: Document,
    pub(crate) selection: Option<Range>,

    /// Marks the next inserted text receives (collapsed-selection formatting)
    pub(crate) marks: Option<Marks>,

    /// Operations applied since the last flush
    operations: Vec<Operation>,

    /// Number of operations flushed before `operations[0]`
    op_base: usize,

    history: UndoStack,

    /// While false, applied operations are kept out of the history
    saving: bool,

    pub(crate) normalize_depth: usize,

    /// Set by any operation or pending-mark change, cleared by `flush`
    changed: bool,
}

impl Editor {
    pub fn new(document: Document) -> Self {
        Self::with_history(document, UndoStack::new())
    }

    pub fn with_history(document: Document, history: UndoStack) -> Self {
        let mut editor = Self {
            document,
            selection: None,
            marks: None,
            operations: Vec::new(),
            op_base: 0,
            history,
            saving: true,
            normalize_depth: 0,
            changed: false,
        };
        editor.reset_normalized();
        editor
    }

    /// Editor over `nodes`, normalized, with no history
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self::new(Document::new(nodes))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn children(&self) -> &[Node] {
        &self.document.children
    }

    pub fn selection(&self) -> Option<&Range> {
        self.selection.as_ref()
    }

    pub fn pending_marks(&self) -> Option<&Marks> {
        self.marks.as_ref()
    }

    pub(crate) fn set_pending_marks(&mut self, marks: Option<Marks>) {
        self.marks = marks;
        self.changed = true;
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    /// Replace the whole document. The selection, pending marks and history
    /// are dropped: the new content did not come from an edit.
    pub fn reset(&mut self, document: Document) {
        debug!(blocks = document.children.len(), "resetting document");
        self.document = document;
        self.selection = None;
        self.marks = None;
        self.op_base += self.operations.len();
        self.operations.clear();
        self.history.clear();
        self.reset_normalized();
        self.changed = true;
    }

    fn reset_normalized(&mut self) {
        // Normalizing fresh content is not an edit the user can undo
        self.saving = false;
        if let Err(error) = self.normalize() {
            warn!(%error, "could not normalize document");
        }
        self.saving = true;
        self.history.clear();
        self.op_base += self.operations.len();
        self.operations.clear();
    }

    /// Apply one operation: change the tree, move the selection, record it
    /// for refs and history, then normalize unless a transform is running.
    pub fn apply(&mut self, op: Operation) -> EditorResult<()> {
        trace!(?op, "apply");
        let selection_before = self.selection.clone();
        op.apply(&mut self.document, &mut self.selection)?;
        if self.saving {
            self.history.record(&op, &selection_before);
        }
        if op.is_selection_op() {
            self.marks = None;
        }
        self.operations.push(op);
        self.changed = true;

        if self.normalize_depth == 0 {
            self.normalize()?;
        }
        Ok(())
    }

    /// Run `f` with normalization deferred until it returns
    pub fn without_normalizing<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> EditorResult<T>,
    ) -> EditorResult<T> {
        self.normalize_depth += 1;
        let result = f(self);
        self.normalize_depth -= 1;
        let value = result?;
        if self.normalize_depth == 0 {
            self.normalize()?;
        }
        Ok(value)
    }

    /// Operations applied since the last flush
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub(crate) fn operations_since(&self, seen: &mut usize) -> &[Operation] {
        unseen(&self.operations, self.op_base, seen)
    }

    fn op_count(&self) -> usize {
        self.op_base + self.operations.len()
    }

    pub fn path_ref(&self, path: Path, affinity: Affinity) -> PathRef {
        PathRef::new(path, affinity, self.op_count())
    }

    pub fn point_ref(&self, point: Point, affinity: Affinity) -> PointRef {
        PointRef::new(point, affinity, self.op_count())
    }

    pub fn range_ref(&self, range: Range) -> RangeRef {
        RangeRef::new(range, self.op_count())
    }

    /// End the current input event: close the history batch and return the
    /// operations it produced. Returns `None` when nothing changed.
    pub fn flush(&mut self) -> Option<Vec<Operation>> {
        self.history.end_batch();
        if !std::mem::take(&mut self.changed) {
            return None;
        }
        self.op_base += self.operations.len();
        Some(std::mem::take(&mut self.operations))
    }

    /// Name the history batch being recorded. No-op when this event has not
    /// recorded anything yet.
    pub fn describe_batch(&mut self, description: impl Into<String>) {
        self.history.set_batch_description(description);
    }

    pub fn undo(&mut self) -> EditorResult<bool> {
        let undone = self.history.undo(&mut self.document, &mut self.selection)?;
        if undone {
            debug!(levels = self.history.undo_levels(), "undo");
            self.marks = None;
            self.changed = true;
        }
        Ok(undone)
    }

    pub fn redo(&mut self) -> EditorResult<bool> {
        let redone = self.history.redo(&mut self.document, &mut self.selection)?;
        if redone {
            debug!(levels = self.history.redo_levels(), "redo");
            self.marks = None;
            self.changed = true;
        }
        Ok(redone)
    }

    /// Apply operations that must not reach the history
    pub fn without_saving<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> EditorResult<T>,
    ) -> EditorResult<T> {
        let saving = std::mem::replace(&mut self.saving, false);
        let result = f(self);
        self.saving = saving;
        result
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Document::default())
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("document", &self.document)
            .field("selection", &self.selection)
            .field("marks", &self.marks)
            .finish_non_exhaustive()
    }
}
