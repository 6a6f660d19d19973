//! # Undo/Redo Stack
//!
//! Tracks operation history and enables undo/redo.
//!
//! ## Design
//!
//! - Every document operation of one input event lands in the same batch
//! - Undo applies the inverses in reverse order, then restores the selection
//!   the batch started from
//! - Redo restores that selection and reapplies the operations
//! - New batches clear the redo stack
//! - Selection-only operations are never recorded
//! - A batch of plain typing continues the previous batch when it picks up
//!   exactly where that one stopped, so a typed word is one undo step
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut stack = UndoStack::new();
//!
//! stack.record(&op, &selection);
//! op.apply(&mut doc, &mut selection)?;
//! stack.end_batch();
//!
//! stack.undo(&mut doc, &mut selection)?;
//! stack.redo(&mut doc, &mut selection)?;
//! ```

use scribe_model::{Document, MutationResult, Operation, Range};

/// A group of operations that are undone/redone together
#[derive(Debug, Clone, PartialEq)]
pub struct OperationBatch {
    /// The operations in this batch (in application order)
    pub operations: Vec<Operation>,

    /// Selection before the first operation was applied
    pub selection_before: Option<Range>,

    /// What produced the batch, e.g. `autolink`. Described batches never
    /// absorb later typing.
    pub description: Option<String>,
}

impl OperationBatch {
    pub fn new(selection_before: Option<Range>) -> Self {
        Self {
            operations: Vec::new(),
            selection_before,
            description: None,
        }
    }

    /// Inverse operations, in the order they must be applied to undo
    pub fn inverses(&self) -> impl Iterator<Item = Operation> + '_ {
        self.operations.iter().rev().map(Operation::inverse)
    }

    /// True when `self` only types (or deletes) text right where `previous`
    /// stopped typing
    fn continues(&self, previous: &OperationBatch) -> bool {
        let (Some(first), Some(last)) = (self.operations.first(), previous.operations.last()) else {
            return false;
        };
        let contiguous = self
            .operations
            .windows(2)
            .all(|pair| is_continuation(&pair[1], &pair[0]));
        contiguous && is_continuation(first, last)
    }
}

fn is_continuation(op: &Operation, prev: &Operation) -> bool {
    match (op, prev) {
        (
            Operation::InsertText { path, offset, .. },
            Operation::InsertText {
                path: prev_path,
                offset: prev_offset,
                text: prev_text,
            },
        ) => path == prev_path && *offset == prev_offset + prev_text.len(),
        (
            Operation::RemoveText { path, offset, text },
            Operation::RemoveText {
                path: prev_path,
                offset: prev_offset,
                ..
            },
        ) => path == prev_path && offset + text.len() == *prev_offset,
        _ => false,
    }
}

/// Undo/redo stack for document editing
#[derive(Debug)]
pub struct UndoStack {
    /// Stack of applied batches (most recent last)
    undo_stack: Vec<OperationBatch>,

    /// Stack of undone batches (most recent last)
    redo_stack: Vec<OperationBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// Currently building a batch
    current_batch: Option<OperationBatch>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            current_batch: None,
        }
    }

    /// Record an operation about to be applied. `selection` is the selection
    /// before it, used when this operation opens a new batch.
    pub fn record(&mut self, op: &Operation, selection: &Option<Range>) {
        if op.is_selection_op() {
            return;
        }
        self.current_batch
            .get_or_insert_with(|| OperationBatch::new(selection.clone()))
            .operations
            .push(op.clone());
    }

    /// Start a batch explicitly (will be undone/redone together)
    pub fn begin_batch(&mut self, selection_before: Option<Range>) {
        if self.current_batch.is_none() {
            self.current_batch = Some(OperationBatch::new(selection_before));
        }
    }

    /// End the current batch and push it to the undo stack
    pub fn end_batch(&mut self) {
        let Some(batch) = self.current_batch.take() else {
            return;
        };
        if batch.operations.is_empty() {
            return;
        }

        if let Some(previous) = self.undo_stack.last_mut() {
            if batch.description.is_none() && batch.continues(previous) {
                previous.operations.extend(batch.operations);
                self.redo_stack.clear();
                return;
            }
        }
        self.push_batch(batch);
    }

    pub fn is_batching(&self) -> bool {
        self.current_batch.is_some()
    }

    /// Set description for current batch (if batching)
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    /// Push a batch to the undo stack
    pub fn push_batch(&mut self, batch: OperationBatch) {
        self.undo_stack.push(batch);

        // Trim if exceeded max levels
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // A new action invalidates the undone future
        self.redo_stack.clear();
    }

    /// Undo the most recent batch
    pub fn undo(&mut self, doc: &mut Document, selection: &mut Option<Range>) -> MutationResult<bool> {
        self.end_batch();
        let Some(batch) = self.undo_stack.pop() else {
            return Ok(false);
        };

        for inverse in batch.inverses() {
            inverse.apply(doc, selection)?;
        }
        if batch.selection_before.is_some() {
            *selection = batch.selection_before.clone();
        }

        self.redo_stack.push(batch);
        Ok(true)
    }

    /// Redo the most recently undone batch
    pub fn redo(&mut self, doc: &mut Document, selection: &mut Option<Range>) -> MutationResult<bool> {
        self.end_batch();
        let Some(batch) = self.redo_stack.pop() else {
            return Ok(false);
        };

        if batch.selection_before.is_some() {
            *selection = batch.selection_before.clone();
        }
        for op in &batch.operations {
            op.apply(doc, selection)?;
        }

        self.undo_stack.push(batch);
        Ok(true)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty() || self.current_batch.as_ref().is_some_and(|b| !b.operations.is_empty())
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Get the number of undo levels available
    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of redo levels available
    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_batch = None;
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_model::{Node, Path, Point};

    fn insert(offset: usize, text: &str) -> Operation {
        Operation::InsertText {
            path: Path::new([0, 0]),
            offset,
            text: text.to_string(),
        }
    }

    fn apply(stack: &mut UndoStack, op: Operation, doc: &mut Document, selection: &mut Option<Range>) {
        stack.record(&op, selection);
        op.apply(doc, selection).unwrap();
    }

    #[test]
    fn test_undo_stack_creation() {
        let stack = UndoStack::new();
        assert_eq!(stack.undo_levels(), 0);
        assert_eq!(stack.redo_levels(), 0);
        assert!(!stack.can_undo());
        assert!(!stack.can_redo());
    }

    #[test]
    fn test_apply_and_undo_text_operation() {
        let mut doc = Document::new(vec![Node::paragraph("Hello")]);
        let mut selection = Some(Range::collapsed(Point::new([0, 0], 5)));
        let mut stack = UndoStack::new();

        apply(&mut stack, insert(5, " World"), &mut doc, &mut selection);
        stack.end_batch();

        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(doc.string(), "Hello World");

        let undone = stack.undo(&mut doc, &mut selection).unwrap();
        assert!(undone);
        assert_eq!(doc.string(), "Hello");
        assert_eq!(selection, Some(Range::collapsed(Point::new([0, 0], 5))));
        assert_eq!(stack.redo_levels(), 1);

        let redone = stack.redo(&mut doc, &mut selection).unwrap();
        assert!(redone);
        assert_eq!(doc.string(), "Hello World");
        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_batched_operations() {
        let mut doc = Document::new(vec![Node::paragraph("ab")]);
        let mut selection = None;
        let mut stack = UndoStack::new();

        stack.begin_batch(None);
        stack.set_batch_description("Split and type");
        apply(
            &mut stack,
            Operation::SplitNode {
                path: Path::new([0, 0]),
                position: 1,
                properties: doc.node(&Path::new([0, 0])).unwrap().properties(),
            },
            &mut doc,
            &mut selection,
        );
        apply(&mut stack, insert(1, "!"), &mut doc, &mut selection);
        stack.end_batch();

        assert_eq!(stack.undo_levels(), 1);
        assert_eq!(stack.undo_description(), Some("Split and type"));

        stack.undo(&mut doc, &mut selection).unwrap();
        assert_eq!(doc, Document::new(vec![Node::paragraph("ab")]));
    }

    #[test]
    fn test_contiguous_typing_merges() {
        let mut doc = Document::new(vec![Node::paragraph("")]);
        let mut selection = None;
        let mut stack = UndoStack::new();

        for (offset, ch) in "abc".char_indices() {
            apply(&mut stack, insert(offset, &ch.to_string()), &mut doc, &mut selection);
            stack.end_batch();
        }
        assert_eq!(stack.undo_levels(), 1);

        // Typing somewhere else starts a new step
        apply(&mut stack, insert(0, "x"), &mut doc, &mut selection);
        stack.end_batch();
        assert_eq!(stack.undo_levels(), 2);

        stack.undo(&mut doc, &mut selection).unwrap();
        assert_eq!(doc.string(), "abc");
        stack.undo(&mut doc, &mut selection).unwrap();
        assert_eq!(doc.string(), "");
    }

    #[test]
    fn test_selection_ops_are_not_recorded() {
        let mut stack = UndoStack::new();
        stack.record(
            &Operation::SetSelection {
                properties: None,
                new_properties: Some(Range::collapsed(Point::new([0, 0], 0))),
            },
            &None,
        );
        stack.end_batch();
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_new_batch_clears_redo() {
        let mut doc = Document::new(vec![Node::paragraph("")]);
        let mut selection = None;
        let mut stack = UndoStack::new();

        apply(&mut stack, insert(0, "a"), &mut doc, &mut selection);
        stack.end_batch();
        stack.undo(&mut doc, &mut selection).unwrap();
        assert_eq!(stack.redo_levels(), 1);

        apply(&mut stack, insert(0, "b"), &mut doc, &mut selection);
        stack.end_batch();
        assert_eq!(stack.redo_levels(), 0);
    }

    #[test]
    fn test_max_levels_enforced() {
        let mut doc = Document::new(vec![Node::paragraph("")]);
        let mut selection = None;
        let mut stack = UndoStack::with_max_levels(2);

        for i in 0..3 {
            stack.begin_batch(None);
            stack.set_batch_description(format!("Step {}", i));
            apply(&mut stack, insert(0, "x"), &mut doc, &mut selection);
            stack.end_batch();
        }

        assert_eq!(stack.undo_levels(), 2);
        assert_eq!(stack.undo_description(), Some("Step 2"));
    }
}
