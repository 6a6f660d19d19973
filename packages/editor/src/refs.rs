//! References that follow the document through edits.
//!
//! A ref remembers a location and how many operations it has already seen.
//! Reading it replays the operations applied since then, so a command can
//! hold on to "the block I started in" across splits, moves and removals.
//! A ref whose node was removed reads as `None`.

use crate::Editor;
use scribe_model::{Affinity, Operation, Path, Point, Range};

#[derive(Debug, Clone, PartialEq)]
pub struct PathRef {
    current: Option<Path>,
    affinity: Affinity,
    seen: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointRef {
    current: Option<Point>,
    affinity: Affinity,
    seen: usize,
}

/// Range ref; edges move inward so the range never grows over inserted content
#[derive(Debug, Clone, PartialEq)]
pub struct RangeRef {
    current: Option<Range>,
    seen: usize,
}

impl PathRef {
    pub(crate) fn new(path: Path, affinity: Affinity, seen: usize) -> Self {
        Self {
            current: Some(path),
            affinity,
            seen,
        }
    }

    pub fn current(&mut self, editor: &Editor) -> Option<Path> {
        let affinity = self.affinity;
        for op in editor.operations_since(&mut self.seen) {
            self.current = self.current.take().and_then(|path| path.transform(op, affinity));
        }
        self.current.clone()
    }

    /// Point the ref somewhere else from now on
    pub fn set(&mut self, editor: &Editor, path: Option<Path>) {
        self.current(editor);
        self.current = path;
    }
}

impl PointRef {
    pub(crate) fn new(point: Point, affinity: Affinity, seen: usize) -> Self {
        Self {
            current: Some(point),
            affinity,
            seen,
        }
    }

    pub fn current(&mut self, editor: &Editor) -> Option<Point> {
        let affinity = self.affinity;
        for op in editor.operations_since(&mut self.seen) {
            self.current = self.current.take().and_then(|point| point.transform(op, affinity));
        }
        self.current.clone()
    }
}

impl RangeRef {
    pub(crate) fn new(range: Range, seen: usize) -> Self {
        Self {
            current: Some(range),
            seen,
        }
    }

    pub fn current(&mut self, editor: &Editor) -> Option<Range> {
        for op in editor.operations_since(&mut self.seen) {
            self.current = self.current.take().and_then(|range| range.transform_inward(op));
        }
        self.current.clone()
    }
}

/// Operations a ref has not seen yet; advances `seen`
pub(crate) fn unseen<'a>(log: &'a [Operation], base: usize, seen: &mut usize) -> &'a [Operation] {
    let start = seen.saturating_sub(base).min(log.len());
    *seen = base + log.len();
    &log[start..]
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_model::{Document, Node};

    #[test]
    fn test_unseen_advances() {
        let ops = vec![Operation::InsertText {
            path: Path::new([0, 0]),
            offset: 0,
            text: "a".to_string(),
        }];
        let mut seen = 0;
        assert_eq!(unseen(&ops, 0, &mut seen).len(), 1);
        assert_eq!(seen, 1);
        assert!(unseen(&ops, 0, &mut seen).is_empty());
    }

    #[test]
    fn test_path_ref_follows_insert_and_dies_on_remove() {
        let mut editor = Editor::new(Document::new(vec![Node::paragraph("a"), Node::paragraph("b")]));
        let mut r = editor.path_ref(Path::new([1]), Affinity::Forward);

        editor
            .insert_nodes(vec![Node::paragraph("new")], crate::NodeOptions::new().at(Path::new([0])))
            .unwrap();
        assert_eq!(r.current(&editor), Some(Path::new([2])));

        editor
            .remove_nodes(crate::NodeOptions::new().at(Path::new([2])))
            .unwrap();
        assert_eq!(r.current(&editor), None);
    }
}
