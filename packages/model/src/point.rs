use crate::{Affinity, Operation, Path};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A position inside a text leaf. `offset` is a byte offset on a char boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub path: Path,
    pub offset: usize,
}

/// A selection: `anchor` is where it started, `focus` where it ends
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub anchor: Point,
    pub focus: Point,
}

impl Point {
    pub fn new(path: impl Into<Path>, offset: usize) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }

    pub fn compare(&self, other: &Point) -> Ordering {
        match self.path.compare(&other.path) {
            Ordering::Equal => self.offset.cmp(&other.offset),
            unequal => unequal,
        }
    }

    pub fn is_before(&self, other: &Point) -> bool {
        self.compare(other) == Ordering::Less
    }

    pub fn is_after(&self, other: &Point) -> bool {
        self.compare(other) == Ordering::Greater
    }

    /// Re-base this point through an operation; `None` when its leaf is gone
    pub fn transform(&self, op: &Operation, affinity: Affinity) -> Option<Point> {
        let mut path = self.path.clone();
        let mut offset = self.offset;

        match op {
            Operation::InsertText {
                path: op_path,
                offset: at,
                text,
            } => {
                if *op_path == path && (*at < offset || (*at == offset && affinity == Affinity::Forward)) {
                    offset += text.len();
                }
            }
            Operation::RemoveText {
                path: op_path,
                offset: at,
                text,
            } => {
                if *op_path == path && *at <= offset {
                    offset -= (offset - at).min(text.len());
                }
            }
            Operation::MergeNode {
                path: op_path,
                position,
                ..
            } => {
                if *op_path == path {
                    offset += position;
                }
                path = path.transform(op, affinity)?;
            }
            Operation::RemoveNode { path: op_path, .. } => {
                if *op_path == path || op_path.is_ancestor_of(&path) {
                    return None;
                }
                path = path.transform(op, affinity)?;
            }
            Operation::SplitNode {
                path: op_path,
                position,
                ..
            } => {
                if *op_path == path {
                    if *position == offset && affinity == Affinity::None {
                        return None;
                    }
                    if *position < offset || (*position == offset && affinity == Affinity::Forward) {
                        offset -= position;
                        path = path.next()?;
                    }
                } else {
                    path = path.transform(op, affinity)?;
                }
            }
            _ => {
                path = path.transform(op, affinity)?;
            }
        }

        Some(Point { path, offset })
    }
}

impl Range {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn is_expanded(&self) -> bool {
        !self.is_collapsed()
    }

    pub fn is_backward(&self) -> bool {
        self.anchor.is_after(&self.focus)
    }

    /// (start, end) in document order
    pub fn edges(&self) -> (Point, Point) {
        if self.is_backward() {
            (self.focus.clone(), self.anchor.clone())
        } else {
            (self.anchor.clone(), self.focus.clone())
        }
    }

    pub fn start(&self) -> Point {
        self.edges().0
    }

    pub fn end(&self) -> Point {
        self.edges().1
    }

    pub fn includes_point(&self, point: &Point) -> bool {
        let (start, end) = self.edges();
        !point.is_before(&start) && !point.is_after(&end)
    }

    pub fn intersection(&self, other: &Range) -> Option<Range> {
        let (s1, e1) = self.edges();
        let (s2, e2) = other.edges();
        let start = if s1.is_before(&s2) { s2 } else { s1 };
        let end = if e1.is_before(&e2) { e1 } else { e2 };
        if end.is_before(&start) {
            None
        } else {
            Some(Range::new(start, end))
        }
    }

    /// Re-base both edges, keeping them inside the original span
    pub fn transform_inward(&self, op: &Operation) -> Option<Range> {
        let collapsed = self.is_collapsed();
        let (anchor_affinity, focus_affinity) = if self.is_backward() {
            (Affinity::Backward, if collapsed { Affinity::Backward } else { Affinity::Forward })
        } else {
            (Affinity::Forward, if collapsed { Affinity::Forward } else { Affinity::Backward })
        };
        Some(Range {
            anchor: self.anchor.transform(op, anchor_affinity)?,
            focus: self.focus.transform(op, focus_affinity)?,
        })
    }

    pub fn transform(&self, op: &Operation, affinity: Affinity) -> Option<Range> {
        Some(Range {
            anchor: self.anchor.transform(op, affinity)?,
            focus: self.focus.transform(op, affinity)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Marks, Properties};

    #[test]
    fn test_edges_and_collapse() {
        let range = Range::new(Point::new([0, 0], 4), Point::new([0, 0], 1));
        assert!(range.is_backward());
        assert_eq!(range.start(), Point::new([0, 0], 1));
        assert!(!range.is_collapsed());
        assert!(Range::collapsed(Point::new([1, 0], 0)).is_collapsed());
    }

    #[test]
    fn test_insert_text_affinity() {
        let op = Operation::InsertText {
            path: Path::from([0, 0]),
            offset: 2,
            text: "ab".to_string(),
        };
        let point = Point::new([0, 0], 2);
        assert_eq!(point.transform(&op, Affinity::Forward).unwrap().offset, 4);
        assert_eq!(point.transform(&op, Affinity::Backward).unwrap().offset, 2);
    }

    #[test]
    fn test_split_moves_point_to_next_leaf() {
        let op = Operation::SplitNode {
            path: Path::from([0, 0]),
            position: 3,
            properties: Properties::Text(Marks::default()),
        };
        let point = Point::new([0, 0], 5);
        assert_eq!(point.transform(&op, Affinity::Forward), Some(Point::new([0, 1], 2)));
        let edge = Point::new([0, 0], 3);
        assert_eq!(edge.transform(&op, Affinity::Backward), Some(Point::new([0, 0], 3)));
        assert_eq!(edge.transform(&op, Affinity::Forward), Some(Point::new([0, 1], 0)));
    }

    #[test]
    fn test_intersection() {
        let a = Range::new(Point::new([0, 0], 0), Point::new([2, 0], 0));
        let b = Range::new(Point::new([1, 0], 3), Point::new([4, 0], 0));
        let both = a.intersection(&b).unwrap();
        assert_eq!(both.start(), Point::new([1, 0], 3));
        assert_eq!(both.end(), Point::new([2, 0], 0));
    }
}
