//! Node addresses.
//!
//! A path is the list of child indexes leading from the document root to a node.
//! [`Path::compare`] orders paths in document order and treats an ancestor as
//! equal to its descendants, which makes "is this node inside the span" checks a
//! pair of comparisons.

use crate::Operation;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;

/// How a reference sitting exactly on an edit boundary should move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Affinity {
    #[default]
    Forward,
    Backward,
    /// Drop the reference when it sits on the boundary
    None,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<usize>);

impl Path {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(indexes: impl Into<Vec<usize>>) -> Self {
        Self(indexes.into())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn parent(&self) -> Option<Path> {
        let (_, rest) = self.0.split_last()?;
        Some(Path(rest.to_vec()))
    }

    pub fn child(&self, index: usize) -> Path {
        let mut indexes = self.0.clone();
        indexes.push(index);
        Path(indexes)
    }

    pub fn next(&self) -> Option<Path> {
        let mut indexes = self.0.clone();
        *indexes.last_mut()? += 1;
        Some(Path(indexes))
    }

    pub fn previous(&self) -> Option<Path> {
        let mut indexes = self.0.clone();
        let last = indexes.last_mut()?;
        *last = last.checked_sub(1)?;
        Some(Path(indexes))
    }

    pub fn has_previous(&self) -> bool {
        self.last().is_some_and(|index| index > 0)
    }

    /// First `len` indexes
    pub fn slice(&self, len: usize) -> Path {
        Path(self.0[..len.min(self.0.len())].to_vec())
    }

    pub fn concat(&self, tail: &[usize]) -> Path {
        let mut indexes = self.0.clone();
        indexes.extend_from_slice(tail);
        Path(indexes)
    }

    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    pub fn is_descendant_of(&self, other: &Path) -> bool {
        other.is_ancestor_of(self)
    }

    pub fn is_sibling(&self, other: &Path) -> bool {
        self.0.len() == other.0.len()
            && !self.0.is_empty()
            && self != other
            && self.parent() == other.parent()
    }

    /// True when `self` is an earlier sibling of `other` or of one of its ancestors
    pub fn ends_before(&self, other: &Path) -> bool {
        let Some((&last, head)) = self.0.split_last() else {
            return false;
        };
        let depth = head.len();
        other.0.len() > depth && other.0[..depth] == *head && last < other.0[depth]
    }

    /// Document order; a path and any of its ancestors compare equal
    pub fn compare(&self, other: &Path) -> Ordering {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            match a.cmp(b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }

    pub fn is_before(&self, other: &Path) -> bool {
        self.compare(other) == Ordering::Less
    }

    pub fn is_after(&self, other: &Path) -> bool {
        self.compare(other) == Ordering::Greater
    }

    /// Longest shared prefix
    pub fn common(&self, other: &Path) -> Path {
        let shared = self
            .0
            .iter()
            .zip(other.0.iter())
            .take_while(|(a, b)| a == b)
            .count();
        self.slice(shared)
    }

    /// Ancestors from the root down to the parent
    pub fn ancestors(&self) -> impl Iterator<Item = Path> + '_ {
        (0..self.0.len()).map(|len| self.slice(len))
    }

    /// Re-base this path through an operation; `None` when the node is gone
    pub fn transform(&self, op: &Operation, affinity: Affinity) -> Option<Path> {
        let mut p = self.0.clone();
        match op {
            Operation::InsertNode { path: op_path, .. } => {
                if op_path == self || op_path.ends_before(self) || op_path.is_ancestor_of(self) {
                    p[op_path.len() - 1] += 1;
                }
            }
            Operation::RemoveNode { path: op_path, .. } => {
                if op_path == self || op_path.is_ancestor_of(self) {
                    return None;
                }
                if op_path.ends_before(self) {
                    p[op_path.len() - 1] -= 1;
                }
            }
            Operation::MergeNode {
                path: op_path,
                position,
                ..
            } => {
                if op_path == self || op_path.ends_before(self) {
                    p[op_path.len() - 1] -= 1;
                } else if op_path.is_ancestor_of(self) {
                    p[op_path.len() - 1] -= 1;
                    p[op_path.len()] += position;
                }
            }
            Operation::SplitNode {
                path: op_path,
                position,
                ..
            } => {
                if op_path == self {
                    match affinity {
                        Affinity::Forward => *p.last_mut()? += 1,
                        Affinity::Backward => {}
                        Affinity::None => return None,
                    }
                } else if op_path.ends_before(self) {
                    p[op_path.len() - 1] += 1;
                } else if op_path.is_ancestor_of(self) && self.0[op_path.len()] >= *position {
                    p[op_path.len() - 1] += 1;
                    p[op_path.len()] -= position;
                }
            }
            Operation::MoveNode {
                path: op_path,
                new_path,
            } => {
                if op_path == new_path {
                    return Some(self.clone());
                }
                if op_path.is_ancestor_of(self) || op_path == self {
                    let mut target = new_path.0.clone();
                    if op_path.ends_before(new_path) && op_path.len() < new_path.len() {
                        target[op_path.len() - 1] -= 1;
                    }
                    target.extend_from_slice(&self.0[op_path.len()..]);
                    return Some(Path(target));
                } else if op_path.is_sibling(new_path)
                    && (new_path.is_ancestor_of(self) || new_path == self)
                {
                    if op_path.ends_before(self) {
                        p[op_path.len() - 1] -= 1;
                    } else {
                        p[op_path.len() - 1] += 1;
                    }
                } else if new_path.ends_before(self)
                    || new_path == self
                    || new_path.is_ancestor_of(self)
                {
                    if op_path.ends_before(self) {
                        p[op_path.len() - 1] -= 1;
                    }
                    p[new_path.len() - 1] += 1;
                } else if op_path.ends_before(self) {
                    if new_path == self {
                        p[new_path.len() - 1] += 1;
                    }
                    p[op_path.len() - 1] -= 1;
                }
            }
            Operation::InsertText { .. }
            | Operation::RemoveText { .. }
            | Operation::SetNode { .. }
            | Operation::SetSelection { .. } => {}
        }
        Some(Path(p))
    }
}

impl Deref for Path {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<usize>> for Path {
    fn from(indexes: Vec<usize>) -> Self {
        Path(indexes)
    }
}

impl From<&[usize]> for Path {
    fn from(indexes: &[usize]) -> Self {
        Path(indexes.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Path {
    fn from(indexes: [usize; N]) -> Self {
        Path(indexes.to_vec())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}
