//! # Operations
//!
//! The primitive, invertible edits a document goes through. Higher-level
//! commands (toggle a list, insert an image) are sequences of these, which is
//! what makes undo and reference re-basing work.
//!
//! Applying an operation also moves the selection along with the edit. When the
//! node holding a selection edge is removed, the edge falls back to the nearest
//! surviving text leaf.

use crate::{Document, MutationError, MutationResult, Node, Path, Point, Properties, Range};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
    InsertNode {
        path: Path,
        node: Node,
    },
    RemoveNode {
        path: Path,
        node: Node,
    },
    InsertText {
        path: Path,
        offset: usize,
        text: String,
    },
    RemoveText {
        path: Path,
        offset: usize,
        text: String,
    },
    /// Merge the node at `path` into its previous sibling. `position` is the
    /// length (bytes or children) of that sibling before the merge.
    MergeNode {
        path: Path,
        position: usize,
        properties: Properties,
    },
    /// Split the node at `path` at `position`; the right half gets `properties`
    SplitNode {
        path: Path,
        position: usize,
        properties: Properties,
    },
    MoveNode {
        path: Path,
        new_path: Path,
    },
    SetNode {
        path: Path,
        properties: Properties,
        new_properties: Properties,
    },
    SetSelection {
        properties: Option<Range>,
        new_properties: Option<Range>,
    },
}

impl Operation {
    pub fn is_selection_op(&self) -> bool {
        matches!(self, Operation::SetSelection { .. })
    }

    pub fn is_text_op(&self) -> bool {
        matches!(self, Operation::InsertText { .. } | Operation::RemoveText { .. })
    }

    /// The operation that undoes this one
    pub fn inverse(&self) -> Operation {
        match self {
            Operation::InsertNode { path, node } => Operation::RemoveNode {
                path: path.clone(),
                node: node.clone(),
            },
            Operation::RemoveNode { path, node } => Operation::InsertNode {
                path: path.clone(),
                node: node.clone(),
            },
            Operation::InsertText { path, offset, text } => Operation::RemoveText {
                path: path.clone(),
                offset: *offset,
                text: text.clone(),
            },
            Operation::RemoveText { path, offset, text } => Operation::InsertText {
                path: path.clone(),
                offset: *offset,
                text: text.clone(),
            },
            Operation::MergeNode {
                path,
                position,
                properties,
            } => Operation::SplitNode {
                path: path.previous().unwrap_or_else(|| path.clone()),
                position: *position,
                properties: properties.clone(),
            },
            Operation::SplitNode {
                path,
                position,
                properties,
            } => Operation::MergeNode {
                path: path.next().unwrap_or_else(|| path.clone()),
                position: *position,
                properties: properties.clone(),
            },
            Operation::MoveNode { path, new_path } => {
                if path == new_path {
                    return self.clone();
                }
                if path.is_sibling(new_path) {
                    return Operation::MoveNode {
                        path: new_path.clone(),
                        new_path: path.clone(),
                    };
                }
                // Where the node ended up, and where its old slot now sits
                let moved = path.transform(self, Default::default()).unwrap_or_else(|| new_path.clone());
                let origin = path
                    .next()
                    .and_then(|next| next.transform(self, Default::default()))
                    .unwrap_or_else(|| path.clone());
                Operation::MoveNode {
                    path: moved,
                    new_path: origin,
                }
            }
            Operation::SetNode {
                path,
                properties,
                new_properties,
            } => Operation::SetNode {
                path: path.clone(),
                properties: new_properties.clone(),
                new_properties: properties.clone(),
            },
            Operation::SetSelection {
                properties,
                new_properties,
            } => Operation::SetSelection {
                properties: new_properties.clone(),
                new_properties: properties.clone(),
            },
        }
    }

    /// Apply to `doc`, moving `selection` along with the change
    pub fn apply(&self, doc: &mut Document, selection: &mut Option<Range>) -> MutationResult<()> {
        match self {
            Operation::InsertNode { path, node } => {
                let (parent, index) = split_path(path)?;
                let siblings = doc
                    .children_at_mut(&parent)
                    .ok_or_else(|| MutationError::ParentNotFound(path.clone()))?;
                if index > siblings.len() {
                    return Err(MutationError::NodeNotFound(path.clone()));
                }
                siblings.insert(index, node.clone());
            }

            Operation::RemoveNode { path, .. } => {
                let (parent, index) = split_path(path)?;
                let siblings = doc
                    .children_at_mut(&parent)
                    .ok_or_else(|| MutationError::ParentNotFound(path.clone()))?;
                if index >= siblings.len() {
                    return Err(MutationError::NodeNotFound(path.clone()));
                }
                siblings.remove(index);

                if let Some(range) = selection.take() {
                    *selection = relocate_after_removal(doc, &range, self, path);
                }
                return Ok(());
            }

            Operation::InsertText { path, offset, text } => {
                let leaf = text_mut(doc, path)?;
                if !leaf.text.is_char_boundary(*offset) {
                    return Err(MutationError::OffsetOutOfBounds {
                        path: path.clone(),
                        offset: *offset,
                    });
                }
                leaf.text.insert_str(*offset, text);
            }

            Operation::RemoveText { path, offset, text } => {
                if text.is_empty() {
                    return Ok(());
                }
                let leaf = text_mut(doc, path)?;
                let end = offset + text.len();
                if end > leaf.text.len()
                    || !leaf.text.is_char_boundary(*offset)
                    || !leaf.text.is_char_boundary(end)
                {
                    return Err(MutationError::OffsetOutOfBounds {
                        path: path.clone(),
                        offset: *offset,
                    });
                }
                leaf.text.replace_range(*offset..end, "");
            }

            Operation::MergeNode { path, .. } => {
                let (parent, index) = split_path(path)?;
                if index == 0 {
                    return Err(MutationError::IncompatibleMerge(path.clone()));
                }
                let siblings = doc
                    .children_at_mut(&parent)
                    .ok_or_else(|| MutationError::ParentNotFound(path.clone()))?;
                if index >= siblings.len() {
                    return Err(MutationError::NodeNotFound(path.clone()));
                }
                let compatible = matches!(
                    (&siblings[index - 1], &siblings[index]),
                    (Node::Text(_), Node::Text(_)) | (Node::Element(_), Node::Element(_))
                );
                if !compatible {
                    return Err(MutationError::IncompatibleMerge(path.clone()));
                }
                let node = siblings.remove(index);
                match (&mut siblings[index - 1], node) {
                    (Node::Text(prev), Node::Text(text)) => prev.text.push_str(&text.text),
                    (Node::Element(prev), Node::Element(element)) => {
                        prev.children.extend(element.children)
                    }
                    _ => unreachable!("compatibility checked above"),
                }
            }

            Operation::SplitNode {
                path,
                position,
                properties,
            } => {
                let (parent, index) = split_path(path)?;
                let siblings = doc
                    .children_at_mut(&parent)
                    .ok_or_else(|| MutationError::ParentNotFound(path.clone()))?;
                let node = siblings
                    .get_mut(index)
                    .ok_or_else(|| MutationError::NodeNotFound(path.clone()))?;
                let mut right = Node::from_properties(properties.clone());
                match (node, &mut right) {
                    (Node::Text(text), Node::Text(after)) => {
                        if *position > text.text.len() || !text.text.is_char_boundary(*position) {
                            return Err(MutationError::OffsetOutOfBounds {
                                path: path.clone(),
                                offset: *position,
                            });
                        }
                        after.text = text.text.split_off(*position);
                    }
                    (Node::Element(element), Node::Element(after)) => {
                        if *position > element.children.len() {
                            return Err(MutationError::OffsetOutOfBounds {
                                path: path.clone(),
                                offset: *position,
                            });
                        }
                        after.children = element.children.split_off(*position);
                    }
                    (Node::Text(_), _) => return Err(MutationError::NotAnElement(path.clone())),
                    (Node::Element(_), _) => return Err(MutationError::NotText(path.clone())),
                }
                siblings.insert(index + 1, right);
            }

            Operation::MoveNode { path, new_path } => {
                if path == new_path {
                    return Ok(());
                }
                if path.is_ancestor_of(new_path) {
                    return Err(MutationError::CycleDetected {
                        from: path.clone(),
                        to: new_path.clone(),
                    });
                }
                let (parent, index) = split_path(path)?;
                let node = {
                    let siblings = doc
                        .children_at_mut(&parent)
                        .ok_or_else(|| MutationError::ParentNotFound(path.clone()))?;
                    if index >= siblings.len() {
                        return Err(MutationError::NodeNotFound(path.clone()));
                    }
                    siblings.remove(index)
                };
                let target = path
                    .transform(self, Default::default())
                    .ok_or_else(|| MutationError::NodeNotFound(new_path.clone()))?;
                let (new_parent, new_index) = split_path(&target)?;
                let siblings = doc
                    .children_at_mut(&new_parent)
                    .ok_or_else(|| MutationError::ParentNotFound(new_path.clone()))?;
                if new_index > siblings.len() {
                    return Err(MutationError::NodeNotFound(new_path.clone()));
                }
                siblings.insert(new_index, node);
            }

            Operation::SetNode {
                path,
                new_properties,
                ..
            } => {
                if path.is_root() {
                    return Err(MutationError::RootPath);
                }
                let node = doc
                    .node_mut(path)
                    .ok_or_else(|| MutationError::NodeNotFound(path.clone()))?;
                if !node.set_properties(new_properties.clone()) {
                    return Err(match new_properties {
                        Properties::Element(_) => MutationError::NotAnElement(path.clone()),
                        Properties::Text(_) => MutationError::NotText(path.clone()),
                    });
                }
            }

            Operation::SetSelection { new_properties, .. } => {
                *selection = new_properties.clone();
                return Ok(());
            }
        }

        if let Some(range) = selection.as_mut() {
            if let Some(moved) = range.transform(self, Default::default()) {
                *range = moved;
            }
        }
        Ok(())
    }
}

fn split_path(path: &Path) -> MutationResult<(Path, usize)> {
    match (path.parent(), path.last()) {
        (Some(parent), Some(index)) => Ok((parent, index)),
        _ => Err(MutationError::RootPath),
    }
}

fn text_mut<'a>(doc: &'a mut Document, path: &Path) -> MutationResult<&'a mut crate::Text> {
    doc.node_mut(path)
        .ok_or_else(|| MutationError::NodeNotFound(path.clone()))?
        .as_text_mut()
        .ok_or_else(|| MutationError::NotText(path.clone()))
}

// Edges inside the removed subtree move to the closest remaining leaf. The
// previous leaf wins unless the next one shares a deeper ancestor with the
// removed path.
fn relocate_after_removal(
    doc: &Document,
    range: &Range,
    op: &Operation,
    removed: &Path,
) -> Option<Range> {
    let fallback = || -> Option<Point> {
        let mut prev: Option<(Path, usize)> = None;
        let mut next: Option<Path> = None;
        for (path, text) in doc.texts() {
            if path.is_before(removed) {
                prev = Some((path, text.text.len()));
            } else {
                next = Some(path);
                break;
            }
        }

        let prefer_next = match (&prev, &next) {
            (Some((prev_path, _)), Some(next_path)) => {
                if next_path == removed {
                    !next_path.has_previous()
                } else {
                    prev_path.common(removed).len() < next_path.common(removed).len()
                }
            }
            _ => false,
        };

        match (prev, next) {
            (Some((path, len)), _) if !prefer_next => Some(Point::new(path, len)),
            (_, Some(path)) => Some(Point::new(path, 0)),
            _ => None,
        }
    };

    let anchor = match range.anchor.transform(op, Default::default()) {
        Some(point) => point,
        None => fallback()?,
    };
    let focus = match range.focus.transform(op, Default::default()) {
        Some(point) => point,
        None => fallback()?,
    };
    Some(Range::new(anchor, focus))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElementAttrs, ElementType, Marks};

    fn doc() -> Document {
        Document::new(vec![Node::paragraph("hello"), Node::paragraph("world")])
    }

    fn apply_all(doc: &mut Document, ops: &[Operation]) {
        let mut selection = None;
        for op in ops {
            op.apply(doc, &mut selection).unwrap();
        }
    }

    #[test]
    fn test_split_and_merge_are_inverse() {
        let mut document = doc();
        let split = Operation::SplitNode {
            path: Path::from([0, 0]),
            position: 2,
            properties: Properties::Text(Marks::default()),
        };
        apply_all(&mut document, &[split.clone()]);
        assert_eq!(document.node(&Path::from([0, 1])).unwrap().string(), "llo");

        apply_all(&mut document, &[split.inverse()]);
        assert_eq!(document, self::doc());
    }

    #[test]
    fn test_move_inverse_restores_tree() {
        let original = Document::new(vec![
            Node::paragraph("a"),
            Node::Element(crate::Element::wrapper(ElementType::QuoteBlock)),
            Node::paragraph("b"),
        ]);
        let mut document = original.clone();
        let op = Operation::MoveNode {
            path: Path::from([0]),
            new_path: Path::from([1, 0]),
        };
        apply_all(&mut document, &[op.clone()]);
        assert_eq!(document.children.len(), 2);
        assert_eq!(document.node(&Path::from([0, 0])).unwrap().string(), "a");

        apply_all(&mut document, &[op.inverse()]);
        assert_eq!(document, original);
    }

    #[test]
    fn test_remove_node_moves_selection_to_previous_text() {
        let mut document = doc();
        let mut selection = Some(Range::collapsed(Point::new([1, 0], 2)));
        let op = Operation::RemoveNode {
            path: Path::from([1]),
            node: Node::paragraph("world"),
        };
        op.apply(&mut document, &mut selection).unwrap();
        assert_eq!(selection, Some(Range::collapsed(Point::new([0, 0], 5))));
    }

    #[test]
    fn test_insert_text_shifts_selection() {
        let mut document = doc();
        let mut selection = Some(Range::collapsed(Point::new([0, 0], 5)));
        Operation::InsertText {
            path: Path::from([0, 0]),
            offset: 5,
            text: "!".to_string(),
        }
        .apply(&mut document, &mut selection)
        .unwrap();
        assert_eq!(document.string(), "hello!world");
        assert_eq!(selection.unwrap().focus.offset, 6);
    }

    #[test]
    fn test_set_node_rejects_mismatched_properties() {
        let mut document = doc();
        let op = Operation::SetNode {
            path: Path::from([0, 0]),
            properties: Properties::Text(Marks::default()),
            new_properties: Properties::Element(ElementAttrs::new(ElementType::Paragraph)),
        };
        assert_eq!(
            op.apply(&mut document, &mut None),
            Err(MutationError::NotAnElement(Path::from([0, 0])))
        );
    }

    #[test]
    fn test_remove_text_checks_bounds() {
        let mut document = doc();
        let op = Operation::RemoveText {
            path: Path::from([0, 0]),
            offset: 3,
            text: "lo!".to_string(),
        };
        assert!(matches!(
            op.apply(&mut document, &mut None),
            Err(MutationError::OffsetOutOfBounds { .. })
        ));
    }
}
