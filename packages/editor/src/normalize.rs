//! Tree normalization.
//!
//! After every transform the tree is brought back to the shape the rest of
//! the crate relies on:
//!
//! - the document holds at least one block, and only blocks;
//! - every element has at least one child (an empty text if nothing else);
//! - an element holds either blocks or inline content, never both; the kind
//!   of its first child decides which, and the other kind is dropped;
//! - adjacent texts with equal marks are merged, and an empty text next to
//!   another text is removed;
//! - an inline element always has a text on each side.
//!
//! Each pass finds the first violation in document order and fixes it with
//! ordinary operations, so normalization is recorded, undoable and moves the
//! selection like any other edit.

use crate::{Editor, EditorResult};
use scribe_model::{Element, ElementType, Node, Operation, Path, Text};
use tracing::warn;

/// Upper bound on fixes per normalization, against a rule that never settles
const MAX_FIXES: usize = 10_000;

#[derive(Debug, Clone, PartialEq)]
enum Fix {
    Insert(Path, Node),
    Remove(Path),
    /// Merge the text at the path into the previous text
    Merge(Path),
}

impl Editor {
    /// Fix the tree until no rule is violated
    pub fn normalize(&mut self) -> EditorResult<()> {
        if self.normalize_depth > 0 {
            return Ok(());
        }
        self.normalize_depth += 1;
        let result = self.run_fixes();
        self.normalize_depth -= 1;
        result
    }

    fn run_fixes(&mut self) -> EditorResult<()> {
        for _ in 0..MAX_FIXES {
            let Some(fix) = find_fix(&self.document.children) else {
                return Ok(());
            };
            let op = self.fix_operation(fix)?;
            self.apply(op)?;
        }
        warn!("normalization did not settle after {} fixes", MAX_FIXES);
        Ok(())
    }

    fn fix_operation(&self, fix: Fix) -> EditorResult<Operation> {
        Ok(match fix {
            Fix::Insert(path, node) => Operation::InsertNode { path, node },
            Fix::Remove(path) => {
                let node = self.node_or_err(&path)?.clone();
                Operation::RemoveNode { path, node }
            }
            Fix::Merge(path) => {
                let node = self.node_or_err(&path)?;
                let previous = path
                    .previous()
                    .and_then(|previous| self.document.text(&previous))
                    .map(|text| text.text.len())
                    .unwrap_or_default();
                Operation::MergeNode {
                    properties: node.properties(),
                    position: previous,
                    path,
                }
            }
        })
    }

    pub(crate) fn node_or_err(&self, path: &Path) -> EditorResult<&Node> {
        self.document
            .node(path)
            .ok_or_else(|| crate::EditorError::NodeNotFound(path.clone()))
    }
}

fn find_fix(blocks: &[Node]) -> Option<Fix> {
    if blocks.is_empty() {
        return Some(Fix::Insert(
            Path::new([0]),
            Node::Element(Element::empty(ElementType::Paragraph)),
        ));
    }
    for (index, node) in blocks.iter().enumerate() {
        let path = Path::new([index]);
        match node {
            Node::Element(element) if !element.is_inline() => {
                if let Some(fix) = element_fix(element, &path) {
                    return Some(fix);
                }
            }
            _ => return Some(Fix::Remove(path)),
        }
    }
    None
}

fn element_fix(element: &Element, path: &Path) -> Option<Fix> {
    let children = &element.children;
    if children.is_empty() {
        return Some(Fix::Insert(path.child(0), Node::Text(Text::default())));
    }

    let holds_inlines = element.is_inline() || children[0].is_inline();

    for (index, child) in children.iter().enumerate() {
        let child_path = path.child(index);
        if child.is_inline() != holds_inlines {
            return Some(Fix::Remove(child_path));
        }
        let previous = index.checked_sub(1).map(|prev| &children[prev]);

        match child {
            Node::Element(inline) if inline.is_inline() => {
                if !matches!(previous, Some(Node::Text(_))) {
                    return Some(Fix::Insert(child_path, Node::Text(Text::default())));
                }
                if index + 1 == children.len() {
                    return Some(Fix::Insert(path.child(index + 1), Node::Text(Text::default())));
                }
            }
            Node::Text(text) => {
                if let Some(Node::Text(prev)) = previous {
                    if prev.marks == text.marks {
                        return Some(Fix::Merge(child_path));
                    }
                    if prev.text.is_empty() {
                        return Some(Fix::Remove(path.child(index - 1)));
                    }
                    if text.text.is_empty() {
                        return Some(Fix::Remove(child_path));
                    }
                }
            }
            Node::Element(_) => {}
        }
    }

    children.iter().enumerate().find_map(|(index, child)| match child {
        Node::Element(inner) => element_fix(inner, &path.child(index)),
        Node::Text(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_model::{Mark, Marks, Properties};

    fn merged_properties(fix: &Operation) -> Option<&Properties> {
        match fix {
            Operation::MergeNode { properties, .. } => Some(properties),
            _ => None,
        }
    }

    fn bold(text: &str) -> Node {
        Node::Text(Text::with_marks(text, Marks::new().with(Mark::Bold)))
    }

    #[test]
    fn test_empty_document_gets_paragraph() {
        let editor = Editor::from_nodes(Vec::new());
        assert_eq!(editor.children().len(), 1);
        assert!(editor.children()[0].is_kind(ElementType::Paragraph));
    }

    #[test]
    fn test_top_level_text_is_removed() {
        let editor = Editor::from_nodes(vec![Node::text("stray"), Node::paragraph("kept")]);
        assert_eq!(editor.children(), &[Node::paragraph("kept")]);
    }

    #[test]
    fn test_equal_texts_merge_and_empty_texts_drop() {
        let editor = Editor::from_nodes(vec![Node::element(
            ElementType::Paragraph,
            vec![Node::text("a"), Node::text("b"), bold("c"), Node::text("")],
        )]);
        assert_eq!(
            editor.children()[0].children().unwrap(),
            &vec![Node::text("ab"), bold("c")]
        );
    }

    #[test]
    fn test_inline_gets_text_on_both_sides() {
        let editor = Editor::from_nodes(vec![Node::element(
            ElementType::Paragraph,
            vec![Node::Element(Element::link("https://a.io", vec![Node::text("a")]))],
        )]);
        let children = editor.children()[0].children().unwrap();
        assert_eq!(children.len(), 3);
        assert_eq!(children[0], Node::text(""));
        assert!(children[1].is_kind(ElementType::Link));
        assert_eq!(children[2], Node::text(""));
    }

    #[test]
    fn test_block_container_drops_inline_children() {
        let editor = Editor::from_nodes(vec![Node::element(
            ElementType::QuoteBlock,
            vec![Node::paragraph("a"), Node::text("stray")],
        )]);
        assert_eq!(
            editor.children(),
            &[Node::element(ElementType::QuoteBlock, vec![Node::paragraph("a")])]
        );
    }

    #[test]
    fn test_empty_element_gets_text() {
        let editor = Editor::from_nodes(vec![Node::Element(Element::wrapper(ElementType::ListItem))]);
        assert_eq!(editor.children()[0].children().unwrap(), &vec![Node::text("")]);
    }

    #[test]
    fn test_merge_operation_keeps_left_marks() {
        let editor = Editor::from_nodes(vec![Node::element(
            ElementType::Paragraph,
            vec![Node::text("a"), bold("b")],
        )]);
        let op = editor.fix_operation(Fix::Merge(Path::new([0, 1]))).unwrap();
        assert_eq!(
            merged_properties(&op),
            Some(&Properties::Text(Marks::new().with(Mark::Bold)))
        );
    }
}
