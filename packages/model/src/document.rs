use crate::{Element, ElementType, Node, Path, Text};
use serde::{Deserialize, Serialize};

/// Root of the tree: an ordered list of top-level blocks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub children: Vec<Node>,
}

impl Default for Document {
    /// A single empty paragraph, the smallest valid document
    fn default() -> Self {
        Self {
            children: vec![Node::Element(Element::empty(ElementType::Paragraph))],
        }
    }
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    pub fn node(&self, path: &Path) -> Option<&Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.children.get(*first)?;
        for index in rest {
            node = node.children()?.get(*index)?;
        }
        Some(node)
    }

    pub fn node_mut(&mut self, path: &Path) -> Option<&mut Node> {
        let (first, rest) = path.split_first()?;
        let mut node = self.children.get_mut(*first)?;
        for index in rest {
            node = node.children_mut()?.get_mut(*index)?;
        }
        Some(node)
    }

    /// Children of the node at `path`; the root path yields the top-level blocks
    pub fn children_at(&self, path: &Path) -> Option<&Vec<Node>> {
        if path.is_root() {
            return Some(&self.children);
        }
        self.node(path)?.children()
    }

    pub fn children_at_mut(&mut self, path: &Path) -> Option<&mut Vec<Node>> {
        if path.is_root() {
            return Some(&mut self.children);
        }
        self.node_mut(path)?.children_mut()
    }

    pub fn element(&self, path: &Path) -> Option<&Element> {
        self.node(path)?.as_element()
    }

    pub fn text(&self, path: &Path) -> Option<&Text> {
        self.node(path)?.as_text()
    }

    /// Every node with its path, in document (pre-)order
    pub fn descendants(&self) -> Vec<(Path, &Node)> {
        let mut out = Vec::new();
        collect(&self.children, &Path::root(), &mut |path, node| out.push((path, node)));
        out
    }

    /// Descendants of the node at `path` (excluding the node itself)
    pub fn descendants_of(&self, path: &Path) -> Vec<(Path, &Node)> {
        let mut out = Vec::new();
        if let Some(children) = self.children_at(path) {
            collect(children, path, &mut |path, node| out.push((path, node)));
        }
        out
    }

    /// Text leaves in document order
    pub fn texts(&self) -> Vec<(Path, &Text)> {
        self.descendants()
            .into_iter()
            .filter_map(|(path, node)| node.as_text().map(|text| (path, text)))
            .collect()
    }

    /// First text leaf at or below `path`
    pub fn first_text(&self, path: &Path) -> Option<(Path, &Text)> {
        let mut path = path.clone();
        loop {
            match self.node_or_root(&path)? {
                NodeRef::Text(text) => return Some((path, text)),
                NodeRef::Children(children) => {
                    if children.is_empty() {
                        return None;
                    }
                    path = path.child(0);
                }
            }
        }
    }

    /// Last text leaf at or below `path`
    pub fn last_text(&self, path: &Path) -> Option<(Path, &Text)> {
        let mut path = path.clone();
        loop {
            match self.node_or_root(&path)? {
                NodeRef::Text(text) => return Some((path, text)),
                NodeRef::Children(children) => {
                    let last = children.len().checked_sub(1)?;
                    path = path.child(last);
                }
            }
        }
    }

    /// Concatenated text of the whole document
    pub fn string(&self) -> String {
        self.children.iter().map(Node::string).collect()
    }

    pub fn has_path(&self, path: &Path) -> bool {
        path.is_root() || self.node(path).is_some()
    }

    fn node_or_root(&self, path: &Path) -> Option<NodeRef<'_>> {
        if path.is_root() {
            return Some(NodeRef::Children(&self.children));
        }
        match self.node(path)? {
            Node::Text(text) => Some(NodeRef::Text(text)),
            Node::Element(element) => Some(NodeRef::Children(&element.children)),
        }
    }
}

enum NodeRef<'a> {
    Text(&'a Text),
    Children(&'a Vec<Node>),
}

fn collect<'a>(children: &'a [Node], parent: &Path, visit: &mut impl FnMut(Path, &'a Node)) {
    for (index, child) in children.iter().enumerate() {
        let path = parent.child(index);
        visit(path.clone(), child);
        if let Node::Element(element) = child {
            collect(&element.children, &path, visit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Document {
        Document::new(vec![
            Node::paragraph("one"),
            Node::element(
                ElementType::UnorderedList,
                vec![
                    Node::element(ElementType::ListItem, vec![Node::text("two")]),
                    Node::element(ElementType::ListItem, vec![Node::text("three")]),
                ],
            ),
        ])
    }

    #[test]
    fn test_lookup() {
        let doc = sample();
        assert_eq!(doc.text(&Path::from([1, 1, 0])).unwrap().text, "three");
        assert!(doc.node(&Path::from([2])).is_none());
        assert!(doc.node(&Path::root()).is_none());
        assert_eq!(doc.children_at(&Path::root()).unwrap().len(), 2);
    }

    #[test]
    fn test_texts_in_order() {
        let doc = sample();
        let paths: Vec<Path> = doc.texts().into_iter().map(|(path, _)| path).collect();
        assert_eq!(
            paths,
            vec![Path::from([0, 0]), Path::from([1, 0, 0]), Path::from([1, 1, 0])]
        );
        assert_eq!(doc.string(), "onetwothree");
    }

    #[test]
    fn test_first_and_last_text() {
        let doc = sample();
        assert_eq!(doc.first_text(&Path::root()).unwrap().0, Path::from([0, 0]));
        assert_eq!(doc.last_text(&Path::from([1])).unwrap().0, Path::from([1, 1, 0]));
    }

    #[test]
    fn test_default_is_single_empty_paragraph() {
        let doc = Document::default();
        assert_eq!(doc.children, vec![Node::paragraph("")]);
        assert_eq!(serde_json::to_string(&doc).unwrap(), r#"[{"type":"Paragraph","children":[{"text":""}]}]"#);
    }
}
