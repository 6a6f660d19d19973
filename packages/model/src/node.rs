use crate::{ElementType, Marks};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// A document node: a structural element or a text leaf
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Element(Element),
    Text(Text),
}

/// Element attributes (everything but the children)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementAttrs {
    #[serde(rename = "type")]
    pub kind: ElementType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "string_or_number"
    )]
    pub width: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "string_or_number"
    )]
    pub height: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(flatten)]
    pub attrs: ElementAttrs,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Text {
    pub text: String,
    #[serde(flatten)]
    pub marks: Marks,
}

/// Properties carried by a `SetNode`/`SplitNode` operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Properties {
    Element(ElementAttrs),
    Text(Marks),
}

/// Fixed display style attached to every image
pub fn image_display_style() -> BTreeMap<String, String> {
    [
        ("maxWidth", "100%"),
        ("maxHeight", "20em"),
        ("objectFit", "contain"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_string(), value.to_string()))
    .collect()
}

// Width and height arrive as numbers from stored documents and as strings from
// HTML attributes.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Dimension {
        Text(String),
        Number(f64),
    }

    Ok(Option::<Dimension>::deserialize(deserializer)?.map(|value| match value {
        Dimension::Text(text) => text,
        Dimension::Number(number) => number.to_string(),
    }))
}

impl ElementAttrs {
    pub fn new(kind: ElementType) -> Self {
        Self {
            kind,
            url: None,
            caption: None,
            width: None,
            height: None,
            style: None,
        }
    }
}

impl Element {
    pub fn new(kind: ElementType, children: Vec<Node>) -> Self {
        let mut element = Self {
            attrs: ElementAttrs::new(kind),
            children,
        };
        if element.children.is_empty() {
            element.children.push(Node::Text(Text::default()));
        }
        element
    }

    /// Element holding a single empty text leaf
    pub fn empty(kind: ElementType) -> Self {
        Self::new(kind, Vec::new())
    }

    /// Wrapper element without children, used as a `wrap_nodes` template
    pub fn wrapper(kind: ElementType) -> Self {
        Self {
            attrs: ElementAttrs::new(kind),
            children: Vec::new(),
        }
    }

    pub fn link(url: impl Into<String>, children: Vec<Node>) -> Self {
        let mut element = Self::new(ElementType::Link, children);
        element.attrs.url = Some(url.into());
        element
    }

    pub fn image(url: impl Into<String>) -> Self {
        let mut element = Self::empty(ElementType::Image);
        element.attrs.url = Some(url.into());
        element.attrs.style = Some(image_display_style());
        element
    }

    pub fn kind(&self) -> ElementType {
        self.attrs.kind
    }

    pub fn is_inline(&self) -> bool {
        self.attrs.kind.is_inline()
    }

    pub fn is_void(&self) -> bool {
        self.attrs.kind.is_void()
    }

    /// Concatenated text of all descendant leaves
    pub fn string(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_string(&mut out);
        }
        out
    }
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::default(),
        }
    }

    pub fn with_marks(text: impl Into<String>, marks: Marks) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(Text::new(text))
    }

    pub fn element(kind: ElementType, children: Vec<Node>) -> Self {
        Node::Element(Element::new(kind, children))
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Node::element(ElementType::Paragraph, vec![Node::text(text)])
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Node::Text(text) => Some(text),
            Node::Element(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn kind(&self) -> Option<ElementType> {
        self.as_element().map(Element::kind)
    }

    pub fn is_kind(&self, kind: ElementType) -> bool {
        self.kind() == Some(kind)
    }

    /// Block-level element (not inline, not text)
    pub fn is_block(&self) -> bool {
        matches!(self, Node::Element(element) if !element.is_inline())
    }

    /// Text or inline element
    pub fn is_inline(&self) -> bool {
        !self.is_block()
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Node::Element(element) if element.is_void())
    }

    pub fn children(&self) -> Option<&Vec<Node>> {
        self.as_element().map(|element| &element.children)
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        self.as_element_mut().map(|element| &mut element.children)
    }

    pub fn string(&self) -> String {
        let mut out = String::new();
        self.collect_string(&mut out);
        out
    }

    fn collect_string(&self, out: &mut String) {
        match self {
            Node::Text(text) => out.push_str(&text.text),
            Node::Element(element) => {
                for child in &element.children {
                    child.collect_string(out);
                }
            }
        }
    }

    pub fn properties(&self) -> Properties {
        match self {
            Node::Element(element) => Properties::Element(element.attrs.clone()),
            Node::Text(text) => Properties::Text(text.marks.clone()),
        }
    }

    /// Replace the node's properties; returns false when the kinds disagree
    pub fn set_properties(&mut self, properties: Properties) -> bool {
        match (self, properties) {
            (Node::Element(element), Properties::Element(attrs)) => {
                element.attrs = attrs;
                true
            }
            (Node::Text(text), Properties::Text(marks)) => {
                text.marks = marks;
                true
            }
            _ => false,
        }
    }

    /// Node with the given properties and no content, the right half of a split
    pub fn from_properties(properties: Properties) -> Node {
        match properties {
            Properties::Element(attrs) => Node::Element(Element {
                attrs,
                children: Vec::new(),
            }),
            Properties::Text(marks) => Node::Text(Text::with_marks("", marks)),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Mark;

    #[test]
    fn test_json_shape() {
        let node = Node::element(
            ElementType::Paragraph,
            vec![Node::Text(Text::with_marks("hi", Marks::new().with(Mark::Bold)))],
        );
        let json = serde_json::to_string(&node).unwrap();
        assert_eq!(
            json,
            r#"{"type":"Paragraph","children":[{"text":"hi","bold":true}]}"#
        );

        let back: Node = serde_json::from_str(&json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_numeric_dimensions_accepted() {
        let json = r#"{"type":"Image","url":"a.png","width":150,"height":"80","children":[{"text":""}]}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        let element = node.as_element().unwrap();
        assert_eq!(element.attrs.width.as_deref(), Some("150"));
        assert_eq!(element.attrs.height.as_deref(), Some("80"));
    }

    #[test]
    fn test_new_element_is_never_empty() {
        let element = Element::new(ElementType::ListItem, vec![]);
        assert_eq!(element.children, vec![Node::text("")]);
    }

    #[test]
    fn test_string_concatenates_leaves() {
        let node = Node::element(
            ElementType::Paragraph,
            vec![
                Node::text("Go to "),
                Node::Element(Element::link("https://x.com", vec![Node::text("x")])),
                Node::text(" now"),
            ],
        );
        assert_eq!(node.string(), "Go to x now");
        assert!(node.is_block());
        assert!(Node::Element(Element::link("u", vec![])).is_inline());
    }
}
