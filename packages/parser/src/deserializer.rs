//! HTML → document tree.
//!
//! [`deserialize`] walks an html5ever node and returns one of the shapes in
//! [`Deserialized`]. Unknown tags are stripped and their content kept, so any
//! input produces a usable tree.

use crate::dom::{child_elements, element_name, parse_html};
use crate::tags::{ElementTag, TextTag};
use crate::{InlineStyle, ParseResult};
use markup5ever_rcdom::{Handle, NodeData};
use scribe_model::{Element, ElementType, Marks, Node, Text};
use tracing::{debug, instrument};

/// Result of deserializing one HTML node
#[derive(Debug, Clone, PartialEq)]
pub enum Deserialized {
    /// Comments, doctypes and other non-content nodes
    Skip,
    /// Raw text (not yet a leaf)
    Text(String),
    Element(Element),
    /// Content of a tag that did not become an element
    Nodes(Vec<Node>),
    /// Children of `<body>`
    Fragment(Vec<Node>),
}

impl Deserialized {
    pub fn into_nodes(self) -> Vec<Node> {
        match self {
            Deserialized::Skip => Vec::new(),
            Deserialized::Text(text) => vec![Node::text(text)],
            Deserialized::Element(element) => vec![Node::Element(element)],
            Deserialized::Nodes(nodes) | Deserialized::Fragment(nodes) => nodes,
        }
    }
}

pub fn deserialize(handle: &Handle) -> Deserialized {
    let name = match &handle.data {
        NodeData::Text { contents } => return Deserialized::Text(contents.borrow().to_string()),
        NodeData::Document => return Deserialized::Nodes(deserialize_children(handle)),
        NodeData::Element { .. } => element_name(handle).unwrap_or_default(),
        _ => return Deserialized::Skip,
    };

    if name == "br" {
        return Deserialized::Text("\n".to_string());
    }

    let children = deserialize_children(&content_source(handle, &name));

    if name == "body" {
        return Deserialized::Fragment(children);
    }

    if let Some(attrs) = ElementTag::from_name(&name).and_then(|tag| tag.attrs(handle)) {
        return Deserialized::Element(Element { attrs, children });
    }

    if let Some(tag) = TextTag::from_name(&name) {
        let marks = tag.marks(&InlineStyle::of(handle));
        let marked = children
            .into_iter()
            .map(|mut child| {
                spread_marks(&mut child, &marks);
                child
            })
            .collect();
        return Deserialized::Nodes(merge_texts(marked));
    }

    Deserialized::Nodes(children)
}

/// Parse an HTML string into top-level document blocks
#[instrument(skip(html), fields(len = html.len()))]
pub fn deserialize_html(html: &str) -> ParseResult<Vec<Node>> {
    let document = parse_html(html)?;
    let nodes = match document.body() {
        Some(body) => deserialize(&body).into_nodes(),
        None => deserialize(document.root()).into_nodes(),
    };
    let blocks = into_document(nodes);
    debug!(blocks = blocks.len(), "deserialized html");
    Ok(blocks)
}

/// Shape a fragment into valid top-level content: runs of inline nodes are
/// wrapped in paragraphs, whitespace-only runs are dropped, and an empty
/// result becomes a single empty paragraph.
pub fn into_document(nodes: Vec<Node>) -> Vec<Node> {
    let mut blocks = Vec::new();
    let mut run: Vec<Node> = Vec::new();

    for node in nodes {
        if node.is_block() {
            flush_run(&mut run, &mut blocks);
            blocks.push(node);
        } else {
            run.push(node);
        }
    }
    flush_run(&mut run, &mut blocks);

    if blocks.is_empty() {
        blocks.push(Node::element(ElementType::Paragraph, Vec::new()));
    }
    blocks
}

fn flush_run(run: &mut Vec<Node>, blocks: &mut Vec<Node>) {
    if run.iter().all(is_blank_text) {
        run.clear();
        return;
    }
    let children = merge_texts(std::mem::take(run));
    blocks.push(Node::element(ElementType::Paragraph, children));
}

// A figure takes its content from its image; a pre holding code reads the code
fn content_source(handle: &Handle, name: &str) -> Handle {
    let first_child = match name {
        "figure" => child_elements(handle)
            .into_iter()
            .find(|child| element_name(child).as_deref() == Some("img")),
        "pre" => handle
            .children
            .borrow()
            .first()
            .filter(|child| element_name(child).as_deref() == Some("code"))
            .cloned(),
        _ => None,
    };
    first_child.unwrap_or_else(|| handle.clone())
}

fn deserialize_children(handle: &Handle) -> Vec<Node> {
    let mut children: Vec<Node> = handle
        .children
        .borrow()
        .iter()
        .flat_map(|child| deserialize(child).into_nodes())
        .collect();

    // Indentation between block tags is not content
    if children.iter().any(Node::is_block) {
        children.retain(|child| !is_blank_text(child));
    }

    let mut children = merge_texts(children);
    if children.is_empty() {
        children.push(Node::Text(Text::default()));
    }
    children
}

fn is_blank_text(node: &Node) -> bool {
    matches!(node, Node::Text(text) if text.text.trim().is_empty())
}

/// Overlay `marks` on every text leaf at or below `node`
fn spread_marks(node: &mut Node, marks: &Marks) {
    match node {
        Node::Text(text) => text.marks.apply(marks),
        Node::Element(element) => {
            for child in &mut element.children {
                spread_marks(child, marks);
            }
        }
    }
}

/// Merge adjacent text leaves that carry the same marks
fn merge_texts(nodes: Vec<Node>) -> Vec<Node> {
    let mut merged: Vec<Node> = Vec::with_capacity(nodes.len());
    for node in nodes {
        if let (Some(Node::Text(prev)), Node::Text(text)) = (merged.last_mut(), &node) {
            if prev.marks == text.marks {
                prev.text.push_str(&text.text);
                continue;
            }
        }
        merged.push(node);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_model::Mark;

    fn html(source: &str) -> Vec<Node> {
        deserialize_html(source).unwrap()
    }

    fn text(value: &str, marks: Marks) -> Node {
        Node::Text(Text::with_marks(value, marks))
    }

    #[test]
    fn test_paragraph_with_link() {
        let nodes = html(r#"<p>Go to <a href="https://x.com">x</a> now</p>"#);
        assert_eq!(
            nodes,
            vec![Node::element(
                ElementType::Paragraph,
                vec![
                    Node::text("Go to "),
                    Node::Element(Element::link("https://x.com", vec![Node::text("x")])),
                    Node::text(" now"),
                ],
            )]
        );
    }

    #[test]
    fn test_text_tags_spread_per_child() {
        let nodes = html("<p><strong>a<em>b</em></strong></p>");
        let bold = Marks::new().with(Mark::Bold);
        assert_eq!(
            nodes[0].children().unwrap(),
            &vec![text("a", bold.clone()), text("b", bold.with(Mark::Italic))]
        );
    }

    #[test]
    fn test_b_is_stripped_not_bold() {
        let nodes = html("<p><b>plain</b></p>");
        assert_eq!(nodes, vec![Node::paragraph("plain")]);
    }

    #[test]
    fn test_headings_become_marked_paragraph_text() {
        let nodes = html("<h1>Title</h1>");
        let marks = Marks::new().with(Mark::Bold).with(Mark::FontSize(32.0));
        assert_eq!(
            nodes,
            vec![Node::element(ElementType::Paragraph, vec![text("Title", marks)])]
        );
    }

    #[test]
    fn test_span_style_marks() {
        let nodes = html(r#"<p><span style="font-size:24px;color:#ff0000">hot</span></p>"#);
        let marks = Marks::new()
            .with(Mark::FontSize(24.0))
            .with(Mark::Color("#ff0000".to_string()));
        assert_eq!(nodes[0].children().unwrap(), &vec![text("hot", marks)]);
    }

    #[test]
    fn test_default_span_style_is_canonical() {
        let nodes = html(r#"<p><span style="font-size:16px;color:#181d23">x</span></p>"#);
        assert_eq!(nodes, vec![Node::paragraph("x")]);
    }

    #[test]
    fn test_div_alignment() {
        for (align, kind) in [
            ("left", ElementType::AlignLeft),
            ("center", ElementType::AlignCenter),
            ("right", ElementType::AlignRight),
            ("justify", ElementType::Justify),
        ] {
            let nodes = html(&format!(r#"<div style="text-align: {align};"><p>a</p></div>"#));
            assert_eq!(nodes[0].kind(), Some(kind), "{align}");
        }
    }

    #[test]
    fn test_div_without_alignment_is_stripped() {
        let nodes = html(r#"<div><p>a</p></div>"#);
        assert_eq!(nodes, vec![Node::paragraph("a")]);
    }

    #[test]
    fn test_figure_reads_inner_image() {
        let nodes = html(
            r#"<figure class="editor-image-container">
                 <img src="a.png" alt="Cat" width="150" height="80" class="editor-image"/>
                 <figcaption>Cat</figcaption>
               </figure>"#,
        );
        let image = nodes[0].as_element().unwrap();
        assert_eq!(image.kind(), ElementType::Image);
        assert_eq!(image.attrs.url.as_deref(), Some("a.png"));
        assert_eq!(image.attrs.caption.as_deref(), Some("Cat"));
        assert_eq!(image.attrs.width.as_deref(), Some("150"));
        assert_eq!(image.attrs.height.as_deref(), Some("80"));
        assert_eq!(image.attrs.style.as_ref().unwrap()["objectFit"], "contain");
        assert_eq!(image.children, vec![Node::text("")]);
    }

    #[test]
    fn test_pre_code_reads_code_children() {
        let nodes = html("<pre><code>let x = 1;</code></pre>");
        assert_eq!(
            nodes,
            vec![Node::element(ElementType::CodeBlock, vec![Node::text("let x = 1;")])]
        );
    }

    #[test]
    fn test_br_and_unknown_tags() {
        let nodes = html("<p>a<br>b<custom-tag>c</custom-tag></p>");
        assert_eq!(nodes, vec![Node::paragraph("a\nbc")]);
    }

    #[test]
    fn test_comments_are_skipped() {
        let nodes = html("<p>a<!-- note -->b</p>");
        assert_eq!(nodes, vec![Node::paragraph("ab")]);
    }

    #[test]
    fn test_bare_text_is_wrapped() {
        assert_eq!(html("hello"), vec![Node::paragraph("hello")]);
        assert_eq!(html(""), vec![Node::paragraph("")]);
        assert_eq!(html("   \n "), vec![Node::paragraph("")]);
    }

    #[test]
    fn test_body_yields_fragment() {
        let document = parse_html("<p>a</p><p>b</p>").unwrap();
        let body = document.body().unwrap();
        match deserialize(&body) {
            Deserialized::Fragment(nodes) => assert_eq!(nodes.len(), 2),
            other => panic!("expected fragment, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_html_recovers() {
        let nodes = html("<p><strong>open <em>tags</p><ul><li>x");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[1].kind(), Some(ElementType::UnorderedList));
    }
}
