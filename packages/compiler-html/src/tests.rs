use crate::{serialize, serialize_nodes, serialize_nodes_with, SerializeOptions};
use scribe_model::{Element, ElementType, Mark, Marks, Node, Text};

const PLAIN: &str = "<span style=\"font-size:16px;color:#181d23\">";

fn styled(text: &str, marks: Marks) -> Node {
    Node::Text(Text::with_marks(text, marks))
}

#[test]
fn test_plain_paragraph() {
    let html = serialize(&Node::paragraph("Hello"));
    assert_eq!(html, format!("<p>{PLAIN}Hello</span></p>"));
}

#[test]
fn test_mark_order_is_fixed() {
    let marks = Marks::from_marks([Mark::Highlight, Mark::Bold, Mark::Code, Mark::Italic]);
    let html = serialize(&styled("x", marks));
    assert_eq!(
        html,
        format!("{PLAIN}<mark><em><strong><code>x</code></strong></em></mark></span>")
    );
}

#[test]
fn test_scalar_marks_in_span() {
    let marks = Marks::new()
        .with(Mark::FontSize(24.0))
        .with(Mark::Color("#ff0000".to_string()));
    let html = serialize(&styled("big", marks));
    assert_eq!(html, "<span style=\"font-size:24px;color:#ff0000\">big</span>");

    let fractional = serialize(&styled("f", Marks::new().with(Mark::FontSize(13.5))));
    assert!(fractional.starts_with("<span style=\"font-size:13.5px;"));
}

#[test]
fn test_escaping_text_and_attributes() {
    let link = Node::Element(Element::link(
        "https://x.com/?a=1&b=\"2\"",
        vec![Node::text("<script>alert('x')</script>")],
    ));
    let html = serialize(&link);
    assert!(html.starts_with("<a href=\"https://x.com/?a=1&amp;b=&quot;2&quot;\">"));
    assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
    assert!(!html.contains("<script>"));

    let color = serialize(&styled("c", Marks::new().with(Mark::Color("\"><b>".to_string()))));
    assert!(color.contains("color:&quot;&gt;&lt;b&gt;"));
}

#[test]
fn test_block_tag_table() {
    let cases = [
        (ElementType::QuoteBlock, "<blockquote class=\"editor-quote-block\">", "</blockquote>"),
        (ElementType::CodeBlock, "<pre class=\"editor-code-block\">", "</pre>"),
        (ElementType::ListItem, "<li>", "</li>"),
        (ElementType::AlignRight, "<div style=\"text-align:right\">", "</div>"),
        (ElementType::Justify, "<div style=\"text-align:justify\">", "</div>"),
    ];
    for (kind, open, close) in cases {
        let html = serialize(&Node::element(kind, vec![Node::text("a")]));
        assert_eq!(html, format!("{open}{PLAIN}a</span>{close}"), "{kind}");
    }
}

#[test]
fn test_lists_nest() {
    let list = Node::element(
        ElementType::OrderedList,
        vec![
            Node::element(ElementType::ListItem, vec![Node::text("one")]),
            Node::element(ElementType::ListItem, vec![Node::text("two")]),
        ],
    );
    assert_eq!(
        serialize(&list),
        format!("<ol><li>{PLAIN}one</span></li><li>{PLAIN}two</span></li></ol>")
    );
}

#[test]
fn test_image_figure() {
    let mut image = Element::image("a.png");
    image.attrs.caption = Some("Image".to_string());
    image.attrs.width = Some("150".to_string());
    image.attrs.height = Some("150".to_string());
    let html = serialize(&Node::Element(image));
    assert_eq!(
        html,
        format!(
            "<figure contenteditable=\"false\" class=\"editor-image-container\">\
             <img src=\"a.png\" alt=\"Image\" width=\"150\" height=\"150\" class=\"editor-image\"/>\
             <figcaption>Image</figcaption>{PLAIN}</span></figure>"
        )
    );
}

#[test]
fn test_image_omits_absent_attributes() {
    let html = serialize(&Node::Element(Element::image("b.png")));
    assert!(html.contains("<img src=\"b.png\" class=\"editor-image\"/>"));
    assert!(html.contains("<figcaption></figcaption>"));
}

#[test]
fn test_multiple_renders_children_only() {
    let node = Node::element(ElementType::Multiple, vec![Node::paragraph("a")]);
    assert_eq!(serialize(&node), format!("<p>{PLAIN}a</span></p>"));
}

#[test]
fn test_nodes_join_without_separator() {
    let html = serialize_nodes(&[Node::paragraph("a"), Node::paragraph("b")]);
    assert_eq!(html, format!("<p>{PLAIN}a</span></p><p>{PLAIN}b</span></p>"));
}

#[test]
fn test_pretty_puts_blocks_on_lines() {
    let doc = vec![
        Node::paragraph("a"),
        Node::element(
            ElementType::UnorderedList,
            vec![Node::element(ElementType::ListItem, vec![Node::text("b")])],
        ),
    ];
    let html = serialize_nodes_with(&doc, &SerializeOptions::pretty());
    println!("Generated HTML:\n{}", html);

    let lines: Vec<&str> = html.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], "<ul>");
    assert_eq!(lines[2], format!("  <li>{PLAIN}b</span></li>"));
    assert_eq!(lines[3], "</ul>");
}
