use scribe_model::{Element, ElementType, Mark, Node, Text};

/// Options for HTML serialization
#[derive(Debug, Clone)]
pub struct SerializeOptions {
    /// Put block elements on their own lines
    pub pretty: bool,
    /// Indentation string (pretty mode only)
    pub indent: String,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            pretty: false,
            indent: "  ".to_string(),
        }
    }
}

impl SerializeOptions {
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::default()
        }
    }
}

struct Context {
    options: SerializeOptions,
    depth: usize,
    buffer: String,
}

impl Context {
    fn new(options: SerializeOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            self.add_indent();
        }
        self.add(text);
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn add_indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    fn get_output(self) -> String {
        self.buffer
    }
}

/// Serialize a single node (compact form)
pub fn serialize(node: &Node) -> String {
    serialize_nodes(std::slice::from_ref(node))
}

/// Serialize a sequence of nodes, joined without separator
pub fn serialize_nodes(nodes: &[Node]) -> String {
    serialize_nodes_with(nodes, &SerializeOptions::default())
}

pub fn serialize_nodes_with(nodes: &[Node], options: &SerializeOptions) -> String {
    let mut ctx = Context::new(options.clone());
    for node in nodes {
        write_node(node, &mut ctx);
    }
    ctx.get_output()
}

fn write_node(node: &Node, ctx: &mut Context) {
    match node {
        Node::Text(text) => ctx.add(&serialize_text(text)),
        Node::Element(element) => write_element(element, ctx),
    }
}

fn write_element(element: &Element, ctx: &mut Context) {
    let Some((open, close)) = open_tag(element) else {
        for child in &element.children {
            write_node(child, ctx);
        }
        return;
    };

    if !ctx.options.pretty || element.is_inline() {
        ctx.add(&open);
        for child in &element.children {
            write_node(child, ctx);
        }
        ctx.add(close);
        return;
    }

    let holds_blocks = element.children.iter().any(Node::is_block);
    if holds_blocks {
        ctx.add_line(&open);
        ctx.indent();
        for child in &element.children {
            write_node(child, ctx);
        }
        ctx.dedent();
        ctx.add_line(close);
    } else {
        ctx.add_indent();
        ctx.add(&open);
        let depth = std::mem::take(&mut ctx.depth);
        let pretty = std::mem::replace(&mut ctx.options.pretty, false);
        for child in &element.children {
            write_node(child, ctx);
        }
        ctx.options.pretty = pretty;
        ctx.depth = depth;
        ctx.add(close);
        ctx.add("\n");
    }
}

/// Opening markup and closing tag; `None` for types rendered as bare children
fn open_tag(element: &Element) -> Option<(String, &'static str)> {
    let attrs = &element.attrs;
    let tag = match element.kind() {
        ElementType::Paragraph => ("<p>".to_string(), "</p>"),
        ElementType::QuoteBlock => (
            "<blockquote class=\"editor-quote-block\">".to_string(),
            "</blockquote>",
        ),
        ElementType::CodeBlock => ("<pre class=\"editor-code-block\">".to_string(), "</pre>"),
        ElementType::OrderedList => ("<ol>".to_string(), "</ol>"),
        ElementType::UnorderedList => ("<ul>".to_string(), "</ul>"),
        ElementType::ListItem => ("<li>".to_string(), "</li>"),
        ElementType::Link => (
            format!(
                "<a href=\"{}\">",
                escape_html(attrs.url.as_deref().unwrap_or_default())
            ),
            "</a>",
        ),
        ElementType::Image => {
            let mut img = String::from("<img");
            for (name, value) in [
                ("src", &attrs.url),
                ("alt", &attrs.caption),
                ("width", &attrs.width),
                ("height", &attrs.height),
            ] {
                if let Some(value) = value {
                    img.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
                }
            }
            img.push_str(" class=\"editor-image\"/>");
            (
                format!(
                    "<figure contenteditable=\"false\" class=\"editor-image-container\">{}<figcaption>{}</figcaption>",
                    img,
                    escape_html(attrs.caption.as_deref().unwrap_or_default())
                ),
                "</figure>",
            )
        }
        kind @ (ElementType::AlignLeft
        | ElementType::AlignCenter
        | ElementType::AlignRight
        | ElementType::Justify) => (
            format!(
                "<div style=\"text-align:{}\">",
                kind.text_align().unwrap_or("left")
            ),
            "</div>",
        ),
        ElementType::Multiple => return None,
    };
    Some(tag)
}

/// Innermost first
const MARK_TAGS: [(Mark, &str); 7] = [
    (Mark::Code, "code"),
    (Mark::Quote, "q"),
    (Mark::Bold, "strong"),
    (Mark::Italic, "em"),
    (Mark::Underline, "u"),
    (Mark::Strike, "del"),
    (Mark::Highlight, "mark"),
];

/// A text leaf: escaped text, mark tags, then the styling span
pub fn serialize_text(text: &Text) -> String {
    let mut html = escape_html(&text.text);
    for (mark, tag) in &MARK_TAGS {
        if text.marks.contains(mark) {
            html = format!("<{tag}>{html}</{tag}>");
        }
    }
    format!(
        "<span style=\"font-size:{}px;color:{}\">{}</span>",
        text.marks.font_size(),
        escape_html(text.marks.color()),
        html
    )
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
