//! Tag dispatch tables.
//!
//! An HTML tag maps either to an element (the tag becomes a node wrapping its
//! children) or to a set of text marks (the tag disappears and its marks are
//! spread onto every child). `<b>` is deliberately absent: rich-paste sources
//! use it for things that are not bold.

use crate::dom::{attribute, child_elements, element_name};
use crate::InlineStyle;
use markup5ever_rcdom::Handle;
use scribe_model::{image_display_style, ElementAttrs, ElementType, Mark, Marks};

/// Heading font sizes, `h1` through `h6`
pub const HEADING_SIZES: [f64; 6] = [32.0, 24.0, 19.0, 16.0, 13.0, 11.0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementTag {
    P,
    Blockquote,
    Pre,
    Ol,
    Ul,
    Li,
    A,
    Img,
    Figure,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTag {
    Code,
    Q,
    Strong,
    Em,
    I,
    U,
    Del,
    S,
    Mark,
    /// `h1`..`h6`, level 1-6
    Heading(u8),
    Div,
    Span,
}

impl ElementTag {
    pub fn from_name(name: &str) -> Option<Self> {
        let tag = match name.to_ascii_lowercase().as_str() {
            "p" => ElementTag::P,
            "blockquote" => ElementTag::Blockquote,
            "pre" => ElementTag::Pre,
            "ol" => ElementTag::Ol,
            "ul" => ElementTag::Ul,
            "li" => ElementTag::Li,
            "a" => ElementTag::A,
            "img" => ElementTag::Img,
            "figure" => ElementTag::Figure,
            "div" => ElementTag::Div,
            _ => return None,
        };
        Some(tag)
    }

    /// Element attributes for `el`, or `None` when the tag does not apply
    /// (a `div` without a known `text-align`, a `figure` without an `img`)
    pub fn attrs(self, el: &Handle) -> Option<ElementAttrs> {
        let kind = match self {
            ElementTag::P => ElementType::Paragraph,
            ElementTag::Blockquote => ElementType::QuoteBlock,
            ElementTag::Pre => ElementType::CodeBlock,
            ElementTag::Ol => ElementType::OrderedList,
            ElementTag::Ul => ElementType::UnorderedList,
            ElementTag::Li => ElementType::ListItem,
            ElementTag::A => {
                let mut attrs = ElementAttrs::new(ElementType::Link);
                attrs.url = attribute(el, "href");
                return Some(attrs);
            }
            ElementTag::Img => return Some(image_attrs(el)),
            ElementTag::Figure => {
                let img = child_elements(el)
                    .into_iter()
                    .find(|child| element_name(child).as_deref() == Some("img"))?;
                return Some(image_attrs(&img));
            }
            ElementTag::Div => {
                let align = InlineStyle::of(el).text_align().map(str::to_string)?;
                ElementType::from_text_align(&align)?
            }
        };
        Some(ElementAttrs::new(kind))
    }
}

fn image_attrs(img: &Handle) -> ElementAttrs {
    let mut attrs = ElementAttrs::new(ElementType::Image);
    attrs.url = attribute(img, "src");
    attrs.caption = attribute(img, "alt");
    attrs.height = attribute(img, "height");
    attrs.width = attribute(img, "width");
    attrs.style = Some(image_display_style());
    attrs
}

impl TextTag {
    pub fn from_name(name: &str) -> Option<Self> {
        let tag = match name.to_ascii_lowercase().as_str() {
            "code" => TextTag::Code,
            "q" => TextTag::Q,
            "strong" => TextTag::Strong,
            "em" => TextTag::Em,
            "i" => TextTag::I,
            "u" => TextTag::U,
            "del" => TextTag::Del,
            "s" => TextTag::S,
            "mark" => TextTag::Mark,
            "h1" => TextTag::Heading(1),
            "h2" => TextTag::Heading(2),
            "h3" => TextTag::Heading(3),
            "h4" => TextTag::Heading(4),
            "h5" => TextTag::Heading(5),
            "h6" => TextTag::Heading(6),
            "div" => TextTag::Div,
            "span" => TextTag::Span,
            _ => return None,
        };
        Some(tag)
    }

    /// Marks this tag spreads onto its children. `div`/`span` only contribute
    /// the properties their inline style declares.
    pub fn marks(self, style: &InlineStyle) -> Marks {
        match self {
            TextTag::Code => Marks::new().with(Mark::Code),
            TextTag::Q => Marks::new().with(Mark::Quote),
            TextTag::Strong => Marks::new().with(Mark::Bold),
            TextTag::Em | TextTag::I => Marks::new().with(Mark::Italic),
            TextTag::U => Marks::new().with(Mark::Underline),
            TextTag::Del | TextTag::S => Marks::new().with(Mark::Strike),
            TextTag::Mark => Marks::new().with(Mark::Highlight),
            TextTag::Heading(level) => {
                let index = usize::from(level.clamp(1, 6)) - 1;
                Marks::new()
                    .with(Mark::FontSize(HEADING_SIZES[index]))
                    .with(Mark::Bold)
            }
            TextTag::Div | TextTag::Span => {
                let mut marks = Marks::new();
                if let Some(size) = style.font_size() {
                    marks.insert(Mark::FontSize(size));
                }
                if let Some(color) = style.color() {
                    marks.insert(Mark::Color(color.to_string()));
                }
                marks
            }
        }
    }
}
