//! Text marks (inline formatting carried by a text leaf)

use serde::{Deserialize, Serialize};

pub const DEFAULT_FONT_SIZE: f64 = 16.0;
pub const DEFAULT_FONT_COLOR: &str = "#181d23";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkKind {
    Bold,
    Italic,
    Underline,
    Strike,
    Highlight,
    Code,
    Quote,
    FontSize,
    Color,
}

impl MarkKind {
    pub const ALL: [MarkKind; 9] = [
        MarkKind::Bold,
        MarkKind::Italic,
        MarkKind::Underline,
        MarkKind::Strike,
        MarkKind::Highlight,
        MarkKind::Code,
        MarkKind::Quote,
        MarkKind::FontSize,
        MarkKind::Color,
    ];

    /// Name used in the JSON document format
    pub fn as_str(self) -> &'static str {
        match self {
            MarkKind::Bold => "bold",
            MarkKind::Italic => "italic",
            MarkKind::Underline => "underline",
            MarkKind::Strike => "strike",
            MarkKind::Highlight => "highlight",
            MarkKind::Code => "code",
            MarkKind::Quote => "quote",
            MarkKind::FontSize => "fontSize",
            MarkKind::Color => "color",
        }
    }

    pub fn is_boolean(self) -> bool {
        !matches!(self, MarkKind::FontSize | MarkKind::Color)
    }
}

/// A single mark with its value
#[derive(Debug, Clone, PartialEq)]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Strike,
    Highlight,
    Code,
    Quote,
    FontSize(f64),
    Color(String),
}

impl Mark {
    pub fn kind(&self) -> MarkKind {
        match self {
            Mark::Bold => MarkKind::Bold,
            Mark::Italic => MarkKind::Italic,
            Mark::Underline => MarkKind::Underline,
            Mark::Strike => MarkKind::Strike,
            Mark::Highlight => MarkKind::Highlight,
            Mark::Code => MarkKind::Code,
            Mark::Quote => MarkKind::Quote,
            Mark::FontSize(_) => MarkKind::FontSize,
            Mark::Color(_) => MarkKind::Color,
        }
    }

    pub fn is_boolean(&self) -> bool {
        self.kind().is_boolean()
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// The set of marks on a text leaf.
///
/// Scalar marks equal to their default are stored as `None`, so a leaf with an
/// explicit 16px font size compares equal to one without a size.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Marks {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strike: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub highlight: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub code: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub quote: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Marks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_marks(marks: impl IntoIterator<Item = Mark>) -> Self {
        let mut result = Self::default();
        for mark in marks {
            result.insert(mark);
        }
        result
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Effective font size (default applied)
    pub fn font_size(&self) -> f64 {
        self.font_size.unwrap_or(DEFAULT_FONT_SIZE)
    }

    /// Effective color (default applied)
    pub fn color(&self) -> &str {
        self.color.as_deref().unwrap_or(DEFAULT_FONT_COLOR)
    }

    pub fn get(&self, kind: MarkKind) -> Option<Mark> {
        let flag = |set: bool, mark: Mark| set.then_some(mark);
        match kind {
            MarkKind::Bold => flag(self.bold, Mark::Bold),
            MarkKind::Italic => flag(self.italic, Mark::Italic),
            MarkKind::Underline => flag(self.underline, Mark::Underline),
            MarkKind::Strike => flag(self.strike, Mark::Strike),
            MarkKind::Highlight => flag(self.highlight, Mark::Highlight),
            MarkKind::Code => flag(self.code, Mark::Code),
            MarkKind::Quote => flag(self.quote, Mark::Quote),
            MarkKind::FontSize => self.font_size.map(Mark::FontSize),
            MarkKind::Color => self.color.clone().map(Mark::Color),
        }
    }

    pub fn contains(&self, mark: &Mark) -> bool {
        self.get(mark.kind()).as_ref() == Some(mark)
    }

    pub fn insert(&mut self, mark: Mark) {
        match mark {
            Mark::Bold => self.bold = true,
            Mark::Italic => self.italic = true,
            Mark::Underline => self.underline = true,
            Mark::Strike => self.strike = true,
            Mark::Highlight => self.highlight = true,
            Mark::Code => self.code = true,
            Mark::Quote => self.quote = true,
            Mark::FontSize(size) => {
                self.font_size = (size != DEFAULT_FONT_SIZE).then_some(size);
            }
            Mark::Color(color) => {
                self.color = (!color.eq_ignore_ascii_case(DEFAULT_FONT_COLOR)).then_some(color);
            }
        }
    }

    pub fn remove(&mut self, kind: MarkKind) {
        match kind {
            MarkKind::Bold => self.bold = false,
            MarkKind::Italic => self.italic = false,
            MarkKind::Underline => self.underline = false,
            MarkKind::Strike => self.strike = false,
            MarkKind::Highlight => self.highlight = false,
            MarkKind::Code => self.code = false,
            MarkKind::Quote => self.quote = false,
            MarkKind::FontSize => self.font_size = None,
            MarkKind::Color => self.color = None,
        }
    }

    /// Marks currently set, in `MarkKind::ALL` order
    pub fn iter(&self) -> impl Iterator<Item = Mark> + '_ {
        MarkKind::ALL.into_iter().filter_map(|kind| self.get(kind))
    }

    /// Overlay `other` on top of `self`: every mark set in `other` wins
    pub fn apply(&mut self, other: &Marks) {
        for mark in other.iter() {
            self.insert(mark);
        }
    }

    pub fn with(mut self, mark: Mark) -> Self {
        self.insert(mark);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scalars_are_normalized() {
        let mut marks = Marks::new();
        marks.insert(Mark::FontSize(16.0));
        marks.insert(Mark::Color("#181D23".to_string()));
        assert!(marks.is_empty());

        marks.insert(Mark::FontSize(24.0));
        assert_eq!(marks.font_size, Some(24.0));
        assert_eq!(marks.color(), DEFAULT_FONT_COLOR);
    }

    #[test]
    fn test_apply_overrides() {
        let mut inner = Marks::new().with(Mark::Bold).with(Mark::FontSize(24.0));
        let outer = Marks::new().with(Mark::Italic).with(Mark::FontSize(32.0));
        inner.apply(&outer);

        assert!(inner.bold);
        assert!(inner.italic);
        assert_eq!(inner.font_size(), 32.0);
    }

    #[test]
    fn test_serde_skips_unset() {
        let marks = Marks::new().with(Mark::Bold).with(Mark::FontSize(11.0));
        let json = serde_json::to_string(&marks).unwrap();
        assert_eq!(json, r#"{"bold":true,"fontSize":11.0}"#);

        let back: Marks = serde_json::from_str(&json).unwrap();
        assert_eq!(back, marks);
    }

    #[test]
    fn test_contains_scalar_value() {
        let marks = Marks::new().with(Mark::Color("red".to_string()));
        assert!(marks.contains(&Mark::Color("red".to_string())));
        assert!(!marks.contains(&Mark::Color("blue".to_string())));
        assert!(!marks.contains(&Mark::Bold));
    }
}
