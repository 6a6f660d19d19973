use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Closed set of element kinds understood by the editor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Paragraph,
    #[serde(rename = "Quote Block")]
    QuoteBlock,
    #[serde(rename = "Code Block")]
    CodeBlock,
    #[serde(rename = "Ordered List")]
    OrderedList,
    #[serde(rename = "Unordered List")]
    UnorderedList,
    #[serde(rename = "List Item")]
    ListItem,
    Link,
    Image,
    #[serde(rename = "Align Left")]
    AlignLeft,
    #[serde(rename = "Align Center")]
    AlignCenter,
    #[serde(rename = "Align Right")]
    AlignRight,
    Justify,
    /// More than one block type is active in the selection. Never persisted.
    Multiple,
}

/// Wrapper blocks whose children are retyped to a companion item type
pub const GROUP_TYPES: [ElementType; 4] = [
    ElementType::OrderedList,
    ElementType::UnorderedList,
    ElementType::CodeBlock,
    ElementType::QuoteBlock,
];

pub const ALIGNMENT_TYPES: [ElementType; 4] = [
    ElementType::AlignLeft,
    ElementType::AlignCenter,
    ElementType::AlignRight,
    ElementType::Justify,
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown element type: {0}")]
pub struct UnknownElementType(pub String);

impl ElementType {
    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Paragraph => "Paragraph",
            ElementType::QuoteBlock => "Quote Block",
            ElementType::CodeBlock => "Code Block",
            ElementType::OrderedList => "Ordered List",
            ElementType::UnorderedList => "Unordered List",
            ElementType::ListItem => "List Item",
            ElementType::Link => "Link",
            ElementType::Image => "Image",
            ElementType::AlignLeft => "Align Left",
            ElementType::AlignCenter => "Align Center",
            ElementType::AlignRight => "Align Right",
            ElementType::Justify => "Justify",
            ElementType::Multiple => "Multiple",
        }
    }

    /// Void elements hold no editable content (a single empty text placeholder)
    pub fn is_void(self) -> bool {
        matches!(self, ElementType::Image)
    }

    /// Inline elements live inside a line of text
    pub fn is_inline(self) -> bool {
        matches!(self, ElementType::Link)
    }

    pub fn is_group(self) -> bool {
        GROUP_TYPES.contains(&self)
    }

    pub fn is_alignment(self) -> bool {
        ALIGNMENT_TYPES.contains(&self)
    }

    /// Item type used for the blocks inside a group wrapper
    pub fn default_child_type(self) -> ElementType {
        match self {
            ElementType::OrderedList | ElementType::UnorderedList => ElementType::ListItem,
            _ => ElementType::Paragraph,
        }
    }

    /// CSS `text-align` keyword of an alignment wrapper
    pub fn text_align(self) -> Option<&'static str> {
        match self {
            ElementType::AlignLeft => Some("left"),
            ElementType::AlignCenter => Some("center"),
            ElementType::AlignRight => Some("right"),
            ElementType::Justify => Some("justify"),
            _ => None,
        }
    }

    pub fn from_text_align(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" => Some(ElementType::AlignLeft),
            "center" => Some(ElementType::AlignCenter),
            "right" => Some(ElementType::AlignRight),
            "justify" => Some(ElementType::Justify),
            _ => None,
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ElementType {
    type Err = UnknownElementType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s {
            "Paragraph" => ElementType::Paragraph,
            "Quote Block" => ElementType::QuoteBlock,
            "Code Block" => ElementType::CodeBlock,
            "Ordered List" => ElementType::OrderedList,
            "Unordered List" => ElementType::UnorderedList,
            "List Item" => ElementType::ListItem,
            "Link" => ElementType::Link,
            "Image" => ElementType::Image,
            "Align Left" => ElementType::AlignLeft,
            "Align Center" => ElementType::AlignCenter,
            "Align Right" => ElementType::AlignRight,
            "Justify" => ElementType::Justify,
            "Multiple" => ElementType::Multiple,
            other => return Err(UnknownElementType(other.to_string())),
        };
        Ok(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_serde_name() {
        for ty in GROUP_TYPES.iter().chain(ALIGNMENT_TYPES.iter()) {
            let json = serde_json::to_string(ty).unwrap();
            assert_eq!(json, format!("\"{}\"", ty));
            assert_eq!(ty.as_str().parse::<ElementType>().unwrap(), *ty);
        }
    }

    #[test]
    fn test_text_align_mapping() {
        assert_eq!(ElementType::from_text_align("right"), Some(ElementType::AlignRight));
        assert_eq!(ElementType::from_text_align(" Center "), Some(ElementType::AlignCenter));
        assert_eq!(ElementType::from_text_align("start"), None);
        assert_eq!(ElementType::Justify.text_align(), Some("justify"));
    }

    #[test]
    fn test_void_and_inline() {
        assert!(ElementType::Image.is_void());
        assert!(!ElementType::Image.is_inline());
        assert!(ElementType::Link.is_inline());
        assert!(!ElementType::Paragraph.is_void());
    }

    #[test]
    fn test_unknown_type() {
        assert!("Heading".parse::<ElementType>().is_err());
    }
}
