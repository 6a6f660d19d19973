use crate::dom::attribute;
use markup5ever_rcdom::Handle;

/// Declarations of an inline `style` attribute, in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineStyle {
    declarations: Vec<(String, String)>,
}

impl InlineStyle {
    pub fn parse(source: &str) -> Self {
        let declarations = source
            .split(';')
            .filter_map(|declaration| declaration.split_once(':'))
            .map(|(property, value)| (property.trim().to_ascii_lowercase(), value.trim().to_string()))
            .filter(|(property, value)| !property.is_empty() && !value.is_empty())
            .collect();
        Self { declarations }
    }

    pub(crate) fn of(handle: &Handle) -> Self {
        attribute(handle, "style")
            .map(|source| Self::parse(&source))
            .unwrap_or_default()
    }

    /// Last declaration wins, as in CSS
    pub fn get(&self, property: &str) -> Option<&str> {
        self.declarations
            .iter()
            .rev()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }

    /// `font-size` in pixels; unparseable values are ignored
    pub fn font_size(&self) -> Option<f64> {
        let value = self.get("font-size")?;
        value.trim_end_matches("px").trim().parse().ok()
    }

    pub fn color(&self) -> Option<&str> {
        self.get("color")
    }

    pub fn text_align(&self) -> Option<&str> {
        self.get("text-align")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_declarations() {
        let style = InlineStyle::parse("font-size: 24px; COLOR:#ff0000;;text-align :right");
        assert_eq!(style.font_size(), Some(24.0));
        assert_eq!(style.color(), Some("#ff0000"));
        assert_eq!(style.text_align(), Some("right"));
    }

    #[test]
    fn test_bad_font_size_is_ignored() {
        assert_eq!(InlineStyle::parse("font-size: large").font_size(), None);
        assert_eq!(InlineStyle::parse("font-size: 13.5px").font_size(), Some(13.5));
    }

    #[test]
    fn test_last_declaration_wins() {
        let style = InlineStyle::parse("color: red; color: blue");
        assert_eq!(style.color(), Some("blue"));
    }
}
