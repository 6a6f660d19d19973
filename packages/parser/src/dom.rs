//! Thin layer over html5ever's reference-counted DOM.

use crate::ParseResult;
use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// A parsed HTML document. Parsing never rejects markup: html5ever recovers
/// from malformed input the way a browser does.
pub struct HtmlDocument {
    dom: RcDom,
}

pub fn parse_html(html: &str) -> ParseResult<HtmlDocument> {
    let dom = parse_document(RcDom::default(), ParseOpts::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())?;
    Ok(HtmlDocument { dom })
}

impl HtmlDocument {
    pub fn root(&self) -> &Handle {
        &self.dom.document
    }

    /// The `<body>` element (always synthesized by the parser)
    pub fn body(&self) -> Option<Handle> {
        find_element(&self.dom.document, "body")
    }
}

fn find_element(handle: &Handle, tag: &str) -> Option<Handle> {
    if element_name(handle).as_deref() == Some(tag) {
        return Some(handle.clone());
    }
    handle
        .children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, tag))
}

/// Lowercase local name of an element node
pub(crate) fn element_name(handle: &Handle) -> Option<String> {
    match &handle.data {
        NodeData::Element { name, .. } => Some(name.local.to_string().to_ascii_lowercase()),
        _ => None,
    }
}

/// Attribute value; empty values count as absent
pub(crate) fn attribute(handle: &Handle, attr: &str) -> Option<String> {
    let NodeData::Element { attrs, .. } = &handle.data else {
        return None;
    };
    attrs
        .borrow()
        .iter()
        .find(|candidate| (*candidate.name.local).eq_ignore_ascii_case(attr))
        .map(|candidate| candidate.value.to_string())
        .filter(|value| !value.is_empty())
}

pub(crate) fn child_elements(handle: &Handle) -> Vec<Handle> {
    handle
        .children
        .borrow()
        .iter()
        .filter(|child| matches!(child.data, NodeData::Element { .. }))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_is_synthesized() {
        let doc = parse_html("just text").unwrap();
        let body = doc.body().unwrap();
        assert_eq!(element_name(&body).as_deref(), Some("body"));
        assert_eq!(body.children.borrow().len(), 1);
    }

    #[test]
    fn test_attribute_lookup() {
        let doc = parse_html(r#"<a HREF="https://x.com" title="">x</a>"#).unwrap();
        let body = doc.body().unwrap();
        let link = &child_elements(&body)[0];
        assert_eq!(attribute(link, "href").as_deref(), Some("https://x.com"));
        assert_eq!(attribute(link, "title"), None);
        assert_eq!(attribute(link, "rel"), None);
    }
}
