//! Commands the toolbar and hotkeys run against an editor, and the queries
//! the toolbar uses to show which formats are active.
//!
//! Every command works on the current selection and does nothing without
//! one. Commands never fail on a missing node; engine errors are propagated.

use crate::autolink::is_url;
use crate::{Edge, Editor, EditorResult, Location, Mode, NodeOptions};
use scribe_model::{
    Element, ElementType, Mark, MarkKind, Node, Path, Properties, DEFAULT_FONT_COLOR,
    DEFAULT_FONT_SIZE,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Caption, width and height given to a newly inserted image
const IMAGE_CAPTION: &str = "Image";
const IMAGE_SIZE: &str = "150";

/// What `get_active_block` found among its candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveBlock {
    Block(ElementType),
    /// More than one candidate is active
    Multiple,
}

impl ActiveBlock {
    /// The element type the toolbar shows; `Multiple` maps to the sentinel
    pub fn kind(self) -> ElementType {
        match self {
            ActiveBlock::Block(kind) => kind,
            ActiveBlock::Multiple => ElementType::Multiple,
        }
    }
}

/// The link under the selection, for the link dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkState {
    pub url: String,
    pub valid: bool,
}

/// Editable image attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageField {
    Url,
    Caption,
    Width,
    Height,
}

fn of_kind(kind: ElementType) -> impl Fn(&Node, &Path) -> bool {
    move |node: &Node, _: &Path| node.is_kind(kind)
}

fn is_group(node: &Node, _: &Path) -> bool {
    node.kind().is_some_and(ElementType::is_group)
}

fn is_alignment(node: &Node, _: &Path) -> bool {
    node.kind().is_some_and(ElementType::is_alignment)
}

pub(crate) fn retyped(node: &Node, kind: ElementType) -> Option<Properties> {
    match node {
        Node::Element(element) if !element.is_void() => {
            let mut attrs = element.attrs.clone();
            attrs.kind = kind;
            Some(Properties::Element(attrs))
        }
        _ => None,
    }
}

/// Add `mark` to the selection, or remove it when it is already active
#[instrument(skip(editor))]
pub fn toggle_mark(editor: &mut Editor, mark: Mark) -> EditorResult<()> {
    if is_mark_active(editor, &mark) {
        editor.remove_mark(mark.kind())
    } else {
        editor.add_mark(mark)
    }
}

/// Toggle a block format on the selected blocks.
///
/// - A plain block type retypes the lowest selected blocks; when it is
///   already active nothing happens.
/// - An alignment replaces any alignment wrapper around the selection.
/// - A group (list, quote, code) replaces any group wrapper around the
///   selection and retypes its blocks to `child_type` (the group's default
///   child type when `None`). Toggling an active group turns its blocks back
///   into paragraphs.
#[instrument(skip(editor))]
pub fn toggle_block(
    editor: &mut Editor,
    format: ElementType,
    child_type: Option<ElementType>,
) -> EditorResult<()> {
    let active = is_block_active(editor, format);
    let group = format.is_group();
    let alignment = format.is_alignment();
    if active && !group {
        return Ok(());
    }

    if alignment {
        editor.unwrap_nodes(NodeOptions::new().matching(&is_alignment).split())?;
    }
    if group {
        editor.unwrap_nodes(NodeOptions::new().matching(&is_group).split())?;
    }
    if !alignment {
        let kind = if active {
            ElementType::Paragraph
        } else if group {
            child_type.unwrap_or_else(|| format.default_child_type())
        } else {
            format
        };
        editor.set_nodes(&|node: &Node| retyped(node, kind), NodeOptions::new())?;
    }
    if (!active && group) || alignment {
        editor.wrap_nodes(Element::wrapper(format), NodeOptions::new())?;
    }
    debug!(%format, was_active = active, "toggled block");
    Ok(())
}

/// Whether an element of type `format` is anywhere in the selection
pub fn is_block_active(editor: &Editor, format: ElementType) -> bool {
    let Some(selection) = editor.selection() else {
        return false;
    };
    let at = Location::Range(editor.unhang_range(selection));
    !editor.nodes(&at, &of_kind(format), Mode::All).is_empty()
}

/// Whether typed text would carry `mark`. A scalar mark is active when its
/// value matches.
pub fn is_mark_active(editor: &Editor, mark: &Mark) -> bool {
    editor.marks().is_some_and(|marks| marks.contains(mark))
}

/// The single active block among `candidates`
pub fn get_active_block(editor: &Editor, candidates: &[ElementType]) -> Option<ActiveBlock> {
    let mut found = None;
    for &candidate in candidates {
        if is_block_active(editor, candidate) {
            if found.is_some() {
                return Some(ActiveBlock::Multiple);
            }
            found = Some(ActiveBlock::Block(candidate));
        }
    }
    found
}

/// Kinds of the marks typed text would carry
pub fn active_styles(editor: &Editor) -> Vec<MarkKind> {
    editor
        .marks()
        .map(|marks| marks.iter().map(|mark| mark.kind()).collect())
        .unwrap_or_default()
}

pub fn active_font_size(editor: &Editor) -> f64 {
    editor
        .marks()
        .map_or(DEFAULT_FONT_SIZE, |marks| marks.font_size())
}

pub fn active_font_color(editor: &Editor) -> String {
    editor
        .marks()
        .map_or_else(|| DEFAULT_FONT_COLOR.to_string(), |marks| marks.color().to_string())
}

/// Link the selection to `url`. Any link already under the selection is
/// removed first. A collapsed selection inserts the url itself as link text.
/// The url is stored even when it does not look valid.
#[instrument(skip(editor))]
pub fn set_link(editor: &mut Editor, url: &str) -> EditorResult<()> {
    if editor.selection().is_none() {
        return Ok(());
    }
    remove_link(editor)?;

    let Some(selection) = editor.selection().cloned() else {
        return Ok(());
    };
    if selection.is_collapsed() {
        let link = Element::link(url, vec![Node::text(url)]);
        editor.insert_nodes(vec![Node::Element(link)], NodeOptions::new())
    } else {
        editor.wrap_nodes(Element::link(url, Vec::new()), NodeOptions::new().split())?;
        editor.collapse(Edge::End)
    }
}

/// Unwrap every link under the selection
pub fn remove_link(editor: &mut Editor) -> EditorResult<()> {
    if !is_block_active(editor, ElementType::Link) {
        return Ok(());
    }
    editor.unwrap_nodes(NodeOptions::new().matching(&of_kind(ElementType::Link)))
}

pub fn active_link(editor: &Editor) -> Option<LinkState> {
    let selection = editor.selection()?;
    let at = Location::Range(editor.unhang_range(selection));
    let (_, link) = editor
        .nodes(&at, &of_kind(ElementType::Link), Mode::Highest)
        .into_iter()
        .next()?;
    let url = link.as_element()?.attrs.url.clone().unwrap_or_default();
    let valid = is_url(&url);
    Some(LinkState { url, valid })
}

/// Insert an image at the selection. An image that ends the document is
/// followed by an empty paragraph so there is somewhere to keep typing.
#[instrument(skip(editor))]
pub fn insert_image(editor: &mut Editor, url: &str) -> EditorResult<()> {
    let mut image = Element::image(url);
    image.attrs.caption = Some(IMAGE_CAPTION.to_string());
    image.attrs.width = Some(IMAGE_SIZE.to_string());
    image.attrs.height = Some(IMAGE_SIZE.to_string());
    editor.insert_nodes(vec![Node::Element(image)], NodeOptions::new())?;

    let at_end = editor
        .selection()
        .is_some_and(|selection| editor.after(&selection.end()).is_none());
    if at_end {
        editor.insert_nodes(
            vec![Node::Element(Element::empty(ElementType::Paragraph))],
            NodeOptions::new(),
        )?;
    }
    Ok(())
}

fn active_image(editor: &Editor) -> Option<(Path, Node)> {
    let selection = editor.selection()?;
    editor
        .nodes(&Location::Range(selection.clone()), &of_kind(ElementType::Image), Mode::All)
        .into_iter()
        .next()
}

/// Remove the first image under the selection
pub fn remove_image(editor: &mut Editor) -> EditorResult<()> {
    let Some((path, _)) = active_image(editor) else {
        return Ok(());
    };
    editor.remove_nodes(NodeOptions::new().at(path))
}

/// Change one attribute of the image under the selection
pub fn update_image(editor: &mut Editor, field: ImageField, value: &str) -> EditorResult<()> {
    let Some((path, _)) = active_image(editor) else {
        return Ok(());
    };
    let update = |node: &Node| {
        let mut attrs = node.as_element()?.attrs.clone();
        let value = Some(value.to_string());
        match field {
            ImageField::Url => attrs.url = value,
            ImageField::Caption => attrs.caption = value,
            ImageField::Width => attrs.width = value,
            ImageField::Height => attrs.height = value,
        }
        Some(Properties::Element(attrs))
    };
    editor.set_nodes(&update, NodeOptions::new().at(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_model::{Point, Range};

    fn item(text: &str) -> Node {
        Node::element(ElementType::ListItem, vec![Node::text(text)])
    }

    fn select_all(editor: &mut Editor) {
        let range = editor.range_of(&Path::root()).unwrap();
        editor.select(range).unwrap();
    }

    fn kinds(editor: &Editor) -> Vec<ElementType> {
        editor.children().iter().filter_map(Node::kind).collect()
    }

    #[test]
    fn test_toggle_mark_twice_restores_text() {
        let mut editor = Editor::from_nodes(vec![Node::paragraph("hello")]);
        select_all(&mut editor);

        toggle_mark(&mut editor, Mark::Bold).unwrap();
        assert!(is_mark_active(&editor, &Mark::Bold));
        assert!(editor.children()[0].children().unwrap()[0]
            .as_text()
            .unwrap()
            .marks
            .bold);

        toggle_mark(&mut editor, Mark::Bold).unwrap();
        assert!(!is_mark_active(&editor, &Mark::Bold));
        assert_eq!(editor.children(), &[Node::paragraph("hello")]);
    }

    #[test]
    fn test_toggle_mark_collapsed_sets_pending() {
        let mut editor = Editor::from_nodes(vec![Node::paragraph("ab")]);
        editor.select(Point::new([0, 0], 1)).unwrap();
        toggle_mark(&mut editor, Mark::FontSize(24.0)).unwrap();

        assert_eq!(active_font_size(&editor), 24.0);
        assert_eq!(active_styles(&editor), vec![MarkKind::FontSize]);
        assert_eq!(editor.children(), &[Node::paragraph("ab")]);
    }

    #[test]
    fn test_toggle_plain_block_is_idempotent() {
        let mut editor = Editor::from_nodes(vec![Node::paragraph("a")]);
        editor.select(Point::new([0, 0], 0)).unwrap();
        toggle_block(&mut editor, ElementType::CodeBlock, None).unwrap();
        assert_eq!(kinds(&editor), vec![ElementType::CodeBlock]);

        editor.select(Point::new([0, 0, 0], 0)).unwrap();
        toggle_block(&mut editor, ElementType::ListItem, None).unwrap();
        toggle_block(&mut editor, ElementType::ListItem, None).unwrap();
        assert!(is_block_active(&editor, ElementType::ListItem));
    }

    #[test]
    fn test_toggle_list_wraps_and_unwraps() {
        let mut editor = Editor::from_nodes(vec![Node::paragraph("a"), Node::paragraph("b")]);
        select_all(&mut editor);

        toggle_block(&mut editor, ElementType::OrderedList, None).unwrap();
        assert_eq!(
            editor.children(),
            &[Node::element(ElementType::OrderedList, vec![item("a"), item("b")])]
        );

        toggle_block(&mut editor, ElementType::OrderedList, None).unwrap();
        assert_eq!(editor.children(), &[Node::paragraph("a"), Node::paragraph("b")]);
    }

    #[test]
    fn test_switching_groups_leaves_one_group() {
        let mut editor = Editor::from_nodes(vec![Node::element(
            ElementType::OrderedList,
            vec![item("a"), item("b")],
        )]);
        select_all(&mut editor);

        toggle_block(&mut editor, ElementType::UnorderedList, None).unwrap();
        assert_eq!(
            editor.children(),
            &[Node::element(ElementType::UnorderedList, vec![item("a"), item("b")])]
        );
        assert!(!is_block_active(&editor, ElementType::OrderedList));
    }

    #[test]
    fn test_alignment_replaces_alignment() {
        let mut editor = Editor::from_nodes(vec![Node::paragraph("a")]);
        editor.select(Point::new([0, 0], 0)).unwrap();

        toggle_block(&mut editor, ElementType::AlignCenter, None).unwrap();
        assert_eq!(kinds(&editor), vec![ElementType::AlignCenter]);

        toggle_block(&mut editor, ElementType::AlignRight, None).unwrap();
        assert_eq!(
            editor.children(),
            &[Node::element(ElementType::AlignRight, vec![Node::paragraph("a")])]
        );
    }

    #[test]
    fn test_active_block_multiple() {
        let mut editor = Editor::from_nodes(vec![
            Node::paragraph("a"),
            Node::element(ElementType::QuoteBlock, vec![Node::paragraph("b")]),
        ]);
        select_all(&mut editor);

        let candidates = [ElementType::Paragraph, ElementType::QuoteBlock];
        assert_eq!(get_active_block(&editor, &candidates), Some(ActiveBlock::Multiple));

        editor.select(Point::new([0, 0], 0)).unwrap();
        assert_eq!(
            get_active_block(&editor, &[ElementType::QuoteBlock, ElementType::CodeBlock]),
            None
        );
        assert_eq!(
            get_active_block(&editor, &candidates).map(ActiveBlock::kind),
            Some(ElementType::Paragraph)
        );
    }

    #[test]
    fn test_set_link_on_collapsed_inserts_url() {
        let mut editor = Editor::from_nodes(vec![Node::paragraph("go ")]);
        editor.select(Point::new([0, 0], 3)).unwrap();
        set_link(&mut editor, "https://x.com").unwrap();

        let children = editor.children()[0].children().unwrap();
        assert!(children[1].is_kind(ElementType::Link));
        assert_eq!(children[1].string(), "https://x.com");
        assert_eq!(
            active_link(&editor),
            Some(LinkState {
                url: "https://x.com".to_string(),
                valid: true
            })
        );
    }

    #[test]
    fn test_set_link_on_word_then_remove() {
        let mut editor = Editor::from_nodes(vec![Node::paragraph("Go to x now")]);
        editor
            .select(Range::new(Point::new([0, 0], 6), Point::new([0, 0], 7)))
            .unwrap();
        set_link(&mut editor, "not a url").unwrap();

        let children = editor.children()[0].children().unwrap();
        assert_eq!(children[1].string(), "x");
        assert!(editor.selection().unwrap().is_collapsed());
        assert_eq!(active_link(&editor).map(|link| link.valid), Some(false));

        remove_link(&mut editor).unwrap();
        assert_eq!(editor.children(), &[Node::paragraph("Go to x now")]);
    }

    #[test]
    fn test_insert_image_at_end_adds_paragraph() {
        let mut editor = Editor::from_nodes(vec![Node::paragraph("ab")]);
        editor.select(Point::new([0, 0], 2)).unwrap();
        insert_image(&mut editor, "https://img.io/a.png").unwrap();

        assert_eq!(
            kinds(&editor),
            vec![ElementType::Paragraph, ElementType::Image, ElementType::Paragraph]
        );
        let image = editor.children()[1].as_element().unwrap();
        assert_eq!(image.attrs.caption.as_deref(), Some("Image"));
        assert_eq!(image.attrs.width.as_deref(), Some("150"));
        assert_eq!(editor.children()[2], Node::paragraph(""));
    }

    #[test]
    fn test_update_and_remove_image() {
        let mut editor = Editor::from_nodes(vec![
            Node::Element(Element::image("https://img.io/a.png")),
            Node::paragraph("after"),
        ]);
        editor.select(Point::new([0, 0], 0)).unwrap();

        update_image(&mut editor, ImageField::Caption, "A cat").unwrap();
        let image = editor.children()[0].as_element().unwrap();
        assert_eq!(image.attrs.caption.as_deref(), Some("A cat"));

        remove_image(&mut editor).unwrap();
        assert_eq!(editor.children(), &[Node::paragraph("after")]);
    }
}
