//! Read-only questions about the tree: which nodes a location spans, what
//! encloses a path, where a point moves by one character, which marks apply.

use crate::Editor;
use scribe_model::{Marks, Node, Path, Point, Range};
use std::cmp::Ordering;

/// Predicate deciding which nodes a query or transform acts on
pub type Matcher<'a> = &'a dyn Fn(&Node, &Path) -> bool;

/// How matches that contain other matches are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Every match
    #[default]
    All,
    /// Only the outermost match on each branch
    Highest,
    /// Only the innermost match on each branch
    Lowest,
}

/// Where a query or transform applies
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Path(Path),
    Point(Point),
    Range(Range),
}

impl From<Path> for Location {
    fn from(path: Path) -> Self {
        Location::Path(path)
    }
}

impl From<Point> for Location {
    fn from(point: Point) -> Self {
        Location::Point(point)
    }
}

impl From<Range> for Location {
    fn from(range: Range) -> Self {
        Location::Range(range)
    }
}

impl Location {
    /// First and last path the location touches
    pub fn span(&self) -> (Path, Path) {
        match self {
            Location::Path(path) => (path.clone(), path.clone()),
            Location::Point(point) => (point.path.clone(), point.path.clone()),
            Location::Range(range) => {
                let (start, end) = range.edges();
                (start.path, end.path)
            }
        }
    }
}

/// Options shared by the node transforms
#[derive(Clone, Default)]
pub struct NodeOptions<'a> {
    pub at: Option<Location>,
    pub matcher: Option<Matcher<'a>>,
    pub mode: Option<Mode>,
    /// Split text or blocks at the range edges first, so only the covered
    /// part is affected
    pub split: bool,
    pub select: Option<bool>,
}

impl<'a> NodeOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, at: impl Into<Location>) -> Self {
        self.at = Some(at.into());
        self
    }

    pub fn matching(mut self, matcher: Matcher<'a>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = Some(mode);
        self
    }

    pub fn split(mut self) -> Self {
        self.split = true;
        self
    }

    pub fn select(mut self, select: bool) -> Self {
        self.select = Some(select);
        self
    }
}

/// Block-level element
pub fn is_block(node: &Node, _: &Path) -> bool {
    node.is_block()
}

pub fn is_text(node: &Node, _: &Path) -> bool {
    node.is_text()
}

/// Text leaf or inline element
pub fn is_inline(node: &Node, _: &Path) -> bool {
    node.is_inline()
}

pub fn is_void(node: &Node, _: &Path) -> bool {
    node.is_void()
}

impl Editor {
    pub fn node(&self, path: &Path) -> Option<&Node> {
        self.document.node(path)
    }

    /// Parent element of `path`; `None` for top-level nodes
    pub fn parent(&self, path: &Path) -> Option<(Path, &Node)> {
        let parent = path.parent().filter(|parent| !parent.is_root())?;
        let node = self.document.node(&parent)?;
        Some((parent, node))
    }

    pub fn leaf(&self, point: &Point) -> Option<&scribe_model::Text> {
        self.document.text(&point.path)
    }

    /// Nodes from the top level down to `path`, stopping at a void element
    pub fn levels(&self, path: &Path) -> Vec<(Path, &Node)> {
        let mut levels = Vec::new();
        for len in 1..=path.len() {
            let level = path.slice(len);
            let Some(node) = self.document.node(&level) else {
                break;
            };
            let void = node.is_void();
            levels.push((level, node));
            if void {
                break;
            }
        }
        levels
    }

    /// Every node between the first and last path of `at`, in document order,
    /// including the ancestors of the first path. Void elements are reported
    /// but not entered.
    pub fn span(&self, at: &Location) -> Vec<(Path, &Node)> {
        let (from, to) = at.span();
        let mut out = Vec::new();
        collect_span(&self.document.children, &Path::root(), &from, &to, &mut out);
        out
    }

    /// Nodes in `at` accepted by `matcher`, filtered by `mode`
    pub fn nodes(&self, at: &Location, matcher: Matcher, mode: Mode) -> Vec<(Path, Node)> {
        let mut out = Vec::new();
        let mut hit: Option<(Path, &Node)> = None;

        for (path, node) in self.span(at) {
            let is_lower = hit
                .as_ref()
                .is_some_and(|(hit_path, _)| path.compare(hit_path) == Ordering::Equal);
            if mode == Mode::Highest && is_lower {
                continue;
            }
            if !matcher(node, &path) {
                continue;
            }
            if mode == Mode::Lowest && is_lower {
                hit = Some((path, node));
                continue;
            }
            let emit = match mode {
                Mode::Lowest => hit.take(),
                _ => Some((path.clone(), node)),
            };
            if let Some((emit_path, emit_node)) = emit {
                out.push((emit_path, emit_node.clone()));
            }
            hit = Some((path, node));
        }

        if mode == Mode::Lowest {
            if let Some((path, node)) = hit {
                out.push((path, node.clone()));
            }
        }
        out
    }

    /// Nearest (`Lowest`) or furthest (`Highest`) ancestor of `path` accepted
    /// by `matcher`. The node at `path` itself is never returned.
    pub fn above(&self, path: &Path, matcher: Matcher, mode: Mode) -> Option<(Path, Node)> {
        let levels = self.levels(path);
        let candidates: Box<dyn Iterator<Item = &(Path, &Node)>> = match mode {
            Mode::Highest => Box::new(levels.iter()),
            _ => Box::new(levels.iter().rev()),
        };
        let found = candidates
            .filter(|(level, node)| level != path && !node.is_text())
            .find(|(level, node)| matcher(*node, level))
            .map(|(level, node)| (level.clone(), (*node).clone()));
        found
    }

    /// Lowest block holding `path` (the path itself when it is a block)
    pub fn block_at(&self, path: &Path) -> Option<(Path, Node)> {
        match self.document.node(path) {
            Some(node) if node.is_block() => Some((path.clone(), node.clone())),
            _ => self.above(path, &is_block, Mode::Lowest),
        }
    }

    /// Outermost void element around `path`, if any
    pub fn void_above(&self, path: &Path) -> Option<(Path, Node)> {
        self.levels(path)
            .into_iter()
            .find(|(_, node)| node.is_void())
            .map(|(level, node)| (level, node.clone()))
    }

    pub fn start(&self, path: &Path) -> Option<Point> {
        let (text_path, _) = self.document.first_text(path)?;
        Some(Point::new(text_path, 0))
    }

    pub fn end(&self, path: &Path) -> Option<Point> {
        let (text_path, text) = self.document.last_text(path)?;
        Some(Point::new(text_path, text.text.len()))
    }

    /// Range covering the whole node at `path`
    pub fn range_of(&self, path: &Path) -> Option<Range> {
        Some(Range::new(self.start(path)?, self.end(path)?))
    }

    /// Resolve any location to a range
    pub fn range(&self, at: &Location) -> Option<Range> {
        match at {
            Location::Path(path) => self.range_of(path),
            Location::Point(point) => Some(Range::collapsed(point.clone())),
            Location::Range(range) => Some(range.clone()),
        }
    }

    pub fn is_start(&self, point: &Point, path: &Path) -> bool {
        self.start(path).as_ref() == Some(point)
    }

    pub fn is_end(&self, point: &Point, path: &Path) -> bool {
        self.end(path).as_ref() == Some(point)
    }

    pub fn is_edge(&self, point: &Point, path: &Path) -> bool {
        self.is_start(point, path) || self.is_end(point, path)
    }

    /// An element whose only content is one empty text
    pub fn is_empty(&self, node: &Node) -> bool {
        match node {
            Node::Element(element) => {
                element.children.is_empty()
                    || (!element.is_void()
                        && element.children.len() == 1
                        && matches!(&element.children[0], Node::Text(text) if text.text.is_empty()))
            }
            Node::Text(text) => text.text.is_empty(),
        }
    }

    /// Text inside `at`. Content of void elements is not included.
    pub fn string(&self, at: &Location) -> String {
        let Some(range) = self.range(at) else {
            return String::new();
        };
        let (start, end) = range.edges();
        let mut out = String::new();
        for (path, node) in self.span(&Location::Range(range)) {
            let Node::Text(text) = node else {
                continue;
            };
            let mut value = text.text.as_str();
            if path == end.path {
                value = value.get(..end.offset).unwrap_or(value);
            }
            if path == start.path {
                value = value.get(start.offset..).unwrap_or("");
            }
            out.push_str(value);
        }
        out
    }

    /// The point one character before `point`. Crossing the start of a block
    /// lands on the end of the previous block.
    pub fn before(&self, point: &Point) -> Option<Point> {
        let (block, leaves) = self.block_leaves(&point.path)?;
        let offset = block_offset(&leaves, point)?;
        if offset > 0 {
            let content: String = leaves.iter().map(|(_, text)| text.as_str()).collect();
            let step = content.get(..offset)?.chars().next_back()?.len_utf8();
            return point_at(&leaves, offset - step, true);
        }

        self.document
            .texts()
            .into_iter()
            .take_while(|(path, _)| path.is_before(&block))
            .last()
            .map(|(path, text)| Point::new(path, text.text.len()))
    }

    /// The point one character after `point`. Crossing the end of a block
    /// lands on the start of the next block.
    pub fn after(&self, point: &Point) -> Option<Point> {
        let (block, leaves) = self.block_leaves(&point.path)?;
        let offset = block_offset(&leaves, point)?;
        let content: String = leaves.iter().map(|(_, text)| text.as_str()).collect();
        if offset < content.len() {
            let step = content.get(offset..)?.chars().next()?.len_utf8();
            return point_at(&leaves, offset + step, false);
        }

        self.document
            .texts()
            .into_iter()
            .find(|(path, _)| path.is_after(&block))
            .map(|(path, _)| Point::new(path, 0))
    }

    /// Block holding `path` and its text leaves in order
    fn block_leaves(&self, path: &Path) -> Option<(Path, Vec<(Path, String)>)> {
        let (block, _) = self.block_at(path)?;
        let leaves = self
            .document
            .descendants_of(&block)
            .into_iter()
            .filter_map(|(path, node)| node.as_text().map(|text| (path, text.text.clone())))
            .collect();
        Some((block, leaves))
    }

    /// Shrink a range that ends at the very start of a block so it ends at
    /// the last non-empty text before that block instead
    pub fn unhang_range(&self, range: &Range) -> Range {
        let (start, end) = range.edges();
        if start.offset != 0 || end.offset != 0 || range.is_collapsed() || end.path.has_previous() {
            return range.clone();
        }
        let block_path = self
            .above(&end.path, &is_block, Mode::Lowest)
            .map(|(path, _)| path)
            .unwrap_or_default();

        let texts = self.nodes(
            &Location::Range(Range::new(start.clone(), end.clone())),
            &is_text,
            Mode::All,
        );
        for (path, node) in texts.iter().rev().skip(1) {
            let text = node.as_text().map(|text| text.text.as_str()).unwrap_or_default();
            if !text.is_empty() || path.is_before(&block_path) {
                return Range::new(start, Point::new(path.clone(), text.len()));
            }
        }
        Range::new(start, end)
    }

    /// Marks that text typed now would get: pending marks if any, else the
    /// marks of the first selected text, else those of the leaf at the caret
    /// (or the leaf before it when the caret sits at a leaf start)
    pub fn marks(&self) -> Option<Marks> {
        let selection = self.selection.as_ref()?;
        if let Some(marks) = &self.marks {
            return Some(marks.clone());
        }

        if selection.is_expanded() {
            let first = self
                .nodes(&Location::Range(selection.clone()), &is_text, Mode::All)
                .into_iter()
                .next();
            return Some(match first {
                Some((_, Node::Text(text))) => text.marks,
                _ => Marks::default(),
            });
        }

        let anchor = &selection.anchor;
        let mut marks = self.leaf(anchor)?.marks.clone();
        if anchor.offset == 0 && self.void_above(&anchor.path).is_none() {
            let previous = self
                .document
                .texts()
                .into_iter()
                .take_while(|(path, _)| path.is_before(&anchor.path))
                .last();
            let block = self.above(&anchor.path, &is_block, Mode::Lowest);
            if let (Some((prev_path, prev)), Some((block_path, _))) = (previous, block) {
                if block_path.is_ancestor_of(&prev_path) {
                    marks = prev.marks.clone();
                }
            }
        }
        Some(marks)
    }
}

fn collect_span<'a>(
    children: &'a [Node],
    parent: &Path,
    from: &Path,
    to: &Path,
    out: &mut Vec<(Path, &'a Node)>,
) {
    for (index, child) in children.iter().enumerate() {
        let path = parent.child(index);
        if path.compare(from) == Ordering::Less {
            continue;
        }
        if path.compare(to) == Ordering::Greater {
            break;
        }
        out.push((path.clone(), child));
        if let Node::Element(element) = child {
            if !element.is_void() {
                collect_span(&element.children, &path, from, to, out);
            }
        }
    }
}

/// Offset of `point` within the concatenated text of `leaves`
fn block_offset(leaves: &[(Path, String)], point: &Point) -> Option<usize> {
    let mut offset = 0;
    for (path, text) in leaves {
        if *path == point.path {
            return Some(offset + point.offset);
        }
        offset += text.len();
    }
    None
}

/// Point at a block offset. On a leaf boundary `prefer_earlier` picks the end
/// of the leaf before it rather than the start of the leaf after it.
fn point_at(leaves: &[(Path, String)], offset: usize, prefer_earlier: bool) -> Option<Point> {
    let mut start = 0;
    for (index, (path, text)) in leaves.iter().enumerate() {
        let end = start + text.len();
        let is_last = index + 1 == leaves.len();
        let inside = if prefer_earlier { offset <= end } else { offset < end || is_last };
        if inside && offset >= start {
            return Some(Point::new(path.clone(), offset - start));
        }
        start = end;
    }
    None
}
