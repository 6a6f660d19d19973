//! Structural edits.
//!
//! Every transform here is a sequence of [`Operation`]s pushed through
//! [`Editor::apply`] inside [`Editor::without_normalizing`], so the tree is
//! normalized once, when the outermost transform returns. Locations computed
//! before an edit are carried across it with refs rather than recomputed.
//!
//! Transforms that take no explicit location act on the selection, and the
//! ones that move content (`split_nodes`, `delete`, `insert_nodes`) then leave
//! the selection where the user expects the caret to be.

use crate::queries::{is_block, is_inline, is_text, Location, Matcher, Mode, NodeOptions};
use crate::{Editor, EditorError, EditorResult, PathRef};
use scribe_model::{
    Affinity, Document, Element, Mark, MarkKind, MutationError, Node, Operation, Path, Point,
    Properties, Range, Text,
};
use std::cmp::Ordering;
use tracing::trace;

/// Which end of the selection to collapse to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Anchor,
    Focus,
    Start,
    End,
}

/// Options for [`Editor::split_nodes`]
#[derive(Clone, Default)]
pub struct SplitOptions<'a> {
    pub at: Option<Location>,
    pub matcher: Option<Matcher<'a>>,
    pub mode: Option<Mode>,
    /// Split even when the point sits on the edge of a node
    pub always: bool,
}

impl<'a> SplitOptions<'a> {
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

    pub fn always(mut self, always: bool) -> Self {
        self.always = always;
        self
    }
}

/// Options for [`Editor::delete`]
#[derive(Debug, Clone, Default)]
pub struct DeleteOptions {
    pub at: Option<Location>,
    /// Delete the character before a collapsed location instead of after it
    pub reverse: bool,
    /// Keep a range that ends at the start of a block as it is
    pub hanging: bool,
}

impl DeleteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn at(mut self, at: impl Into<Location>) -> Self {
        self.at = Some(at.into());
        self
    }

    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    pub fn hanging(mut self, hanging: bool) -> Self {
        self.hanging = hanging;
        self
    }
}

fn any_node(_: &Node, _: &Path) -> bool {
    true
}

fn inline_element(node: &Node, _: &Path) -> bool {
    matches!(node, Node::Element(element) if element.is_inline())
}

/// Matcher accepting only the node at `at`, when `at` is a path
fn at_path(at: &Location) -> impl Fn(&Node, &Path) -> bool {
    let target = match at {
        Location::Path(path) => Some(path.clone()),
        _ => None,
    };
    move |_: &Node, path: &Path| target.as_ref() == Some(path)
}

/// The caller's matcher, else the node at a path location, else blocks
fn or_default<'m>(matcher: Option<Matcher<'m>>, at: &Location, own: Matcher<'m>) -> Matcher<'m> {
    match (matcher, at) {
        (Some(matcher), _) => matcher,
        (None, Location::Path(_)) => own,
        (None, _) => &is_block,
    }
}

fn following(path: &Path) -> Path {
    path.next().unwrap_or_else(|| path.clone())
}

/// An element whose content is a single chain down to one leaf or void
fn has_single_child_nest(node: &Node) -> bool {
    match node {
        Node::Element(element) if element.is_void() => true,
        Node::Element(element) => match element.children.as_slice() {
            [only] => has_single_child_nest(only),
            _ => false,
        },
        Node::Text(_) => true,
    }
}

/// `path` is `other` or one of its ancestors
fn is_common(path: &Path, other: &Path) -> bool {
    path == other || path.is_ancestor_of(other)
}

// Fragment nodes accepted by `keep`; rejected elements are searched instead.
fn collect_fragment(
    children: &[Node],
    parent: &Path,
    keep: &dyn Fn(&Node, &Path) -> bool,
    out: &mut Vec<Node>,
) {
    for (index, child) in children.iter().enumerate() {
        let path = parent.child(index);
        if keep(child, &path) {
            out.push(child.clone());
        } else if let Node::Element(element) = child {
            collect_fragment(&element.children, &path, keep, out);
        }
    }
}

// Selection
impl Editor {
    pub fn set_selection(&mut self, selection: Option<Range>) -> EditorResult<()> {
        if self.selection == selection {
            return Ok(());
        }
        self.apply(Operation::SetSelection {
            properties: self.selection.clone(),
            new_properties: selection,
        })
    }

    /// Select a path (its whole content), a point or a range
    pub fn select(&mut self, at: impl Into<Location>) -> EditorResult<()> {
        let range = self.resolve_range(&at.into())?;
        self.set_selection(Some(range))
    }

    pub fn deselect(&mut self) -> EditorResult<()> {
        self.set_selection(None)
    }

    pub fn collapse(&mut self, edge: Edge) -> EditorResult<()> {
        let Some(selection) = self.selection.clone() else {
            return Ok(());
        };
        let point = match edge {
            Edge::Anchor => selection.anchor,
            Edge::Focus => selection.focus,
            Edge::Start => selection.start(),
            Edge::End => selection.end(),
        };
        self.select(point)
    }

    pub(crate) fn resolve_range(&self, at: &Location) -> EditorResult<Range> {
        self.range(at)
            .ok_or_else(|| EditorError::NodeNotFound(at.span().0))
    }

    fn selection_location(&self) -> Option<Location> {
        self.selection.clone().map(Location::Range)
    }

    /// The selection, else the end of the document
    fn default_insert_location(&self) -> Location {
        match (&self.selection, self.end(&Path::root())) {
            (Some(selection), _) => Location::Range(selection.clone()),
            (None, Some(end)) => Location::Point(end),
            (None, None) => Location::Path(Path::new([0])),
        }
    }

    fn path_refs(&self, entries: &[(Path, Node)]) -> Vec<PathRef> {
        entries
            .iter()
            .map(|(path, _)| self.path_ref(path.clone(), Affinity::Forward))
            .collect()
    }

    fn remove_node_at(&mut self, path: Path) -> EditorResult<()> {
        let node = self.node_or_err(&path)?.clone();
        self.apply(Operation::RemoveNode { path, node })
    }
}

// Node transforms
impl Editor {
    /// Insert `nodes` at a path, or at a point after splitting the nodes
    /// around it. Without a location the nodes go at the selection and the
    /// caret moves to their end.
    pub fn insert_nodes(&mut self, nodes: Vec<Node>, options: NodeOptions) -> EditorResult<()> {
        if nodes.is_empty() {
            return Ok(());
        }
        self.without_normalizing(|editor| {
            let (at, select) = match options.at.clone() {
                Some(at) => (at, options.select.unwrap_or(false)),
                None => (editor.default_insert_location(), options.select.unwrap_or(true)),
            };

            let path = match at {
                Location::Path(path) => Some(path),
                Location::Point(point) => {
                    editor.insertion_path(point, &nodes[0], options.matcher, options.mode)?
                }
                Location::Range(range) => {
                    let range = editor.unhang_range(&range);
                    match editor.delete_range(range)? {
                        Some(point) => {
                            editor.insertion_path(point, &nodes[0], options.matcher, options.mode)?
                        }
                        None => None,
                    }
                }
            };
            let Some(path) = path else {
                return Ok(());
            };

            let Some(parent) = path.parent() else {
                return Ok(());
            };
            if editor.void_above(&parent).is_some() {
                return Ok(());
            }
            let index = path.last().unwrap_or_default();
            let count = nodes.len();
            for (offset, node) in nodes.into_iter().enumerate() {
                editor.apply(Operation::InsertNode {
                    path: parent.child(index + offset),
                    node,
                })?;
            }

            if select {
                if let Some(end) = editor.end(&parent.child(index + count - 1)) {
                    editor.select(end)?;
                }
            }
            Ok(())
        })
    }

    // Split the nodes around `point` so `first` can be inserted as a sibling
    // of the matched node; returns the insertion path.
    fn insertion_path(
        &mut self,
        point: Point,
        first: &Node,
        matcher: Option<Matcher>,
        mode: Option<Mode>,
    ) -> EditorResult<Option<Path>> {
        let matcher: Matcher = match matcher {
            Some(matcher) => matcher,
            None if first.is_text() => &is_text,
            None if first.is_inline() => &is_inline,
            None => &is_block,
        };
        let mode = mode.unwrap_or(Mode::Lowest);
        let Some((found, _)) = self
            .nodes(&Location::Path(point.path.clone()), matcher, mode)
            .into_iter()
            .next()
        else {
            return Ok(None);
        };

        let mut found_ref = self.path_ref(found.clone(), Affinity::Forward);
        let at_end = self.is_end(&point, &found);
        self.split_nodes(SplitOptions::new().at(point).matching(matcher).mode(mode))?;
        Ok(found_ref
            .current(self)
            .map(|path| if at_end { following(&path) } else { path }))
    }

    pub fn remove_nodes(&mut self, options: NodeOptions) -> EditorResult<()> {
        self.without_normalizing(|editor| {
            let Some(at) = options.at.clone().or_else(|| editor.selection_location()) else {
                return Ok(());
            };
            let own = at_path(&at);
            let matcher = or_default(options.matcher, &at, &own);
            let at = match at {
                Location::Range(range) => Location::Range(editor.unhang_range(&range)),
                other => other,
            };

            let found = editor.nodes(&at, matcher, options.mode.unwrap_or(Mode::Lowest));
            for mut path_ref in editor.path_refs(&found) {
                if let Some(path) = path_ref.current(editor) {
                    editor.remove_node_at(path)?;
                }
            }
            Ok(())
        })
    }

    /// Replace the properties of matching nodes. `update` returns the new
    /// properties, or `None` to leave a node alone. With `split`, text and
    /// blocks are split at the range edges so only the covered part changes.
    pub fn set_nodes(
        &mut self,
        update: &dyn Fn(&Node) -> Option<Properties>,
        options: NodeOptions,
    ) -> EditorResult<()> {
        self.without_normalizing(|editor| {
            let Some(mut at) = options.at.clone().or_else(|| editor.selection_location()) else {
                return Ok(());
            };
            let own = at_path(&at);
            let matcher = or_default(options.matcher, &at, &own);
            let mode = options.mode.unwrap_or(Mode::Lowest);
            if let Location::Range(range) = &at {
                at = Location::Range(editor.unhang_range(range));
            }

            if let (true, Location::Range(range)) = (options.split, at.clone()) {
                let leaf_has_text = editor
                    .leaf(&range.anchor)
                    .is_some_and(|leaf| !leaf.text.is_empty());
                if range.is_collapsed() && leaf_has_text {
                    return Ok(());
                }
                let mut range_ref = editor.range_ref(range.clone());
                let split_mode = if mode == Mode::Lowest { Mode::Lowest } else { Mode::Highest };
                editor.split_edges(&range, matcher, split_mode, true)?;
                let Some(range) = range_ref.current(editor) else {
                    return Ok(());
                };
                if options.at.is_none() {
                    editor.select(range.clone())?;
                }
                at = Location::Range(range);
            }

            for (path, node) in editor.nodes(&at, matcher, mode) {
                let Some(new_properties) = update(&node) else {
                    continue;
                };
                let properties = node.properties();
                if properties != new_properties {
                    editor.apply(Operation::SetNode {
                        path,
                        properties,
                        new_properties,
                    })?;
                }
            }
            Ok(())
        })
    }

    // Split at the end, then the start, of `range`. With `inside`, an edge
    // that is not already a node edge always splits.
    fn split_edges(
        &mut self,
        range: &Range,
        matcher: Matcher,
        mode: Mode,
        inside: bool,
    ) -> EditorResult<()> {
        let (start, end) = range.edges();
        let always = inside && !self.is_end(&end, &end.path);
        self.split_nodes(
            SplitOptions::new()
                .at(end)
                .matching(matcher)
                .mode(mode)
                .always(always),
        )?;
        let always = inside && !self.is_start(&start, &start.path);
        self.split_nodes(
            SplitOptions::new()
                .at(start)
                .matching(matcher)
                .mode(mode)
                .always(always),
        )
    }

    /// Split the text at a point and its ancestors up to the matched node.
    /// Ancestors are only split when the point is not on their edge, unless
    /// `always` is set. A path location splits its parent before that node.
    pub fn split_nodes(&mut self, options: SplitOptions) -> EditorResult<()> {
        self.without_normalizing(|editor| {
            let matcher = options.matcher.unwrap_or(&is_block);
            let mode = options.mode.unwrap_or(Mode::Lowest);
            let Some(at) = options.at.clone().or_else(|| editor.selection_location()) else {
                return Ok(());
            };
            let point = match at {
                Location::Path(path) => return editor.split_parent_before(&path),
                Location::Point(point) => point,
                Location::Range(range) => match editor.delete_range(range)? {
                    Some(point) => point,
                    None => return Ok(()),
                },
            };

            let mut before_ref = editor.point_ref(point.clone(), Affinity::Backward);
            let Some((highest, _)) = editor
                .nodes(&Location::Point(point.clone()), matcher, mode)
                .into_iter()
                .next()
            else {
                return Ok(());
            };

            let mut always = options.always;
            let mut height = 0;
            if let Some((void_path, _)) = editor.void_above(&point.path) {
                height = point.path.len() - void_path.len() + 1;
                always = true;
            }

            let mut after_ref = editor.point_ref(point.clone(), Affinity::Forward);
            let depth = point.path.len().saturating_sub(height);
            let lowest = point.path.slice(depth);
            let mut position = if height == 0 { point.offset } else { point.path[depth] };

            let levels: Vec<(Path, Properties, bool)> = editor
                .levels(&lowest)
                .into_iter()
                .rev()
                .map(|(path, node)| (path, node.properties(), node.is_void()))
                .collect();
            for (path, properties, void) in levels {
                if path.len() < highest.len() || path.is_root() || void {
                    break;
                }
                let Some(before) = before_ref.current(editor) else {
                    break;
                };
                let at_end = editor.is_end(&before, &path);
                let split = always || !editor.is_edge(&before, &path);
                if split {
                    editor.apply(Operation::SplitNode {
                        path: path.clone(),
                        position,
                        properties,
                    })?;
                }
                position = path.last().unwrap_or_default() + usize::from(split || at_end);
            }

            if options.at.is_none() {
                let caret = after_ref.current(editor).or_else(|| editor.end(&Path::root()));
                if let Some(caret) = caret {
                    editor.select(caret)?;
                }
            }
            Ok(())
        })
    }

    // Split the parent of `path` so the node at `path` starts the right half
    fn split_parent_before(&mut self, path: &Path) -> EditorResult<()> {
        let Some(parent) = path.parent().filter(|parent| !parent.is_root()) else {
            return Ok(());
        };
        let properties = self.node_or_err(&parent)?.properties();
        self.apply(Operation::SplitNode {
            path: parent,
            position: path.last().unwrap_or_default(),
            properties,
        })
    }

    /// Merge the matched node at a point into the matched node before it.
    /// With a path, the node merges into its previous sibling. A node nested
    /// deeper than its target is moved next to it first, and wrappers left
    /// holding nothing else are removed. An empty target is removed instead.
    pub fn merge_nodes(&mut self, options: NodeOptions) -> EditorResult<()> {
        self.without_normalizing(|editor| {
            let Some(at) = options.at.clone().or_else(|| editor.selection_location()) else {
                return Ok(());
            };
            let matcher = options.matcher.unwrap_or(&is_block);
            let mode = options.mode.unwrap_or(Mode::Lowest);

            let (current, previous) = match at {
                Location::Path(path) => {
                    let Some(previous) = path.previous() else {
                        return Ok(());
                    };
                    let entry = |path: Path| editor.node(&path).cloned().map(|node| (path, node));
                    (entry(path), entry(previous))
                }
                other => {
                    let point = match other {
                        Location::Point(point) => point,
                        Location::Range(range) => {
                            let range = editor.unhang_range(&range);
                            if range.is_collapsed() {
                                range.anchor
                            } else {
                                let Some(point) = editor.delete_range(range)? else {
                                    return Ok(());
                                };
                                if options.at.is_none() {
                                    editor.select(point.clone())?;
                                }
                                point
                            }
                        }
                        Location::Path(_) => return Ok(()),
                    };
                    let first = |at: Point| {
                        editor
                            .nodes(&Location::Point(at), matcher, mode)
                            .into_iter()
                            .next()
                    };
                    let previous = editor.before(&point).and_then(|before| first(before));
                    (first(point), previous)
                }
            };

            let (Some((path, node)), Some((prev_path, prev_node))) = (current, previous) else {
                return Ok(());
            };
            if path.is_root()
                || prev_path.is_root()
                || path == prev_path
                || prev_path.is_ancestor_of(&path)
            {
                return Ok(());
            }

            let position = match (&node, &prev_node) {
                (Node::Text(_), Node::Text(prev)) => prev.text.len(),
                (Node::Element(_), Node::Element(prev)) => prev.children.len(),
                _ => return Err(MutationError::IncompatibleMerge(path).into()),
            };
            let properties = node.properties();
            let new_path = following(&prev_path);
            let common = path.common(&prev_path);

            let nested_alone =
                |node: &Node, level: &Path| level.len() >= common.len() && has_single_child_nest(node);
            let mut empty_ref = editor
                .above(&path, &nested_alone, Mode::Highest)
                .map(|(empty, _)| editor.path_ref(empty, Affinity::Forward));

            if !path.is_sibling(&prev_path) {
                editor.apply(Operation::MoveNode {
                    path: path.clone(),
                    new_path: new_path.clone(),
                })?;
            }
            if let Some(empty) = empty_ref.as_mut().and_then(|empty| empty.current(editor)) {
                editor.remove_node_at(empty)?;
            }

            let prev_is_empty = match &prev_node {
                Node::Element(_) => editor.is_empty(&prev_node),
                Node::Text(text) => text.text.is_empty() && prev_path.last() != Some(0),
            };
            if prev_is_empty {
                editor.remove_node_at(prev_path)
            } else {
                editor.apply(Operation::MergeNode {
                    path: new_path,
                    position,
                    properties,
                })
            }
        })
    }

    /// Move the matched nodes so the first lands at `to`
    pub fn move_nodes(&mut self, to: Path, options: NodeOptions) -> EditorResult<()> {
        self.without_normalizing(|editor| {
            let Some(at) = options.at.clone().or_else(|| editor.selection_location()) else {
                return Ok(());
            };
            let own = at_path(&at);
            let matcher = or_default(options.matcher, &at, &own);

            let mut to_ref = editor.path_ref(to, Affinity::Forward);
            let targets = editor.nodes(&at, matcher, options.mode.unwrap_or(Mode::Lowest));
            for mut path_ref in editor.path_refs(&targets) {
                let (Some(path), Some(new_path)) = (path_ref.current(editor), to_ref.current(editor))
                else {
                    continue;
                };
                if !path.is_root() {
                    editor.apply(Operation::MoveNode {
                        path: path.clone(),
                        new_path: new_path.clone(),
                    })?;
                }
                if new_path.is_sibling(&path) && new_path.is_after(&path) {
                    let next = to_ref.current(editor).map(|current| following(&current));
                    to_ref.set(editor, next);
                }
            }
            Ok(())
        })
    }

    /// Move the matched nodes out of their parent, splitting the parent when
    /// they sit in its middle and removing it when they were all it held
    pub fn lift_nodes(&mut self, options: NodeOptions) -> EditorResult<()> {
        self.without_normalizing(|editor| {
            let Some(at) = options.at.clone().or_else(|| editor.selection_location()) else {
                return Ok(());
            };
            let own = at_path(&at);
            let matcher = or_default(options.matcher, &at, &own);

            let found = editor.nodes(&at, matcher, options.mode.unwrap_or(Mode::Lowest));
            for mut path_ref in editor.path_refs(&found) {
                let Some(path) = path_ref.current(editor) else {
                    continue;
                };
                if path.len() < 2 {
                    return Err(EditorError::CannotLift(path));
                }
                let Some(parent) = path.parent() else {
                    continue;
                };
                let length = editor.document.children_at(&parent).map_or(0, Vec::len);
                let index = path.last().unwrap_or_default();
                let after_parent = following(&parent);

                if length == 1 {
                    editor.apply(Operation::MoveNode {
                        path,
                        new_path: after_parent,
                    })?;
                    editor.remove_node_at(parent)?;
                } else if index == 0 {
                    editor.apply(Operation::MoveNode {
                        path,
                        new_path: parent,
                    })?;
                } else if index + 1 == length {
                    editor.apply(Operation::MoveNode {
                        path,
                        new_path: after_parent,
                    })?;
                } else {
                    editor.split_parent_before(&following(&path))?;
                    editor.apply(Operation::MoveNode {
                        path,
                        new_path: after_parent,
                    })?;
                }
            }
            Ok(())
        })
    }

    /// Wrap the matched nodes in a copy of `wrapper`. An inline wrapper wraps
    /// the matches of each block separately.
    pub fn wrap_nodes(&mut self, wrapper: Element, options: NodeOptions) -> EditorResult<()> {
        self.without_normalizing(|editor| {
            let Some(mut at) = options.at.clone().or_else(|| editor.selection_location()) else {
                return Ok(());
            };
            let own = at_path(&at);
            let fallback: Matcher = match &at {
                Location::Path(_) => &own,
                _ if wrapper.is_inline() => &is_inline,
                _ => &is_block,
            };
            let matcher = options.matcher.unwrap_or(fallback);
            let mode = options.mode.unwrap_or(Mode::Lowest);

            if let (true, Location::Range(range)) = (options.split, at.clone()) {
                let mut range_ref = editor.range_ref(range.clone());
                editor.split_edges(&range, matcher, Mode::Lowest, false)?;
                let Some(range) = range_ref.current(editor) else {
                    return Ok(());
                };
                if options.at.is_none() {
                    editor.select(range.clone())?;
                }
                at = Location::Range(range);
            }

            let roots: Vec<Path> = if wrapper.is_inline() {
                editor
                    .nodes(&at, &is_block, Mode::Lowest)
                    .into_iter()
                    .map(|(path, _)| path)
                    .collect()
            } else {
                vec![Path::root()]
            };

            for root in roots {
                let scope = match &at {
                    Location::Range(range) => {
                        match editor.range_of(&root).and_then(|whole| range.intersection(&whole)) {
                            Some(range) => Location::Range(range),
                            None => continue,
                        }
                    }
                    other => other.clone(),
                };
                let found = editor.nodes(&scope, matcher, mode);
                let (Some((first, _)), Some((last, _))) = (found.first(), found.last()) else {
                    continue;
                };
                if first.is_root() && last.is_root() {
                    continue;
                }

                let common = if first == last {
                    first.parent().unwrap_or_default()
                } else {
                    first.common(last)
                };
                let (Some(start), Some(end)) = (editor.start(first), editor.end(last)) else {
                    continue;
                };
                let wrapper_path = following(&last.slice(common.len() + 1));

                let mut shell = wrapper.clone();
                shell.children.clear();
                trace!(%wrapper_path, kind = %shell.kind(), "wrapping");
                editor.insert_nodes(
                    vec![Node::Element(shell)],
                    NodeOptions::new().at(wrapper_path.clone()),
                )?;

                let direct_child = |_: &Node, path: &Path| path.parent().as_ref() == Some(&common);
                editor.move_nodes(
                    wrapper_path.child(0),
                    NodeOptions::new()
                        .at(Range::new(start, end))
                        .matching(&direct_child),
                )?;
            }
            Ok(())
        })
    }

    /// Replace each matched element by its children
    pub fn unwrap_nodes(&mut self, options: NodeOptions) -> EditorResult<()> {
        self.without_normalizing(|editor| {
            let Some(at) = options.at.clone().or_else(|| editor.selection_location()) else {
                return Ok(());
            };
            let own = at_path(&at);
            let matcher = or_default(options.matcher, &at, &own);
            let at = match at {
                Location::Path(_) => Location::Range(editor.resolve_range(&at)?),
                other => other,
            };
            let mut range_ref = match &at {
                Location::Range(range) => Some(editor.range_ref(range.clone())),
                _ => None,
            };

            let found = editor.nodes(&at, matcher, options.mode.unwrap_or(Mode::Lowest));
            for mut path_ref in editor.path_refs(&found).into_iter().rev() {
                let Some(path) = path_ref.current(editor) else {
                    continue;
                };
                let Some(mut range) = editor.range_of(&path) else {
                    continue;
                };
                if options.split {
                    if let Some(current) = range_ref.as_mut().and_then(|r| r.current(editor)) {
                        match range.intersection(&current) {
                            Some(inside) => range = inside,
                            None => continue,
                        }
                    }
                }
                let child_of = |_: &Node, child: &Path| child.parent().as_ref() == Some(&path);
                editor.lift_nodes(NodeOptions::new().at(range).matching(&child_of))?;
            }
            Ok(())
        })
    }
}

// Text transforms
impl Editor {
    /// Delete a range, a node at a path, or one character next to a point
    pub fn delete(&mut self, options: DeleteOptions) -> EditorResult<()> {
        self.without_normalizing(|editor| {
            let Some(at) = options.at.clone().or_else(|| editor.selection_location()) else {
                return Ok(());
            };
            let mut hanging = options.hanging;
            let at = match at {
                Location::Range(range) if range.is_collapsed() => Location::Point(range.anchor),
                other => other,
            };

            let range = match at {
                Location::Path(path) => return editor.remove_nodes(NodeOptions::new().at(path)),
                Location::Range(range) => range,
                Location::Point(point) => {
                    if let Some((void_path, _)) = editor.void_above(&point.path) {
                        return editor.remove_nodes(NodeOptions::new().at(void_path));
                    }
                    let target = if options.reverse {
                        editor.before(&point).or_else(|| editor.start(&Path::root()))
                    } else {
                        editor.after(&point).or_else(|| editor.end(&Path::root()))
                    };
                    let Some(target) = target else {
                        return Ok(());
                    };
                    hanging = true;
                    Range::new(point, target)
                }
            };
            if range.is_collapsed() {
                return Ok(());
            }
            let range = if hanging || editor.end(&Path::root()) == Some(range.end()) {
                range
            } else {
                editor.unhang_range(&range)
            };

            let (mut start, mut end) = range.edges();
            let start_block = editor.block_at(&start.path).map(|(path, _)| path);
            let end_block = editor.block_at(&end.path).map(|(path, _)| path);
            let across_blocks = matches!((&start_block, &end_block), (Some(a), Some(b)) if a != b);
            let single_text = start.path == end.path;
            let start_void = editor.void_above(&start.path).is_some();
            let end_void = editor.void_above(&end.path).is_some();

            if start_void {
                if let Some(before) = editor.before(&start) {
                    if start_block.as_ref().is_some_and(|block| block.is_ancestor_of(&before.path)) {
                        start = before;
                    }
                }
            }
            if end_void {
                if let Some(after) = editor.after(&end) {
                    if end_block.as_ref().is_some_and(|block| block.is_ancestor_of(&after.path)) {
                        end = after;
                    }
                }
            }

            // Whole nodes inside the range, skipping descendants of a match
            let mut doomed: Vec<(Path, Node)> = Vec::new();
            for (path, node) in editor.nodes(&Location::Range(range.clone()), &any_node, Mode::All) {
                let below_last = doomed
                    .last()
                    .is_some_and(|(last, _)| path.compare(last) == Ordering::Equal);
                if below_last {
                    continue;
                }
                if node.is_void() || (!is_common(&path, &start.path) && !is_common(&path, &end.path)) {
                    doomed.push((path, node));
                }
            }

            let doomed_refs = editor.path_refs(&doomed);
            let mut start_ref = editor.point_ref(start.clone(), Affinity::Forward);
            let mut end_ref = editor.point_ref(end.clone(), Affinity::Forward);

            if !single_text && !start_void {
                if let Some(point) = start_ref.current(editor) {
                    let text = editor
                        .leaf(&point)
                        .and_then(|leaf| leaf.text.get(start.offset..))
                        .unwrap_or_default()
                        .to_string();
                    if !text.is_empty() {
                        editor.apply(Operation::RemoveText {
                            path: point.path,
                            offset: start.offset,
                            text,
                        })?;
                    }
                }
            }

            for mut path_ref in doomed_refs.into_iter().rev() {
                if let Some(path) = path_ref.current(editor) {
                    editor.remove_nodes(NodeOptions::new().at(path))?;
                }
            }

            if !end_void {
                if let Some(point) = end_ref.current(editor) {
                    let offset = if single_text { start.offset } else { 0 };
                    let text = editor
                        .leaf(&point)
                        .and_then(|leaf| leaf.text.get(offset..end.offset))
                        .unwrap_or_default()
                        .to_string();
                    if !text.is_empty() {
                        editor.apply(Operation::RemoveText {
                            path: point.path,
                            offset,
                            text,
                        })?;
                    }
                }
            }

            if !single_text && across_blocks {
                if let (Some(point), Some(_)) = (end_ref.current(editor), start_ref.current(editor)) {
                    editor.merge_nodes(NodeOptions::new().at(point))?;
                }
            }

            if options.at.is_none() {
                let caret = if options.reverse {
                    start_ref.current(editor).or_else(|| end_ref.current(editor))
                } else {
                    end_ref.current(editor).or_else(|| start_ref.current(editor))
                };
                if let Some(caret) = caret {
                    editor.select(caret)?;
                }
            }
            Ok(())
        })
    }

    // Delete an expanded range and return where its end ended up
    fn delete_range(&mut self, range: Range) -> EditorResult<Option<Point>> {
        if range.is_collapsed() {
            return Ok(Some(range.anchor));
        }
        let mut end = self.point_ref(range.end(), Affinity::Forward);
        self.delete(DeleteOptions::new().at(range))?;
        Ok(end.current(self))
    }

    pub fn delete_backward(&mut self) -> EditorResult<()> {
        if self.selection.is_none() {
            return Ok(());
        }
        self.delete(DeleteOptions::new().reverse(true))
    }

    pub fn delete_forward(&mut self) -> EditorResult<()> {
        if self.selection.is_none() {
            return Ok(());
        }
        self.delete(DeleteOptions::new())
    }

    /// Type `text` at the selection. Pending marks, when set, are applied to
    /// the new text and then dropped.
    pub fn insert_text(&mut self, text: &str) -> EditorResult<()> {
        if self.selection.is_none() {
            return Ok(());
        }
        match self.marks.clone() {
            Some(marks) => self.insert_nodes(
                vec![Node::Text(Text::with_marks(text, marks))],
                NodeOptions::new(),
            )?,
            None => self.insert_text_at(text, None)?,
        }
        self.set_pending_marks(None);
        Ok(())
    }

    /// Insert plain text at a location, replacing an expanded range
    pub fn insert_text_at(&mut self, text: &str, at: Option<Location>) -> EditorResult<()> {
        self.without_normalizing(|editor| {
            let Some(at) = at.or_else(|| editor.selection_location()) else {
                return Ok(());
            };
            let point = match at {
                Location::Point(point) => point,
                other => {
                    let range = editor.resolve_range(&other)?;
                    if range.is_collapsed() {
                        range.anchor
                    } else {
                        if editor.void_above(&range.end().path).is_some() {
                            return Ok(());
                        }
                        let mut start_ref = editor.point_ref(range.start(), Affinity::Forward);
                        let mut end_ref = editor.point_ref(range.end(), Affinity::Forward);
                        editor.delete(DeleteOptions::new().at(range))?;
                        let Some(point) = start_ref.current(editor).or_else(|| end_ref.current(editor))
                        else {
                            return Ok(());
                        };
                        editor.set_selection(Some(Range::collapsed(point.clone())))?;
                        point
                    }
                }
            };
            if text.is_empty() || editor.void_above(&point.path).is_some() {
                return Ok(());
            }
            editor.apply(Operation::InsertText {
                path: point.path,
                offset: point.offset,
                text: text.to_string(),
            })
        })
    }

    /// Split the current block at the selection
    pub fn insert_break(&mut self) -> EditorResult<()> {
        self.split_nodes(SplitOptions::new().always(true))
    }

    /// Insert a fragment of nodes at the selection. The first and last
    /// blocks of the fragment merge into the blocks around the caret; whole
    /// blocks in between are inserted as siblings.
    pub fn insert_fragment(&mut self, fragment: Vec<Node>) -> EditorResult<()> {
        if fragment.is_empty() {
            return Ok(());
        }
        self.without_normalizing(|editor| {
            let point = match editor.default_insert_location() {
                Location::Range(range) => {
                    let range = editor.unhang_range(&range);
                    if range.is_collapsed() {
                        range.anchor
                    } else {
                        if editor.void_above(&range.end().path).is_some() {
                            return Ok(());
                        }
                        match editor.delete_range(range)? {
                            Some(point) => point,
                            None => return Ok(()),
                        }
                    }
                }
                Location::Point(point) => point,
                Location::Path(path) => match editor.start(&path) {
                    Some(point) => point,
                    None => return Ok(()),
                },
            };
            if editor.void_above(&point.path).is_some() {
                return Ok(());
            }

            // A caret on the edge of a link goes just outside it
            let mut at = point;
            if let Some((inline_path, _)) = editor.above(&at.path, &inline_element, Mode::Highest) {
                if editor.is_end(&at, &inline_path) {
                    if let Some(after) = editor.start(&following(&inline_path)) {
                        at = after;
                    }
                } else if editor.is_start(&at, &inline_path) {
                    if let Some(before) = inline_path.previous().and_then(|prev| editor.end(&prev)) {
                        at = before;
                    }
                }
            }

            let Some((block_path, _)) = editor.block_at(&at.path) else {
                return Ok(());
            };
            let block_start = editor.is_start(&at, &block_path);
            let block_end = editor.is_end(&at, &block_path);
            let block_empty = block_start && block_end;
            let merge_start = !block_start || block_empty;
            let merge_end = !block_end;

            let shape = Document::new(fragment);
            let (Some((first_leaf, _)), Some((last_leaf, _))) =
                (shape.first_text(&Path::root()), shape.last_text(&Path::root()))
            else {
                return Ok(());
            };
            let keep = |node: &Node, path: &Path| {
                if block_empty {
                    return true;
                }
                let merging = node.is_block() && !node.is_void();
                !(merging
                    && ((merge_start && path.is_ancestor_of(&first_leaf))
                        || (merge_end && path.is_ancestor_of(&last_leaf))))
            };
            let mut kept = Vec::new();
            collect_fragment(&shape.children, &Path::root(), &keep, &mut kept);

            let mut starts = Vec::new();
            let mut middles = Vec::new();
            let mut ends = Vec::new();
            for node in kept {
                if node.is_block() {
                    middles.push(node);
                } else if middles.is_empty() {
                    starts.push(node);
                } else {
                    ends.push(node);
                }
            }
            let has_blocks = !middles.is_empty();

            let Some((inline_path, _)) = editor
                .nodes(&Location::Point(at.clone()), &is_inline, Mode::Highest)
                .into_iter()
                .next()
            else {
                return Ok(());
            };
            let inline_start = editor.is_start(&at, &inline_path);
            let inline_end = editor.is_end(&at, &inline_path);

            let middle_target = if block_end && ends.is_empty() {
                following(&block_path)
            } else {
                block_path.clone()
            };
            let mut middle_ref = editor.path_ref(middle_target, Affinity::Forward);
            let end_target = if inline_end { following(&inline_path) } else { inline_path.clone() };
            let mut end_ref = editor.path_ref(end_target, Affinity::Forward);

            let (split_matcher, split_mode): (Matcher, Mode) = if has_blocks {
                (&is_block, Mode::Lowest)
            } else {
                (&is_inline, Mode::Highest)
            };
            editor.split_nodes(
                SplitOptions::new()
                    .at(at.clone())
                    .matching(split_matcher)
                    .mode(split_mode),
            )?;

            let start_target = if !inline_start || inline_end {
                following(&inline_path)
            } else {
                inline_path.clone()
            };
            let mut start_ref = editor.path_ref(start_target, Affinity::Forward);

            let (had_starts, had_ends) = (!starts.is_empty(), !ends.is_empty());
            if let Some(path) = start_ref.current(editor) {
                editor.insert_nodes(starts, NodeOptions::new().at(path))?;
            }
            if block_empty && !had_starts && has_blocks && !had_ends {
                editor.remove_nodes(NodeOptions::new().at(block_path))?;
            }
            if let Some(path) = middle_ref.current(editor) {
                editor.insert_nodes(middles, NodeOptions::new().at(path))?;
            }
            if let Some(path) = end_ref.current(editor) {
                editor.insert_nodes(ends, NodeOptions::new().at(path))?;
            }

            let last_ref = if had_ends {
                &mut end_ref
            } else if has_blocks {
                &mut middle_ref
            } else {
                &mut start_ref
            };
            let caret = last_ref
                .current(editor)
                .and_then(|path| path.previous())
                .and_then(|path| editor.end(&path));
            if let Some(caret) = caret {
                editor.select(caret)?;
            }
            Ok(())
        })
    }

    /// Add a mark to the selected text, or to the pending marks when the
    /// selection is collapsed
    pub fn add_mark(&mut self, mark: Mark) -> EditorResult<()> {
        let Some(selection) = self.selection.clone() else {
            return Ok(());
        };
        if selection.is_expanded() {
            let update = |node: &Node| match node {
                Node::Text(text) => Some(Properties::Text(text.marks.clone().with(mark.clone()))),
                Node::Element(_) => None,
            };
            self.set_nodes(&update, NodeOptions::new().matching(&is_text).split())
        } else {
            let marks = self.marks().unwrap_or_default().with(mark);
            self.set_pending_marks(Some(marks));
            Ok(())
        }
    }

    pub fn remove_mark(&mut self, kind: MarkKind) -> EditorResult<()> {
        let Some(selection) = self.selection.clone() else {
            return Ok(());
        };
        if selection.is_expanded() {
            let update = |node: &Node| match node {
                Node::Text(text) => {
                    let mut marks = text.marks.clone();
                    marks.remove(kind);
                    Some(Properties::Text(marks))
                }
                Node::Element(_) => None,
            };
            self.set_nodes(&update, NodeOptions::new().matching(&is_text).split())
        } else {
            let mut marks = self.marks().unwrap_or_default();
            marks.remove(kind);
            self.set_pending_marks(Some(marks));
            Ok(())
        }
    }
}
