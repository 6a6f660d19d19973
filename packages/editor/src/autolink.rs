//! Turn a typed url into a link once the word after it starts.
//!
//! When the character just before the caret is a space, the word before that
//! space (within the caret's text leaf) is checked with [`is_url`]. A match is
//! wrapped in a Link by a deferred task, so the wrap lands after the keystroke
//! that triggered it has been committed.

use crate::{Editor, NodeOptions, Scheduler};
use regex::Regex;
use scribe_model::{Element, ElementType, Point, Range};
use std::sync::LazyLock;
use tracing::debug;

/// History label of the batch that wraps a typed url
pub const AUTOLINK_BATCH: &str = "autolink";

static PROTOCOL_AND_DOMAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\w+:)?//(\S+)$").expect("valid regex"));

static LOCALHOST_DOMAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^localhost[?:\d]*(?:[^?:\d]\S*)?$").expect("valid regex"));

static NON_LOCALHOST_DOMAIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s.]+\.\S{2,}$").expect("valid regex"));

/// Whether `text` looks like an absolute url: an optional `scheme:`, then
/// `//`, then `localhost` (with an optional port) or a dotted host
pub fn is_url(text: &str) -> bool {
    let Some(captures) = PROTOCOL_AND_DOMAIN.captures(text) else {
        return false;
    };
    let Some(rest) = captures.get(1).map(|m| m.as_str()) else {
        return false;
    };
    LOCALHOST_DOMAIN.is_match(rest) || NON_LOCALHOST_DOMAIN.is_match(rest)
}

/// Queue a link wrap for the url just before the caret, if there is one
pub fn identify_links_in_text_if_any(editor: &Editor, scheduler: &mut Scheduler) {
    let Some(selection) = editor.selection() else {
        return;
    };
    if selection.is_expanded() {
        return;
    }
    let caret = &selection.anchor;
    if editor
        .parent(&caret.path)
        .is_some_and(|(_, parent)| parent.is_kind(ElementType::Link))
    {
        return;
    }
    let Some(leaf) = editor.leaf(caret) else {
        return;
    };

    let Some(typed) = leaf.text.get(..caret.offset) else {
        return;
    };
    let Some(before_space) = typed.strip_suffix(' ') else {
        return;
    };
    let word_start = before_space.rfind(' ').map_or(0, |index| index + 1);
    let word = &before_space[word_start..];
    if !is_url(word) {
        return;
    }

    let range = Range::new(
        Point::new(caret.path.clone(), word_start),
        Point::new(caret.path.clone(), before_space.len()),
    );
    debug!(url = word, "autolinking");
    let url = word.to_string();
    let mut range_ref = editor.range_ref(range);
    scheduler.defer(move |editor| {
        let Some(range) = range_ref.current(editor) else {
            return Ok(());
        };
        editor.wrap_nodes(Element::link(url, Vec::new()), NodeOptions::new().at(range).split())?;
        editor.describe_batch(AUTOLINK_BATCH);
        Ok(())
    });
}
