//! Maps the focused DOM node to the mention link the user intends to edit.

use wasm_bindgen::JsCast;
use web_sys::{CharacterData, HtmlAnchorElement, Node, Range};

/// Resolve the mention link for a focused node, if any.
///
/// Rules, in order:
/// 1. an anchor element resolves to itself; any other element resolves to
///    nothing;
/// 2. a text node inside an anchor resolves to the nearest ancestor anchor;
/// 3. a text node with the cursor at its very end whose next sibling is an
///    anchor resolves by recursing on that sibling, and symmetrically a text
///    node with the cursor at offset 0 whose previous sibling is an anchor
///    resolves by recursing on that one (the cursor is visually touching the
///    link even though the browser reports the neighbouring text node);
/// 4. any other node type resolves to nothing.
///
/// When the cursor sits exactly between two adjacent anchors the end-of-node
/// check runs first, so that side wins; the highlight shows the user which
/// link was picked and cancel-and-retry covers the rest. The container is not
/// checked for editability, so static page links also match; the prompt then
/// opens over dead text, which is harmless.
///
/// Pure read of its two arguments; assumes the selection has not moved since
/// `node` was captured from it.
pub(crate) fn focused_mention(node: &Node, range: &Range) -> Option<HtmlAnchorElement> {
    match node.node_type() {
        Node::ELEMENT_NODE => node.clone().dyn_into::<HtmlAnchorElement>().ok(),
        Node::TEXT_NODE => {
            if let Some(anchor) = ancestor_anchor(node) {
                return Some(anchor);
            }
            if let Some(sibling) = anchor_after_cursor(range) {
                return focused_mention(&sibling, range);
            }
            if let Some(sibling) = anchor_before_cursor(range) {
                return focused_mention(&sibling, range);
            }
            // Cursor is in plain text away from any mention.
            None
        }
        _ => None,
    }
}

fn ancestor_anchor(node: &Node) -> Option<HtmlAnchorElement> {
    node.parent_element()?
        .closest("a")
        .ok()??
        .dyn_into::<HtmlAnchorElement>()
        .ok()
}

/// The anchor directly to the right of the cursor: the range ends at the last
/// UTF-16 unit of its end container and the next sibling is an anchor.
fn anchor_after_cursor(range: &Range) -> Option<Node> {
    let container = range.end_container().ok()?;
    let length = container.dyn_ref::<CharacterData>()?.length();
    if range.end_offset().ok()? != length {
        return None;
    }

    let next = container.next_sibling()?;
    next.is_instance_of::<HtmlAnchorElement>().then_some(next)
}

/// The anchor directly to the left of the cursor. This also catches the
/// sentinel text node left behind by [`crate::caret::place_after`]: editing a
/// mention twice in a row parks the cursor at offset 0 of that empty node.
fn anchor_before_cursor(range: &Range) -> Option<Node> {
    if range.start_offset().ok()? != 0 {
        return None;
    }

    let previous = range.start_container().ok()?.previous_sibling()?;
    previous
        .is_instance_of::<HtmlAnchorElement>()
        .then_some(previous)
}
