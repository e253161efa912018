//! Puts the text cursor back into the editor after a session ends.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlAnchorElement, HtmlElement};

use crate::config::EnvConfig;

/// Move the cursor to a point immediately after `link` so anything typed next
/// becomes plain text, not link text.
///
/// Some browsers (Firefox in particular) extend a link's text run when the
/// user types at the boundary right after it. An empty sentinel text node
/// inserted after the link gives the cursor a landing spot that is
/// unambiguously outside the link. Must run every time editing ends, commit
/// or cancel.
pub(crate) fn place_after(link: &HtmlAnchorElement, config: &EnvConfig) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    // Hand focus back to the editable region before touching the selection.
    if let Some(editor) = link.closest(&config.editor_content_selector())? {
        if let Some(editor) = editor.dyn_ref::<HtmlElement>() {
            let _ = editor.focus();
        }
    }

    let selection = window
        .get_selection()?
        .ok_or_else(|| JsValue::from_str("no selection"))?;
    if selection.range_count() > 0 {
        selection.remove_all_ranges()?;
    }

    let sentinel = document.create_text_node("");
    let parent = link
        .parent_node()
        .ok_or_else(|| JsValue::from_str("link is detached"))?;
    parent.insert_before(&sentinel, link.next_sibling().as_ref())?;

    let range = document.create_range()?;
    range.select_node_contents(&sentinel)?;
    range.collapse_with_to_start(true);
    selection.add_range(&range)?;

    Ok(())
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;
    use web_sys::{Document, Element};

    wasm_bindgen_test_configure!(run_in_browser);

    fn document() -> Document {
        web_sys::window().unwrap().document().unwrap()
    }

    fn editor_fixture(document: &Document) -> (Element, HtmlAnchorElement) {
        let editor = document.create_element("div").unwrap();
        editor.set_class_name("qtext_editor_content");
        editor.set_attribute("contenteditable", "true").unwrap();
        editor
            .append_child(&document.create_text_node("Hello "))
            .unwrap();
        let link = document.create_element("a").unwrap();
        link.set_text_content(Some("Jane Doe"));
        editor.append_child(&link).unwrap();
        document.body().unwrap().append_child(&editor).unwrap();
        (editor, link.unchecked_into())
    }

    #[wasm_bindgen_test]
    fn test_cursor_lands_in_sentinel_after_link() {
        let document = document();
        let (editor, link) = editor_fixture(&document);

        place_after(&link, &EnvConfig::default()).expect("caret placement should succeed");

        let sentinel = link.next_sibling().expect("sentinel should follow link");
        assert_eq!(sentinel.node_type(), web_sys::Node::TEXT_NODE);
        assert_eq!(sentinel.node_value().as_deref(), Some(""));

        let selection = web_sys::window().unwrap().get_selection().unwrap().unwrap();
        assert_eq!(selection.range_count(), 1);
        let anchor = selection.anchor_node().expect("selection should be set");
        assert!(anchor.is_same_node(Some(&sentinel)));
        assert_eq!(selection.anchor_offset(), 0);

        editor.remove();
    }

    #[wasm_bindgen_test]
    fn test_prior_ranges_are_cleared() {
        let document = document();
        let (editor, link) = editor_fixture(&document);

        // Park the selection somewhere else first.
        let selection = web_sys::window().unwrap().get_selection().unwrap().unwrap();
        let range = document.create_range().unwrap();
        range.select_node_contents(&editor.first_child().unwrap()).unwrap();
        selection.remove_all_ranges().unwrap();
        selection.add_range(&range).unwrap();

        place_after(&link, &EnvConfig::default()).expect("caret placement should succeed");

        assert_eq!(selection.range_count(), 1);
        let anchor = selection.anchor_node().unwrap();
        assert!(anchor.is_same_node(link.next_sibling().as_ref()));

        editor.remove();
    }
}
