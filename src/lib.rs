//! Bookmarklet for renaming the visible text of an "@mention" link inside a
//! social Q&A site's rich-text editor. Put the cursor in the mention text,
//! trigger the bookmarklet, type the new text in the floating prompt.
//!
//! Compiled to wasm with `wasm-bindgen`; runs once on load against the
//! current `window.getSelection()` and injects nothing permanent: everything
//! it adds to the page is namespaced per session and removed on close.

mod caret;
mod config;
mod prompt;
mod resolver;
mod style;
mod util;

use wasm_bindgen::JsValue;

pub use crate::config::EnvConfig;

use crate::prompt::{PromptCallbacks, PromptSession};

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

/// Run one edit flow against the current selection.
///
/// "No applicable mention" is not an error; the bookmarklet simply does
/// nothing. Because the prompt steals keyboard focus from the rich-text
/// editor, a second invocation while a prompt is open resolves against the
/// prompt's own input and falls into the same no-op path, so invocation is
/// idempotent without any extra global state.
pub fn run(config: EnvConfig) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let selection = window
        .get_selection()?
        .ok_or_else(|| JsValue::from_str("no selection"))?;

    let Some(focus) = selection.focus_node() else {
        return Ok(());
    };
    if selection.range_count() == 0 {
        return Ok(());
    }
    let range = selection.get_range_at(0)?;

    let Some(target) = resolver::focused_mention(&focus, &range) else {
        return Ok(());
    };

    // Snapshot for cancel/restore; owned by the cancel callback.
    let original_text = target.text_content().unwrap_or_default();

    let callbacks = PromptCallbacks {
        on_commit: Box::new(|link, new_text| {
            link.set_text_content(Some(new_text));
        }),
        on_cancel: Box::new(move |link| {
            link.set_text_content(Some(&original_text));
        }),
        // Mirror every keystroke into the link so the user sees the rename
        // in place while typing.
        on_live_change: Some(Box::new(|link, current_text| {
            link.set_text_content(Some(current_text));
        })),
    };

    PromptSession::open(target, callbacks, config)?;
    Ok(())
}

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();

    if let Err(err) = run(EnvConfig::load()) {
        // Anomalies degrade silently for the user; leave a trace for us.
        web_sys::console::warn_2(&JsValue::from_str("mention-editor:"), &err);
    }
}
