//! The floating edit prompt. One session per mention edit: built on open,
//! destroyed on close, never reused.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Document, Element, EventTarget, HtmlAnchorElement, HtmlElement, HtmlInputElement,
    KeyboardEvent, MouseEvent,
};

use crate::caret;
use crate::config::{EnvConfig, VERSION};
use crate::resolver;
use crate::style;
use crate::util::fresh_namespace;

const HIGHLIGHT_BACKGROUND: &str = "#ffff80";
const FADE_OUT_MS: i32 = 150;

/// Callbacks supplied by whoever opens the session. Each mutates the target
/// link directly; the session itself never touches the link's text.
pub struct PromptCallbacks {
    pub on_commit: Box<dyn Fn(&HtmlAnchorElement, &str)>,
    pub on_cancel: Box<dyn Fn(&HtmlAnchorElement)>,
    pub on_live_change: Option<Box<dyn Fn(&HtmlAnchorElement, &str)>>,
}

#[derive(Clone, Copy)]
enum CloseReason {
    Commit,
    Cancel,
}

/// A listener registration owned by one session. Only the JS function handle
/// is kept; the Rust closure behind it is leaked on purpose (the
/// `into_js_value` forget), which is bounded per session and lets teardown
/// run from inside one of these very closures without invalidating it
/// mid-call. Unbinding goes through the handle, so a session can never
/// disturb another session's bindings.
struct ListenerHandle {
    target: EventTarget,
    event: &'static str,
    function: js_sys::Function,
}

/// One open-to-closed lifecycle of the edit prompt for a single mention.
///
/// Two states: Open (from [`PromptSession::open`]) and Closed (terminal; the
/// `closed` flag makes the transition fire exactly once, no matter how many
/// controls race to trigger it).
pub struct PromptSession {
    namespace: String,
    config: EnvConfig,
    target: HtmlAnchorElement,
    container: HtmlElement,
    input: HtmlInputElement,
    style_el: Element,
    original_background: String,
    callbacks: PromptCallbacks,
    listeners: RefCell<Vec<ListenerHandle>>,
    closed: Cell<bool>,
    help_open: Cell<bool>,
}

impl PromptSession {
    /// Build the prompt for `target`, anchor it below the link, and wire all
    /// handlers. The input field is pre-filled with the link's current text
    /// and selected.
    pub fn open(
        target: HtmlAnchorElement,
        callbacks: PromptCallbacks,
        config: EnvConfig,
    ) -> Result<Rc<PromptSession>, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let namespace = fresh_namespace();

        // Stylesheet before markup so the prompt never flashes unstyled.
        let style_el = document.create_element("style")?;
        style_el.set_id(&format!("{namespace}style"));
        style_el.set_text_content(Some(&style::to_css(style::prompt_rules(), &namespace)));
        document
            .head()
            .ok_or_else(|| JsValue::from_str("no head"))?
            .append_child(&style_el)?;

        let container: HtmlElement = document.create_element("div")?.unchecked_into();
        // The outer classes are the host page's own menu styling.
        container.set_class_name("hover_menu");
        container.set_inner_html(&prompt_markup(&namespace, &config));
        document
            .body()
            .ok_or_else(|| JsValue::from_str("no body"))?
            .append_child(&container)?;

        let input: HtmlInputElement = find_element(&document, &namespace, "input_field")?
            .unchecked_into();

        let link_style = target.style();
        let original_background = link_style.get_property_value("background").unwrap_or_default();
        link_style.set_property("background", HIGHLIGHT_BACKGROUND)?;

        let session = Rc::new(PromptSession {
            namespace,
            config,
            target,
            container,
            input,
            style_el,
            original_background,
            callbacks,
            listeners: RefCell::new(Vec::new()),
            closed: Cell::new(false),
            help_open: Cell::new(false),
        });

        session.position()?;

        session
            .input
            .set_value(&session.target.text_content().unwrap_or_default());
        let _ = session.input.focus();
        session.input.select();

        Self::wire_handlers(&session, &document)?;

        Ok(session)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    /// Anchor the prompt just below and left-aligned with the target link.
    /// Re-run on every host-editor keyup, since edits above the mention shift
    /// its layout position.
    fn position(&self) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let rect = self.target.get_bounding_client_rect();
        let top = rect.bottom() + window.page_y_offset()? + 2.0;
        let left = rect.left() + window.page_x_offset()?;

        let style = self.container.style();
        style.set_property("position", "absolute")?;
        style.set_property("top", &format!("{top}px"))?;
        style.set_property("left", &format!("{left}px"))?;
        Ok(())
    }

    fn wire_handlers(session: &Rc<Self>, document: &Document) -> Result<(), JsValue> {
        // Enter commits, Escape cancels, anything else is a live update.
        {
            let handler = Rc::clone(session);
            let closure = Closure::<dyn FnMut(KeyboardEvent)>::new(move |ev: KeyboardEvent| {
                match ev.key().as_str() {
                    "Enter" => PromptSession::close(&handler, CloseReason::Commit),
                    "Escape" => PromptSession::close(&handler, CloseReason::Cancel),
                    _ => {
                        if let Some(on_live_change) = &handler.callbacks.on_live_change {
                            on_live_change(&handler.target, &handler.input.value());
                        }
                    }
                }
            });
            session.bind(session.input.unchecked_ref(), "keyup", closure.into_js_value())?;
        }

        {
            let handler = Rc::clone(session);
            let closure = Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
                ev.prevent_default();
                PromptSession::close(&handler, CloseReason::Commit);
            });
            let ok_button = session.element(document, "ok_button")?;
            session.bind(ok_button.unchecked_ref(), "click", closure.into_js_value())?;
        }

        {
            let handler = Rc::clone(session);
            let closure = Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
                ev.prevent_default();
                PromptSession::close(&handler, CloseReason::Cancel);
            });
            let cancel_button = session.element(document, "cancel_button")?;
            session.bind(cancel_button.unchecked_ref(), "click", closure.into_js_value())?;
        }

        {
            let handler = Rc::clone(session);
            let closure = Closure::<dyn FnMut(MouseEvent)>::new(move |ev: MouseEvent| {
                ev.prevent_default();
                let _ = handler.toggle_help();
            });
            let help_toggle = session.element(document, "help_toggle")?;
            session.bind(help_toggle.unchecked_ref(), "click", closure.into_js_value())?;
        }

        if let Some(editor) = session.target.closest(&session.config.editor_content_selector())? {
            // The prompt must follow the mention if surrounding edits move it.
            {
                let handler = Rc::clone(session);
                let closure = Closure::<dyn FnMut(KeyboardEvent)>::new(move |_: KeyboardEvent| {
                    let _ = handler.position();
                });
                session.bind(editor.unchecked_ref(), "keyup", closure.into_js_value())?;
            }

            // While the prompt is open the mention itself is read-only from
            // the rich-text surface; all other typing is fair game.
            {
                let handler = Rc::clone(session);
                let closure = Closure::<dyn FnMut(KeyboardEvent)>::new(move |ev: KeyboardEvent| {
                    if handler.cursor_is_on_target() {
                        ev.prevent_default();
                        ev.stop_propagation();
                    }
                });
                session.bind(editor.unchecked_ref(), "keydown", closure.into_js_value())?;
            }
        }

        // Closing the host's own edit form must also tear this prompt down,
        // but only this one, not an editor the user opens later.
        if let Some(form) = session.target.closest(&session.config.editor_form_selector())? {
            if let Some(host_cancel) = form.query_selector(&session.config.editor_cancel_selector())? {
                let handler = Rc::clone(session);
                let closure = Closure::<dyn FnMut(MouseEvent)>::new(move |_: MouseEvent| {
                    PromptSession::close(&handler, CloseReason::Cancel);
                });
                session.bind(host_cancel.unchecked_ref(), "click", closure.into_js_value())?;
            }
        }

        Ok(())
    }

    fn bind(
        &self,
        target: &EventTarget,
        event: &'static str,
        function: JsValue,
    ) -> Result<(), JsValue> {
        let function: js_sys::Function = function.unchecked_into();
        target.add_event_listener_with_callback(event, &function)?;
        self.listeners.borrow_mut().push(ListenerHandle {
            target: target.clone(),
            event,
            function,
        });
        Ok(())
    }

    /// True when the current selection resolves to this session's target.
    fn cursor_is_on_target(&self) -> bool {
        let Some(window) = web_sys::window() else {
            return false;
        };
        let Ok(Some(selection)) = window.get_selection() else {
            return false;
        };
        let Some(focus) = selection.focus_node() else {
            return false;
        };
        if selection.range_count() == 0 {
            return false;
        }
        let Ok(range) = selection.get_range_at(0) else {
            return false;
        };

        resolver::focused_mention(&focus, &range)
            .map(|link| link.is_same_node(Some(self.target.unchecked_ref())))
            .unwrap_or(false)
    }

    fn close(session: &Rc<Self>, reason: CloseReason) {
        if session.closed.replace(true) {
            return;
        }

        match reason {
            CloseReason::Commit => {
                (session.callbacks.on_commit)(&session.target, &session.input.value());
            }
            // The field value is ignored on cancel.
            CloseReason::Cancel => (session.callbacks.on_cancel)(&session.target),
        }

        Self::teardown(session);
    }

    /// Runs exactly once, always after the commit/cancel callback.
    fn teardown(session: &Rc<Self>) {
        // Unbind first so a queued event cannot re-enter the prompt.
        session.unbind_all();

        let container_style = session.container.style();
        let _ = container_style.set_property("transition", &format!("opacity {FADE_OUT_MS}ms"));
        let _ = container_style.set_property("opacity", "0");

        // DOM removal and caret placement wait for the fade; the session stays
        // alive until the continuation has run.
        let session = Rc::clone(session);
        let finish = Closure::once_into_js(move || session.remove_from_page());
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                finish.as_ref().unchecked_ref(),
                FADE_OUT_MS,
            );
        }
    }

    fn remove_from_page(&self) {
        self.container.remove();
        self.style_el.remove();

        let link_style = self.target.style();
        if self.original_background.is_empty() {
            let _ = link_style.remove_property("background");
        } else {
            let _ = link_style.set_property("background", &self.original_background);
        }

        // The cursor must land outside the link even on cancel.
        let _ = caret::place_after(&self.target, &self.config);
    }

    fn unbind_all(&self) {
        for handle in self.listeners.borrow_mut().drain(..) {
            let _ = handle
                .target
                .remove_event_listener_with_callback(handle.event, &handle.function);
        }
    }

    /// Show/hide the help panel and swap the toggle glyph. Local UI state
    /// only; does not touch the Open/Closed machine.
    fn toggle_help(&self) -> Result<(), JsValue> {
        let document = self
            .container
            .owner_document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let help: HtmlElement = self.element(&document, "help")?.unchecked_into();
        let toggle = self.element(&document, "help_toggle")?;
        let hidden_class = format!("{}hidden", self.namespace);

        let now_open = !self.help_open.get();
        self.help_open.set(now_open);

        if now_open {
            help.style().set_property("display", "block")?;
            toggle.set_text_content(Some("\u{00d7}"));
            toggle.class_list().remove_1(&hidden_class)?;
        } else {
            help.style().set_property("display", "none")?;
            toggle.set_text_content(Some("+"));
            toggle.class_list().add_1(&hidden_class)?;
        }
        Ok(())
    }

    fn element(&self, document: &Document, id: &str) -> Result<Element, JsValue> {
        find_element(document, &self.namespace, id)
    }
}

fn find_element(document: &Document, namespace: &str, id: &str) -> Result<Element, JsValue> {
    document
        .get_element_by_id(&format!("{namespace}{id}"))
        .ok_or_else(|| JsValue::from_str("prompt element missing"))
}

/// Markup for the prompt, salted with the session namespace. The inner
/// classes (`hover_menu_nub`, `menu_contents`, `submit_button`, ...) reuse the
/// host page's styling on purpose so the prompt looks native.
fn prompt_markup(namespace: &str, config: &EnvConfig) -> String {
    format!(
        concat!(
            r#"<div id="%ns%arrow_nub" class="hover_menu_nub"></div>"#,
            r#"<div id="%ns%prompt" class="menu_contents growl_notification">"#,
            r#"<input id="%ns%input_field" type="text" />"#,
            r#"<div id="%ns%controls">"#,
            r##"<a id="%ns%ok_button" href="#" class="submit_button">Save</a>"##,
            r##"<a id="%ns%cancel_button" href="#" title="Undo changes and close">Cancel</a>"##,
            r##"<a id="%ns%help_toggle" class="%ns%hidden" href="#">+</a>"##,
            r#"</div>"#,
            r#"<div id="%ns%help">"#,
            r#"<a href="{update_url}" title="You have version {version}" target="_%ns%_update">Check for updates</a>"#,
            r#"<br/><a href="{issues_url}" target="_%ns%_issues">Report bug</a>"#,
            r#"</div>"#,
            r#"</div>"#,
        ),
        update_url = config.versioned_update_url(),
        issues_url = config.versioned_issues_url(),
        version = VERSION,
    )
    .replace("%ns%", namespace)
}
