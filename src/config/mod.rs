//! Host DOM contract and outbound links.
//!
//! The host page's class names are an informal protocol: the bookmarklet
//! expects a content-editable container, mention links as anchors, and the
//! editor's own cancel control under a known form class. There is no fallback
//! when they differ, but another host can override them through
//! `window.MENTION_EDITOR_ENV`.

use serde::{Deserialize, Serialize};

pub(crate) const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EnvConfig {
    /// Where to check for updates.
    #[serde(default = "default_update_url")]
    pub update_url: String,

    /// Where to report bugs.
    #[serde(default = "default_issues_url")]
    pub issues_url: String,

    /// Class of the content-editable region in the host editor.
    #[serde(default = "default_editor_content_class")]
    pub editor_content_class: String,

    /// Class of the form element wrapping one host editor instance.
    #[serde(default = "default_editor_form_class")]
    pub editor_form_class: String,

    /// Class of the host editor's own cancel control inside that form.
    #[serde(default = "default_editor_cancel_class")]
    pub editor_cancel_class: String,
}

fn default_update_url() -> String {
    "http://bochkariov.com/quora/edit-mentions/update".to_string()
}

fn default_issues_url() -> String {
    "http://bochkariov.com/quora/edit-mentions/bugs".to_string()
}

fn default_editor_content_class() -> String {
    "qtext_editor_content".to_string()
}

fn default_editor_form_class() -> String {
    "inline_editor_form".to_string()
}

fn default_editor_cancel_class() -> String {
    "inline_editor_cancel_button".to_string()
}

impl EnvConfig {
    /// Read overrides from `window.MENTION_EDITOR_ENV` when the host page (or
    /// the user's own bookmarklet wrapper) provides them. Unknown or missing
    /// fields fall back to the Quora defaults; a malformed object is ignored
    /// wholesale.
    pub fn load() -> Self {
        if let Some(window) = web_sys::window() {
            if let Some(env) = window.get("MENTION_EDITOR_ENV") {
                if !env.is_undefined() && env.is_object() {
                    if let Ok(json) = js_sys::JSON::stringify(&env) {
                        if let Some(json) = json.as_string() {
                            if let Ok(config) = serde_json::from_str(&json) {
                                return config;
                            }
                        }
                    }
                }
            }
        }

        Self::default()
    }

    pub fn editor_content_selector(&self) -> String {
        format!(".{}", self.editor_content_class)
    }

    pub fn editor_form_selector(&self) -> String {
        format!(".{}", self.editor_form_class)
    }

    pub fn editor_cancel_selector(&self) -> String {
        format!(".{}", self.editor_cancel_class)
    }

    /// "Check for updates" link, carrying the running version.
    pub fn versioned_update_url(&self) -> String {
        format!("{}?version={}", self.update_url, urlencoding::encode(VERSION))
    }

    /// "Report bug" link, carrying the running version.
    pub fn versioned_issues_url(&self) -> String {
        format!("{}?version={}", self.issues_url, urlencoding::encode(VERSION))
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            update_url: default_update_url(),
            issues_url: default_issues_url(),
            editor_content_class: default_editor_content_class(),
            editor_form_class: default_editor_form_class(),
            editor_cancel_class: default_editor_cancel_class(),
        }
    }
}
