//! Namespaced CSS generation for the prompt widget.

pub(crate) type Declarations = &'static [(&'static str, &'static str)];
pub(crate) type Rules = &'static [(&'static str, Declarations)];

/// Compile a declarative rule table into one CSS blob scoped to `namespace`.
///
/// Selector transformation:
/// - a selector starting with `.` gets the namespace inserted right after the
///   leading dot: `.hidden` -> `.{ns}hidden`
/// - any other selector is treated as an element id: `prompt` -> `#{ns}prompt`
///
/// Interior `.`/`#` are left untouched, so rules where namespaced elements
/// need to reference each other must be pre-namespaced by the caller. No
/// escaping or validation; malformed values pass through verbatim.
pub(crate) fn to_css(rules: Rules, namespace: &str) -> String {
    let mut css = String::new();

    for (selector, declarations) in rules {
        if let Some(rest) = selector.strip_prefix('.') {
            css.push('.');
            css.push_str(namespace);
            css.push_str(rest);
        } else {
            css.push('#');
            css.push_str(namespace);
            css.push_str(selector);
        }

        css.push('{');
        for (property, value) in *declarations {
            css.push_str(property);
            css.push(':');
            css.push_str(value);
            css.push(';');
        }
        css.push('}');
    }

    css
}

/// Style table for the prompt widget. Immutable for the process lifetime;
/// selectors name prompt elements by their un-namespaced id.
pub(crate) fn prompt_rules() -> Rules {
    PROMPT_RULES
}

const PROMPT_RULES: Rules = &[
    ("arrow_nub", &[("background-position", "10px top")]),
    (
        "prompt",
        &[
            ("background", "#fff"),
            ("padding", "11px"),
            ("width", "auto"),
        ],
    ),
    (
        "input_field",
        &[
            ("background", "#f9f9f9"),
            ("border", "1px solid #ccc"),
            ("display", "block"),
            ("padding", "2px"),
        ],
    ),
    (
        "controls",
        &[
            ("margin", "2px 0 0 0"),
            ("overflow", "auto"),
            ("padding", "6px 4px 0 0"),
        ],
    ),
    (
        "controls a:last-child",
        &[("color", "#777"), ("float", "right")],
    ),
    ("controls:hover a:last-child", &[("display", "inline")]),
    (
        "controls:hover a:last-child:hover",
        &[("color", "#19558D"), ("text-decoration", "none")],
    ),
    ("controls a:focus", &[("border", "0"), ("outline", "none")]),
    (
        "help",
        &[
            ("display", "none"),
            ("margin", "0"),
            ("padding", "6px 4px 0 0"),
        ],
    ),
    ("help a", &[("color", "#777"), ("font-size", "0.97em")]),
    (
        "ok_button",
        &[
            ("display", "block"),
            ("float", "left"),
            ("margin", "-1px 10px 0 0"),
            ("min-width", "0"),
            ("padding", "2px 10px"),
        ],
    ),
    (
        "cancel_button",
        &[("font-size", "0.97em"), ("text-decoration", "underline")],
    ),
    (".hidden", &[("display", "none")]),
];
