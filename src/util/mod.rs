use std::sync::atomic::{AtomicUsize, Ordering};

pub(crate) fn now_ms() -> i64 {
    // Use the browser clock; the token only has to be unique, not monotonic.
    js_sys::Date::now().round() as i64
}

static COUNTER: AtomicUsize = AtomicUsize::new(1);

/// Per-session prefix applied to every injected id, class, stylesheet and
/// browsing-context name so a session collides neither with the host page nor
/// with an earlier session's leftovers.
///
/// Must stay a plain CSS/ident-safe chunk (no `.`, `#`, `-` or spaces).
pub(crate) fn namespace_token(now_ms: i64, counter: usize) -> String {
    format!("qme_{}_{}__", now_ms, counter)
}

pub(crate) fn fresh_namespace() -> String {
    // The counter keeps two sessions within the same millisecond distinct.
    namespace_token(now_ms(), COUNTER.fetch_add(1, Ordering::SeqCst))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_token_format() {
        assert_eq!(
            namespace_token(1_330_000_000_000, 7),
            "qme_1330000000000_7__"
        );
    }

    #[test]
    fn test_namespace_token_is_ident_safe() {
        let token = namespace_token(1_330_000_000_000, 42);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }

    #[test]
    fn test_namespace_token_distinct_within_same_millisecond() {
        assert_ne!(namespace_token(5, 1), namespace_token(5, 2));
    }
}
