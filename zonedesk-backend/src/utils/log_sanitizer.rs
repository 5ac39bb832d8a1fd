//! Keeps request and response bodies short in debug/error logs.
//!
//! Zone listings can be megabytes of TXT/DNSKEY data; only the head is useful
//! when tracing a request.

use std::borrow::Cow;

/// Maximum number of characters kept from a logged body.
const LOG_CHAR_LIMIT: usize = 256;

/// Truncate `body` to [`LOG_CHAR_LIMIT`] characters, noting the full size.
///
/// Cuts on a character boundary, never inside a multi-byte sequence.
pub fn truncate_for_log(body: &str) -> Cow<'_, str> {
    match body.char_indices().nth(LOG_CHAR_LIMIT) {
        None => Cow::Borrowed(body),
        Some((cut, _)) => Cow::Owned(format!(
            "{}... [truncated, total {} bytes]",
            &body[..cut],
            body.len()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_body_is_borrowed() {
        let body = r#"{"success":true}"#;
        assert!(matches!(truncate_for_log(body), Cow::Borrowed(b) if b == body));
    }

    #[test]
    fn body_at_limit_is_kept() {
        let body = "x".repeat(LOG_CHAR_LIMIT);
        assert_eq!(truncate_for_log(&body), body);
    }

    #[test]
    fn long_body_is_cut() {
        let body = "x".repeat(LOG_CHAR_LIMIT * 4);
        let logged = truncate_for_log(&body);
        assert!(logged.starts_with(&"x".repeat(LOG_CHAR_LIMIT)));
        assert!(logged.ends_with(&format!("total {} bytes]", LOG_CHAR_LIMIT * 4)));
    }

    #[test]
    fn multibyte_body_cuts_on_char_boundary() {
        let body = "ü".repeat(LOG_CHAR_LIMIT + 1);
        let logged = truncate_for_log(&body);
        assert!(logged.starts_with(&"ü".repeat(LOG_CHAR_LIMIT)));
        assert!(logged.contains("[truncated"));
    }
}
