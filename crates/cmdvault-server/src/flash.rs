//! Flash-style messages carried on the redirect back to the originating view.
//!
//! Expected mutation failures never surface as error pages; they redirect
//! with a `flash` query parameter the target page renders once.

use axum::response::Redirect;

/// Redirect to `path` with a flash message attached.
pub fn redirect_with(path: &str, msg: &str) -> Redirect {
    let sep = if path.contains('?') { '&' } else { '?' };
    Redirect::to(&format!("{path}{sep}flash={}", percent_encode(msg)))
}

/// Percent-encode everything outside the URL-unreserved set.
fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char)
            }
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}
