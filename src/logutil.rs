//! Helpers for putting player-supplied text into log lines.
//!
//! Usernames and item ids arrive straight from form posts and URLs, so they are
//! escaped before logging to keep every record on one line. Session tokens are
//! bearer credentials and are shortened before they reach a log file.

use std::fmt::Write;

const MAX_PREVIEW: usize = 120;

/// Escape control characters and cap the length of `s` for single-line logging.
pub fn escape_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len().min(MAX_PREVIEW) + 8);
    for (count, ch) in s.chars().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(&mut out, "\\x{:02X}", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

/// First eight characters of a session token, enough to correlate log lines.
pub fn short_token(token: &str) -> String {
    let prefix: String = token.chars().take(8).collect();
    format!("{}…", escape_log(&prefix))
}
