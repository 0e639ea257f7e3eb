//! Input sanitization.
//!
//! Every string in a submission is trimmed, HTML-escaped for Telegram's HTML
//! parse mode and bounded to [`MAX_FIELD_CHARS`] characters. Escaping happens
//! before bounding and never cuts an entity in half, so a sanitized string
//! holds no raw `&`, `<` or `>` and never exceeds the bound.

use serde_json::{Map, Value};

/// Maximum characters kept per string field, after escaping.
pub const MAX_FIELD_CHARS: usize = 500;

/// Values nested this many levels deep or more are dropped to `null`.
pub const MAX_DEPTH: usize = 8;

/// Entity for a character Telegram's HTML parser treats as markup.
const fn entity(ch: char) -> Option<&'static str> {
    match ch {
        '&' => Some("&amp;"),
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        _ => None,
    }
}

/// Trim, escape and bound a single string.
pub fn sanitize_str(raw: &str) -> String {
    let mut out = String::new();
    let mut used = 0;

    for ch in raw.trim().chars() {
        // Entities are ASCII, so byte length equals char count.
        let width = entity(ch).map_or(1, str::len);
        if used + width > MAX_FIELD_CHARS {
            break;
        }
        match entity(ch) {
            Some(escaped) => out.push_str(escaped),
            None => out.push(ch),
        }
        used += width;
    }

    out
}

/// Sanitize a whole JSON document.
///
/// Strings are sanitized, arrays element-wise, objects value-wise (keys are
/// kept). Anything nested [`MAX_DEPTH`] levels deep becomes `null`.
pub fn sanitize_value(value: Value) -> Value {
    sanitize_at(value, 0)
}

fn sanitize_at(value: Value, depth: usize) -> Value {
    if depth >= MAX_DEPTH {
        return Value::Null;
    }
    match value {
        Value::String(s) => Value::String(sanitize_str(&s)),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|item| sanitize_at(item, depth + 1))
                .collect(),
        ),
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, item)| (key, sanitize_at(item, depth + 1)))
                .collect::<Map<String, Value>>(),
        ),
        other => other,
    }
}
