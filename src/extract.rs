//! Pull JSON out of noisy model output.
//!
//! Models wrap JSON in code fences or prose often enough that a plain
//! `serde_json::from_str` on the raw content is not reliable. Prose may also
//! contain stray braces or brackets ahead of the payload, so every opening
//! delimiter is tried in turn.

use serde::de::DeserializeOwned;

/// Parse the first balanced `{...}` span in `raw` that deserializes as `T`.
pub fn parse_json_object<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    parse_embedded(raw, '{', '}')
}

/// Parse the first balanced `[...]` span in `raw` that deserializes as `T`.
pub fn parse_json_array<T: DeserializeOwned>(raw: &str) -> Result<T, serde_json::Error> {
    parse_embedded(raw, '[', ']')
}

/// Tries each balanced span in order. If none parses, the error is the first
/// span's error, or the error from parsing the whole trimmed input when no
/// span balances.
fn parse_embedded<T: DeserializeOwned>(
    raw: &str,
    open: char,
    close: char,
) -> Result<T, serde_json::Error> {
    let mut first_err = None;
    for span in balanced_spans(raw, open, close) {
        match serde_json::from_str(span) {
            Ok(value) => return Ok(value),
            Err(e) => {
                first_err.get_or_insert(e);
            }
        }
    }
    match first_err {
        Some(e) => Err(e),
        None => serde_json::from_str(raw.trim()),
    }
}

/// Every balanced span starting at an occurrence of `open`, in order.
fn balanced_spans(raw: &str, open: char, close: char) -> impl Iterator<Item = &str> + '_ {
    raw.match_indices(open).filter_map(move |(start, _)| {
        let remainder = &raw[start..];
        find_matching(remainder, open, close).map(|end| &remainder[..end])
    })
}

/// Byte offset just past the delimiter closing the one at offset 0.
/// Delimiters inside JSON strings are skipped.
fn find_matching(s: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0i32;
    let mut in_string = false;
    let mut escape = false;

    for (i, c) in s.char_indices() {
        if escape {
            escape = false;
            continue;
        }
        if c == '\\' && in_string {
            escape = true;
            continue;
        }
        if c == '"' {
            in_string = !in_string;
            continue;
        }
        if in_string {
            continue;
        }
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(i + c.len_utf8());
            }
        }
    }
    None
}
