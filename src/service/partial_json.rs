// Partial JSON decoding for streamed object output
//
// The generation service writes the JSON text of one object as it is being
// produced, so at any point the accumulated body is usually a prefix of a
// valid document:
//
//   {"language": "tsx", "code": "export default fun
//
// `parse_partial` repairs such a prefix into the most complete value it can:
// open strings are closed, dangling escapes dropped, open containers closed,
// and a trailing key without a value (or half a literal) is cut back to the
// last complete member. `PartialJsonDecoder` wraps this for a byte stream and
// only reports a value when it differs from the last one reported.

use bytes::{Buf, BytesMut};
use serde_json::Value;

/// Incremental decoder fed with raw body chunks
#[derive(Debug, Default)]
pub struct PartialJsonDecoder {
    /// Bytes not yet valid UTF-8 (a code point split across chunks)
    pending: BytesMut,
    /// All decoded text so far
    text: String,
    /// Last value handed out
    last: Option<Value>,
}

impl PartialJsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk. Returns a value when the parsed object changed.
    pub fn push(&mut self, chunk: &[u8]) -> Option<Value> {
        self.pending.extend_from_slice(chunk);
        if !self.decode_pending() {
            return None;
        }

        let value = parse_partial(&self.text)?;
        if self.last.as_ref() == Some(&value) {
            return None;
        }
        self.last = Some(value.clone());
        Some(value)
    }

    /// The raw text accumulated so far
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Move decodable bytes from `pending` into `text`. Invalid sequences
    /// become U+FFFD; an incomplete trailing sequence waits for more bytes.
    /// Returns true if any text was added.
    fn decode_pending(&mut self) -> bool {
        let mut added = false;
        while !self.pending.is_empty() {
            let (valid, invalid) = match std::str::from_utf8(&self.pending) {
                Ok(s) => (s.len(), None),
                Err(e) => (e.valid_up_to(), e.error_len()),
            };
            if let Ok(s) = std::str::from_utf8(&self.pending[..valid]) {
                self.text.push_str(s);
            }
            self.pending.advance(valid);
            added |= valid > 0;

            match invalid {
                Some(len) => {
                    tracing::warn!("Replaced {} invalid UTF-8 byte(s) in response body", len);
                    self.text.push(char::REPLACEMENT_CHARACTER);
                    self.pending.advance(len);
                    added = true;
                }
                // Either everything decoded or the tail is a split code point
                None => break,
            }
        }
        added
    }
}

/// Parse a possibly-truncated JSON document into its best-effort value
pub fn parse_partial(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Some(value);
    }

    // Retry with progressively shorter prefixes, cutting at the last
    // top-level-or-nested member separator each time.
    let mut candidate = trimmed;
    loop {
        if let Some(value) = close_and_parse(candidate) {
            return Some(value);
        }
        let cut = last_separator(candidate)?;
        candidate = &candidate[..cut];
    }
}

/// Scanner state after walking a prefix
struct Scan {
    /// Open containers, innermost last ('{' or '[')
    stack: Vec<char>,
    in_string: bool,
    /// Byte offset of an unfinished escape sequence inside the open string
    open_escape: Option<usize>,
}

fn scan(text: &str) -> Scan {
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escape_at: Option<usize> = None;
    // Hex digits of a `\u` escape read so far, and their value
    let mut unicode_digits: Option<(u8, u32)> = None;
    // Start of a `\uD800`-`\uDBFF` escape still waiting for its low half
    let mut high_surrogate_at: Option<usize> = None;

    for (i, ch) in text.char_indices() {
        if in_string {
            if let Some((read, value)) = unicode_digits {
                let value = (value << 4) | ch.to_digit(16).unwrap_or(0);
                if read + 1 < 4 {
                    unicode_digits = Some((read + 1, value));
                    continue;
                }
                unicode_digits = None;
                let start = escape_at.take();
                high_surrogate_at = if (0xD800..=0xDBFF).contains(&value)
                    && high_surrogate_at.is_none()
                {
                    start
                } else {
                    None
                };
                continue;
            }
            if escape_at.is_some() {
                if ch == 'u' {
                    unicode_digits = Some((0, 0));
                } else {
                    escape_at = None;
                    high_surrogate_at = None;
                }
                continue;
            }
            match ch {
                '\\' => escape_at = Some(i),
                '"' => {
                    in_string = false;
                    high_surrogate_at = None;
                }
                _ => high_surrogate_at = None,
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' | '[' => stack.push(ch),
            '}' | ']' => {
                stack.pop();
            }
            _ => {}
        }
    }

    Scan {
        stack,
        in_string,
        open_escape: if in_string {
            high_surrogate_at.or(escape_at)
        } else {
            None
        },
    }
}

fn close_and_parse(prefix: &str) -> Option<Value> {
    let state = scan(prefix);

    let mut fixed = match state.open_escape {
        Some(at) => prefix[..at].to_string(),
        None => prefix.to_string(),
    };
    if state.in_string {
        fixed.push('"');
    }

    let body = fixed.trim_end();
    let body = body.strip_suffix(',').unwrap_or(body).trim_end();
    if body.ends_with(':') {
        return None;
    }

    let mut closed = body.to_string();
    for open in state.stack.iter().rev() {
        closed.push(if *open == '{' { '}' } else { ']' });
    }

    serde_json::from_str(&closed).ok()
}

/// Byte offset of the last ',' that sits outside any string
fn last_separator(text: &str) -> Option<usize> {
    let mut in_string = false;
    let mut escaped = false;
    let mut last = None;

    for (i, ch) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            ',' => last = Some(i),
            _ => {}
        }
    }

    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_complete_document_parses_as_is() {
        assert_eq!(
            parse_partial(r#"{"code": "x", "language": "ts"}"#),
            Some(json!({ "code": "x", "language": "ts" }))
        );
    }

    #[test]
    fn test_open_string_is_closed() {
        assert_eq!(
            parse_partial(r#"{"language": "tsx", "code": "export def"#),
            Some(json!({ "language": "tsx", "code": "export def" }))
        );
    }

    #[test]
    fn test_dangling_key_is_dropped() {
        assert_eq!(
            parse_partial(r#"{"language": "tsx", "co"#),
            Some(json!({ "language": "tsx" }))
        );
        assert_eq!(
            parse_partial(r#"{"language": "tsx", "code":"#),
            Some(json!({ "language": "tsx" }))
        );
        assert_eq!(
            parse_partial(r#"{"language": "tsx","#),
            Some(json!({ "language": "tsx" }))
        );
    }

    #[test]
    fn test_first_key_without_value_yields_nothing() {
        assert_eq!(parse_partial(r#"{"language":"#), None);
        assert_eq!(parse_partial(r#"{"lang"#), None);
        assert_eq!(parse_partial("   "), None);
    }

    #[test]
    fn test_bare_open_brace_is_empty_object() {
        assert_eq!(parse_partial("{"), Some(json!({})));
    }

    #[test]
    fn test_incomplete_escapes_are_trimmed() {
        assert_eq!(
            parse_partial(r#"{"code": "line\"#),
            Some(json!({ "code": "line" }))
        );
        assert_eq!(
            parse_partial(r#"{"code": "a\u00"#),
            Some(json!({ "code": "a" }))
        );
        assert_eq!(
            parse_partial(r#"{"code": "a\n"#),
            Some(json!({ "code": "a\n" }))
        );
    }

    #[test]
    fn test_nested_containers_close_in_order() {
        assert_eq!(
            parse_partial(r#"{"a": [1, {"b": "c"#),
            Some(json!({ "a": [1, { "b": "c" }] }))
        );
    }

    #[test]
    fn test_decoder_reports_only_changes() {
        let mut decoder = PartialJsonDecoder::new();

        assert_eq!(decoder.push(br#"{"lang"#), None);
        assert_eq!(
            decoder.push(br#"uage": "tsx""#),
            Some(json!({ "language": "tsx" }))
        );
        // Whitespace does not change the value
        assert_eq!(decoder.push(b"  "), None);
        assert_eq!(
            decoder.push(br#", "code": "ex"#),
            Some(json!({ "language": "tsx", "code": "ex" }))
        );
        assert_eq!(decoder.text(), r#"{"language": "tsx"  , "code": "ex"#);
    }

    #[test]
    fn test_trailing_high_surrogate_is_held_back() {
        assert_eq!(
            parse_partial(r#"{"language":"tsx","code":"abc\ud83d"#),
            Some(json!({ "language": "tsx", "code": "abc" }))
        );
        // Low half partly arrived
        assert_eq!(
            parse_partial(r#"{"language":"tsx","code":"abc\ud83d\ude"#),
            Some(json!({ "language": "tsx", "code": "abc" }))
        );
        assert_eq!(
            parse_partial(r#"{"language":"tsx","code":"abc\ud83d\ude00 x"#),
            Some(json!({ "language": "tsx", "code": "abc😀 x" }))
        );
    }

    #[test]
    fn test_decoder_keeps_code_across_split_surrogate_pair() {
        let mut decoder = PartialJsonDecoder::new();

        assert_eq!(
            decoder.push(br#"{"language":"tsx","code":"abc"#),
            Some(json!({ "language": "tsx", "code": "abc" }))
        );
        // Nothing new until the pair is complete, and `code` stays present
        assert_eq!(decoder.push(br#"\ud83d"#), None);
        assert_eq!(
            decoder.push(br#"\ude00 x"}"#),
            Some(json!({ "language": "tsx", "code": "abc😀 x" }))
        );
    }

    #[test]
    fn test_decoder_replaces_invalid_utf8_and_keeps_going() {
        let mut decoder = PartialJsonDecoder::new();

        let first = decoder.push(b"{\"language\":\"ts\",\"code\":\"ab\xff");
        assert_eq!(first, Some(json!({ "language": "ts", "code": "ab\u{FFFD}" })));
        let second = decoder.push(br#"cdef"}"#);
        assert_eq!(
            second,
            Some(json!({ "language": "ts", "code": "ab\u{FFFD}cdef" }))
        );
        assert!(decoder.text().ends_with(r#"cdef"}"#));
    }

    #[test]
    fn test_decoder_handles_split_code_points() {
        let mut decoder = PartialJsonDecoder::new();
        let text = r#"{"code": "héllo"}"#.as_bytes();
        // Split inside the two-byte 'é'
        let split = text.iter().position(|b| *b == 0xC3).unwrap() + 1;

        let first = decoder.push(&text[..split]);
        assert_eq!(first, Some(json!({ "code": "h" })));
        let second = decoder.push(&text[split..]);
        assert_eq!(second, Some(json!({ "code": "héllo" })));
    }
}
