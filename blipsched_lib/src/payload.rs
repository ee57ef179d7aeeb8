//! Hydration payload mining.
//!
//! blip.kr pages are server-rendered by Next.js; the data we want lives in
//! `self.__next_f.push([1,"…"])` script calls as an escaped string. The
//! payload as a whole is not valid JSON (framework wrapper syntax is
//! interleaved with JSON fragments), so whole-document parsing is off the
//! table. Instead: decode each chunk, anchor on a record marker, recover one
//! object at a time with a bounded balanced-brace scan, and tolerate every
//! parse failure.

use regex::Regex;
use serde_json::Value;

use crate::types::RawEvent;

const PUSH_NEEDLE: &str = "self.__next_f.push([1,\"";

/// First key of every schedule record in the payload.
pub const EVENT_MARKER: &str = "{\"scheduleId\":";

/// Upper bound on a single object scan. Past this, the braces are assumed
/// unbalanced and the span is left for the parser to reject.
const SCAN_WINDOW: usize = 10_000;

/// Stand-in for `\\` during decoding. NUL never occurs in page markup.
const BACKSLASH_HOLD: &str = "\u{0}";

/// Reverses the escaping applied when a payload string is embedded in a
/// script call. Total: malformed input just fails to parse downstream.
///
/// The order is load-bearing: doubled backslashes must be parked first so
/// that `\"` and `\n` substitutions cannot eat half of one.
pub fn decode_chunk(raw: &str) -> String {
    raw.replace("\\\\", BACKSLASH_HOLD)
        .replace("\\\"", "\"")
        .replace("\\n", "\n")
        .replace(BACKSLASH_HOLD, "\\")
}

/// Collects and decodes every hydration chunk on a page, in document order.
///
/// An empty result usually means the upstream markup changed shape, which
/// would otherwise surface only as a silent zero-event run; warn about it.
pub fn payload_chunks(html: &str) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = html;
    while let Some(start) = rest.find(PUSH_NEEDLE) {
        let after = &rest[start + PUSH_NEEDLE.len()..];
        let Some(end) = closing_quote(after) else {
            break;
        };
        chunks.push(decode_chunk(&after[..end]));
        rest = &after[end..];
    }
    if chunks.is_empty() {
        tracing::warn!("no hydration chunks found in page");
    }
    chunks
}

/// Position of the first unescaped `"` in `s`.
fn closing_quote(s: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, ch) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => return Some(i),
            _ => {}
        }
    }
    None
}

/// Yields every parseable JSON object in `text` whose opening brace starts
/// an occurrence of `marker`, left to right. Single forward scan; objects
/// that fail to parse are skipped and the scan resumes past their span.
pub fn extract_objects(text: &str, marker: &str) -> Vec<Value> {
    // The `message` field is free text that may carry unescaped control
    // characters; it is unused downstream, so blank it before parsing.
    let message_re = Regex::new(r#""message":"[^"]*""#).ok();
    let mut out = Vec::new();
    let mut cursor = 0;
    while let Some(pos) = text[cursor..].find(marker) {
        let start = cursor + pos;
        // The window is a byte budget; snap it back onto a char boundary so
        // the slice cannot split a multibyte character in Korean text.
        let mut limit = (start + SCAN_WINDOW).min(text.len());
        while !text.is_char_boundary(limit) {
            limit -= 1;
        }
        let end = balanced_end(&text[start..limit])
            .map(|off| start + off)
            .unwrap_or(limit);
        let mut span = text[start..end].to_string();
        if let Some(re) = &message_re {
            span = re.replace_all(&span, r#""message":"""#).into_owned();
        }
        if let Ok(value) = serde_json::from_str::<Value>(&span) {
            out.push(value);
        }
        cursor = end.max(start + marker.len());
    }
    out
}

/// Byte offset just past the `}` that balances the `{` at the start of
/// `window`, or `None` if depth never returns to zero.
fn balanced_end(window: &str) -> Option<usize> {
    let mut depth: i64 = 0;
    for (i, ch) in window.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Full page-to-records path for a schedule page: decode all chunks,
/// concatenate (records may straddle chunk boundaries), extract, and keep
/// the records that deserialize.
pub fn extract_events(html: &str) -> Vec<RawEvent> {
    let payload = payload_chunks(html).concat();
    extract_objects(&payload, EVENT_MARKER)
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_is_idempotent_on_clean_text() {
        let clean = r#"{"scheduleId":1,"title":"컴백 쇼케이스"}"#;
        assert_eq!(decode_chunk(clean), clean);
    }

    #[test]
    fn decode_unescapes_quotes_and_newlines() {
        let raw = r#"{\"title\":\"a\nb\"}"#;
        assert_eq!(decode_chunk(raw), "{\"title\":\"a\nb\"}");
    }

    #[test]
    fn decode_keeps_escaped_backslash_from_colliding() {
        // `\\n` is an escaped backslash followed by `n`, not a newline.
        assert_eq!(decode_chunk(r"C:\\note"), r"C:\note");
        assert_eq!(decode_chunk(r"\\\n"), "\\\n");
    }

    #[test]
    fn extracts_one_object_per_marker() {
        let text = concat!(
            "noise [\"$\",\"div\",null,",
            "{\"scheduleId\":1,\"title\":\"a\"}",
            " more noise ",
            "{\"scheduleId\":2,\"title\":\"b\",\"nested\":{\"x\":1}}",
            " tail",
        );
        let objects = extract_objects(text, EVENT_MARKER);
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0]["scheduleId"], 1);
        assert_eq!(objects[1]["nested"]["x"], 1);
    }

    #[test]
    fn unterminated_braces_never_hang_and_yield_nothing() {
        let mut text = String::from("{\"scheduleId\":1,\"open\":{");
        text.push_str(&"x".repeat(30_000));
        let objects = extract_objects(&text, EVENT_MARKER);
        assert!(objects.is_empty());
    }

    #[test]
    fn scan_window_lands_safely_inside_multibyte_text() {
        // More than 10 KB of Hangul after the marker puts the window cutoff
        // mid-character; the scan must clamp, not panic.
        let mut text = String::from("{\"scheduleId\":1,\"open\":{");
        text.push_str(&"가".repeat(6_000));
        assert!(extract_objects(&text, EVENT_MARKER).is_empty());
    }

    #[test]
    fn balanced_object_with_long_hangul_tail_still_parses() {
        let mut text = String::from("{\"scheduleId\":5,\"title\":\"심야 방송\"}");
        text.push_str(&"나".repeat(6_000));
        let objects = extract_objects(&text, EVENT_MARKER);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0]["scheduleId"], 5);
    }

    #[test]
    fn bad_object_is_skipped_and_scan_continues() {
        let text = concat!(
            "{\"scheduleId\":broken}",
            " then ",
            "{\"scheduleId\":7,\"title\":\"ok\"}",
        );
        let objects = extract_objects(text, EVENT_MARKER);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0]["scheduleId"], 7);
    }

    #[test]
    fn message_field_is_blanked_before_parse() {
        let text = "{\"scheduleId\":3,\"message\":\"line1\u{1}line2\",\"title\":\"t\"}";
        let objects = extract_objects(text, EVENT_MARKER);
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0]["message"], "");
    }

    #[test]
    fn chunks_are_decoded_in_document_order() {
        let html = "<script>self.__next_f.push([1,\"first \\\"part\\\"\"])</script>\
                    <script>self.__next_f.push([1,\"second\"])</script>";
        let chunks = payload_chunks(html);
        assert_eq!(chunks, vec!["first \"part\"".to_string(), "second".to_string()]);
    }

    #[test]
    fn page_without_chunks_yields_no_events() {
        assert!(extract_events("<html><body>static page</body></html>").is_empty());
    }
}
