// partial_json.rs — best-effort recovery of JSON values from a growing text buffer.
//
// Used by stream_object() on every text delta and by generate_object() on the
// final text. The repair is deliberately conservative: it never closes a string
// that was cut off mid-value, so a partial object never carries a truncated
// field value.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// Strip surrounding whitespace and a Markdown code fence (```` ```json ... ``` ````).
///
/// An opening fence without its closing fence (still streaming) is stripped too.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string (`json`, `JSON`, ...) up to the first newline.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => return "",
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Count unmatched `{` and `[` outside string literals. Escape-aware.
fn unmatched_brackets(text: &str) -> (usize, usize) {
    let mut braces: isize = 0;
    let mut brackets: isize = 0;
    let mut in_string = false;
    let mut escaped = false;

    for c in text.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => braces += 1,
            '}' => braces -= 1,
            '[' => brackets += 1,
            ']' => brackets -= 1,
            _ => {}
        }
    }

    (braces.max(0) as usize, brackets.max(0) as usize)
}

/// Apply structural repair to a truncated JSON document.
///
/// 1. Strip a trailing `,`.
/// 2. Append `"` when the text after the last quote contains `:` and no quote.
/// 3. Append missing `]` then missing `}`.
///
/// The result is a candidate only; callers re-parse it.
pub fn repair(text: &str) -> String {
    let mut out = text.trim_end().to_string();
    if out.ends_with(',') {
        out.pop();
    }

    let (braces, brackets) = unmatched_brackets(&out);

    if let Some(last_quote) = out.rfind('"') {
        let tail = &out[last_quote + 1..];
        if tail.contains(':') && !tail.contains('"') {
            out.push('"');
        }
    }

    out.extend(std::iter::repeat(']').take(brackets));
    out.extend(std::iter::repeat('}').take(braces));
    out
}

/// Strict decode of the (fence-stripped) text.
pub fn parse_complete_value(text: &str) -> Option<Value> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return None;
    }
    serde_json::from_str(body).ok()
}

/// Strict decode, falling back to [`repair`]. `None` when neither yields JSON.
pub fn parse_partial_value(text: &str) -> Option<Value> {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return None;
    }
    if let Ok(value) = serde_json::from_str(body) {
        return Some(value);
    }
    serde_json::from_str(&repair(body)).ok()
}

/// Typed variant of [`parse_partial_value`]: the repaired value must also
/// deserialize into `T`.
pub fn parse_partial<T: DeserializeOwned>(text: &str) -> Option<T> {
    parse_partial_value(text).and_then(|v| serde_json::from_value(v).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn test_strict_json_passes_through() {
        assert_eq!(
            parse_partial_value(r#"{"a": 1, "b": [true]}"#),
            Some(json!({"a": 1, "b": [true]}))
        );
    }

    #[test]
    fn test_closes_missing_brace() {
        assert_eq!(
            parse_partial_value(r#"{"name":"Ada""#),
            Some(json!({"name": "Ada"}))
        );
    }

    #[test]
    fn test_strips_trailing_comma() {
        assert_eq!(
            parse_partial_value(r#"{"name":"Ada","#),
            Some(json!({"name": "Ada"}))
        );
    }

    #[test]
    fn test_closes_brackets_before_braces() {
        assert_eq!(
            parse_partial_value(r#"{"tags":["a","b""#),
            Some(json!({"tags": ["a", "b"]}))
        );
        assert_eq!(
            parse_partial_value(r#"{"tags":["a","#),
            Some(json!({"tags": ["a"]}))
        );
    }

    #[test]
    fn test_bare_trailing_number_yields_nothing() {
        // A number may still be growing, so `:` after the last quote blocks it.
        assert_eq!(parse_partial_value(r#"{"tags":[1,2"#), None);
    }

    #[test]
    fn test_truncated_string_value_yields_nothing() {
        assert_eq!(parse_partial_value(r#"{"name":"Ad"#), None);
    }

    #[test]
    fn test_truncated_number_after_key_yields_nothing() {
        // The quote heuristic fires on `:3`, producing invalid JSON.
        assert_eq!(parse_partial_value(r#"{"name":"Ada","age":3"#), None);
    }

    #[test]
    fn test_brackets_inside_strings_are_ignored() {
        assert_eq!(
            parse_partial_value(r#"{"expr":"f(x) = {[x]}""#),
            Some(json!({"expr": "f(x) = {[x]}"}))
        );
    }

    #[test]
    fn test_escaped_quotes_inside_strings() {
        assert_eq!(
            parse_partial_value(r#"{"quote":"she said \"hi\"""#),
            Some(json!({"quote": "she said \"hi\""}))
        );
    }

    #[test]
    fn test_quote_heuristic_closes_value_ending_in_colon_text() {
        assert_eq!(
            repair(r#"{"url":"http:"#),
            r#"{"url":"http:"}"#.to_string()
        );
    }

    #[test]
    fn test_code_fence_is_stripped() {
        let fenced = "```json\n{\"ok\": true}\n```";
        assert_eq!(parse_complete_value(fenced), Some(json!({"ok": true})));

        let streaming = "```json\n{\"ok\": tr";
        assert_eq!(strip_code_fence(streaming), "{\"ok\": tr");
        assert_eq!(strip_code_fence("```js"), "");
    }

    #[test]
    fn test_empty_and_whitespace_yield_nothing() {
        assert_eq!(parse_partial_value(""), None);
        assert_eq!(parse_partial_value("   \n"), None);
    }

    #[test]
    fn test_parse_complete_rejects_truncated() {
        assert_eq!(parse_complete_value(r#"{"name":"Ada""#), None);
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Person {
        name: Option<String>,
        age: Option<u32>,
    }

    #[test]
    fn test_truncations_never_contradict_final_values() {
        let full = r#"{"name":"Ada","age":37}"#;
        for end in 1..=full.len() {
            let prefix = &full[..end];
            if let Some(person) = parse_partial::<Person>(prefix) {
                if let Some(name) = &person.name {
                    assert_eq!(name, "Ada", "prefix {prefix:?}");
                }
                if let Some(age) = person.age {
                    assert_eq!(age, 37, "prefix {prefix:?}");
                }
            }
        }
        assert_eq!(
            parse_partial::<Person>(full),
            Some(Person {
                name: Some("Ada".into()),
                age: Some(37)
            })
        );
    }

    #[test]
    fn test_typed_decode_requires_fields() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Strict {
            name: String,
            age: u32,
        }
        assert!(parse_partial::<Strict>(r#"{"name":"Ada""#).is_none());
        assert!(parse_partial::<Strict>(r#"{"name":"Ada","age":37"#).is_none());
        assert!(parse_partial::<Strict>(r#"{"name":"Ada","age":37}"#).is_some());
    }
}
