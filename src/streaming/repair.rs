use serde_json::Value;
use std::borrow::Cow;
use tracing::debug;

/// Wrap unquoted object keys in double quotes.
///
/// A bareword (alphanumeric or `_` characters) immediately followed by `:`
/// is quoted, unless it sits inside a double-quoted string literal. String
/// contents are copied through untouched, so `{note:"a: b"}` only gains
/// quotes around `note`. Input with nothing to repair is returned borrowed.
pub fn quote_bare_keys(input: &str) -> Cow<'_, str> {
    let spans = bare_key_spans(input);
    if spans.is_empty() {
        return Cow::Borrowed(input);
    }

    let mut repaired = String::with_capacity(input.len() + spans.len() * 2);
    let mut last = 0;
    for (start, end) in spans {
        repaired.push_str(&input[last..start]);
        repaired.push('"');
        repaired.push_str(&input[start..end]);
        repaired.push('"');
        last = end;
    }
    repaired.push_str(&input[last..]);

    Cow::Owned(repaired)
}

/// Repair `text` and parse it, keeping the result only if it is an array.
pub fn parse_array(text: &str) -> Option<Vec<Value>> {
    let repaired = quote_bare_keys(text);
    match serde_json::from_str::<Value>(&repaired) {
        Ok(Value::Array(items)) => Some(items),
        Ok(other) => {
            debug!(kind = value_kind(&other), "repaired payload is not an array");
            None
        }
        Err(e) => {
            debug!(error = %e, "repaired payload is not valid JSON yet");
            None
        }
    }
}

fn bare_key_spans(input: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut word_start: Option<usize> = None;

    for (i, ch) in input.char_indices() {
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

        if ch.is_alphanumeric() || ch == '_' {
            word_start.get_or_insert(i);
            continue;
        }

        if let Some(start) = word_start.take()
            && ch == ':'
        {
            spans.push((start, i));
        }

        if ch == '"' {
            in_string = true;
        }
    }

    spans
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_quotes_unquoted_keys() {
        let repaired = quote_bare_keys(r#"[{name:"양파",time:5}]"#);
        assert_eq!(repaired, r#"[{"name":"양파","time":5}]"#);

        let value: Value = serde_json::from_str(&repaired).unwrap();
        assert_eq!(value, json!([{"name": "양파", "time": 5}]));
    }

    #[test]
    fn test_valid_json_is_borrowed() {
        let input = r#"[{"name":"양파","time":5}]"#;
        assert!(matches!(quote_bare_keys(input), Cow::Borrowed(_)));
    }

    #[test]
    fn test_repair_is_idempotent() {
        let once = quote_bare_keys(r#"[{day_no:1,meal_type:"lunch"}]"#).into_owned();
        let twice = quote_bare_keys(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_string_contents_untouched() {
        let repaired = quote_bare_keys(r#"[{note:"tip: stir well",url:"http://x"}]"#);
        assert_eq!(
            repaired,
            r#"[{"note":"tip: stir well","url":"http://x"}]"#
        );
    }

    #[test]
    fn test_escaped_quote_inside_string() {
        let repaired = quote_bare_keys(r#"[{name:"say \"hi: there\"",level:"easy"}]"#);
        assert_eq!(
            repaired,
            r#"[{"name":"say \"hi: there\"","level":"easy"}]"#
        );
    }

    #[test]
    fn test_unicode_bare_keys() {
        let repaired = quote_bare_keys(r#"[{이름:"김치찌개"}]"#);
        assert_eq!(repaired, r#"[{"이름":"김치찌개"}]"#);
    }

    #[test]
    fn test_non_ascii_bare_values_left_alone() {
        let input = r#"[{name:"김치: 매운맛",메모:"시간: 30분",level:쉬움,time:5}]"#;
        let repaired = quote_bare_keys(input);
        assert_eq!(
            repaired,
            r#"[{"name":"김치: 매운맛","메모":"시간: 30분","level":쉬움,"time":5}]"#
        );
        assert!(parse_array(input).is_none());

        let quoted = r#"[{name:"김치: 매운맛",메모:"시간: 30분",level:"쉬움",time:5}]"#;
        assert_eq!(
            parse_array(quoted).unwrap(),
            vec![json!({"name": "김치: 매운맛", "메모": "시간: 30분", "level": "쉬움", "time": 5})]
        );
    }

    #[test]
    fn test_parse_array_accepts_repaired_array() {
        let items = parse_array(r#"[{name:"사과"}]"#).unwrap();
        assert_eq!(items, vec![json!({"name": "사과"})]);
    }

    #[test]
    fn test_parse_array_rejects_non_array() {
        assert!(parse_array(r#"{name:"사과"}"#).is_none());
        assert!(parse_array("42").is_none());
    }

    #[test]
    fn test_parse_array_rejects_partial_fragment() {
        assert!(parse_array(r#"[{name:"사과"},{name:"#).is_none());
    }
}
