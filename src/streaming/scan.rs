use serde_json::Value;

use super::repair::parse_array;

/// Find the last balanced `[...]` span in free-form text that parses as an
/// array after key repair and satisfies `accept`.
///
/// Spans are found with a bracket-depth scan that ignores brackets inside
/// string literals. A span that fails to parse is skipped as a whole; arrays
/// nested inside it are not tried separately. A parsed span rejected by
/// `accept` leaves the earlier match in place.
pub fn last_array<F>(raw: &str, accept: F) -> Option<Vec<Value>>
where
    F: Fn(&[Value]) -> bool,
{
    let mut latest = None;
    let mut search_start = 0;

    while let Some(offset) = raw[search_start..].find('[') {
        let start = search_start + offset;
        let Some(len) = find_array_boundary(&raw.as_bytes()[start..]) else {
            // Unbalanced tail, nothing further can close
            break;
        };

        if let Some(items) = parse_array(&raw[start..start + len])
            && accept(&items)
        {
            latest = Some(items);
        }
        search_start = start + len;
    }

    latest
}

fn find_array_boundary(bytes: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &byte) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else {
                match byte {
                    b'\\' => escaped = true,
                    b'"' => in_string = false,
                    _ => {}
                }
            }
        } else {
            match byte {
                b'"' => in_string = true,
                b'[' => depth += 1,
                b']' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return Some(i + 1);
                    }
                }
                _ => {}
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn any_shape(_: &[Value]) -> bool {
        true
    }

    fn objects_only(items: &[Value]) -> bool {
        !items.is_empty() && items.iter().all(Value::is_object)
    }

    #[test]
    fn test_array_in_free_text() {
        let raw = r#"Here is your plan: [{"day_no":1,"meal_type":"lunch","item":"비빔밥"}] enjoy!"#;
        let items = last_array(raw, any_shape).unwrap();
        assert_eq!(
            items,
            vec![json!({"day_no": 1, "meal_type": "lunch", "item": "비빔밥"})]
        );
    }

    #[test]
    fn test_last_array_wins() {
        let raw = r#"[1,2] then a revision [3]"#;
        assert_eq!(last_array(raw, any_shape).unwrap(), vec![json!(3)]);
    }

    #[test]
    fn test_brackets_inside_strings() {
        let raw = r#"[{"item":"rice ] and [ beans"}]"#;
        assert_eq!(
            last_array(raw, any_shape).unwrap(),
            vec![json!({"item": "rice ] and [ beans"})]
        );
    }

    #[test]
    fn test_unbalanced_tail_keeps_earlier_array() {
        let raw = r#"[{name:"a"}] [{name:"b""#;
        assert_eq!(last_array(raw, any_shape).unwrap(), vec![json!({"name": "a"})]);
    }

    #[test]
    fn test_no_array() {
        assert!(last_array("no structured output here", any_shape).is_none());
        assert!(last_array("[not json at all]", any_shape).is_none());
    }

    #[test]
    fn test_rejected_trailing_array_keeps_match() {
        let raw = r#"[{"day_no":1,"meal_type":"lunch","item":"비빔밥"}] 참고 칼로리: [500, 600] []"#;
        assert_eq!(last_array(raw, any_shape).unwrap(), Vec::<Value>::new());
        assert_eq!(
            last_array(raw, objects_only).unwrap(),
            vec![json!({"day_no": 1, "meal_type": "lunch", "item": "비빔밥"})]
        );
    }

    #[test]
    fn test_nothing_accepted() {
        assert!(last_array("[1, 2] [3]", objects_only).is_none());
    }
}
