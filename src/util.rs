use serde_json::{Map, Value};

/// Truncate `value` to at most `limit` characters.
/// Returns the input unchanged when it already fits.
pub fn truncate_to_limit(value: &str, limit: usize) -> &str {
    match value.char_indices().nth(limit) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

/// Remove empty string values from a JSON document.
///
/// Object keys holding an empty string are dropped, empty strings are
/// filtered out of arrays, and a bare empty string becomes `None`.
/// Nested objects and arrays are cleaned recursively.
pub fn clear_empty_strings(value: Value) -> Option<Value> {
    match value {
        Value::String(s) if s.is_empty() => None,
        Value::Object(map) => Some(Value::Object(
            map.into_iter()
                .filter_map(|(k, v)| clear_empty_strings(v).map(|v| (k, v)))
                .collect::<Map<String, Value>>(),
        )),
        Value::Array(items) => Some(Value::Array(
            items.into_iter().filter_map(clear_empty_strings).collect(),
        )),
        other => Some(other),
    }
}

/// Decode an S3 object key as it appears in event notifications,
/// where spaces are encoded as `+` and other characters are percent-encoded.
pub fn unquote_plus(key: &str) -> String {
    let spaced = key.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        // not valid utf-8 once decoded, keep the raw key
        Err(_) => spaced,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_truncate_long_value() {
        let long = "a".repeat(40) + &"b".repeat(60);
        let truncated = truncate_to_limit(&long, 64);
        assert_eq!(64, truncated.len());
        assert_eq!(&long[..64], truncated);
    }

    #[test]
    fn test_truncate_short_value() {
        let short = "x".repeat(63);
        assert_eq!(short, truncate_to_limit(&short, 64));
        let exact = "y".repeat(64);
        assert_eq!(exact, truncate_to_limit(&exact, 64));
        assert_eq!("", truncate_to_limit("", 64));
    }

    #[test]
    fn test_truncate_counts_characters() {
        let value = "é".repeat(70);
        let truncated = truncate_to_limit(&value, 64);
        assert_eq!(64, truncated.chars().count());
    }

    #[test]
    fn test_clear_empty_strings_nested() {
        let value = json!({
            "caseId": "case-1",
            "subject": "",
            "recentCommunications": {
                "communications": [
                    {"body": "hello", "submittedBy": ""},
                    "",
                    "kept"
                ]
            },
            "ccEmailAddresses": ["", "ops@example.com", ""],
            "count": 0,
            "flag": false,
            "missing": null
        });

        let cleaned = clear_empty_strings(value).unwrap();
        assert_eq!(
            json!({
                "caseId": "case-1",
                "recentCommunications": {
                    "communications": [
                        {"body": "hello"},
                        "kept"
                    ]
                },
                "ccEmailAddresses": ["ops@example.com"],
                "count": 0,
                "flag": false,
                "missing": null
            }),
            cleaned
        );
    }

    #[test]
    fn test_clear_empty_strings_scalar() {
        assert_eq!(None, clear_empty_strings(json!("")));
        assert_eq!(Some(json!("a")), clear_empty_strings(json!("a")));
        assert_eq!(Some(json!([])), clear_empty_strings(json!(["", ""])));
    }

    #[test]
    fn test_unquote_plus() {
        assert_eq!(
            "AWSLogs/111111111111/CloudTrail/us-east-1/2024/01/01/file name.json.gz",
            unquote_plus("AWSLogs/111111111111/CloudTrail/us-east-1/2024/01/01/file+name.json.gz")
        );
        assert_eq!("a:b c+d", unquote_plus("a%3Ab+c%2Bd"));
    }
}
