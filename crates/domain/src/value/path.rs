use serde_json::Value;

/// Walks a dot-separated path through nested objects.
///
/// Returns `None` when a segment is missing, when an intermediate value is not
/// an object, or when the value found is `null`.
pub fn get_path<'a>(path: &str, data: &'a Value) -> Option<&'a Value> {
    path.split('.')
        .try_fold(data, |current, segment| current.as_object()?.get(segment))
        .filter(|value| !value.is_null())
}

/// First segment of a dot-separated path.
pub fn path_root(path: &str) -> &str {
    path.split('.').next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_path_nested() {
        let data = json!({"a": {"b": {"c": 5}}});
        assert_eq!(get_path("a.b.c", &data), Some(&json!(5)));
        assert_eq!(get_path("a.b", &data), Some(&json!({"c": 5})));
    }

    #[test]
    fn test_get_path_missing_segment() {
        assert_eq!(get_path("a.b.c", &json!({"a": {}})), None);
        assert_eq!(get_path("x", &json!({"a": 1})), None);
    }

    #[test]
    fn test_get_path_through_non_object() {
        assert_eq!(get_path("a.b.c", &json!({"a": {"b": "text"}})), None);
        assert_eq!(get_path("a.b", &json!({"a": [1, 2]})), None);
        assert_eq!(get_path("a", &json!("scalar")), None);
    }

    #[test]
    fn test_get_path_null_is_unavailable() {
        assert_eq!(get_path("a.b", &json!({"a": {"b": null}})), None);
    }

    #[test]
    fn test_get_path_intent_speech() {
        let data = json!({
            "intent_output": {
                "response": {"speech": {"plain": {"speech": "Turned on the light"}}}
            }
        });
        assert_eq!(
            get_path("intent_output.response.speech.plain.speech", &data),
            Some(&json!("Turned on the light"))
        );
    }

    #[test]
    fn test_path_root() {
        assert_eq!(path_root("intent_output.response"), "intent_output");
        assert_eq!(path_root("text"), "text");
    }
}
