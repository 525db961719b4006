use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// Maximum length of a displayed text state.
pub const MAX_TEXT_LEN: usize = 254;

const TRUNCATION_MARKER: &str = "..";

/// Boolean-like interpretation of a device value.
///
/// `true` for the literal boolean, or when the textual form (case-insensitive)
/// is one of `"true"`, `"1"`, `"yes"`. Everything else is `false`.
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => is_truthy_word(s),
        Value::Number(n) => is_truthy_word(&n.to_string()),
        _ => false,
    }
}

fn is_truthy_word(s: &str) -> bool {
    matches!(s.to_lowercase().as_str(), "true" | "1" | "yes")
}

/// Numeric-looking strings become integers, everything else passes through.
pub fn coerce_native(value: &Value) -> Value {
    match value {
        Value::String(s) if is_all_digits(s) => s
            .parse::<u64>()
            .map(Value::from)
            .unwrap_or_else(|_| value.clone()),
        other => other.clone(),
    }
}

fn is_all_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

/// Truncates free text to the platform state limit, marking the cut with `..`.
pub fn coerce_text(text: &str) -> String {
    if text.chars().count() <= MAX_TEXT_LEN {
        return text.to_string();
    }
    let keep = MAX_TEXT_LEN - TRUNCATION_MARKER.len();
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(TRUNCATION_MARKER);
    truncated
}

/// Parses an ISO-8601 timestamp, falling back to the Unix epoch.
///
/// Accepts RFC 3339 with offset, a naive date-time (taken as UTC) and a bare date.
pub fn coerce_timestamp(text: &str) -> DateTime<Utc> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return naive.and_utc();
    }
    if let Some(midnight) = NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
    {
        return midnight.and_utc();
    }

    DateTime::<Utc>::UNIX_EPOCH
}

/// Battery-charging label: zero / false / empty means not charging.
pub fn charging_label(value: &Value) -> &'static str {
    let charging = match coerce_native(value) {
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::Bool(b) => b,
        Value::String(s) => !s.is_empty() && !s.eq_ignore_ascii_case("false"),
        Value::Null => false,
        _ => true,
    };
    if charging { "charging" } else { "not_charging" }
}

/// Loose truthiness of a JSON value, as the device protocol uses it for flags.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coerce_bool_literals() {
        assert!(coerce_bool(&json!(true)));
        assert!(!coerce_bool(&json!(false)));
        assert!(!coerce_bool(&Value::Null));
        assert!(!coerce_bool(&json!({"on": true})));
    }

    #[test]
    fn test_coerce_bool_strings_case_insensitive() {
        for v in ["true", "TRUE", "True", "1", "yes", "YeS"] {
            assert!(coerce_bool(&json!(v)), "{v} should be true");
        }
        for v in ["false", "0", "no", "on", "", " true", "y"] {
            assert!(!coerce_bool(&json!(v)), "{v} should be false");
        }
    }

    #[test]
    fn test_coerce_bool_numbers_use_textual_form() {
        assert!(coerce_bool(&json!(1)));
        assert!(!coerce_bool(&json!(0)));
        assert!(!coerce_bool(&json!(2)));
        assert!(!coerce_bool(&json!(1.0)));
    }

    #[test]
    fn test_coerce_native() {
        assert_eq!(coerce_native(&json!("87")), json!(87));
        assert_eq!(coerce_native(&json!("312")), json!(312));
        assert_eq!(coerce_native(&json!("portrait")), json!("portrait"));
        assert_eq!(coerce_native(&json!("-5")), json!("-5"));
        assert_eq!(coerce_native(&json!("1.5")), json!("1.5"));
        assert_eq!(coerce_native(&json!("")), json!(""));
        assert_eq!(coerce_native(&json!(42.5)), json!(42.5));
        assert_eq!(coerce_native(&json!(true)), json!(true));
    }

    #[test]
    fn test_coerce_native_overflow_passes_through() {
        let huge = "9".repeat(40);
        assert_eq!(coerce_native(&json!(huge)), json!(huge));
    }

    #[test]
    fn test_coerce_text_short_is_unchanged() {
        assert_eq!(coerce_text("turn on the lights"), "turn on the lights");
        let exact = "x".repeat(MAX_TEXT_LEN);
        assert_eq!(coerce_text(&exact), exact);
    }

    #[test]
    fn test_coerce_text_truncates_long_values() {
        let long = "a".repeat(400);
        let out = coerce_text(&long);
        assert_eq!(out.chars().count(), MAX_TEXT_LEN);
        assert!(out.ends_with(".."));

        let just_over = "b".repeat(MAX_TEXT_LEN + 1);
        assert_eq!(coerce_text(&just_over).chars().count(), MAX_TEXT_LEN);
    }

    #[test]
    fn test_coerce_text_counts_characters_not_bytes() {
        let long = "é".repeat(300);
        let out = coerce_text(&long);
        assert_eq!(out.chars().count(), MAX_TEXT_LEN);
        assert!(out.starts_with("éé"));
    }

    #[test]
    fn test_coerce_timestamp_valid() {
        let ts = coerce_timestamp("2024-05-01T12:30:00+02:00");
        assert_eq!(ts.to_rfc3339(), "2024-05-01T10:30:00+00:00");

        let naive = coerce_timestamp("2024-05-01T12:30:00");
        assert_eq!(naive.to_rfc3339(), "2024-05-01T12:30:00+00:00");

        let date = coerce_timestamp("2024-05-01");
        assert_eq!(date.to_rfc3339(), "2024-05-01T00:00:00+00:00");
    }

    #[test]
    fn test_coerce_timestamp_malformed_falls_back_to_epoch() {
        for bad in ["", "yesterday", "2024-13-45T99:00:00Z", "12:30"] {
            assert_eq!(coerce_timestamp(bad), DateTime::<Utc>::UNIX_EPOCH, "{bad}");
        }
        assert_eq!(
            coerce_timestamp("garbage").to_rfc3339(),
            "1970-01-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_charging_label() {
        assert_eq!(charging_label(&json!(0)), "not_charging");
        assert_eq!(charging_label(&json!("0")), "not_charging");
        assert_eq!(charging_label(&json!(false)), "not_charging");
        assert_eq!(charging_label(&json!(2)), "charging");
        assert_eq!(charging_label(&json!("1")), "charging");
        assert_eq!(charging_label(&json!(true)), "charging");
    }

    #[test]
    fn test_is_truthy() {
        assert!(!is_truthy(&Value::Null));
        assert!(!is_truthy(&json!("")));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!([])));
        assert!(is_truthy(&json!("1.4.2")));
        assert!(is_truthy(&json!({"a": 1})));
    }
}
