use crate::model::FormValues;
use itertools::Itertools;
use serde_json::Value;

/// Resolves a dotted path against a value map.
///
/// An exact key wins over a nested walk, so a flat key such as `"a.b"` is
/// found directly. Missing segments resolve to `None` rather than failing.
pub fn resolve_path<'a>(values: &'a FormValues, path: &str) -> Option<&'a Value> {
    if let Some(value) = values.get(path) {
        return Some(value);
    }
    let mut segments = path.split('.');
    let mut current = values.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Null, missing, and the empty string count as "no value".
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Numeric view of a value. Blank values have none.
pub fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// String view of a value, used by `contains` and `regex`.
pub fn to_display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Array(items) => items.iter().map(to_display_string).join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// Loose equality across string-backed and typed controls.
///
/// `"true" == true`, `"18" == 18`, and `0 == "0"` all hold. Null only equals null.
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Bool(b), Value::String(s)) | (Value::String(s), Value::Bool(b)) => {
            match s.trim() {
                "true" => *b,
                "false" => !*b,
                other => other.parse::<f64>().ok() == Some(if *b { 1.0 } else { 0.0 }),
            }
        }
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| loose_eq(x, y))
        }
        (Value::Object(a), Value::Object(b)) => a == b,
        (Value::Array(_), other) | (other, Value::Array(_)) => {
            to_display_string(left) == to_display_string(right) && !other.is_object()
        }
        _ => match (to_number(left), to_number(right)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn values(v: Value) -> FormValues {
        match v {
            Value::Object(map) => map,
            _ => FormValues::new(),
        }
    }

    #[test]
    fn test_resolve_path_nested_and_flat() {
        let data = values(json!({
            "contact": { "email": "a@b.co" },
            "items": [{ "sku": "X1" }],
            "a.b": 5
        }));
        assert_eq!(resolve_path(&data, "contact.email"), Some(&json!("a@b.co")));
        assert_eq!(resolve_path(&data, "items.0.sku"), Some(&json!("X1")));
        assert_eq!(resolve_path(&data, "a.b"), Some(&json!(5)));
        assert_eq!(resolve_path(&data, "contact.phone.mobile"), None);
        assert_eq!(resolve_path(&data, "missing"), None);
    }

    #[test]
    fn test_loose_equality() {
        assert!(loose_eq(&json!("true"), &json!(true)));
        assert!(loose_eq(&json!(false), &json!("false")));
        assert!(loose_eq(&json!(0), &json!("0")));
        assert!(loose_eq(&json!("18"), &json!(18.0)));
        assert!(!loose_eq(&json!(null), &json!("")));
        assert!(!loose_eq(&json!("admin"), &json!("user")));
        assert!(loose_eq(&json!(["a", "b"]), &json!("a,b")));
    }

    #[test]
    fn test_to_number() {
        assert_eq!(to_number(&json!("42")), Some(42.0));
        assert_eq!(to_number(&json!(" 3.5 ")), Some(3.5));
        assert_eq!(to_number(&json!(true)), Some(1.0));
        assert_eq!(to_number(&json!("")), None);
        assert_eq!(to_number(&json!("abc")), None);
        assert_eq!(to_number(&json!(null)), None);
    }

    #[test]
    fn test_to_display_string() {
        assert_eq!(to_display_string(&json!("hi")), "hi");
        assert_eq!(to_display_string(&json!(7)), "7");
        assert_eq!(to_display_string(&json!(null)), "");
        assert_eq!(to_display_string(&json!(["x", 1])), "x,1");
    }
}
