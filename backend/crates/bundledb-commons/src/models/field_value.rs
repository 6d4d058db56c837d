//! Tagged field values.
//!
//! Incoming JSON values are classified once, at ingestion, into one of three shapes.
//! The tag decides the canonical index key and how a constraint value is normalized,
//! so neither the indexer nor the matcher has to re-inspect raw JSON.

use serde_json::{Number, Value};

/// A row or constraint value, classified by shape.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// JSON string.
    String(String),
    /// JSON number.
    Number(Number),
    /// Anything else: objects, arrays, booleans and `null`.
    Structured(Value),
}

impl FieldValue {
    /// Classify a JSON value.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => FieldValue::String(s.clone()),
            Value::Number(n) => FieldValue::Number(n.clone()),
            other => FieldValue::Structured(other.clone()),
        }
    }

    /// Canonical string under which this value is indexed.
    ///
    /// Strings are kept verbatim, numbers use their shortest decimal form
    /// (`30.0` indexes as `30`), everything else is JSON-encoded.
    pub fn index_key(&self) -> String {
        match self {
            FieldValue::String(s) => s.clone(),
            FieldValue::Number(n) => number_key(n),
            FieldValue::Structured(v) => v.to_string(),
        }
    }

    /// Normalized form used on the constraint side of a match.
    ///
    /// Text is case-folded unless `strict`; numbers are stringified unchanged.
    pub fn constraint_key(&self, strict: bool) -> String {
        match self {
            FieldValue::Number(n) => number_key(n),
            other if strict => other.index_key(),
            other => other.index_key().to_lowercase(),
        }
    }

    /// Falsy constraint values normalize to the empty boundary.
    ///
    /// `null`, `false`, `""` and `[]` are falsy; the number `0` is not.
    pub fn is_falsy(&self) -> bool {
        match self {
            FieldValue::String(s) => s.is_empty(),
            FieldValue::Number(_) => false,
            FieldValue::Structured(Value::Null) | FieldValue::Structured(Value::Bool(false)) => {
                true
            },
            FieldValue::Structured(Value::Array(items)) => items.is_empty(),
            FieldValue::Structured(_) => false,
        }
    }
}

impl From<&Value> for FieldValue {
    fn from(value: &Value) -> Self {
        FieldValue::from_json(value)
    }
}

fn number_key(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", f as i64)
        },
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classification() {
        assert!(matches!(FieldValue::from_json(&json!("a")), FieldValue::String(_)));
        assert!(matches!(FieldValue::from_json(&json!(1.5)), FieldValue::Number(_)));
        assert!(matches!(FieldValue::from_json(&json!({"a": 1})), FieldValue::Structured(_)));
        assert!(matches!(FieldValue::from_json(&json!(true)), FieldValue::Structured(_)));
        assert!(matches!(FieldValue::from_json(&json!(null)), FieldValue::Structured(_)));
    }

    #[test]
    fn test_index_keys() {
        assert_eq!(FieldValue::from_json(&json!("Ann")).index_key(), "Ann");
        assert_eq!(FieldValue::from_json(&json!(30)).index_key(), "30");
        assert_eq!(FieldValue::from_json(&json!(30.0)).index_key(), "30");
        assert_eq!(FieldValue::from_json(&json!(2.5)).index_key(), "2.5");
        assert_eq!(FieldValue::from_json(&json!(-4)).index_key(), "-4");
        assert_eq!(FieldValue::from_json(&json!(null)).index_key(), "null");
        assert_eq!(FieldValue::from_json(&json!([1, "a"])).index_key(), r#"[1,"a"]"#);
    }

    #[test]
    fn test_constraint_keys_fold_case_unless_strict() {
        let v = FieldValue::from_json(&json!("AnN"));
        assert_eq!(v.constraint_key(false), "ann");
        assert_eq!(v.constraint_key(true), "AnN");
        assert_eq!(FieldValue::from_json(&json!(7)).constraint_key(false), "7");
    }

    #[test]
    fn test_falsy_values() {
        assert!(FieldValue::from_json(&json!(null)).is_falsy());
        assert!(FieldValue::from_json(&json!(false)).is_falsy());
        assert!(FieldValue::from_json(&json!("")).is_falsy());
        assert!(FieldValue::from_json(&json!([])).is_falsy());
        assert!(!FieldValue::from_json(&json!(0)).is_falsy());
        assert!(!FieldValue::from_json(&json!("x")).is_falsy());
    }
}
