//! Row identifier.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Auto-assigned row identifier (`Register::row_count` at insert time).
///
/// Serialized as a bare integer; as a map key it round-trips through its decimal
/// string form, which keeps bundles compatible with plain JSON objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(u64);

impl RowId {
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Parse a client-supplied id: a non-negative integer or its decimal string.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_u64().map(Self),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RowId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u64>().map(Self)
    }
}

impl From<u64> for RowId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<RowId> for Value {
    fn from(id: RowId) -> Self {
        Value::from(id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_from_json_accepts_numbers_and_numeric_strings() {
        assert_eq!(RowId::from_json(&json!(3)), Some(RowId::new(3)));
        assert_eq!(RowId::from_json(&json!("12")), Some(RowId::new(12)));
        assert_eq!(RowId::from_json(&json!(-1)), None);
        assert_eq!(RowId::from_json(&json!("abc")), None);
        assert_eq!(RowId::from_json(&json!(null)), None);
    }

    #[test]
    fn test_map_keys_serialize_as_strings() {
        let mut map = BTreeMap::new();
        map.insert(RowId::new(2), "b");
        let encoded = serde_json::to_string(&map).unwrap();
        assert_eq!(encoded, r#"{"2":"b"}"#);
        let decoded: BTreeMap<RowId, String> = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded.get(&RowId::new(2)).map(String::as_str), Some("b"));
    }
}
