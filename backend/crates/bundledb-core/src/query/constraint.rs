//! Constraint normalization.

use crate::error::{BundleDbError, Result};
use bundledb_commons::constants::MATCH_ALL;
use bundledb_commons::{FieldValue, NEGATION_SUFFIX};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One normalized field constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    /// Field name with any negation suffix stripped.
    pub field: String,
    /// Normalized options; always at least two entries.
    pub bounds: Vec<String>,
    /// Flips every per-bucket match result.
    pub negated: bool,
}

/// A parsed constraint set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraints {
    /// `"*"` or `{}`: every visible row.
    All,
    /// Field constraints, at most one per field.
    Fields(Vec<Constraint>),
}

impl Constraints {
    /// Parse a request's `constraints` value.
    ///
    /// When both `age` and `age_NOT` are given, the key visited last wins.
    pub fn parse(value: &Value, strict: bool) -> Result<Self> {
        match value {
            Value::String(s) if s == MATCH_ALL => Ok(Constraints::All),
            Value::Object(map) if map.is_empty() => Ok(Constraints::All),
            Value::Object(map) => {
                let mut fields: Vec<Constraint> = Vec::with_capacity(map.len());
                for (key, raw) in map {
                    let (field, negated) = split_negation(key);
                    let constraint = Constraint {
                        field: field.to_string(),
                        bounds: format_param(raw, strict),
                        negated,
                    };
                    match fields.iter_mut().find(|c| c.field == constraint.field) {
                        Some(existing) => *existing = constraint,
                        None => fields.push(constraint),
                    }
                }
                Ok(Constraints::Fields(fields))
            },
            other => Err(BundleDbError::InvalidInput(format!(
                "constraints must be an object or \"{}\", got {}",
                MATCH_ALL, other
            ))),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Constraints::All)
    }
}

fn split_negation(key: &str) -> (&str, bool) {
    match key.strip_suffix(NEGATION_SUFFIX) {
        Some(field) if !field.is_empty() => (field, true),
        _ => (key, false),
    }
}

/// Normalize a constraint value into its option list.
///
/// - scalar → `[v, v]`
/// - list → element-wise, a single element is duplicated
/// - falsy (`null`, `false`, `""`, `[]`) → `["", ""]`
///
/// Text is lower-cased unless `strict`. Objects are JSON-encoded and treated as
/// scalars.
pub fn format_param(value: &Value, strict: bool) -> Vec<String> {
    let tagged = FieldValue::from_json(value);
    if tagged.is_falsy() {
        return vec![String::new(), String::new()];
    }
    match value {
        Value::Array(items) => {
            let mut bounds: Vec<String> = items
                .iter()
                .map(|item| FieldValue::from_json(item).constraint_key(strict))
                .collect();
            if bounds.len() == 1 {
                bounds.push(bounds[0].clone());
            }
            bounds
        },
        _ => {
            let key = tagged.constraint_key(strict);
            vec![key.clone(), key]
        },
    }
}
