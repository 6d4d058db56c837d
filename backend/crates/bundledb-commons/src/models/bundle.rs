//! Bundle model: Register, Table and Index.
//!
//! A bundle is persisted as a three-element JSON array
//! `[register, table, index]`, which is also how it travels inside snapshot
//! update jobs.

use super::{RowId, TableName};
use crate::constants::RESERVED_PRIVATE;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A row record: field name → JSON value, reserved fields included.
pub type Row = Map<String, Value>;

/// Row id → row record.
pub type Table = BTreeMap<RowId, Row>;

/// Field → canonical value key → row ids holding that value.
pub type Index = BTreeMap<String, BTreeMap<String, Vec<RowId>>>;

/// Per-table schema and row counter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Register {
    /// Ordered, duplicate-free, append-only list of schema fields.
    #[serde(default)]
    pub dataform: Vec<String>,
    /// Highest auto-assigned row id.
    #[serde(default)]
    pub row_count: u64,
}

impl Register {
    /// Append `fields` (then the table's reserved fields) to the schema,
    /// preserving order and skipping duplicates.
    ///
    /// Returns the number of fields actually added.
    pub fn extend_dataform<I, S>(&mut self, table: &TableName, fields: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let before = self.dataform.len();
        let reserved = table.reserved_fields();
        for field in fields.into_iter().map(Into::into).chain(reserved) {
            if !field.is_empty() && !self.dataform.contains(&field) {
                self.dataform.push(field);
            }
        }
        self.dataform.len() - before
    }

    /// True if `field` may be stored in rows of `table`.
    ///
    /// Reserved fields are accepted even when a lazily created table has an empty
    /// schema, so such tables can still be stamped and soft-deleted.
    pub fn accepts(&self, table: &TableName, field: &str) -> bool {
        table.is_reserved(field) || self.dataform.iter().any(|f| f == field)
    }

    /// Increment the counter and return the new row id.
    pub fn next_row_id(&mut self) -> RowId {
        self.row_count += 1;
        RowId::new(self.row_count)
    }
}

/// The (Register, Table, Index) triple for one table.
///
/// Decoding is lenient below the register: rows that are not objects, table
/// keys that are not row ids and bucket entries that are not row ids are
/// dropped with a warning, so one bad element never hides the rest of the table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawBundle", into = "BundleRepr")]
pub struct Bundle {
    pub register: Register,
    pub table: Table,
    pub index: Index,
}

#[derive(Serialize)]
struct BundleRepr(Register, Table, Index);

#[derive(Deserialize)]
struct RawBundle(Register, #[serde(default)] Value, #[serde(default)] Value);

impl From<RawBundle> for Bundle {
    fn from(raw: RawBundle) -> Self {
        Self {
            register: raw.0,
            table: decode_table(raw.1),
            index: decode_index(raw.2),
        }
    }
}

impl From<Bundle> for BundleRepr {
    fn from(b: Bundle) -> Self {
        BundleRepr(b.register, b.table, b.index)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn decode_table(raw: Value) -> Table {
    let mut table = Table::new();
    let entries = match raw {
        Value::Object(entries) => entries,
        Value::Null => return table,
        other => {
            log::warn!("Bundle table is a {}, not an object; reading it as empty", json_kind(&other));
            return table;
        },
    };
    for (key, value) in entries {
        let Ok(row_id) = key.trim().parse::<RowId>() else {
            log::warn!("Skipping table entry with non-numeric row id {:?}", key);
            continue;
        };
        match value {
            Value::Object(row) => {
                table.insert(row_id, row);
            },
            other => log::warn!("Skipping row {}: expected an object, found {}", row_id, json_kind(&other)),
        }
    }
    table
}

fn decode_index(raw: Value) -> Index {
    let mut index = Index::new();
    let fields = match raw {
        Value::Object(fields) => fields,
        Value::Null => return index,
        other => {
            log::warn!("Bundle index is a {}, not an object; reading it as empty", json_kind(&other));
            return index;
        },
    };
    for (field, buckets) in fields {
        let Value::Object(buckets) = buckets else {
            log::warn!("Skipping index field {:?}: buckets are a {}", field, json_kind(&buckets));
            continue;
        };
        let decoded = index.entry(field.clone()).or_default();
        for (key, ids) in buckets {
            let Value::Array(ids) = ids else {
                log::warn!("Skipping index bucket {}[{:?}]: not an array", field, key);
                continue;
            };
            let mut row_ids = Vec::with_capacity(ids.len());
            for id in &ids {
                match RowId::from_json(id) {
                    Some(row_id) => row_ids.push(row_id),
                    None => log::warn!("Skipping row id {} in index bucket {}[{:?}]", id, field, key),
                }
            }
            if !row_ids.is_empty() {
                decoded.insert(key, row_ids);
            }
        }
    }
    index.retain(|_, buckets| !buckets.is_empty());
    index
}

impl Bundle {
    /// The canonical empty bundle (`[{dataform: [], row_count: 0}, {}, {}]`).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Reset contents, keeping the schema.
    pub fn flush(&mut self) {
        self.register.row_count = 0;
        self.table.clear();
        self.index.clear();
    }

    /// Visible rows in ascending row id order.
    pub fn visible_rows(&self) -> impl Iterator<Item = (&RowId, &Row)> {
        self.table.iter().filter(|(_, row)| !is_private(row))
    }

    /// Look up a row, hiding soft-deleted ones.
    pub fn visible_row(&self, row_id: &RowId) -> Option<&Row> {
        self.table.get(row_id).filter(|row| !is_private(row))
    }
}

/// True if the row is soft-deleted (`__private__` equals 1).
pub fn is_private(row: &Row) -> bool {
    match row.get(RESERVED_PRIVATE) {
        Some(Value::Number(n)) => n.as_f64() == Some(1.0),
        Some(Value::String(s)) => s.trim() == "1",
        Some(Value::Bool(b)) => *b,
        _ => false,
    }
}
