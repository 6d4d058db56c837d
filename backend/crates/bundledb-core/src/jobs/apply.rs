//! In-place bundle mutations performed by the worker.
//!
//! These are pure functions over a loaded [`Bundle`]; loading and storing is the
//! worker's job.

use crate::index::{index_insert, index_replace};
use bundledb_commons::{
    Bundle, Row, RowId, TableName, RESERVED_CREATED_AT, RESERVED_PRIVATE, RESERVED_ROW_ID,
    RESERVED_UPDATED_AT,
};
use serde_json::Value;

/// Merge `fields` (and the reserved fields) into the schema.
///
/// Returns the number of fields added.
pub fn extend_schema(bundle: &mut Bundle, table: &TableName, fields: &[String]) -> usize {
    bundle.register.extend_dataform(table, fields.iter().cloned())
}

/// Insert `data` as a new row stamped at `now` and return its id.
///
/// Reserved fields are stamped first; `row_id` defaults to the new id when the
/// caller did not supply one. Only fields the register accepts are stored and
/// indexed.
pub fn insert_row(bundle: &mut Bundle, table: &TableName, mut data: Row, now: i64) -> RowId {
    let row_id = bundle.register.next_row_id();

    data.insert(RESERVED_CREATED_AT.to_string(), Value::from(now));
    data.insert(RESERVED_UPDATED_AT.to_string(), Value::Null);
    data.insert(RESERVED_PRIVATE.to_string(), Value::from(0));
    data.entry(RESERVED_ROW_ID.to_string())
        .or_insert_with(|| Value::from(row_id));

    let mut row = Row::new();
    for (field, value) in data {
        if !bundle.register.accepts(table, &field) {
            continue;
        }
        index_insert(&mut bundle.index, &field, &value, row_id);
        row.insert(field, value);
    }
    bundle.table.insert(row_id, row);
    row_id
}

/// Overwrite the accepted fields of `use_data` on one row and stamp
/// `__updated_at__`.
///
/// Returns `false` when the row does not exist.
pub fn update_row(
    bundle: &mut Bundle,
    table: &TableName,
    row_id: RowId,
    use_data: &Row,
    now: i64,
) -> bool {
    let Bundle {
        register,
        table: rows,
        index,
    } = bundle;
    let Some(row) = rows.get_mut(&row_id) else {
        return false;
    };

    for (field, value) in use_data {
        if field == RESERVED_UPDATED_AT || !register.accepts(table, field) {
            continue;
        }
        row.insert(field.clone(), value.clone());
        index_replace(index, field, row_id, value);
    }

    let stamp = Value::from(now);
    row.insert(RESERVED_UPDATED_AT.to_string(), stamp.clone());
    index_replace(index, RESERVED_UPDATED_AT, row_id, &stamp);
    true
}
