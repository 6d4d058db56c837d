//! Inverted index maintenance.
//!
//! Invariant: for every field present in the index, a row id sits in at most one
//! value bucket of that field. Updates remove the row id from every bucket of the
//! field before inserting it under the new value.

use bundledb_commons::{FieldValue, Index, RowId};
use serde_json::Value;

/// Append `row_id` under `value`'s canonical key, creating buckets as needed.
pub fn index_insert(index: &mut Index, field: &str, value: &Value, row_id: RowId) {
    let key = FieldValue::from_json(value).index_key();
    index
        .entry(field.to_string())
        .or_default()
        .entry(key)
        .or_default()
        .push(row_id);
}

/// Move `row_id` to the bucket of `new_value` within `field`.
///
/// Removes the first occurrence of the row id from every bucket of `field`, drops
/// buckets left empty, then inserts. A field missing from the index degrades to a
/// plain insert.
pub fn index_replace(index: &mut Index, field: &str, row_id: RowId, new_value: &Value) {
    if let Some(buckets) = index.get_mut(field) {
        buckets.retain(|_, ids| {
            if let Some(pos) = ids.iter().position(|id| *id == row_id) {
                ids.remove(pos);
                return !ids.is_empty();
            }
            true
        });
    }
    index_insert(index, field, new_value, row_id);
}

/// Every `(field, bucket)` pair currently holding `row_id`.
pub fn buckets_of(index: &Index, row_id: RowId) -> Vec<(&str, &str)> {
    index
        .iter()
        .flat_map(|(field, buckets)| {
            buckets
                .iter()
                .filter(move |(_, ids)| ids.contains(&row_id))
                .map(move |(key, _)| (field.as_str(), key.as_str()))
        })
        .collect()
}
