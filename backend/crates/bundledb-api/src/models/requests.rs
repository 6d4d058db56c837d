//! Request bodies.
//!
//! Required fields are `Option`s so that an absent field yields the
//! "required fields missing" 400 instead of a deserialization error.

use bundledb_commons::Row;
use serde::Deserialize;
use serde_json::Value;

/// POST /new_table
#[derive(Debug, Default, Deserialize)]
pub struct NewTableRequest {
    pub tablename: Option<String>,
    pub fields: Option<Vec<String>>,
}

/// POST /new_record
#[derive(Debug, Default, Deserialize)]
pub struct NewRecordRequest {
    pub tablename: Option<String>,
    pub data: Option<Row>,
}

/// POST /fetch_records
#[derive(Debug, Default, Deserialize)]
pub struct FetchRecordsRequest {
    pub tablename: Option<String>,
    /// Field → value or list, or `"*"` for every row.
    pub constraints: Option<Value>,
    #[serde(default)]
    pub strict: Option<Value>,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub page_size: Option<Value>,
    #[serde(default)]
    pub this_page: Option<Value>,
    /// Fields to keep in each returned row.
    #[serde(default)]
    pub restrict: Option<Vec<String>>,
}

/// POST /update_records
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRecordsRequest {
    pub tablename: Option<String>,
    pub constraints: Option<Value>,
    /// Replacement values.
    pub data: Option<Row>,
    #[serde(default)]
    pub strict: Option<Value>,
    #[serde(default)]
    pub operator: Option<String>,
}

/// POST /delete_records
#[derive(Debug, Default, Deserialize)]
pub struct DeleteRecordsRequest {
    pub tablename: Option<String>,
    pub constraints: Option<Value>,
    #[serde(default)]
    pub strict: Option<Value>,
    #[serde(default)]
    pub operator: Option<String>,
}

/// POST /get_rows
#[derive(Debug, Default, Deserialize)]
pub struct GetRowsRequest {
    pub tablename: Option<String>,
    pub row_ids: Option<Vec<Value>>,
    #[serde(default)]
    pub restrict: Option<Vec<String>>,
}
