//! Reserved field names and wire constants.

/// Epoch seconds at which the row was inserted. Set once.
pub const RESERVED_CREATED_AT: &str = "__created_at__";

/// Epoch seconds of the last update, `null` until the first update.
pub const RESERVED_UPDATED_AT: &str = "__updated_at__";

/// Visibility flag: `0` visible, `1` soft-deleted.
pub const RESERVED_PRIVATE: &str = "__private__";

/// Row identifier echoed inside the row record.
pub const RESERVED_ROW_ID: &str = "row_id";

/// Suffix of the per-table token field (`<tablename>_id`).
pub const TABLE_ID_FIELD_SUFFIX: &str = "_id";

/// Constraint key suffix that negates the constraint (`age_NOT`).
pub const NEGATION_SUFFIX: &str = "_NOT";

/// Constraint value that selects every visible row.
pub const MATCH_ALL: &str = "*";

/// Default object key suffix for bundles (`<tablename>.bundle`).
pub const DEFAULT_BUNDLE_SUFFIX: &str = "bundle";
