//! Type-safe wrappers and the bundle model.

mod bundle;
mod field_value;
mod job_id;
mod job_type;
mod row_id;
mod table_name;

pub use bundle::{is_private, Bundle, Index, Register, Row, Table};
pub use field_value::FieldValue;
pub use job_id::JobId;
pub use job_type::JobType;
pub use row_id::RowId;
pub use table_name::{TableName, TableNameValidationError};
