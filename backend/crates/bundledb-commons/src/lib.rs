//! # bundledb-commons
//!
//! Shared types, constants, and utilities for BundleDB.
//!
//! Every other crate in the workspace depends on this one, so it stays free of
//! storage, HTTP and runtime dependencies.
//!
//! ## Type-Safe Wrappers
//!
//! - `TableName`: validated table name (also the object-store key stem)
//! - `RowId`: auto-assigned row identifier
//! - `JobId` / `JobType`: queue job identifiers of the form `<job_type>_<token>`
//!
//! ## Bundle Model
//!
//! A table is persisted as one [`Bundle`]: the [`Register`] (schema and row counter),
//! the [`Table`] (row id → row record) and the [`Index`] (field → value → row ids).
//!
//! ```rust
//! use bundledb_commons::{Bundle, TableName};
//!
//! let table = TableName::new("users");
//! let bundle = Bundle::empty();
//! assert_eq!(bundle.register.row_count, 0);
//! assert_eq!(table.id_field(), "users_id");
//! ```

pub mod constants;
pub mod errors;
pub mod helpers;
pub mod models;

pub use constants::{NEGATION_SUFFIX, RESERVED_CREATED_AT, RESERVED_PRIVATE, RESERVED_ROW_ID, RESERVED_UPDATED_AT};
pub use errors::{CommonError, Result};
pub use models::{
    is_private, Bundle, FieldValue, Index, JobId, JobType, Register, Row, RowId, Table, TableName,
    TableNameValidationError,
};
