//! Type-safe wrapper for table names.

use crate::constants::{
    RESERVED_CREATED_AT, RESERVED_PRIVATE, RESERVED_ROW_ID, RESERVED_UPDATED_AT,
    TABLE_ID_FIELD_SUFFIX,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error returned when a table name fails validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNameValidationError {
    pub name: String,
    pub reason: String,
}

impl fmt::Display for TableNameValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid table name '{}': {}", self.name, self.reason)
    }
}

impl std::error::Error for TableNameValidationError {}

/// Type-safe wrapper for table names.
///
/// The name doubles as the object-store key stem (`<name>.<suffix>`), so anything
/// that could escape the bucket prefix is rejected:
/// - Empty strings
/// - Names containing `..` (parent directory traversal)
/// - Names containing `/` or `\` (path separators)
/// - Names containing null bytes
///
/// Unlike SQL identifiers, names are case-sensitive: `Users` and `users` are two
/// different bundles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableName(String);

impl TableName {
    fn validate(name: &str) -> Result<(), TableNameValidationError> {
        let fail = |reason: &str| {
            Err(TableNameValidationError {
                name: name.to_string(),
                reason: reason.to_string(),
            })
        };

        if name.trim().is_empty() {
            return fail("Table name cannot be empty");
        }
        if name.contains("..") {
            return fail("Table name cannot contain '..' (path traversal)");
        }
        if name.contains('/') || name.contains('\\') {
            return fail("Table name cannot contain path separators");
        }
        if name.contains('\0') {
            return fail("Table name cannot contain null bytes");
        }
        Ok(())
    }

    /// Creates a new TableName, returning an error if validation fails.
    pub fn try_new(name: impl Into<String>) -> Result<Self, TableNameValidationError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Creates a new TableName.
    ///
    /// # Panics
    ///
    /// Panics if the name fails validation. Use `try_new` for fallible creation.
    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        match Self::try_new(name) {
            Ok(table) => table,
            Err(e) => panic!("{}", e),
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }

    /// Name of the per-table token field (`<tablename>_id`).
    pub fn id_field(&self) -> String {
        format!("{}{}", self.0, TABLE_ID_FIELD_SUFFIX)
    }

    /// Reserved fields every row of this table carries, in schema order.
    pub fn reserved_fields(&self) -> [String; 5] {
        [
            RESERVED_CREATED_AT.to_string(),
            RESERVED_UPDATED_AT.to_string(),
            RESERVED_PRIVATE.to_string(),
            RESERVED_ROW_ID.to_string(),
            self.id_field(),
        ]
    }

    /// True if `field` is one of this table's reserved fields.
    pub fn is_reserved(&self, field: &str) -> bool {
        matches!(
            field,
            RESERVED_CREATED_AT | RESERVED_UPDATED_AT | RESERVED_PRIVATE | RESERVED_ROW_ID
        ) || field == self.id_field()
    }

    /// Upper-cased form used in response messages.
    pub fn display_upper(&self) -> String {
        self.0.to_uppercase()
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for TableName {
    type Error = TableNameValidationError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_new(s)
    }
}

impl From<TableName> for String {
    fn from(t: TableName) -> Self {
        t.0
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
