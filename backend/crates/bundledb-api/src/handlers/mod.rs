//! HTTP request handlers
//!
//! One handler per table endpoint plus the health check. Handlers validate the
//! body, call [`bundledb_core::TableService`] and wrap the outcome in an
//! [`ApiResponse`](crate::models::ApiResponse).

mod health;
mod helpers;
mod records;
mod tables;

pub use health::healthcheck_handler;
pub use records::{
    delete_records_handler, fetch_records_handler, get_rows_handler, new_record_handler,
    update_records_handler,
};
pub use tables::{flush_table_handler, get_register_handler, new_table_handler};

pub(crate) use helpers::AppData;
