//! Small helpers shared by the API and the worker.

/// Current time in whole epoch seconds.
#[inline]
pub fn now_secs() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Current time in epoch microseconds (queue ordering).
#[inline]
pub fn now_micros() -> i64 {
    chrono::Utc::now().timestamp_micros()
}

/// Random 32-character hex token.
///
/// Used for `<tablename>_id` values and for job identifiers.
pub fn new_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
