//! Request and response models for the table endpoints.

mod api_response;
mod requests;

pub use api_response::ApiResponse;
pub use requests::{
    DeleteRecordsRequest, FetchRecordsRequest, GetRowsRequest, NewRecordRequest, NewTableRequest,
    UpdateRecordsRequest,
};
