pub(crate) mod bulk_model;
mod bulk_service;

pub use bulk_model::{
    BulkAmount, BulkCreateRequest, BulkItemResult, BulkOperationResult, BulkOutcome,
    CopyMonthRequest,
};
