// Re-export the store traits, their AWS implementations, and the error type
pub mod blob;
pub mod record;

pub use blob::{BlobStore, FetchUrl, S3BlobStore};
pub use record::{DynamoRecordStore, RecordStore};

use thiserror::Error;

/// Failure reported by a record store or blob store operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The addressed object or record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backing service rejected or failed the call.
    #[error("{0}")]
    Service(String),
}
