//! NoteBoard: note lifecycle orchestration over a DynamoDB record store
//! and an S3 blob store.

pub mod config;
pub mod notes;
pub mod store;

pub use config::{board_from_config, board_from_env, AwsNoteBoard, BoardConfig};
pub use notes::{
    BoardError, BoardNote, CreateNotePayload, CreateOutcome, Draft, DraftField, ImageFile, Note,
    NoteBoard, NoteState,
};
pub use store::{BlobStore, DynamoRecordStore, FetchUrl, RecordStore, S3BlobStore, StoreError};
