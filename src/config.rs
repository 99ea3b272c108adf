use std::env;
use std::time::Duration;

use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_s3::Client as S3Client;

use crate::notes::NoteBoard;
use crate::store::{DynamoRecordStore, S3BlobStore};

/// A board wired to the production stores.
pub type AwsNoteBoard = NoteBoard<DynamoRecordStore, S3BlobStore>;

/// How long presigned image URLs stay valid unless configured otherwise.
pub const DEFAULT_URL_TTL: Duration = Duration::from_secs(900);

/// Deployment settings, read once at startup.
#[derive(Debug, Clone)]
pub struct BoardConfig {
    pub table_name: String,
    pub bucket_name: String,
    pub url_ttl: Duration,
}

impl BoardConfig {
    /// Read settings from `TABLE_NAME`, `S3_BUCKET_NAME` and
    /// `IMAGE_URL_TTL_SECS`, falling back to defaults for anything unset
    /// or unparsable.
    pub fn from_env() -> Self {
        let table_name = env::var("TABLE_NAME").unwrap_or_else(|_| "noteboard".to_string());
        let bucket_name =
            env::var("S3_BUCKET_NAME").unwrap_or_else(|_| "noteboard-media".to_string());
        let url_ttl = env::var("IMAGE_URL_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_URL_TTL);

        BoardConfig {
            table_name,
            bucket_name,
            url_ttl,
        }
    }
}

/// Build a board against DynamoDB and S3 using settings from the
/// environment.
pub async fn board_from_env() -> AwsNoteBoard {
    board_from_config(BoardConfig::from_env()).await
}

/// Build a board against DynamoDB and S3 with explicit settings. Both
/// clients share one SDK configuration loaded from the environment.
pub async fn board_from_config(config: BoardConfig) -> AwsNoteBoard {
    let aws_config = aws_config::load_from_env().await;
    let records = DynamoRecordStore::new(DynamoClient::new(&aws_config), config.table_name);
    let blobs = S3BlobStore::new(
        S3Client::new(&aws_config),
        config.bucket_name,
        config.url_ttl,
    );

    NoteBoard::new(records, blobs)
}
