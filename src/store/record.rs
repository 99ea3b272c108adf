use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;

use super::StoreError;
use crate::notes::model::{CreateNotePayload, Note};

/// Persistence for note records. Identity and creation time are assigned
/// by the store, never by the caller.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All persisted notes, in the store's listing order.
    async fn list_notes(&self) -> Result<Vec<Note>, StoreError>;

    /// Persist a new note and return it with its assigned id.
    async fn create_note(&self, payload: CreateNotePayload) -> Result<Note, StoreError>;

    /// Delete the note with the given id. Deleting an unknown id is a no-op.
    async fn delete_note(&self, id: &str) -> Result<(), StoreError>;
}

/// DynamoDB-backed record store. Notes live in a single table under
/// `PK = "NOTE"`, `SK = "NOTE#{id}"`.
pub struct DynamoRecordStore {
    client: DynamoClient,
    table_name: String,
}

impl DynamoRecordStore {
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        DynamoRecordStore {
            client,
            table_name: table_name.into(),
        }
    }
}

#[async_trait]
impl RecordStore for DynamoRecordStore {
    async fn list_notes(&self) -> Result<Vec<Note>, StoreError> {
        let result = self
            .client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression("PK = :pk AND begins_with(SK, :sk_prefix)")
            .expression_attribute_values(":pk", AttributeValue::S("NOTE".to_string()))
            .expression_attribute_values(":sk_prefix", AttributeValue::S("NOTE#".to_string()))
            .send()
            .await
            .map_err(|e| StoreError::Service(format!("DynamoDB query error: {}", e)))?;

        let mut notes = Vec::new();
        for item in result.items() {
            if let Some(note) = note_from_item(item) {
                notes.push(note);
            }
        }

        Ok(notes)
    }

    async fn create_note(&self, payload: CreateNotePayload) -> Result<Note, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        let now = chrono::Utc::now().to_rfc3339();

        let mut builder = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .item("PK", AttributeValue::S("NOTE".to_string()))
            .item("SK", AttributeValue::S(format!("NOTE#{}", id)))
            .item("name", AttributeValue::S(payload.name.clone()))
            .item("description", AttributeValue::S(payload.description.clone()))
            .item("created_at", AttributeValue::S(now.clone()));

        // The image attribute is only written when an image was uploaded
        if let Some(image) = &payload.image {
            builder = builder.item("image", AttributeValue::S(image.clone()));
        }

        builder
            .send()
            .await
            .map_err(|e| StoreError::Service(format!("DynamoDB put_item error: {}", e)))?;

        Ok(Note {
            id,
            name: payload.name,
            description: payload.description,
            image: payload.image,
            created_at: now,
        })
    }

    async fn delete_note(&self, id: &str) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("PK", AttributeValue::S("NOTE".to_string()))
            .key("SK", AttributeValue::S(format!("NOTE#{}", id)))
            .send()
            .await
            .map_err(|e| StoreError::Service(format!("DynamoDB delete_item error: {}", e)))?;

        Ok(())
    }
}

fn note_from_item(item: &HashMap<String, AttributeValue>) -> Option<Note> {
    let sk = item.get("SK").and_then(|v| v.as_s().ok())?;
    let id = sk.strip_prefix("NOTE#")?;

    Some(Note {
        id: id.to_string(),
        name: item.get("name").and_then(|v| v.as_s().ok()).map(|s| s.to_string()).unwrap_or_default(),
        description: item.get("description").and_then(|v| v.as_s().ok()).map(|s| s.to_string()).unwrap_or_default(),
        image: item.get("image").and_then(|v| v.as_s().ok()).map(|s| s.to_string()),
        created_at: item.get("created_at").and_then(|v| v.as_s().ok()).map(|s| s.to_string()).unwrap_or_default(),
    })
}
