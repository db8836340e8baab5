use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use chrono::{DateTime, Utc};
use serde_dynamo::aws_sdk_dynamodb_1::{from_item, to_item};

use crate::models::queue::QueueEntry;
use crate::repositories::errors::queue_repository_errors::QueueRepositoryError;

#[async_trait]
pub trait QueueRepository: Send + Sync {
    /// Inserts (or replaces) the caller's queue entry.
    async fn insert_entry(&self, entry: &QueueEntry) -> Result<(), QueueRepositoryError>;

    /// Removes the entry for `user_id`. A no-op when the entry is already
    /// gone, so concurrent eviction by both paired players is safe.
    async fn delete_entry(&self, user_id: &str) -> Result<(), QueueRepositoryError>;

    async fn get_entry(&self, user_id: &str) -> Result<Option<QueueEntry>, QueueRepositoryError>;

    /// Entries other than `exclude_user_id` joined at or after `joined_since`
    /// with trophies in `[min_trophies, max_trophies]`, oldest join first.
    async fn find_candidates(
        &self,
        exclude_user_id: &str,
        min_trophies: i32,
        max_trophies: i32,
        joined_since: DateTime<Utc>,
    ) -> Result<Vec<QueueEntry>, QueueRepositoryError>;
}

pub struct DynamoDbQueueRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbQueueRepository {
    pub fn new(client: Client) -> Self {
        let table_name =
            std::env::var("QUEUE_TABLE").expect("QUEUE_TABLE environment variable must be set");
        Self { client, table_name }
    }
}

#[async_trait]
impl QueueRepository for DynamoDbQueueRepository {
    async fn insert_entry(&self, entry: &QueueEntry) -> Result<(), QueueRepositoryError> {
        let item =
            to_item(entry).map_err(|e| QueueRepositoryError::Serialization(e.to_string()))?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| QueueRepositoryError::DynamoDb(e.to_string()))?;

        Ok(())
    }

    async fn delete_entry(&self, user_id: &str) -> Result<(), QueueRepositoryError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .key("user_id", AttributeValue::S(user_id.to_string()))
            .send()
            .await
            .map_err(|e| QueueRepositoryError::DynamoDb(e.to_string()))?;

        Ok(())
    }

    async fn get_entry(&self, user_id: &str) -> Result<Option<QueueEntry>, QueueRepositoryError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("user_id", AttributeValue::S(user_id.to_string()))
            .send()
            .await
            .map_err(|e| QueueRepositoryError::DynamoDb(e.to_string()))?;

        match output.item {
            Some(item) => {
                let entry: QueueEntry = from_item(item)
                    .map_err(|e| QueueRepositoryError::Serialization(e.to_string()))?;
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    async fn find_candidates(
        &self,
        exclude_user_id: &str,
        min_trophies: i32,
        max_trophies: i32,
        joined_since: DateTime<Utc>,
    ) -> Result<Vec<QueueEntry>, QueueRepositoryError> {
        // The queue is tiny (players wait at most 60s), so a filtered scan is
        // fine. `joined_at` is stored as RFC 3339, which compares correctly
        // as a string.
        let scan_result = self
            .client
            .scan()
            .table_name(&self.table_name)
            .filter_expression(
                "user_id <> :me AND joined_at >= :since AND trophies BETWEEN :min AND :max",
            )
            .expression_attribute_values(":me", AttributeValue::S(exclude_user_id.to_string()))
            .expression_attribute_values(
                ":since",
                // Fixed-width rendering, identical to how `joined_at` is
                // stored, so the string comparison is order-preserving.
                AttributeValue::S(crate::models::timestamps::format(joined_since)),
            )
            .expression_attribute_values(":min", AttributeValue::N(min_trophies.to_string()))
            .expression_attribute_values(":max", AttributeValue::N(max_trophies.to_string()))
            .send()
            .await
            .map_err(|e| QueueRepositoryError::DynamoDb(e.to_string()))?;

        let mut candidates = Vec::new();
        if let Some(items) = scan_result.items {
            for item in items {
                let entry: QueueEntry = from_item(item)
                    .map_err(|e| QueueRepositoryError::Serialization(e.to_string()))?;
                candidates.push(entry);
            }
        }

        // Oldest first, so the longest-waiting player is paired first.
        candidates.sort_by_key(|entry| entry.joined_at);

        Ok(candidates)
    }
}
