use async_trait::async_trait;
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use chrono::{DateTime, Utc};
use serde_dynamo::aws_sdk_dynamodb_1::{from_item, to_item};

use crate::models::online_match::{OnlineMatch, PlayerSlot};
use crate::models::timestamps;
use crate::repositories::errors::match_repository_errors::MatchRepositoryError;

#[async_trait]
pub trait MatchRepository: Send + Sync {
    async fn create_match(&self, online_match: &OnlineMatch) -> Result<(), MatchRepositoryError>;

    async fn get_match(&self, match_id: &str)
        -> Result<Option<OnlineMatch>, MatchRepositoryError>;

    /// Most recent non-completed match involving `user_id`, created at or
    /// after `since`. Covers the race where the opponent's invocation already
    /// paired the caller and cleared both queue entries.
    async fn find_recent_for_user(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<OnlineMatch>, MatchRepositoryError>;

    /// Most recent non-completed match between the exact (unordered) pair,
    /// created at or after `since`. Guards against duplicate creation when
    /// both players' invocations pair each other simultaneously.
    async fn find_recent_for_pair(
        &self,
        user_a: &str,
        user_b: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<OnlineMatch>, MatchRepositoryError>;

    /// Sets one score column to an authoritative total. Returns `false` when
    /// the write was discarded because it would have decreased the stored
    /// value (a stale concurrent write, not an error).
    async fn set_score(
        &self,
        match_id: &str,
        slot: PlayerSlot,
        score: i32,
    ) -> Result<bool, MatchRepositoryError>;

    /// Sets `current_round`, discarding decreases the same way as scores.
    async fn set_round(&self, match_id: &str, round: i32) -> Result<bool, MatchRepositoryError>;

    async fn complete_match(
        &self,
        match_id: &str,
        winner_id: Option<&str>,
    ) -> Result<(), MatchRepositoryError>;
}

pub struct DynamoDbMatchRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbMatchRepository {
    pub fn new(client: Client) -> Self {
        let table_name = std::env::var("MATCHES_TABLE")
            .expect("MATCHES_TABLE environment variable must be set");
        Self { client, table_name }
    }

    async fn scan_recent(
        &self,
        filter_expression: &str,
        values: Vec<(&str, AttributeValue)>,
        since: DateTime<Utc>,
    ) -> Result<Option<OnlineMatch>, MatchRepositoryError> {
        let mut scan = self
            .client
            .scan()
            .table_name(&self.table_name)
            // `status` is a DynamoDB reserved word.
            .filter_expression(format!(
                "{} AND created_at >= :since AND #st <> :completed",
                filter_expression
            ))
            .expression_attribute_names("#st", "status")
            .expression_attribute_values(
                ":since",
                // Fixed width to match the stored `created_at` shape.
                AttributeValue::S(timestamps::format(since)),
            )
            .expression_attribute_values(":completed", AttributeValue::S("completed".to_string()));

        for (name, value) in values {
            scan = scan.expression_attribute_values(name, value);
        }

        let output = scan
            .send()
            .await
            .map_err(|e| MatchRepositoryError::DynamoDb(e.to_string()))?;

        let mut matches = Vec::new();
        if let Some(items) = output.items {
            for item in items {
                let m: OnlineMatch = from_item(item)
                    .map_err(|e| MatchRepositoryError::Serialization(e.to_string()))?;
                matches.push(m);
            }
        }

        // Newest first; only the latest pairing is relevant.
        matches.sort_by_key(|m| std::cmp::Reverse(m.created_at));

        Ok(matches.into_iter().next())
    }

    async fn monotonic_set(
        &self,
        match_id: &str,
        attribute: &str,
        value: i32,
    ) -> Result<bool, MatchRepositoryError> {
        let update_result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(match_id.to_string()))
            .update_expression("SET #attr = :value")
            .condition_expression("attribute_exists(id) AND #attr <= :value")
            .expression_attribute_names("#attr", attribute)
            .expression_attribute_values(":value", AttributeValue::N(value.to_string()))
            .send()
            .await;

        match update_result {
            Ok(_) => Ok(true),
            Err(e) => {
                // A failed condition means a concurrent writer already stored
                // an equal-or-greater value; the stale write is dropped.
                if let SdkError::ServiceError(service_err) = &e {
                    if service_err.err().is_conditional_check_failed_exception() {
                        return Ok(false);
                    }
                }
                Err(MatchRepositoryError::DynamoDb(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl MatchRepository for DynamoDbMatchRepository {
    async fn create_match(&self, online_match: &OnlineMatch) -> Result<(), MatchRepositoryError> {
        let item = to_item(online_match)
            .map_err(|e| MatchRepositoryError::Serialization(e.to_string()))?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| MatchRepositoryError::DynamoDb(e.to_string()))?;

        Ok(())
    }

    async fn get_match(
        &self,
        match_id: &str,
    ) -> Result<Option<OnlineMatch>, MatchRepositoryError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(match_id.to_string()))
            .send()
            .await
            .map_err(|e| MatchRepositoryError::DynamoDb(e.to_string()))?;

        match output.item {
            Some(item) => {
                let m: OnlineMatch = from_item(item)
                    .map_err(|e| MatchRepositoryError::Serialization(e.to_string()))?;
                Ok(Some(m))
            }
            None => Ok(None),
        }
    }

    async fn find_recent_for_user(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<OnlineMatch>, MatchRepositoryError> {
        self.scan_recent(
            "(player1_id = :user OR player2_id = :user)",
            vec![(":user", AttributeValue::S(user_id.to_string()))],
            since,
        )
        .await
    }

    async fn find_recent_for_pair(
        &self,
        user_a: &str,
        user_b: &str,
        since: DateTime<Utc>,
    ) -> Result<Option<OnlineMatch>, MatchRepositoryError> {
        self.scan_recent(
            "((player1_id = :a AND player2_id = :b) OR (player1_id = :b AND player2_id = :a))",
            vec![
                (":a", AttributeValue::S(user_a.to_string())),
                (":b", AttributeValue::S(user_b.to_string())),
            ],
            since,
        )
        .await
    }

    async fn set_score(
        &self,
        match_id: &str,
        slot: PlayerSlot,
        score: i32,
    ) -> Result<bool, MatchRepositoryError> {
        self.monotonic_set(match_id, slot.score_column(), score).await
    }

    async fn set_round(&self, match_id: &str, round: i32) -> Result<bool, MatchRepositoryError> {
        self.monotonic_set(match_id, "current_round", round).await
    }

    async fn complete_match(
        &self,
        match_id: &str,
        winner_id: Option<&str>,
    ) -> Result<(), MatchRepositoryError> {
        let winner = match winner_id {
            Some(id) => AttributeValue::S(id.to_string()),
            None => AttributeValue::Null(true),
        };

        self.client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(match_id.to_string()))
            .update_expression("SET #st = :completed, winner_id = :winner")
            .condition_expression("attribute_exists(id)")
            .expression_attribute_names("#st", "status")
            .expression_attribute_values(":completed", AttributeValue::S("completed".to_string()))
            .expression_attribute_values(":winner", winner)
            .send()
            .await
            .map_err(|e| MatchRepositoryError::DynamoDb(e.to_string()))?;

        Ok(())
    }
}
