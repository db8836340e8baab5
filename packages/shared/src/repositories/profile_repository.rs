use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use serde_dynamo::aws_sdk_dynamodb_1::from_item;

use crate::models::profile::PlayerProfile;
use crate::repositories::errors::profile_repository_errors::ProfileRepositoryError;

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn get_profile(
        &self,
        user_id: &str,
    ) -> Result<PlayerProfile, ProfileRepositoryError>;
}

pub struct DynamoDbProfileRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbProfileRepository {
    pub fn new(client: Client) -> Self {
        let table_name = std::env::var("PROFILES_TABLE")
            .expect("PROFILES_TABLE environment variable must be set");
        Self { client, table_name }
    }
}

#[async_trait]
impl ProfileRepository for DynamoDbProfileRepository {
    async fn get_profile(
        &self,
        user_id: &str,
    ) -> Result<PlayerProfile, ProfileRepositoryError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("user_id", AttributeValue::S(user_id.to_string()))
            .send()
            .await
            .map_err(|e| ProfileRepositoryError::DynamoDb(e.to_string()))?;

        match output.item {
            Some(item) => {
                let profile: PlayerProfile = from_item(item)
                    .map_err(|e| ProfileRepositoryError::Serialization(e.to_string()))?;
                Ok(profile)
            }
            None => Err(ProfileRepositoryError::NotFound),
        }
    }
}
