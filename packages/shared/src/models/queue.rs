use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::timestamps;

/// A player waiting for an opponent.
/// One DynamoDB item per user (PK: "user_id"); `joined_at` is assigned on the
/// server at insert time and doubles as the clock anchor for the client's
/// countdown synchronization.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueueEntry {
    pub user_id: String,
    pub trophies: i32,
    #[serde(with = "timestamps")]
    pub joined_at: DateTime<Utc>,
}

impl QueueEntry {
    pub fn new(user_id: &str, trophies: i32) -> Self {
        QueueEntry {
            user_id: user_id.to_string(),
            trophies,
            joined_at: timestamps::now(),
        }
    }
}
