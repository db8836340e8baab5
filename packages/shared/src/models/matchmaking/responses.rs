use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::online_match::OnlineMatch;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinQueueResponse {
    /// Server-assigned queue timestamp. Clients anchor their countdown clock
    /// to this value instead of trusting the local clock.
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindMatchResponse {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player1_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player2_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FindMatchResponse {
    pub fn found(m: &OnlineMatch) -> Self {
        FindMatchResponse {
            found: true,
            match_id: Some(m.id.clone()),
            player1_id: Some(m.player1_id.clone()),
            player2_id: Some(m.player2_id.clone()),
            start_at: Some(m.start_at),
            message: None,
        }
    }

    pub fn not_found(message: &str) -> Self {
        FindMatchResponse {
            found: false,
            match_id: None,
            player1_id: None,
            player2_id: None,
            start_at: None,
            message: Some(message.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}
