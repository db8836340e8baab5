use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::timestamps;

/// Seconds between match creation and the synchronized start instant. Gives
/// both clients time to receive the pairing result and render the countdown.
pub const MATCH_START_LEAD_SECONDS: i64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Waiting,
    Playing,
    Completed,
}

/// Which score column a client is allowed to write. Fixed at pairing time and
/// never renegotiated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerSlot {
    Player1,
    Player2,
}

/// A match row shared by both players. Scores and `current_round` only ever
/// increase; each client writes its own score column and learns about the
/// opponent through change notifications on this row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnlineMatch {
    pub id: String,
    pub player1_id: String,
    pub player2_id: String,
    pub player1_score: i32,
    pub player2_score: i32,
    pub current_round: i32,
    pub status: MatchStatus,
    #[serde(with = "timestamps")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamps")]
    pub start_at: DateTime<Utc>,
    pub winner_id: Option<String>,
}

impl OnlineMatch {
    pub fn new(player1_id: &str, player2_id: &str) -> Self {
        let now = timestamps::now();
        OnlineMatch {
            id: Uuid::new_v4().to_string(),
            player1_id: player1_id.to_string(),
            player2_id: player2_id.to_string(),
            player1_score: 0,
            player2_score: 0,
            current_round: 1,
            status: MatchStatus::Playing,
            created_at: now,
            start_at: now + Duration::seconds(MATCH_START_LEAD_SECONDS),
            winner_id: None,
        }
    }

    pub fn is_participant(&self, user_id: &str) -> bool {
        self.player1_id == user_id || self.player2_id == user_id
    }

    pub fn slot_of(&self, user_id: &str) -> Option<PlayerSlot> {
        if self.player1_id == user_id {
            Some(PlayerSlot::Player1)
        } else if self.player2_id == user_id {
            Some(PlayerSlot::Player2)
        } else {
            None
        }
    }

    pub fn opponent_of(&self, user_id: &str) -> Option<&str> {
        match self.slot_of(user_id)? {
            PlayerSlot::Player1 => Some(&self.player2_id),
            PlayerSlot::Player2 => Some(&self.player1_id),
        }
    }

    pub fn score_of(&self, slot: PlayerSlot) -> i32 {
        match slot {
            PlayerSlot::Player1 => self.player1_score,
            PlayerSlot::Player2 => self.player2_score,
        }
    }
}

impl PlayerSlot {
    /// The opposing slot.
    pub fn other(self) -> PlayerSlot {
        match self {
            PlayerSlot::Player1 => PlayerSlot::Player2,
            PlayerSlot::Player2 => PlayerSlot::Player1,
        }
    }

    /// DynamoDB attribute name of the score column this slot owns.
    pub fn score_column(self) -> &'static str {
        match self {
            PlayerSlot::Player1 => "player1_score",
            PlayerSlot::Player2 => "player2_score",
        }
    }
}
