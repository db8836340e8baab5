pub mod requests;
pub mod responses;

use serde::{Deserialize, Serialize};

use crate::models::online_match::OnlineMatch;

/// Push message delivered over the realtime channel when a match row a player
/// participates in is inserted or updated. Push is a best-effort backup;
/// polling must be able to resolve a search on its own.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchPush {
    MatchCreated(OnlineMatch),
    MatchUpdated(OnlineMatch),
}

impl MatchPush {
    pub fn match_row(&self) -> &OnlineMatch {
        match self {
            MatchPush::MatchCreated(m) | MatchPush::MatchUpdated(m) => m,
        }
    }
}
