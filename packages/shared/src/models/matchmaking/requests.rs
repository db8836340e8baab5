use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinQueueRequest {
    pub trophies: i32,
}

/// The score is an authoritative total, not a delta. The writer reads its
/// current total, adds the round bonus and sends the result; a concurrent
/// stale write can then only ever under-write, never corrupt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreUpdateRequest {
    pub score: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundAdvanceRequest {
    pub round: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteMatchRequest {
    /// `None` records a draw.
    pub winner_id: Option<String>,
}
