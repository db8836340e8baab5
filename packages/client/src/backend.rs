use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use shared::models::matchmaking::responses::FindMatchResponse;
use shared::models::matchmaking::MatchPush;
use shared::models::online_match::OnlineMatch;
use shared::models::profile::PlayerProfile;

use crate::error::BackendError;

/// Everything the game needs from the server, one method per endpoint.
/// [`crate::http::HttpBackend`] is the production implementation; tests
/// substitute in-memory fakes.
#[async_trait]
pub trait MatchmakingBackend: Send + Sync {
    /// Enqueues the caller and returns the server-assigned queue timestamp.
    async fn join_queue(&self, trophies: i32) -> Result<DateTime<Utc>, BackendError>;

    async fn leave_queue(&self) -> Result<(), BackendError>;

    /// One pairing attempt.
    async fn find_match(&self) -> Result<FindMatchResponse, BackendError>;

    async fn get_match(&self, match_id: &str) -> Result<OnlineMatch, BackendError>;

    /// Writes the caller's cumulative score total for the match.
    async fn submit_score(&self, match_id: &str, score: i32) -> Result<(), BackendError>;

    async fn advance_round(&self, match_id: &str, round: i32) -> Result<(), BackendError>;

    async fn complete_match(
        &self,
        match_id: &str,
        winner_id: Option<&str>,
    ) -> Result<(), BackendError>;

    async fn get_profile(&self, user_id: &str) -> Result<PlayerProfile, BackendError>;
}

/// Realtime push channel. Subscribing yields every [`MatchPush`] addressed
/// to the authenticated player until the connection drops; the stream ending
/// is not an error, polling continues to cover for it.
#[async_trait]
pub trait MatchEvents: Send + Sync {
    async fn subscribe(&self) -> Result<mpsc::Receiver<MatchPush>, BackendError>;
}
