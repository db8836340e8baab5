use std::sync::Arc;

use tracing::{info, warn};

use shared::deck::ROUNDS_PER_MATCH;
use shared::models::online_match::{MatchStatus, OnlineMatch};
use shared::repositories::match_repository::MatchRepository;

use crate::services::errors::match_service_errors::MatchServiceError;

/// Highest total a player can reach: full points every round.
const MAX_TOTAL_SCORE: i32 = (ROUNDS_PER_MATCH * 10) as i32;

/// Guards match row writes: only participants may touch a row, and each
/// participant only its own column. Monotonicity itself is enforced by the
/// repository's conditional writes.
pub struct MatchService {
    match_repository: Arc<dyn MatchRepository>,
}

impl MatchService {
    pub fn new(match_repository: Arc<dyn MatchRepository>) -> Self {
        MatchService { match_repository }
    }

    pub async fn get_match(
        &self,
        match_id: &str,
        caller_id: &str,
    ) -> Result<OnlineMatch, MatchServiceError> {
        let online_match = self.fetch(match_id).await?;
        if !online_match.is_participant(caller_id) {
            return Err(MatchServiceError::NotParticipant);
        }
        Ok(online_match)
    }

    /// Writes the caller's authoritative score total. A stale total is
    /// silently dropped by the conditional write; the caller's next round
    /// write carries the correct cumulative value anyway.
    pub async fn submit_score(
        &self,
        match_id: &str,
        caller_id: &str,
        score: i32,
    ) -> Result<(), MatchServiceError> {
        if !(0..=MAX_TOTAL_SCORE).contains(&score) {
            return Err(MatchServiceError::ValidationError(format!(
                "Score must be between 0 and {}",
                MAX_TOTAL_SCORE
            )));
        }

        let online_match = self.fetch(match_id).await?;
        let Some(slot) = online_match.slot_of(caller_id) else {
            return Err(MatchServiceError::NotParticipant);
        };
        if online_match.status == MatchStatus::Completed {
            return Err(MatchServiceError::ValidationError(
                "Match is already completed".to_string(),
            ));
        }

        let applied = self
            .match_repository
            .set_score(match_id, slot, score)
            .await?;
        if !applied {
            warn!(
                "Dropped stale score {} for {} in match {}",
                score, caller_id, match_id
            );
        }
        Ok(())
    }

    /// Advances the shared round counter. Rounds run 1 through
    /// [`ROUNDS_PER_MATCH`]; a write of `ROUNDS_PER_MATCH + 1` marks the
    /// final round as finished.
    pub async fn advance_round(
        &self,
        match_id: &str,
        caller_id: &str,
        round: i32,
    ) -> Result<(), MatchServiceError> {
        if !(1..=(ROUNDS_PER_MATCH as i32 + 1)).contains(&round) {
            return Err(MatchServiceError::ValidationError(format!(
                "Round must be between 1 and {}",
                ROUNDS_PER_MATCH + 1
            )));
        }

        let online_match = self.fetch(match_id).await?;
        if !online_match.is_participant(caller_id) {
            return Err(MatchServiceError::NotParticipant);
        }
        if online_match.status == MatchStatus::Completed {
            return Err(MatchServiceError::ValidationError(
                "Match is already completed".to_string(),
            ));
        }

        let applied = self.match_repository.set_round(match_id, round).await?;
        if applied {
            info!("Match {} advanced to round {}", match_id, round);
        }
        Ok(())
    }

    /// Marks the match completed. Both clients call this with the same
    /// deterministic result; the second write is a harmless overwrite.
    pub async fn complete_match(
        &self,
        match_id: &str,
        caller_id: &str,
        winner_id: Option<&str>,
    ) -> Result<(), MatchServiceError> {
        let online_match = self.fetch(match_id).await?;
        if !online_match.is_participant(caller_id) {
            return Err(MatchServiceError::NotParticipant);
        }
        if let Some(winner) = winner_id {
            if !online_match.is_participant(winner) {
                return Err(MatchServiceError::ValidationError(
                    "Winner must be a participant of the match".to_string(),
                ));
            }
        }

        self.match_repository
            .complete_match(match_id, winner_id)
            .await?;
        info!(
            "Match {} completed, winner: {}",
            match_id,
            winner_id.unwrap_or("draw")
        );
        Ok(())
    }

    async fn fetch(&self, match_id: &str) -> Result<OnlineMatch, MatchServiceError> {
        self.match_repository
            .get_match(match_id)
            .await?
            .ok_or(MatchServiceError::MatchNotFound)
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use shared::models::online_match::PlayerSlot;
    use shared::repositories::errors::match_repository_errors::MatchRepositoryError;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct InMemoryMatchRepository {
        pub matches: Mutex<Vec<OnlineMatch>>,
    }

    #[async_trait]
    impl MatchRepository for InMemoryMatchRepository {
        async fn create_match(
            &self,
            online_match: &OnlineMatch,
        ) -> Result<(), MatchRepositoryError> {
            self.matches.lock().unwrap().push(online_match.clone());
            Ok(())
        }

        async fn get_match(
            &self,
            match_id: &str,
        ) -> Result<Option<OnlineMatch>, MatchRepositoryError> {
            Ok(self
                .matches
                .lock()
                .unwrap()
                .iter()
                .find(|m| m.id == match_id)
                .cloned())
        }

        async fn find_recent_for_user(
            &self,
            user_id: &str,
            since: DateTime<Utc>,
        ) -> Result<Option<OnlineMatch>, MatchRepositoryError> {
            Ok(self
                .matches
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.is_participant(user_id))
                .filter(|m| m.created_at >= since)
                .filter(|m| m.status != MatchStatus::Completed)
                .max_by_key(|m| m.created_at)
                .cloned())
        }

        async fn find_recent_for_pair(
            &self,
            user_a: &str,
            user_b: &str,
            since: DateTime<Utc>,
        ) -> Result<Option<OnlineMatch>, MatchRepositoryError> {
            Ok(self
                .matches
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.is_participant(user_a) && m.is_participant(user_b))
                .filter(|m| m.created_at >= since)
                .filter(|m| m.status != MatchStatus::Completed)
                .max_by_key(|m| m.created_at)
                .cloned())
        }

        async fn set_score(
            &self,
            match_id: &str,
            slot: PlayerSlot,
            score: i32,
        ) -> Result<bool, MatchRepositoryError> {
            let mut matches = self.matches.lock().unwrap();
            let m = matches
                .iter_mut()
                .find(|m| m.id == match_id)
                .ok_or(MatchRepositoryError::NotFound)?;
            if score < m.score_of(slot) {
                return Ok(false);
            }
            match slot {
                PlayerSlot::Player1 => m.player1_score = score,
                PlayerSlot::Player2 => m.player2_score = score,
            }
            Ok(true)
        }

        async fn set_round(
            &self,
            match_id: &str,
            round: i32,
        ) -> Result<bool, MatchRepositoryError> {
            let mut matches = self.matches.lock().unwrap();
            let m = matches
                .iter_mut()
                .find(|m| m.id == match_id)
                .ok_or(MatchRepositoryError::NotFound)?;
            if round < m.current_round {
                return Ok(false);
            }
            m.current_round = round;
            Ok(true)
        }

        async fn complete_match(
            &self,
            match_id: &str,
            winner_id: Option<&str>,
        ) -> Result<(), MatchRepositoryError> {
            let mut matches = self.matches.lock().unwrap();
            let m = matches
                .iter_mut()
                .find(|m| m.id == match_id)
                .ok_or(MatchRepositoryError::NotFound)?;
            m.status = MatchStatus::Completed;
            m.winner_id = winner_id.map(str::to_string);
            Ok(())
        }
    }

    fn seeded(repository: &InMemoryMatchRepository) -> OnlineMatch {
        let m = OnlineMatch::new("player-a", "player-b");
        repository.matches.lock().unwrap().push(m.clone());
        m
    }

    #[tokio::test]
    async fn test_get_match_requires_participation() {
        let repository = Arc::new(InMemoryMatchRepository::default());
        let m = seeded(&repository);
        let service = MatchService::new(repository);

        let fetched = service.get_match(&m.id, "player-a").await.unwrap();
        assert_eq!(fetched.id, m.id);

        let outsider = service.get_match(&m.id, "player-c").await;
        assert!(matches!(outsider, Err(MatchServiceError::NotParticipant)));

        let missing = service.get_match("no-such-match", "player-a").await;
        assert!(matches!(missing, Err(MatchServiceError::MatchNotFound)));
    }

    #[tokio::test]
    async fn test_submit_score_writes_own_column_only() {
        let repository = Arc::new(InMemoryMatchRepository::default());
        let m = seeded(&repository);
        let service = MatchService::new(repository.clone());

        service.submit_score(&m.id, "player-b", 7).await.unwrap();

        let stored = repository.matches.lock().unwrap()[0].clone();
        assert_eq!(stored.player1_score, 0);
        assert_eq!(stored.player2_score, 7);
    }

    #[tokio::test]
    async fn test_submit_score_rejects_out_of_range() {
        let repository = Arc::new(InMemoryMatchRepository::default());
        let m = seeded(&repository);
        let service = MatchService::new(repository);

        let too_big = service.submit_score(&m.id, "player-a", 101).await;
        assert!(matches!(
            too_big,
            Err(MatchServiceError::ValidationError(_))
        ));

        let negative = service.submit_score(&m.id, "player-a", -1).await;
        assert!(matches!(
            negative,
            Err(MatchServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_stale_score_is_dropped_not_errored() {
        let repository = Arc::new(InMemoryMatchRepository::default());
        let m = seeded(&repository);
        let service = MatchService::new(repository.clone());

        service.submit_score(&m.id, "player-a", 12).await.unwrap();
        service.submit_score(&m.id, "player-a", 8).await.unwrap();

        let stored = repository.matches.lock().unwrap()[0].clone();
        assert_eq!(stored.player1_score, 12);
    }

    #[tokio::test]
    async fn test_advance_round_validates_range() {
        let repository = Arc::new(InMemoryMatchRepository::default());
        let m = seeded(&repository);
        let service = MatchService::new(repository.clone());

        service.advance_round(&m.id, "player-a", 4).await.unwrap();
        assert_eq!(repository.matches.lock().unwrap()[0].current_round, 4);

        let past_end = service.advance_round(&m.id, "player-a", 12).await;
        assert!(matches!(
            past_end,
            Err(MatchServiceError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_round_never_moves_backwards() {
        let repository = Arc::new(InMemoryMatchRepository::default());
        let m = seeded(&repository);
        let service = MatchService::new(repository.clone());

        service.advance_round(&m.id, "player-a", 5).await.unwrap();
        service.advance_round(&m.id, "player-b", 3).await.unwrap();

        assert_eq!(repository.matches.lock().unwrap()[0].current_round, 5);
    }

    #[tokio::test]
    async fn test_complete_match_records_winner() {
        let repository = Arc::new(InMemoryMatchRepository::default());
        let m = seeded(&repository);
        let service = MatchService::new(repository.clone());

        service
            .complete_match(&m.id, "player-a", Some("player-b"))
            .await
            .unwrap();

        let stored = repository.matches.lock().unwrap()[0].clone();
        assert_eq!(stored.status, MatchStatus::Completed);
        assert_eq!(stored.winner_id.as_deref(), Some("player-b"));
    }

    #[tokio::test]
    async fn test_complete_match_draw_and_validation() {
        let repository = Arc::new(InMemoryMatchRepository::default());
        let m = seeded(&repository);
        let service = MatchService::new(repository.clone());

        let bad_winner = service
            .complete_match(&m.id, "player-a", Some("player-c"))
            .await;
        assert!(matches!(
            bad_winner,
            Err(MatchServiceError::ValidationError(_))
        ));

        service.complete_match(&m.id, "player-a", None).await.unwrap();
        let stored = repository.matches.lock().unwrap()[0].clone();
        assert_eq!(stored.status, MatchStatus::Completed);
        assert!(stored.winner_id.is_none());
    }

    #[tokio::test]
    async fn test_writes_rejected_after_completion() {
        let repository = Arc::new(InMemoryMatchRepository::default());
        let m = seeded(&repository);
        let service = MatchService::new(repository);

        service.complete_match(&m.id, "player-a", None).await.unwrap();

        let score = service.submit_score(&m.id, "player-a", 5).await;
        assert!(matches!(score, Err(MatchServiceError::ValidationError(_))));

        let round = service.advance_round(&m.id, "player-a", 2).await;
        assert!(matches!(round, Err(MatchServiceError::ValidationError(_))));
    }
}
