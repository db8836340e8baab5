use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, warn};

use crate::models::online_match::OnlineMatch;
use crate::models::queue::QueueEntry;
use crate::repositories::match_repository::MatchRepository;
use crate::repositories::queue_repository::QueueRepository;
use crate::services::errors::matchmaker_errors::MatchmakerError;

/// Queue entries older than this are ignored: an abandoned entry from a
/// crashed client must not get paired. There is no server-side garbage
/// collector; the next join from the same user clears its stale row.
pub const QUEUE_RECENCY_MINUTES: i64 = 2;

/// Window in which an existing match between two players is reused instead of
/// creating a duplicate.
pub const PAIR_REUSE_MINUTES: i64 = 5;

/// Preferred trophy distance between paired players.
pub const TROPHY_BAND: i32 = 200;

#[derive(Debug)]
pub enum PairingOutcome {
    /// A match exists (newly created or recovered) naming the caller.
    Found(OnlineMatch),
    /// Caller is queued but nobody compatible is waiting; keep polling.
    NoOpponent,
    /// Caller has no queue entry and no recent match.
    NotQueued,
}

/// Stateless pairing, invoked once per poll request. Safe under concurrent
/// invocation by both players of an eventual pair: all coordination state
/// lives in the queue and match tables.
#[derive(Clone)]
pub struct MatchmakerService {
    queue_repository: Arc<dyn QueueRepository>,
    match_repository: Arc<dyn MatchRepository>,
}

impl MatchmakerService {
    pub fn new(
        queue_repository: Arc<dyn QueueRepository>,
        match_repository: Arc<dyn MatchRepository>,
    ) -> Self {
        MatchmakerService {
            queue_repository,
            match_repository,
        }
    }

    pub async fn find_match(&self, caller_id: &str) -> Result<PairingOutcome, MatchmakerError> {
        let Some(caller) = self.queue_repository.get_entry(caller_id).await? else {
            // The opponent's concurrent invocation may have already created
            // the match and cleared both queue entries. Without this lookup
            // the caller would stay stuck in "searching".
            let since = Utc::now() - Duration::minutes(PAIR_REUSE_MINUTES);
            if let Some(existing) = self
                .match_repository
                .find_recent_for_user(caller_id, since)
                .await?
            {
                info!(
                    "User {} not queued but recent match {} exists, returning it",
                    caller_id, existing.id
                );
                return Ok(PairingOutcome::Found(existing));
            }
            return Ok(PairingOutcome::NotQueued);
        };

        let joined_since = Utc::now() - Duration::minutes(QUEUE_RECENCY_MINUTES);

        let mut candidates = self
            .queue_repository
            .find_candidates(
                caller_id,
                caller.trophies - TROPHY_BAND,
                caller.trophies + TROPHY_BAND,
                joined_since,
            )
            .await?;

        if candidates.is_empty() {
            // Thin queue: widen to any skill rather than leave both players
            // waiting. Documented policy, wide trophy gaps are accepted.
            candidates = self
                .queue_repository
                .find_candidates(caller_id, i32::MIN, i32::MAX, joined_since)
                .await?;
        }

        // Candidates are sorted oldest join first; take the longest waiting.
        let Some(opponent) = candidates.into_iter().next() else {
            return Ok(PairingOutcome::NoOpponent);
        };

        let online_match = self.pair(&caller, &opponent).await?;
        Ok(PairingOutcome::Found(online_match))
    }

    async fn pair(
        &self,
        caller: &QueueEntry,
        opponent: &QueueEntry,
    ) -> Result<OnlineMatch, MatchmakerError> {
        let since = Utc::now() - Duration::minutes(PAIR_REUSE_MINUTES);

        // Both players poll independently, so their invocations can race to
        // pair the same two entries. If the other side already created the
        // match, reuse it instead of inserting a duplicate row.
        if let Some(existing) = self
            .match_repository
            .find_recent_for_pair(&caller.user_id, &opponent.user_id, since)
            .await?
        {
            info!(
                "Reusing existing match {} for pair ({}, {})",
                existing.id, caller.user_id, opponent.user_id
            );
            self.evict_pair(&caller.user_id, &opponent.user_id).await;
            return Ok(existing);
        }

        let online_match = OnlineMatch::new(&caller.user_id, &opponent.user_id);
        self.match_repository.create_match(&online_match).await?;

        info!(
            "Created match {} pairing {} with {} (start_at {})",
            online_match.id, caller.user_id, opponent.user_id, online_match.start_at
        );

        self.evict_pair(&caller.user_id, &opponent.user_id).await;

        Ok(online_match)
    }

    /// Queue deletion is keyed and idempotent; a failure here leaves a stale
    /// entry that ages out of the recency window on its own.
    async fn evict_pair(&self, user_a: &str, user_b: &str) {
        for user_id in [user_a, user_b] {
            if let Err(e) = self.queue_repository.delete_entry(user_id).await {
                warn!("Failed to remove {} from queue: {}", user_id, e);
            }
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::models::online_match::MatchStatus;
    use crate::repositories::errors::match_repository_errors::MatchRepositoryError;
    use crate::repositories::errors::queue_repository_errors::QueueRepositoryError;
    use crate::models::online_match::PlayerSlot;
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::sync::Mutex;

    // In-memory repositories backing the pairing tests.

    #[derive(Default)]
    pub struct InMemoryQueueRepository {
        pub entries: Mutex<Vec<QueueEntry>>,
    }

    impl InMemoryQueueRepository {
        pub fn with_entries(entries: Vec<QueueEntry>) -> Self {
            Self {
                entries: Mutex::new(entries),
            }
        }
    }

    #[async_trait]
    impl QueueRepository for InMemoryQueueRepository {
        async fn insert_entry(&self, entry: &QueueEntry) -> Result<(), QueueRepositoryError> {
            let mut entries = self.entries.lock().unwrap();
            entries.retain(|e| e.user_id != entry.user_id);
            entries.push(entry.clone());
            Ok(())
        }

        async fn delete_entry(&self, user_id: &str) -> Result<(), QueueRepositoryError> {
            self.entries.lock().unwrap().retain(|e| e.user_id != user_id);
            Ok(())
        }

        async fn get_entry(
            &self,
            user_id: &str,
        ) -> Result<Option<QueueEntry>, QueueRepositoryError> {
            Ok(self
                .entries
                .lock()
                .unwrap()
                .iter()
                .find(|e| e.user_id == user_id)
                .cloned())
        }

        async fn find_candidates(
            &self,
            exclude_user_id: &str,
            min_trophies: i32,
            max_trophies: i32,
            joined_since: DateTime<Utc>,
        ) -> Result<Vec<QueueEntry>, QueueRepositoryError> {
            let mut candidates: Vec<QueueEntry> = self
                .entries
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.user_id != exclude_user_id)
                .filter(|e| e.joined_at >= joined_since)
                .filter(|e| e.trophies >= min_trophies && e.trophies <= max_trophies)
                .cloned()
                .collect();
            candidates.sort_by_key(|e| e.joined_at);
            Ok(candidates)
        }
    }

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
            let mut recent: Vec<OnlineMatch> = self
                .matches
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.is_participant(user_id))
                .filter(|m| m.created_at >= since)
                .filter(|m| m.status != MatchStatus::Completed)
                .cloned()
                .collect();
            recent.sort_by_key(|m| std::cmp::Reverse(m.created_at));
            Ok(recent.into_iter().next())
        }

        async fn find_recent_for_pair(
            &self,
            user_a: &str,
            user_b: &str,
            since: DateTime<Utc>,
        ) -> Result<Option<OnlineMatch>, MatchRepositoryError> {
            let mut recent: Vec<OnlineMatch> = self
                .matches
                .lock()
                .unwrap()
                .iter()
                .filter(|m| m.is_participant(user_a) && m.is_participant(user_b))
                .filter(|m| m.created_at >= since)
                .filter(|m| m.status != MatchStatus::Completed)
                .cloned()
                .collect();
            recent.sort_by_key(|m| std::cmp::Reverse(m.created_at));
            Ok(recent.into_iter().next())
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
            let current = m.score_of(slot);
            if score < current {
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

    fn service(
        queue: Arc<InMemoryQueueRepository>,
        matches: Arc<InMemoryMatchRepository>,
    ) -> MatchmakerService {
        MatchmakerService::new(queue, matches)
    }

    fn entry_joined_ago(user_id: &str, trophies: i32, seconds_ago: i64) -> QueueEntry {
        QueueEntry {
            user_id: user_id.to_string(),
            trophies,
            joined_at: Utc::now() - Duration::seconds(seconds_ago),
        }
    }

    #[tokio::test]
    async fn test_pairs_within_trophy_band() {
        let queue = Arc::new(InMemoryQueueRepository::with_entries(vec![
            entry_joined_ago("player-a", 500, 10),
            entry_joined_ago("player-b", 650, 0),
        ]));
        let matches = Arc::new(InMemoryMatchRepository::default());
        let matchmaker = service(queue.clone(), matches.clone());

        let outcome = matchmaker.find_match("player-b").await.unwrap();

        let PairingOutcome::Found(m) = outcome else {
            panic!("expected a match");
        };
        assert!(m.is_participant("player-a"));
        assert!(m.is_participant("player-b"));
        assert_eq!(m.current_round, 1);
        assert_eq!(m.player1_score, 0);
        assert_eq!(m.player2_score, 0);
        assert_eq!(m.status, MatchStatus::Playing);

        let lead_ms = (m.start_at - Utc::now()).num_milliseconds();
        assert!(lead_ms > 3000 && lead_ms <= 4000, "lead was {}ms", lead_ms);

        // Both queue entries are gone.
        assert!(queue.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_skips_entries_outside_band_when_closer_exists() {
        let queue = Arc::new(InMemoryQueueRepository::with_entries(vec![
            entry_joined_ago("far", 2000, 30),
            entry_joined_ago("near", 600, 5),
            entry_joined_ago("caller", 500, 0),
        ]));
        let matches = Arc::new(InMemoryMatchRepository::default());
        let matchmaker = service(queue, matches);

        let outcome = matchmaker.find_match("caller").await.unwrap();

        let PairingOutcome::Found(m) = outcome else {
            panic!("expected a match");
        };
        assert!(m.is_participant("near"));
        assert!(!m.is_participant("far"));
    }

    #[tokio::test]
    async fn test_falls_back_to_any_skill_on_thin_queue() {
        let queue = Arc::new(InMemoryQueueRepository::with_entries(vec![
            entry_joined_ago("grandmaster", 5000, 30),
            entry_joined_ago("caller", 100, 0),
        ]));
        let matches = Arc::new(InMemoryMatchRepository::default());
        let matchmaker = service(queue, matches);

        let outcome = matchmaker.find_match("caller").await.unwrap();

        let PairingOutcome::Found(m) = outcome else {
            panic!("expected fallback pairing");
        };
        assert!(m.is_participant("grandmaster"));
    }

    #[tokio::test]
    async fn test_prefers_longest_waiting_candidate() {
        let queue = Arc::new(InMemoryQueueRepository::with_entries(vec![
            entry_joined_ago("recent", 520, 5),
            entry_joined_ago("patient", 480, 90),
            entry_joined_ago("caller", 500, 0),
        ]));
        let matches = Arc::new(InMemoryMatchRepository::default());
        let matchmaker = service(queue, matches);

        let outcome = matchmaker.find_match("caller").await.unwrap();

        let PairingOutcome::Found(m) = outcome else {
            panic!("expected a match");
        };
        assert!(m.is_participant("patient"));
    }

    #[tokio::test]
    async fn test_ignores_stale_queue_entries() {
        // "cancelled" left more than two minutes ago; must not be paired.
        let queue = Arc::new(InMemoryQueueRepository::with_entries(vec![
            entry_joined_ago("abandoned", 500, 3 * 60),
            entry_joined_ago("caller", 500, 0),
        ]));
        let matches = Arc::new(InMemoryMatchRepository::default());
        let matchmaker = service(queue, matches);

        let outcome = matchmaker.find_match("caller").await.unwrap();
        assert!(matches!(outcome, PairingOutcome::NoOpponent));
    }

    #[tokio::test]
    async fn test_no_opponent_when_queue_empty() {
        let queue = Arc::new(InMemoryQueueRepository::with_entries(vec![
            entry_joined_ago("caller", 500, 0),
        ]));
        let matches = Arc::new(InMemoryMatchRepository::default());
        let matchmaker = service(queue, matches);

        let outcome = matchmaker.find_match("caller").await.unwrap();
        assert!(matches!(outcome, PairingOutcome::NoOpponent));
    }

    #[tokio::test]
    async fn test_not_queued_without_entry_or_match() {
        let queue = Arc::new(InMemoryQueueRepository::default());
        let matches = Arc::new(InMemoryMatchRepository::default());
        let matchmaker = service(queue, matches);

        let outcome = matchmaker.find_match("ghost").await.unwrap();
        assert!(matches!(outcome, PairingOutcome::NotQueued));
    }

    #[tokio::test]
    async fn test_recovers_match_created_by_opponent_invocation() {
        // Simulate the losing side of the pairing race: the caller's queue
        // entry is gone because the opponent's poll already paired them.
        let queue = Arc::new(InMemoryQueueRepository::with_entries(vec![
            entry_joined_ago("player-a", 500, 10),
            entry_joined_ago("player-b", 650, 0),
        ]));
        let matches = Arc::new(InMemoryMatchRepository::default());
        let matchmaker = service(queue.clone(), matches.clone());

        let first = matchmaker.find_match("player-b").await.unwrap();
        let PairingOutcome::Found(created) = first else {
            panic!("expected a match");
        };

        // player-a polls next; no queue entry, but the match names them.
        let second = matchmaker.find_match("player-a").await.unwrap();
        let PairingOutcome::Found(recovered) = second else {
            panic!("expected recovery of the existing match");
        };

        assert_eq!(recovered.id, created.id);
        assert_eq!(matches.matches.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reuses_existing_pair_match_instead_of_duplicating() {
        let queue = Arc::new(InMemoryQueueRepository::with_entries(vec![
            entry_joined_ago("player-a", 500, 10),
            entry_joined_ago("player-b", 650, 0),
        ]));
        let matches = Arc::new(InMemoryMatchRepository::default());
        let matchmaker = service(queue.clone(), matches.clone());

        // A match for the pair already exists (the other invocation finished
        // creating it but has not evicted the queue entries yet).
        let existing = OnlineMatch::new("player-a", "player-b");
        matches.create_match(&existing).await.unwrap();

        let outcome = matchmaker.find_match("player-b").await.unwrap();
        let PairingOutcome::Found(m) = outcome else {
            panic!("expected a match");
        };

        assert_eq!(m.id, existing.id);
        assert_eq!(matches.matches.lock().unwrap().len(), 1);
        assert!(queue.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_player_is_not_paired() {
        let queue = Arc::new(InMemoryQueueRepository::with_entries(vec![
            entry_joined_ago("player-a", 500, 20),
            entry_joined_ago("player-c", 520, 0),
        ]));
        let matches = Arc::new(InMemoryMatchRepository::default());
        let matchmaker = service(queue.clone(), matches);

        // player-a cancels mid-search; their row is deleted.
        queue.delete_entry("player-a").await.unwrap();

        let outcome = matchmaker.find_match("player-c").await.unwrap();
        assert!(matches!(outcome, PairingOutcome::NoOpponent));
    }
}
