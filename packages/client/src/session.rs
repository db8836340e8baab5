//! Matchmaking lifecycle: queue join, the poll/push race for the pairing
//! result, the search timeout and cancellation.
//!
//! Polling and push both run while searching; whichever sees the match first
//! wins and the session transitions exactly once. The timeout is anchored to
//! the server queue timestamp so a skewed local clock cannot stretch or cut
//! the search window.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use shared::models::matchmaking::MatchPush;
use shared::models::online_match::OnlineMatch;
use shared::models::profile::PlayerProfile;

use crate::backend::{MatchEvents, MatchmakingBackend};
use crate::clock::MatchClock;
use crate::error::BackendError;

/// A search that has not paired within this window gives up.
pub const SEARCH_TIMEOUT_SECONDS: i64 = 60;

pub const POLL_INTERVAL_SECONDS: u64 = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Searching,
    Found,
    TimedOut,
    Failed,
}

/// Everything the game needs to enter the arena.
#[derive(Debug, Clone)]
pub struct MatchFound {
    pub online_match: OnlineMatch,
    pub opponent: PlayerProfile,
    pub clock: MatchClock,
}

struct SessionState {
    status: SessionStatus,
    clock: MatchClock,
    found: Option<MatchFound>,
    error: Option<String>,
    /// Bumped by `cancel()` and `reset()`; a `start()` in flight across an
    /// await compares it before committing to `Searching`.
    generation: u64,
    tasks: Vec<JoinHandle<()>>,
}

struct SessionInner {
    backend: Arc<dyn MatchmakingBackend>,
    events: Arc<dyn MatchEvents>,
    user_id: String,
    state: Mutex<SessionState>,
    status_tx: watch::Sender<SessionStatus>,
}

pub struct MatchmakingSession {
    inner: Arc<SessionInner>,
}

impl MatchmakingSession {
    pub fn new(
        backend: Arc<dyn MatchmakingBackend>,
        events: Arc<dyn MatchEvents>,
        user_id: &str,
    ) -> Self {
        let (status_tx, _) = watch::channel(SessionStatus::Idle);
        MatchmakingSession {
            inner: Arc::new(SessionInner {
                backend,
                events,
                user_id: user_id.to_string(),
                state: Mutex::new(SessionState {
                    status: SessionStatus::Idle,
                    clock: MatchClock::unsynchronized(),
                    found: None,
                    error: None,
                    generation: 0,
                    tasks: Vec::new(),
                }),
                status_tx,
            }),
        }
    }

    /// Observers see every status transition of this session.
    pub fn subscribe_status(&self) -> watch::Receiver<SessionStatus> {
        self.inner.status_tx.subscribe()
    }

    pub async fn status(&self) -> SessionStatus {
        self.inner.state.lock().await.status.clone()
    }

    /// The pairing result, available once the status is `Found`.
    pub async fn found(&self) -> Option<MatchFound> {
        self.inner.state.lock().await.found.clone()
    }

    /// The user-facing failure message, available once the status is
    /// `Failed`.
    pub async fn error(&self) -> Option<String> {
        self.inner.state.lock().await.error.clone()
    }

    /// Joins the queue and starts searching. A call while already searching
    /// is a no-op; from any terminal state the session restarts.
    pub async fn start(&self, trophies: i32) -> Result<(), BackendError> {
        let generation = {
            let mut state = self.inner.state.lock().await;
            if state.status == SessionStatus::Searching {
                return Ok(());
            }
            for task in state.tasks.drain(..) {
                task.abort();
            }
            state.found = None;
            state.error = None;
            state.generation
        };

        // A crashed previous run may have left a queue row behind.
        let _ = self.inner.backend.leave_queue().await;

        let joined_at = self.inner.backend.join_queue(trophies).await?;
        let clock = MatchClock::from_queue_anchor(joined_at, Utc::now());
        let deadline = joined_at + Duration::seconds(SEARCH_TIMEOUT_SECONDS);

        let mut state = self.inner.state.lock().await;
        if state.generation != generation {
            // Cancelled while the join was in flight; the queue row the join
            // just created has to go.
            drop(state);
            let _ = self.inner.backend.leave_queue().await;
            info!("Search aborted before it began for {}", self.inner.user_id);
            return Ok(());
        }

        info!(
            "Searching for opponent as {} (clock offset {}ms)",
            self.inner.user_id,
            clock.offset_ms()
        );

        state.status = SessionStatus::Searching;
        state.clock = clock;
        let _ = self.inner.status_tx.send(SessionStatus::Searching);

        let inner = self.inner.clone();
        state.tasks.push(tokio::spawn(async move {
            inner.poll_loop().await;
        }));
        let inner = self.inner.clone();
        state.tasks.push(tokio::spawn(async move {
            inner.push_loop().await;
        }));
        let inner = self.inner.clone();
        state.tasks.push(tokio::spawn(async move {
            inner.timeout_after(deadline).await;
        }));

        Ok(())
    }

    /// Stops the search from any state and returns the session to idle.
    /// Safe to call repeatedly.
    pub async fn cancel(&self) {
        {
            let mut state = self.inner.state.lock().await;
            for task in state.tasks.drain(..) {
                task.abort();
            }
            state.status = SessionStatus::Idle;
            state.found = None;
            state.error = None;
            state.generation += 1;
            let _ = self.inner.status_tx.send(SessionStatus::Idle);
        }
        let _ = self.inner.backend.leave_queue().await;
        info!("Search cancelled for {}", self.inner.user_id);
    }

    /// Clears a terminal state back to idle without touching the backend,
    /// for the "search again" path after a timeout or failure.
    pub async fn reset(&self) {
        let mut state = self.inner.state.lock().await;
        if state.status == SessionStatus::Searching {
            return;
        }
        state.status = SessionStatus::Idle;
        state.found = None;
        state.error = None;
        state.generation += 1;
        let _ = self.inner.status_tx.send(SessionStatus::Idle);
    }
}

impl SessionInner {
    fn is_searching(&self) -> bool {
        *self.status_tx.borrow() == SessionStatus::Searching
    }

    async fn poll_loop(self: Arc<Self>) {
        loop {
            if !self.is_searching() {
                return;
            }
            match self.backend.find_match().await {
                Ok(response) if response.found => {
                    let Some(match_id) = response.match_id else {
                        self.fail(BackendError::Decode(
                            "Pairing response missing match id".to_string(),
                        ))
                        .await;
                        return;
                    };
                    match self.backend.get_match(&match_id).await {
                        Ok(online_match) => self.on_found(online_match).await,
                        Err(e) => self.fail(e).await,
                    }
                    return;
                }
                Ok(_) => {}
                Err(e) => {
                    self.fail(e).await;
                    return;
                }
            }
            tokio::time::sleep(std::time::Duration::from_secs(POLL_INTERVAL_SECONDS)).await;
        }
    }

    async fn push_loop(self: Arc<Self>) {
        let mut receiver = match self.events.subscribe().await {
            Ok(receiver) => receiver,
            Err(e) => {
                // Push is an accelerator; polling alone resolves the search.
                warn!("Push channel unavailable: {}", e);
                return;
            }
        };

        while let Some(push) = receiver.recv().await {
            if let MatchPush::MatchCreated(online_match) = push {
                if online_match.is_participant(&self.user_id) {
                    self.on_found(online_match).await;
                    return;
                }
            }
        }
    }

    async fn timeout_after(self: Arc<Self>, deadline: DateTime<Utc>) {
        let clock = self.state.lock().await.clock;
        let remaining_ms = clock.ms_until(deadline, Utc::now()).max(0);
        tokio::time::sleep(std::time::Duration::from_millis(remaining_ms as u64)).await;

        {
            let mut state = self.state.lock().await;
            if state.status != SessionStatus::Searching {
                return;
            }
            state.status = SessionStatus::TimedOut;
            let _ = self.status_tx.send(SessionStatus::TimedOut);
        }
        let _ = self.backend.leave_queue().await;
        info!("Search timed out for {}", self.user_id);
    }

    /// Single-winner transition out of `Searching`; the loser of the
    /// poll/push race returns without side effects.
    async fn on_found(&self, online_match: OnlineMatch) {
        {
            let mut state = self.state.lock().await;
            if state.status != SessionStatus::Searching {
                return;
            }
            state.status = SessionStatus::Found;
        }

        // The matchmaker normally evicts both queue rows; this covers the
        // path where the pairing was learned through push first.
        let _ = self.backend.leave_queue().await;

        let opponent_id = online_match
            .opponent_of(&self.user_id)
            .unwrap_or_default()
            .to_string();
        let opponent = match self.backend.get_profile(&opponent_id).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Profile lookup failed for {}: {}", opponent_id, e);
                PlayerProfile::placeholder(&opponent_id)
            }
        };

        info!(
            "Match {} found: {} vs {}",
            online_match.id, self.user_id, opponent.display_name
        );

        let mut state = self.state.lock().await;
        let clock = state.clock;
        state.found = Some(MatchFound {
            online_match,
            opponent,
            clock,
        });
        let _ = self.status_tx.send(SessionStatus::Found);
    }

    /// Fail fast: any backend error while searching ends the search rather
    /// than leaving the player staring at an endless spinner. The message is
    /// kept for the UI to render next to the retry prompt.
    async fn fail(&self, e: BackendError) {
        {
            let mut state = self.state.lock().await;
            if state.status != SessionStatus::Searching {
                return;
            }
            state.status = SessionStatus::Failed;
            state.error = Some(e.to_string());
            let _ = self.status_tx.send(SessionStatus::Failed);
        }
        let _ = self.backend.leave_queue().await;
        error!("Search failed for {}: {}", self.user_id, e);
    }
}
