//! Round lockstep over the shared match row.
//!
//! Each round a player answers once, worth the seconds left on the round
//! timer. The only signal a client gets about its opponent is the match row
//! changing, so "the opponent answered this round" is inferred from their
//! score column moving by a plausible per-round amount. Ties between the two
//! clients advancing the round are absorbed by the server's monotonic round
//! counter.

use std::sync::Arc;

use tracing::warn;

use shared::deck::ROUNDS_PER_MATCH;
use shared::models::online_match::{OnlineMatch, PlayerSlot};
use shared::trophies;

use crate::backend::MatchmakingBackend;
use crate::error::BackendError;

/// Time units per round; also the maximum points a single answer can score.
pub const ROUND_TIME_UNITS: i32 = 10;

/// Final standing of a finished match from one player's point of view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameOutcome {
    pub won: bool,
    pub draw: bool,
    pub player_score: i32,
    pub opponent_score: i32,
    /// Signed trophy change; zero on a draw.
    pub trophy_change: i32,
}

pub struct RoundSynchronizer {
    backend: Arc<dyn MatchmakingBackend>,
    match_id: String,
    user_id: String,
    opponent_id: String,
    slot: PlayerSlot,
    current_round: i32,
    my_total: i32,
    opponent_total: i32,
    last_seen_opponent_total: i32,
    my_answered: bool,
    opponent_answered: bool,
}

impl RoundSynchronizer {
    /// Returns `None` when `user_id` is not a participant of the match.
    pub fn new(
        backend: Arc<dyn MatchmakingBackend>,
        online_match: &OnlineMatch,
        user_id: &str,
    ) -> Option<Self> {
        let slot = online_match.slot_of(user_id)?;
        let opponent_id = online_match.opponent_of(user_id)?.to_string();
        let my_total = online_match.score_of(slot);
        let opponent_total = online_match.score_of(slot.other());

        Some(RoundSynchronizer {
            backend,
            match_id: online_match.id.clone(),
            user_id: user_id.to_string(),
            opponent_id,
            slot,
            current_round: online_match.current_round,
            my_total,
            opponent_total,
            last_seen_opponent_total: opponent_total,
            my_answered: false,
            opponent_answered: false,
        })
    }

    pub fn current_round(&self) -> i32 {
        self.current_round
    }

    pub fn my_total(&self) -> i32 {
        self.my_total
    }

    pub fn opponent_total(&self) -> i32 {
        self.opponent_total
    }

    /// Both sides have locked in an answer for the current round.
    pub fn is_resolved(&self) -> bool {
        self.my_answered && self.opponent_answered
    }

    pub fn is_finished(&self) -> bool {
        self.current_round > ROUNDS_PER_MATCH as i32
    }

    /// Locks in the local answer, worth the time units left on the round
    /// timer, and writes the new cumulative total. The second answer of a
    /// round is ignored.
    pub async fn record_local_answer(&mut self, time_left: i32) -> Result<(), BackendError> {
        if self.my_answered {
            return Ok(());
        }
        self.my_total += time_left.clamp(0, ROUND_TIME_UNITS);
        self.my_answered = true;
        self.backend
            .submit_score(&self.match_id, self.my_total)
            .await
    }

    /// Feeds a match row update from push or polling. Detects the opponent's
    /// answer from their score column moving by a single-answer amount, and
    /// catches up when the shared round counter has moved past us.
    pub fn observe_update(&mut self, online_match: &OnlineMatch) {
        let opponent_now = online_match.score_of(self.slot.other());
        let delta = opponent_now - self.last_seen_opponent_total;
        if (1..=ROUND_TIME_UNITS).contains(&delta) {
            self.opponent_answered = true;
        }
        if opponent_now > self.opponent_total {
            self.opponent_total = opponent_now;
        }

        let mine_now = online_match.score_of(self.slot);
        if mine_now > self.my_total {
            self.my_total = mine_now;
        }

        if online_match.current_round > self.current_round {
            self.current_round = online_match.current_round;
            self.reset_round();
        }
    }

    /// Moves both players to the next round once the current one is
    /// resolved. The write is monotonic on the server, so whichever client
    /// gets there first wins and the other's write is a no-op.
    pub async fn advance(&mut self) -> Result<(), BackendError> {
        let next = self.current_round + 1;
        self.backend.advance_round(&self.match_id, next).await?;
        self.current_round = next;
        self.reset_round();
        Ok(())
    }

    /// Round timer expired. An unanswered player scores zero for the round;
    /// the total is re-written unchanged so the opponent still observes a
    /// row update. A failed advance is non-fatal, the opponent's own
    /// deadline write moves the counter.
    pub async fn handle_deadline(&mut self) -> Result<(), BackendError> {
        if !self.my_answered {
            self.my_answered = true;
            self.backend
                .submit_score(&self.match_id, self.my_total)
                .await?;
        }
        if let Err(e) = self.advance().await {
            warn!(
                "Round advance failed for match {}: {}; waiting for opponent",
                self.match_id, e
            );
        }
        Ok(())
    }

    /// Reports the final result. Both clients compute the same winner from
    /// the same totals, so the two completion calls agree.
    pub async fn complete(&self, player_trophies: i32) -> Result<GameOutcome, BackendError> {
        let outcome = self.outcome(player_trophies);
        let winner_id = if outcome.draw {
            None
        } else if outcome.won {
            Some(self.user_id.as_str())
        } else {
            Some(self.opponent_id.as_str())
        };
        self.backend
            .complete_match(&self.match_id, winner_id)
            .await?;
        Ok(outcome)
    }

    pub fn outcome(&self, player_trophies: i32) -> GameOutcome {
        let won = self.my_total > self.opponent_total;
        let draw = self.my_total == self.opponent_total;
        let trophy_change = if draw {
            0
        } else {
            trophies::trophy_delta(player_trophies, won)
        };
        GameOutcome {
            won,
            draw,
            player_score: self.my_total,
            opponent_score: self.opponent_total,
            trophy_change,
        }
    }

    fn reset_round(&mut self) {
        self.my_answered = false;
        self.opponent_answered = false;
        self.last_seen_opponent_total = self.opponent_total;
    }
}
