//! Countdown synchronization.
//!
//! Local device clocks cannot be trusted, so the client derives a clock
//! offset from the one server timestamp it is guaranteed to hold before the
//! countdown matters: the `joined_at` assigned when it entered the queue.
//! Both players apply their own offset to the shared `start_at`, which makes
//! the start instant agree across devices regardless of local clock skew.

use chrono::{DateTime, Duration, Utc};

/// The countdown becomes visible this long before the start instant.
pub const COUNTDOWN_VISIBLE_MS: i64 = 3000;

/// Polling cadence of the countdown driver.
pub const CLOCK_TICK_MS: u64 = 100;

/// Lead applied before a locally driven countdown when the match row carries
/// no start instant.
pub const FALLBACK_LEAD_MS: u64 = 1500;

/// Offset between server time and the local clock, captured at queue join.
#[derive(Debug, Clone, Copy)]
pub struct MatchClock {
    offset_ms: i64,
}

impl MatchClock {
    /// `server_joined_at` is the queue timestamp the server returned;
    /// `local_at_join` is the local clock reading taken when the response
    /// arrived. Network latency leaks into the offset but stays well under
    /// the one second countdown granularity.
    pub fn from_queue_anchor(
        server_joined_at: DateTime<Utc>,
        local_at_join: DateTime<Utc>,
    ) -> Self {
        MatchClock {
            offset_ms: (server_joined_at - local_at_join).num_milliseconds(),
        }
    }

    /// No anchor available; trusts the local clock.
    pub fn unsynchronized() -> Self {
        MatchClock { offset_ms: 0 }
    }

    pub fn offset_ms(&self) -> i64 {
        self.offset_ms
    }

    /// Local time corrected into server time.
    pub fn adjusted(&self, local_now: DateTime<Utc>) -> DateTime<Utc> {
        local_now + Duration::milliseconds(self.offset_ms)
    }

    pub fn adjusted_now(&self) -> DateTime<Utc> {
        self.adjusted(Utc::now())
    }

    /// Milliseconds from the corrected now until `target`; negative once the
    /// target has passed.
    pub fn ms_until(&self, target: DateTime<Utc>, local_now: DateTime<Utc>) -> i64 {
        (target - self.adjusted(local_now)).num_milliseconds()
    }
}

/// What the lobby should render for a given distance to the start instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartPhase {
    /// Start is further out than the visible countdown window.
    Waiting,
    /// Seconds left, clamped to 1..=3.
    Countdown(u32),
    Start,
}

pub fn phase(ms_until_start: i64) -> StartPhase {
    if ms_until_start <= 0 {
        StartPhase::Start
    } else if ms_until_start <= COUNTDOWN_VISIBLE_MS {
        let seconds = (ms_until_start + 999) / 1000;
        StartPhase::Countdown((seconds.clamp(1, 3)) as u32)
    } else {
        StartPhase::Waiting
    }
}

/// Drives the countdown until the start instant, invoking `on_tick` on every
/// phase change and returning once [`StartPhase::Start`] has been emitted.
/// Start fires exactly once; the function returning is the latch.
///
/// Without a start instant the driver falls back to a locally timed 3-2-1
/// after a short lead.
pub async fn run_countdown<F>(
    clock: MatchClock,
    start_at: Option<DateTime<Utc>>,
    mut on_tick: F,
) where
    F: FnMut(StartPhase),
{
    let Some(start_at) = start_at else {
        tokio::time::sleep(std::time::Duration::from_millis(FALLBACK_LEAD_MS)).await;
        for seconds in (1..=3).rev() {
            on_tick(StartPhase::Countdown(seconds));
            tokio::time::sleep(std::time::Duration::from_secs(1)).await;
        }
        on_tick(StartPhase::Start);
        return;
    };

    let mut last: Option<StartPhase> = None;
    loop {
        let current = phase(clock.ms_until(start_at, Utc::now()));
        if last != Some(current) {
            on_tick(current);
            last = Some(current);
        }
        if current == StartPhase::Start {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(CLOCK_TICK_MS)).await;
    }
}
