//! Arena tiers and trophy rewards.
//!
//! Twelve arenas partition the trophy axis. Rewards taper with rank: early
//! arenas pay out generously and punish lightly, top arenas do the opposite,
//! which slows climbing without ever making a win worthless.

/// Inclusive trophy range of one arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaTier {
    pub id: u32,
    pub min_trophies: i32,
    pub max_trophies: i32,
}

pub const ARENA_TIERS: [ArenaTier; 12] = [
    ArenaTier { id: 1, min_trophies: 0, max_trophies: 299 },
    ArenaTier { id: 2, min_trophies: 300, max_trophies: 699 },
    ArenaTier { id: 3, min_trophies: 700, max_trophies: 1199 },
    ArenaTier { id: 4, min_trophies: 1200, max_trophies: 1799 },
    ArenaTier { id: 5, min_trophies: 1800, max_trophies: 2499 },
    ArenaTier { id: 6, min_trophies: 2500, max_trophies: 3299 },
    ArenaTier { id: 7, min_trophies: 3300, max_trophies: 4199 },
    ArenaTier { id: 8, min_trophies: 4200, max_trophies: 5099 },
    ArenaTier { id: 9, min_trophies: 5100, max_trophies: 5999 },
    ArenaTier { id: 10, min_trophies: 6000, max_trophies: 6899 },
    ArenaTier { id: 11, min_trophies: 6900, max_trophies: 7799 },
    ArenaTier { id: 12, min_trophies: 7800, max_trophies: i32::MAX },
];

/// Negative counts resolve to the first arena.
pub fn tier_for(trophies: i32) -> ArenaTier {
    for tier in ARENA_TIERS.iter().rev() {
        if trophies >= tier.min_trophies {
            return *tier;
        }
    }
    ARENA_TIERS[0]
}

/// Signed trophy change for a decisive result at the given trophy count.
/// Wins pay `30 - 2 * (tier - 1)`, floored at 10. Losses cost
/// `15 + floor(1.5 * (tier - 1))`. Draws award nothing and do not go
/// through here.
pub fn trophy_delta(trophies: i32, won: bool) -> i32 {
    let rank = tier_for(trophies).id as i32 - 1;
    if won {
        (30 - 2 * rank).max(10)
    } else {
        -(15 + (3 * rank) / 2)
    }
}

/// New trophy count after applying a signed delta, floored at zero.
pub fn apply_delta(trophies: i32, delta: i32) -> i32 {
    (trophies + delta).max(0)
}

/// A player abandoning a live match concedes the win reward to the opponent.
pub fn forfeit_penalty(trophies: i32) -> i32 {
    -trophy_delta(trophies, true)
}
