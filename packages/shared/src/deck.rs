//! Deterministic per-match word ordering.
//!
//! Both clients derive the round deck locally from the match id, so the
//! server never ships word lists. Any stable hash works as long as both
//! sides agree; the seed feeds a seedable RNG whose shuffle is identical
//! across builds.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// An online match always runs exactly this many rounds.
pub const ROUNDS_PER_MATCH: usize = 10;

/// FNV-1a over the match id bytes.
pub fn seed_from_match_id(match_id: &str) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in match_id.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

/// Indices into the caller's word deck, one per round, shuffled by the
/// match seed and truncated to [`ROUNDS_PER_MATCH`]. Decks smaller than a
/// full match yield one round per word.
pub fn round_word_indices(match_id: &str, deck_size: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..deck_size).collect();
    let mut rng = StdRng::seed_from_u64(seed_from_match_id(match_id));
    indices.shuffle(&mut rng);
    indices.truncate(ROUNDS_PER_MATCH);
    indices
}
