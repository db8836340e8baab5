pub mod matchmaking;
pub mod online_match;
pub mod profile;
pub mod queue;
pub mod timestamps;
