pub mod health;
pub mod matches;
pub mod matchmaking;
pub mod profiles;
