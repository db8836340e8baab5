//! Game-side half of the online match protocol: queueing, countdown clock
//! synchronization, round locking and result computation. The rendering
//! layer sits on top of [`session::MatchmakingSession`] and
//! [`rounds::RoundSynchronizer`] and never talks to the backend directly.

pub mod answers;
pub mod backend;
pub mod clock;
pub mod error;
pub mod http;
pub mod rounds;
pub mod session;
