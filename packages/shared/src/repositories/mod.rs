pub mod connection_repository;
pub mod errors;
pub mod match_repository;
pub mod profile_repository;
pub mod queue_repository;
