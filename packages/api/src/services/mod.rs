pub mod errors;
pub mod match_service;
pub mod queue_service;
