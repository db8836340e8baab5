pub mod auth_service;
pub mod errors;
pub mod matchmaker;
pub mod push_service;
