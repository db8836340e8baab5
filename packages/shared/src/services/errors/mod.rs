pub mod auth_service_errors;
pub mod matchmaker_errors;
