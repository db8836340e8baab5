use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use shared::models::matchmaking::responses::ErrorResponse;
use shared::repositories::errors::profile_repository_errors::ProfileRepositoryError;
use shared::services::errors::auth_service_errors::AuthServiceError;
use shared::services::errors::matchmaker_errors::MatchmakerError;

use crate::services::errors::match_service_errors::MatchServiceError;
use crate::services::errors::queue_service_errors::QueueServiceError;

#[derive(Debug)]
pub enum ApiError {
    AuthService(AuthServiceError),
    QueueService(QueueServiceError),
    MatchService(MatchServiceError),
    Matchmaker(MatchmakerError),
    ProfileRepository(ProfileRepositoryError),
}

impl From<AuthServiceError> for ApiError {
    fn from(error: AuthServiceError) -> Self {
        ApiError::AuthService(error)
    }
}

impl From<QueueServiceError> for ApiError {
    fn from(error: QueueServiceError) -> Self {
        ApiError::QueueService(error)
    }
}

impl From<MatchServiceError> for ApiError {
    fn from(error: MatchServiceError) -> Self {
        ApiError::MatchService(error)
    }
}

impl From<MatchmakerError> for ApiError {
    fn from(error: MatchmakerError) -> Self {
        ApiError::Matchmaker(error)
    }
}

impl From<ProfileRepositoryError> for ApiError {
    fn from(error: ProfileRepositoryError) -> Self {
        ApiError::ProfileRepository(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::AuthService(
                AuthServiceError::InvalidCredentials
                | AuthServiceError::InvalidToken
                | AuthServiceError::ExpiredToken,
            ) => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::AuthService(AuthServiceError::ValidationError(msg)) => {
                (StatusCode::BAD_REQUEST, msg)
            }

            ApiError::QueueService(QueueServiceError::ValidationError(msg)) => {
                (StatusCode::BAD_REQUEST, msg)
            }
            ApiError::QueueService(e @ QueueServiceError::RepositoryError(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }

            ApiError::MatchService(MatchServiceError::MatchNotFound) => {
                (StatusCode::NOT_FOUND, "Match not found".to_string())
            }
            ApiError::MatchService(MatchServiceError::NotParticipant) => {
                (StatusCode::FORBIDDEN, "Not a participant".to_string())
            }
            ApiError::MatchService(MatchServiceError::ValidationError(msg)) => {
                (StatusCode::BAD_REQUEST, msg)
            }
            ApiError::MatchService(e @ MatchServiceError::RepositoryError(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }

            ApiError::Matchmaker(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),

            ApiError::ProfileRepository(ProfileRepositoryError::NotFound) => {
                (StatusCode::NOT_FOUND, "Profile not found".to_string())
            }
            ApiError::ProfileRepository(e) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
