use shared::repositories::errors::match_repository_errors::MatchRepositoryError;

#[derive(Debug)]
pub enum MatchServiceError {
    MatchNotFound,
    NotParticipant,
    ValidationError(String),
    RepositoryError(MatchRepositoryError),
}

impl std::fmt::Display for MatchServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchServiceError::MatchNotFound => write!(f, "Match not found"),
            MatchServiceError::NotParticipant => {
                write!(f, "Caller is not a participant of this match")
            }
            MatchServiceError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            MatchServiceError::RepositoryError(err) => write!(f, "Repository error: {}", err),
        }
    }
}

impl std::error::Error for MatchServiceError {}

impl From<MatchRepositoryError> for MatchServiceError {
    fn from(err: MatchRepositoryError) -> Self {
        match err {
            MatchRepositoryError::NotFound => MatchServiceError::MatchNotFound,
            other => MatchServiceError::RepositoryError(other),
        }
    }
}
