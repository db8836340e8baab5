use crate::repositories::errors::match_repository_errors::MatchRepositoryError;
use crate::repositories::errors::queue_repository_errors::QueueRepositoryError;

#[derive(Debug)]
pub enum MatchmakerError {
    QueueRepository(QueueRepositoryError),
    MatchRepository(MatchRepositoryError),
}

impl std::fmt::Display for MatchmakerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchmakerError::QueueRepository(err) => write!(f, "Queue repository error: {}", err),
            MatchmakerError::MatchRepository(err) => write!(f, "Match repository error: {}", err),
        }
    }
}

impl std::error::Error for MatchmakerError {}

impl From<QueueRepositoryError> for MatchmakerError {
    fn from(err: QueueRepositoryError) -> Self {
        MatchmakerError::QueueRepository(err)
    }
}

impl From<MatchRepositoryError> for MatchmakerError {
    fn from(err: MatchRepositoryError) -> Self {
        MatchmakerError::MatchRepository(err)
    }
}
