use std::fmt;

#[derive(Debug)]
pub enum AuthServiceError {
    InvalidCredentials,
    InvalidToken,
    ExpiredToken,
    ValidationError(String),
}

impl fmt::Display for AuthServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthServiceError::InvalidCredentials => write!(f, "Invalid credentials"),
            AuthServiceError::InvalidToken => write!(f, "Invalid JWT token"),
            AuthServiceError::ExpiredToken => write!(f, "JWT token has expired"),
            AuthServiceError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for AuthServiceError {}
