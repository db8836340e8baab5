#[derive(Debug)]
pub enum BackendError {
    Unauthorized,
    Transport(String),
    Api { status: u16, message: String },
    Decode(String),
}

impl std::fmt::Display for BackendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendError::Unauthorized => write!(f, "Unauthorized"),
            BackendError::Transport(msg) => write!(f, "Transport error: {}", msg),
            BackendError::Api { status, message } => {
                write!(f, "API error ({}): {}", status, message)
            }
            BackendError::Decode(msg) => write!(f, "Decode error: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}
