/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Upstream API returned status {status}: {message}")]
    Upstream { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Whether the error came from the transport rather than the remote API
    pub fn is_network(&self) -> bool {
        matches!(self, AppError::Network(_))
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::Persistence(e.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;
