use thiserror::Error;

#[derive(Error, Debug)]
pub enum FinanceError {
    #[error("{0}")]
    Validation(String),
    #[error("Please log in first")]
    NotLoggedIn,
    #[error("Transaction with ID {0} not found")]
    NotFound(i64),
    #[error("Line {line}: {message}")]
    Import { line: usize, message: String },
    #[error("Storage failure: {0}")]
    Store(#[from] rusqlite::Error),
    #[error("Failed to encode user data: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("CSV parse error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, FinanceError>;
