use segcheck_engine::CheckError;
use thiserror::Error;

/// Every collected case passed, or nothing was collected
pub const EXIT_OK: i32 = 0;
/// At least one case failed or errored
pub const EXIT_TESTS_FAILED: i32 = 1;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Collection error: {0}")]
    Collection(#[source] CheckError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Process exit code, following the pytest convention
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Collection(_) => 2,
            AppError::InvalidInput(_) | AppError::ParseError(_) => 4,
            AppError::Io(_) | AppError::Initialization(_) | AppError::Serialization(_) => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let collection = AppError::Collection(CheckError::InvalidUrl {
            url: "x".into(),
            reason: "relative URL without a base".into(),
        });
        assert_eq!(collection.exit_code(), 2);
        assert_eq!(AppError::Initialization("logger".into()).exit_code(), 3);
        assert_eq!(AppError::InvalidInput("bad".into()).exit_code(), 4);
        assert_eq!(AppError::ParseError("bad".into()).exit_code(), 4);
    }
}
