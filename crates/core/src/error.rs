#[derive(Debug, thiserror::Error)]
pub enum PatientError {
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),
    #[error("patient {0} not found")]
    NotFound(i64),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to read file: {0}")]
    FileRead(std::io::Error),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("terminology error: {0}")]
    Terminology(#[from] terminology::TerminologyError),
}

impl PatientError {
    /// True for errors caused by the caller's input rather than a system fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PatientError::MissingRequiredField(_) | PatientError::NotFound(_)
        )
    }
}

pub type PatientResult<T> = std::result::Result<T, PatientError>;
