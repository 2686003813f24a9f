use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong email or wrong password. Callers must never learn which.
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Email not verified")]
    EmailNotVerified,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    /// Unique-constraint violation (live email or token digest).
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// Covers "no such record", "expired" and "already used" alike so the
    /// API response cannot distinguish them.
    #[error("Record not found")]
    NotFound,
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid email format: {0}")]
    InvalidEmail(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    #[error("Invalid field: {0}")]
    InvalidField(String),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

impl Error {
    /// True for errors that surface as a generic token failure (not found,
    /// expired, already used).
    pub fn is_token_rejection(&self) -> bool {
        matches!(self, Error::Storage(StorageError::NotFound))
    }

    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Error::Storage(StorageError::Duplicate(_)))
    }
}
