// ⚠️ Errors - Failures surfaced by the session, store, and edit helpers
//
// Malformed stored fields are never errors: the reconciler normalizes them
// to defaults. Only storage failures and rejected edits surface here.

use thiserror::Error;

/// Result type alias using `FinanceError`.
pub type Result<T> = std::result::Result<T, FinanceError>;

/// Errors surfaced to callers of the session and edit helpers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FinanceError {
    /// A subscription or read delivered an error instead of a snapshot.
    #[error("Storage read error: {0}")]
    StorageRead(String),

    /// A merge-write failed. In-memory state is left untouched.
    #[error("Storage write error: {0}")]
    StorageWrite(String),

    /// Account type not valid for its category.
    #[error("Invalid account: {0}")]
    InvalidAccount(String),

    /// Category/bucket pair that names no known bucket.
    #[error("Unknown bucket: {0}")]
    UnknownBucket(String),

    /// Request payload could not be decoded.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Edit referenced an id that does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl FinanceError {
    /// Short machine-readable code for API responses.
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::StorageRead(_) => "STORAGE_READ_ERROR",
            Self::StorageWrite(_) => "STORAGE_WRITE_ERROR",
            Self::InvalidAccount(_) => "INVALID_ACCOUNT",
            Self::UnknownBucket(_) => "UNKNOWN_BUCKET",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Config(_) => "CONFIG_ERROR",
        }
    }

    /// HTTP status the server maps this error to.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::InvalidAccount(_) | Self::UnknownBucket(_) | Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            Self::StorageRead(_) | Self::StorageWrite(_) | Self::Config(_) => 500,
        }
    }
}

/// Failures raised by a `DocumentStore` implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored body exists but is not a JSON object.
    #[error("corrupt document for user {0}")]
    Corrupt(String),

    /// Store cannot be reached (poisoned lock, closed connection, network).
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<config::ConfigError> for FinanceError {
    fn from(err: config::ConfigError) -> Self {
        FinanceError::Config(err.to_string())
    }
}
