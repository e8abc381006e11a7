use thiserror::Error;

use crate::validation::{PasswordError, UsernameError};

/// Errors that can arise while interacting with the account store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Wrapper around sled's error type.
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    /// Wrapper around bincode serialization and deserialization errors.
    #[error("serialization error: {0}")]
    Bincode(#[from] bincode::Error),

    /// Wrapper around IO errors (directory creation, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Returned when fetching a record that is not present.
    #[error("record not found: {0}")]
    NotFound(String),

    /// Returned when deserializing a record with an unexpected schema version.
    #[error("schema mismatch for {entity}: expected {expected}, got {found}")]
    SchemaMismatch {
        entity: &'static str,
        expected: u8,
        found: u8,
    },

    #[error("Username '{0}' is already taken")]
    UsernameTaken(String),

    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    #[error("{0}")]
    InvalidPassword(#[from] PasswordError),

    /// Hashing failed or a stored hash could not be parsed.
    #[error("password hash error: {0}")]
    PasswordHash(String),

    /// A blocking store call panicked or was cancelled.
    #[error("store task failed: {0}")]
    Task(String),
}

impl StoreError {
    /// Errors caused by what the player typed rather than by the store itself.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            StoreError::UsernameTaken(_)
                | StoreError::InvalidUsername(_)
                | StoreError::InvalidPassword(_)
        )
    }
}
