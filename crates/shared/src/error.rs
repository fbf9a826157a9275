//! Error types for Helpdesk

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HelpdeskError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result type for store operations
pub type HelpdeskResult<T> = Result<T, HelpdeskError>;
