//! Error types for group operations and the stores behind them.

use thiserror::Error;

/// Business-rule outcomes of group, membership and invitation operations.
///
/// Every variant except `Storage` is a final answer for the caller; none are
/// retried.
#[derive(Debug, Error)]
pub enum GroupError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("User is already a member of this group")]
    AlreadyMember,

    #[error("Invalid or expired invitation code")]
    InvalidOrExpiredCode,

    #[error("Invalid role assignment: {0}")]
    InvalidRoleAssignment(String),

    #[error("You have reached the maximum number of groups ({limit})")]
    QuotaExceeded { limit: i64 },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl GroupError {
    /// HTTP status a transport layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            GroupError::NotFound(_) | GroupError::InvalidOrExpiredCode => 404,
            GroupError::Forbidden(_) => 403,
            GroupError::AlreadyMember
            | GroupError::InvalidRoleAssignment(_)
            | GroupError::QuotaExceeded { .. } => 400,
            GroupError::Validation(_) => 422,
            GroupError::Storage(_) => 500,
        }
    }
}

impl From<validator::ValidationErrors> for GroupError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let messages: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    let message = e.message.clone().map(|m| m.to_string()).unwrap_or_default();
                    format!("{}: {}", field, message)
                })
            })
            .collect();
        GroupError::Validation(messages.join(", "))
    }
}

/// Failures reported by a store implementation.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),

    #[error("Transient store error: {0}")]
    Transient(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Returns true for failures worth retrying (lost connections, serialization conflicts).
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }
}
