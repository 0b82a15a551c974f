//! Contract error types for the shop service
//!
//! These errors are transport-agnostic and used for in-process communication.

/// Shop service domain errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShopError {
    /// Caller-supplied data is missing or malformed; nothing was written
    #[error("Validation error: {message}")]
    Validation {
        /// Validation error message
        message: String,
    },
    /// A referenced parent record does not exist
    #[error("{resource} not found: {id}")]
    NotFound {
        /// Resource type (customer, vehicle, task, invoice, photo)
        resource: &'static str,
        /// Resource identifier
        id: String,
    },
    /// A configured policy refuses the operation
    #[error("Conflict: {reason}")]
    Conflict {
        /// Conflict reason
        reason: String,
    },
    /// The store rejected a write on a unique or foreign key
    #[error("Constraint violation: {cause}")]
    ConstraintViolation {
        /// Underlying store error chain
        cause: String,
    },
    /// The store failed; any enclosing transaction was rolled back
    #[error("Persistence error: {cause}")]
    Persistence {
        /// Underlying store error chain
        cause: String,
    },
}

impl ShopError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    /// True for every failure reported by the store, constraint violations included
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence { .. } | Self::ConstraintViolation { .. })
    }
}
