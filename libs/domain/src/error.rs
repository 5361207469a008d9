//! Error kinds surfaced by the scheduling and commission core

use thiserror::Error;
use uuid::Uuid;

use crate::store::StoreError;

/// Error type for every core operation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// No principal was supplied with the call
    #[error("Unauthorized")]
    Unauthorized,

    /// The principal is authenticated but not entitled to the resource
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested entity does not exist
    #[error("{entity} not found with ID {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// Malformed or missing input
    #[error("Validation error: {0}")]
    Validation(String),

    /// A status change that the lifecycle does not allow
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// The order has already been forwarded to the platform admin
    #[error("Order {0} already forwarded to admin")]
    AlreadyForwarded(Uuid),

    /// A uniqueness constraint was violated at the store
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Opaque persistence failure
    #[error("Store error: {0}")]
    Store(String),
}

impl DomainError {
    pub(crate) fn not_found(entity: &'static str, id: Uuid) -> Self {
        DomainError::NotFound { entity, id }
    }

    pub(crate) fn invalid_transition(from: impl ToString, to: impl ToString) -> Self {
        DomainError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => DomainError::NotFound { entity, id },
            StoreError::Conflict(msg) => DomainError::Conflict(msg),
            StoreError::Backend(msg) => DomainError::Store(msg),
        }
    }
}

/// Type alias for Result with DomainError
pub type DomainResult<T> = Result<T, DomainError>;
