use crate::auth::{PasswordError, TokenError};
use crate::domain::models::RequestStatus;
use crate::store::StoreError;

/// Errors raised by the service layer.
///
/// The display text of the client-facing variants is the message returned to
/// the caller.
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("{0}")]
    Validation(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("User is not a resident")]
    NotResident,

    #[error("Invalid document type")]
    UnknownDocumentType,

    #[error("Invalid status")]
    InvalidStatus(String),

    #[error("Cannot change status from {from} to {to}")]
    InvalidTransition {
        from: RequestStatus,
        to: RequestStatus,
    },

    #[error("No valid fields to update")]
    NoFieldsToUpdate,

    #[error("Only pending requests can be deleted")]
    NotPending,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Access denied. This account is not authorized for barangay access.")]
    NotBarangayAccount,

    #[error("Please use the barangay login portal.")]
    NotResidentAccount,

    #[error("Current password is incorrect")]
    IncorrectPassword,

    #[error("Could not allocate a unique tracking number")]
    TrackingNumberExhausted,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    /// Whether the error is a server-side failure rather than a rule the
    /// caller broke.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            DomainError::Store(_)
                | DomainError::Password(_)
                | DomainError::Token(_)
                | DomainError::TrackingNumberExhausted
        )
    }
}
