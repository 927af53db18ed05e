use crate::store::StoreError;

/// Password hashing errors.
#[derive(thiserror::Error, Debug)]
pub enum PasswordError {
    #[error("Failed to generate a password salt")]
    Salt,

    #[error("Stored password hash is malformed")]
    Malformed,

    #[error(transparent)]
    Task(#[from] tokio::task::JoinError),
}

/// Token issuance and verification errors.
#[derive(thiserror::Error, Debug)]
pub enum TokenError {
    #[error("Token is malformed")]
    Malformed,

    #[error("Unsupported token algorithm {0}")]
    UnsupportedAlgorithm(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token has expired")]
    Expired,

    #[error("Token has been revoked")]
    Revoked,

    #[error(transparent)]
    Encoding(#[from] serde_json::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<base64::DecodeError> for TokenError {
    fn from(_: base64::DecodeError) -> Self {
        TokenError::Malformed
    }
}
