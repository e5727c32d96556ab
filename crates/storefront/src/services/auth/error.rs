//! Authentication error types.

use thiserror::Error;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The identifier cannot be used as a display name.
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(#[from] emporium_core::DisplayNameError),

    /// Password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// Credentials were rejected.
    #[error("invalid credentials")]
    InvalidCredentials,
}
