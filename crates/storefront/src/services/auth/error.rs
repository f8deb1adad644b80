//! Authentication error types.

use thiserror::Error;

use crate::backend::ApiError;

/// A form field failed local validation.
///
/// The `Display` text is shown to the shopper verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Username is a required field")]
    UsernameRequired,

    #[error("Username must be at least {min} characters")]
    UsernameTooShort { min: usize },

    #[error("Password is a required field")]
    PasswordRequired,

    #[error("Password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("Passwords do not match")]
    PasswordMismatch,
}

/// Errors that can occur during login or registration.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The form was refused before any request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backend call failed or was rejected.
    #[error(transparent)]
    Api(#[from] ApiError),
}
