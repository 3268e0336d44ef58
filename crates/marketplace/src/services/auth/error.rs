//! Authentication error types.

use thiserror::Error;

use crate::session::SessionError;

/// Errors that can occur during phone OTP authentication.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid phone number format.
    #[error("invalid phone number: {0}")]
    InvalidPhone(#[from] farm_connect_core::PhoneError),

    /// Login attempted for a phone without a completed profile.
    #[error("phone number is not registered")]
    NotRegistered,

    /// Wrong one-time code.
    #[error("invalid OTP")]
    InvalidOtp,

    /// Session could not be saved.
    #[error("session error: {0}")]
    Session(#[from] SessionError),
}
