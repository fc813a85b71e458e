//! Shared primitives for all Authega crates.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Result type used across Authega crates.
pub type MfaResult<T> = Result<T, MfaError>;

/// Failure categories for device enrollment and challenge response.
///
/// Validation failures are reported before any network or storage
/// interaction; provider and storage failures carry the originating cause
/// in their message and are never retried by the engine itself.
#[derive(Debug, Error)]
pub enum MfaError {
    /// An operation was invoked before `initialize` completed.
    #[error("engine is not initialized; call initialize first")]
    NotInitialized,

    /// The enrollment URI argument was empty.
    #[error("enrollment URI is not provided")]
    MissingEnrollmentUri,

    /// The push token argument was empty.
    #[error("push token is not provided")]
    MissingPushToken,

    /// The enrollment URI could not be parsed or lacks required fields.
    #[error("invalid enrollment URI: {0}")]
    InvalidEnrollmentUri(String),

    /// The enrollment exchange with the identity provider failed.
    #[error("enrollment failed: {0}")]
    EnrollmentFailed(String),

    /// No stored enrollment matches the requested identifier.
    #[error("no matching enrollment: {0}")]
    EnrollmentNotFound(String),

    /// The identity provider rejected or failed the device revocation.
    #[error("unenrollment failed: {0}")]
    UnenrollmentFailed(String),

    /// The enrollment has no TOTP secret to derive codes from.
    #[error("TOTP is not configured: {0}")]
    TotpNotConfigured(String),

    /// The inbound push payload lacks required challenge fields.
    #[error("invalid challenge payload: {0}")]
    InvalidChallenge(String),

    /// Submitting the signed challenge response failed.
    #[error("challenge response failed: {0}")]
    ChallengeResponseFailed(String),

    /// The secure key store could not produce, export, or sign with a key.
    #[error("key signing error: {0}")]
    KeySigning(String),

    /// Durable storage could not be read or written.
    #[error("storage error: {0}")]
    Storage(String),

    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),
}
