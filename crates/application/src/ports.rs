//! Ports the device MFA service depends on. Infrastructure provides the
//! concrete identity-provider client, durable storage, key store, and
//! TOTP implementation.

mod keystore;
mod provider;
mod storage;
mod totp;

pub use keystore::{KeyHandle, SecureKeyProvider};
pub use provider::{DeviceMetadata, IdentityProvider, RegisteredEnrollment};
pub use storage::EnrollmentRepository;
pub use totp::TotpGenerator;
