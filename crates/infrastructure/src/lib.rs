//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod file_enrollment_repository;
mod http_identity_provider;
mod in_memory_enrollment_repository;
mod rsa_key_provider;
mod totp_rs_generator;

pub use file_enrollment_repository::{FileEnrollmentRepository, STORAGE_FILE_NAME};
pub use http_identity_provider::HttpIdentityProvider;
pub use in_memory_enrollment_repository::InMemoryEnrollmentRepository;
pub use rsa_key_provider::RsaKeyProvider;
pub use totp_rs_generator::TotpRsGenerator;

#[cfg(test)]
mod tests;
