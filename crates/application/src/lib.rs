//! Application service and ports for device MFA.

#![forbid(unsafe_code)]

mod device_service;
mod ports;

pub use device_service::{DeviceMfaService, LookupPolicy};
pub use ports::{
    DeviceMetadata, EnrollmentRepository, IdentityProvider, KeyHandle, RegisteredEnrollment,
    SecureKeyProvider, TotpGenerator,
};
