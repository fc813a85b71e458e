//! Domain types for device MFA enrollment and challenge response.

#![forbid(unsafe_code)]

mod challenge;
mod device;
mod enrollment;
mod enrollment_uri;

pub use challenge::{Challenge, ChallengeResponse};
pub use device::DeviceInfo;
pub use enrollment::{
    DEFAULT_TOTP_DIGITS, DEFAULT_TOTP_PERIOD, Enrollment, TotpAlgorithm, TotpParameters,
};
pub use enrollment_uri::EnrollmentTicket;
