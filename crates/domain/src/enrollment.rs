//! Enrollment record and TOTP parameter types.
//!
//! `Enrollment` is the durable record binding this device to one identity
//! provider registration. The serialized form is the flat camelCase record
//! the storage contract fixes: TOTP fields sit next to the device fields
//! and are omitted entirely when no TOTP factor was issued.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use authega_core::{MfaError, MfaResult};
use serde::{Deserialize, Serialize};

/// HMAC algorithm used for TOTP code generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TotpAlgorithm {
    /// HMAC-SHA1 (RFC 6238 default).
    #[default]
    Sha1,
    /// HMAC-SHA256.
    Sha256,
    /// HMAC-SHA512.
    Sha512,
}

impl FromStr for TotpAlgorithm {
    type Err = MfaError;

    fn from_str(value: &str) -> MfaResult<Self> {
        match value.to_ascii_lowercase().as_str() {
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            other => Err(MfaError::Validation(format!(
                "unsupported TOTP algorithm '{other}'"
            ))),
        }
    }
}

impl Display for TotpAlgorithm {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        };
        write!(formatter, "{name}")
    }
}

/// Default TOTP code width in digits.
pub const DEFAULT_TOTP_DIGITS: u32 = 6;

/// Default TOTP period in seconds.
pub const DEFAULT_TOTP_PERIOD: u64 = 30;

/// TOTP factor parameters issued at enrollment time.
///
/// A present secret always travels with algorithm, digits, and period;
/// absent fields fall back to the RFC 6238 defaults on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotpParameters {
    /// Base32-encoded shared secret.
    pub secret: String,
    /// HMAC algorithm, SHA1 unless the provider says otherwise.
    #[serde(default)]
    pub algorithm: TotpAlgorithm,
    /// Code width in digits.
    #[serde(default = "default_digits")]
    pub digits: u32,
    /// Code rotation period in seconds.
    #[serde(default = "default_period")]
    pub period: u64,
}

impl TotpParameters {
    /// Creates parameters with the RFC 6238 defaults for a given secret.
    #[must_use]
    pub fn with_defaults(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            algorithm: TotpAlgorithm::default(),
            digits: DEFAULT_TOTP_DIGITS,
            period: DEFAULT_TOTP_PERIOD,
        }
    }
}

fn default_digits() -> u32 {
    DEFAULT_TOTP_DIGITS
}

fn default_period() -> u64 {
    DEFAULT_TOTP_PERIOD
}

/// Durable record of one device registration with one provider tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    /// Provider-assigned enrollment identifier, unique within the store.
    pub id: String,
    /// End-user identity this enrollment belongs to.
    pub user_id: String,
    /// Stable per-installation device identifier.
    pub device_identifier: String,
    /// Human-readable device label.
    pub device_name: String,
    /// Provider-issued per-device API token; bearer credential for
    /// revocation and challenge-response submissions.
    pub device_token: String,
    /// Opaque token the provider uses to push notifications to this
    /// device. Mutable: device tokens rotate.
    #[serde(rename = "notificationToken")]
    pub push_token: String,
    /// TOTP fallback factor, when the provider issued one.
    #[serde(flatten)]
    pub totp: Option<TotpParameters>,
}
