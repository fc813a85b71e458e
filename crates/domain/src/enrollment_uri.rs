//! Enrollment URI parsing.
//!
//! Providers hand the device an `otpauth://totp/...` URI (usually via QR
//! code) carrying the enrollment transaction id, the one-time enrollment
//! secret, and optional TOTP parameters plus a tenant base URL.

use std::collections::HashMap;
use std::str::FromStr;

use authega_core::{MfaError, MfaResult};
use url::Url;

use crate::enrollment::{DEFAULT_TOTP_DIGITS, DEFAULT_TOTP_PERIOD, TotpAlgorithm, TotpParameters};

/// Parsed enrollment URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentTicket {
    /// Provider-side transaction id authorizing this enrollment.
    pub enrollment_tx_id: String,
    /// One-time enrollment secret, base32-encoded. Doubles as the TOTP
    /// secret when the provider response does not carry its own.
    pub secret: String,
    /// Issuer label, when the URI carries one.
    pub issuer: Option<String>,
    /// Account label from the URI path.
    pub user: Option<String>,
    /// Tenant base URL override from the `base_url` parameter.
    pub base_url: Option<Url>,
    /// TOTP algorithm, SHA1 unless stated.
    pub algorithm: TotpAlgorithm,
    /// TOTP code width.
    pub digits: u32,
    /// TOTP period in seconds.
    pub period: u64,
}

impl EnrollmentTicket {
    /// Parses a provider enrollment URI.
    ///
    /// Requires the `otpauth://totp/` form with non-empty
    /// `enrollment_tx_id` and `secret` query parameters; everything else
    /// is optional and defaulted.
    pub fn parse(uri: &str) -> MfaResult<Self> {
        let parsed = Url::parse(uri)
            .map_err(|error| MfaError::InvalidEnrollmentUri(format!("not a valid URI: {error}")))?;

        if parsed.scheme() != "otpauth" {
            return Err(MfaError::InvalidEnrollmentUri(format!(
                "unsupported scheme '{}'",
                parsed.scheme()
            )));
        }

        if parsed.host_str() != Some("totp") {
            return Err(MfaError::InvalidEnrollmentUri(format!(
                "unsupported OTP type '{}'",
                parsed.host_str().unwrap_or_default()
            )));
        }

        let query: HashMap<String, String> = parsed
            .query_pairs()
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        let enrollment_tx_id = required(&query, "enrollment_tx_id")?;
        let secret = required(&query, "secret")?;

        let algorithm = match query.get("algorithm") {
            Some(value) => TotpAlgorithm::from_str(value).map_err(|error| {
                MfaError::InvalidEnrollmentUri(format!("bad algorithm parameter: {error}"))
            })?,
            None => TotpAlgorithm::default(),
        };
        let digits = numeric(&query, "digits", DEFAULT_TOTP_DIGITS)?;
        let period = numeric(&query, "period", DEFAULT_TOTP_PERIOD)?;

        let base_url = match query.get("base_url") {
            Some(value) => Some(Url::parse(value).map_err(|error| {
                MfaError::InvalidEnrollmentUri(format!("bad base_url parameter: {error}"))
            })?),
            None => None,
        };

        let label = parsed.path().trim_start_matches('/');
        let (issuer, user) = match label.split_once(':') {
            Some((issuer, user)) => (non_empty(issuer), non_empty(user)),
            None => (None, non_empty(label)),
        };
        let issuer = query.get("issuer").cloned().or(issuer);

        Ok(Self {
            enrollment_tx_id,
            secret,
            issuer,
            user,
            base_url,
            algorithm,
            digits,
            period,
        })
    }

    /// TOTP parameters carried by the URI itself.
    #[must_use]
    pub fn totp_parameters(&self) -> TotpParameters {
        TotpParameters {
            secret: self.secret.clone(),
            algorithm: self.algorithm,
            digits: self.digits,
            period: self.period,
        }
    }
}

fn required(query: &HashMap<String, String>, key: &str) -> MfaResult<String> {
    query
        .get(key)
        .filter(|value| !value.is_empty())
        .cloned()
        .ok_or_else(|| MfaError::InvalidEnrollmentUri(format!("missing '{key}' parameter")))
}

fn numeric<T: FromStr>(query: &HashMap<String, String>, key: &str, default: T) -> MfaResult<T> {
    match query.get(key) {
        Some(value) => value.parse().map_err(|_| {
            MfaError::InvalidEnrollmentUri(format!("parameter '{key}' is not a number: '{value}'"))
        }),
        None => Ok(default),
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_owned())
    }
}
