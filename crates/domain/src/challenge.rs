//! Challenge decoding and response payload construction.
//!
//! A challenge is ephemeral: decoded from an inbound push payload, acted
//! on once, never persisted. Push envelopes differ per platform, so field
//! lookup accepts both camelCase and snake_case key spellings.

use std::collections::HashMap;

use authega_core::{MfaError, MfaResult};
use serde::Serialize;

/// Login-approval request decoded from an inbound push payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    /// Target enrollment identifier.
    pub enrollment_id: String,
    /// Provider-issued nonce identifying this login attempt.
    pub transaction_token: String,
    /// Correlates request and response on the provider side.
    pub transaction_linking_id: Option<String>,
    /// Requesting location, display only.
    pub location: Option<String>,
    /// Requesting browser/OS description, display only.
    pub source: Option<String>,
    /// Challenge code shown to the user, display only.
    pub code: Option<String>,
}

impl Challenge {
    /// Decodes a push payload into a challenge.
    ///
    /// `enrollmentId` and `transactionToken` are required; everything else
    /// is carried through for display when present.
    pub fn from_payload(payload: &HashMap<String, String>) -> MfaResult<Self> {
        let enrollment_id = required(payload, &["enrollmentId", "enrollment_id"])?;
        let transaction_token = required(payload, &["transactionToken", "transaction_token"])?;

        Ok(Self {
            enrollment_id,
            transaction_token,
            transaction_linking_id: optional(
                payload,
                &["transactionLinkingId", "transaction_linking_id"],
            ),
            location: optional(payload, &["location"]),
            source: optional(payload, &["source", "browser"]),
            code: optional(payload, &["challengeCode", "challenge_code"]),
        })
    }
}

fn required(payload: &HashMap<String, String>, keys: &[&str]) -> MfaResult<String> {
    optional(payload, keys).ok_or_else(|| {
        MfaError::InvalidChallenge(format!("push payload is missing field '{}'", keys[0]))
    })
}

fn optional(payload: &HashMap<String, String>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| payload.get(*key))
        .find(|value| !value.is_empty())
        .cloned()
}

/// Provider-defined response payload for one challenge.
///
/// The canonical JSON encoding of this struct is the exact byte sequence
/// the device signs; the provider verifies the signature against the
/// public key registered at enrollment time.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    /// Enrollment the response is issued under.
    pub enrollment_id: String,
    /// Transaction being accepted or rejected.
    pub transaction_token: String,
    /// Provider-side correlation id, when the challenge carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_linking_id: Option<String>,
    /// `true` to approve the login attempt, `false` to reject it.
    pub accept: bool,
}

impl ChallengeResponse {
    /// Builds the response payload for a decoded challenge.
    #[must_use]
    pub fn for_challenge(challenge: &Challenge, accept: bool) -> Self {
        Self {
            enrollment_id: challenge.enrollment_id.clone(),
            transaction_token: challenge.transaction_token.clone(),
            transaction_linking_id: challenge.transaction_linking_id.clone(),
            accept,
        }
    }

    /// Canonical byte sequence to sign.
    pub fn signing_input(&self) -> MfaResult<Vec<u8>> {
        serde_json::to_vec(self).map_err(|error| {
            MfaError::Validation(format!("failed to encode challenge response: {error}"))
        })
    }
}
