//! HTTP client for the identity-provider exchange.
//!
//! Three calls against the tenant base URL:
//! - `POST api/enroll`, authorized by the enrollment ticket, registering
//!   the device and its public key;
//! - `DELETE api/device-accounts/{id}`, authorized by the per-device API
//!   token, revoking the registration;
//! - `POST api/resolve-transaction`, authorized by the per-device API
//!   token, carrying the response payload and its detached signature.
//!
//! Failures map to the error kind of the operation and are never retried
//! here; the calling application decides whether to retry.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use authega_application::{DeviceMetadata, IdentityProvider, RegisteredEnrollment};
use authega_core::{MfaError, MfaResult};
use authega_domain::{ChallengeResponse, EnrollmentTicket, TotpParameters};

/// Identity-provider client over HTTPS.
#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    http_client: reqwest::Client,
}

impl HttpIdentityProvider {
    /// Creates a provider client using the given HTTP client.
    #[must_use]
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

impl Default for HttpIdentityProvider {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

/// Provider response to `POST api/enroll`.
#[derive(Debug, Deserialize)]
struct EnrollResponse {
    id: String,
    user_id: String,
    token: String,
    totp: Option<TotpParameters>,
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn register_enrollment(
        &self,
        base: &Url,
        ticket: &EnrollmentTicket,
        device: &DeviceMetadata,
        public_key_der: &[u8],
    ) -> MfaResult<RegisteredEnrollment> {
        let url = endpoint(base, "api/enroll")?;
        debug!(%url, enrollment_tx_id = %ticket.enrollment_tx_id, "registering device enrollment");

        let body = serde_json::json!({
            "identifier": device.identifier,
            "name": device.name,
            "push_credentials": {
                "service": "FCM",
                "token": device.push_token,
            },
            "public_key": BASE64.encode(public_key_der),
        });

        let response = self
            .http_client
            .post(url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Ticket id=\"{}\"", ticket.enrollment_tx_id),
            )
            .json(&body)
            .send()
            .await
            .map_err(|error| MfaError::EnrollmentFailed(format!("transport error: {error}")))?;
        let response = error_for_status(response, MfaError::EnrollmentFailed).await?;

        let payload: EnrollResponse = response.json().await.map_err(|error| {
            MfaError::EnrollmentFailed(format!("malformed enrollment response: {error}"))
        })?;

        Ok(RegisteredEnrollment {
            id: payload.id,
            user_id: payload.user_id,
            device_token: payload.token,
            totp: payload.totp,
        })
    }

    async fn revoke_enrollment(
        &self,
        base: &Url,
        enrollment_id: &str,
        device_token: &str,
    ) -> MfaResult<()> {
        let url = endpoint(base, &format!("api/device-accounts/{enrollment_id}"))?;
        debug!(%url, enrollment_id, "revoking device enrollment");

        let response = self
            .http_client
            .delete(url)
            .bearer_auth(device_token)
            .send()
            .await
            .map_err(|error| MfaError::UnenrollmentFailed(format!("transport error: {error}")))?;
        error_for_status(response, MfaError::UnenrollmentFailed).await?;
        Ok(())
    }

    async fn submit_challenge_response(
        &self,
        base: &Url,
        response: &ChallengeResponse,
        device_token: &str,
        signature: &[u8],
    ) -> MfaResult<()> {
        let url = endpoint(base, "api/resolve-transaction")?;
        debug!(%url, enrollment_id = %response.enrollment_id, accept = response.accept, "resolving transaction");

        let body = serde_json::json!({
            "challenge_response": response,
            "signature": BASE64.encode(signature),
        });

        let http_response = self
            .http_client
            .post(url)
            .bearer_auth(device_token)
            .json(&body)
            .send()
            .await
            .map_err(|error| {
                MfaError::ChallengeResponseFailed(format!("transport error: {error}"))
            })?;
        error_for_status(http_response, MfaError::ChallengeResponseFailed).await?;
        Ok(())
    }
}

fn endpoint(base: &Url, path: &str) -> MfaResult<Url> {
    base.join(path)
        .map_err(|error| MfaError::Validation(format!("invalid provider URL: {error}")))
}

async fn error_for_status(
    response: reqwest::Response,
    wrap: fn(String) -> MfaError,
) -> MfaResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<response body unavailable>".to_owned());
    Err(wrap(format!("provider returned status {status}: {body}")))
}
