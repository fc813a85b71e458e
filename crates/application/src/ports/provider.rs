use async_trait::async_trait;
use authega_core::MfaResult;
use authega_domain::{ChallengeResponse, EnrollmentTicket, TotpParameters};
use url::Url;

/// Device metadata submitted with an enrollment request.
#[derive(Debug, Clone)]
pub struct DeviceMetadata {
    /// Stable per-installation identifier.
    pub identifier: String,
    /// Human-readable device label.
    pub name: String,
    /// Token the provider should use to push notifications here.
    pub push_token: String,
}

/// Provider response to a successful enrollment exchange.
#[derive(Debug, Clone)]
pub struct RegisteredEnrollment {
    /// Provider-assigned enrollment identifier.
    pub id: String,
    /// End-user identity the enrollment was created for.
    pub user_id: String,
    /// Per-device API token for subsequent provider calls.
    pub device_token: String,
    /// TOTP fallback factor, when the provider issued one.
    pub totp: Option<TotpParameters>,
}

/// Port for the identity-provider exchange.
///
/// `base` is the active tenant base URL established at initialize time
/// (or the per-ticket override). Implementations report failures as the
/// error kind of the operation: `EnrollmentFailed` for registration,
/// `UnenrollmentFailed` for revocation, `ChallengeResponseFailed` for
/// challenge submissions, each carrying the underlying cause. No
/// retries: the calling application decides whether to retry.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Registers this device under an enrollment ticket, submitting the
    /// one-time secret, push token, device metadata, and public key.
    async fn register_enrollment(
        &self,
        base: &Url,
        ticket: &EnrollmentTicket,
        device: &DeviceMetadata,
        public_key_der: &[u8],
    ) -> MfaResult<RegisteredEnrollment>;

    /// Revokes the device registration behind an enrollment.
    async fn revoke_enrollment(
        &self,
        base: &Url,
        enrollment_id: &str,
        device_token: &str,
    ) -> MfaResult<()>;

    /// Submits a signed accept/reject response for a login challenge.
    async fn submit_challenge_response(
        &self,
        base: &Url,
        response: &ChallengeResponse,
        device_token: &str,
        signature: &[u8],
    ) -> MfaResult<()>;
}
