use std::collections::HashMap;

use authega_core::{MfaError, MfaResult};
use authega_domain::{Challenge, ChallengeResponse};
use tracing::info;

use super::{DeviceMfaService, LookupPolicy, resolve};

impl DeviceMfaService {
    /// Approves the login challenge in `payload`.
    pub async fn allow(&self, payload: &HashMap<String, String>) -> MfaResult<()> {
        self.respond(payload, true).await
    }

    /// Rejects the login challenge in `payload`.
    pub async fn reject(&self, payload: &HashMap<String, String>) -> MfaResult<()> {
        self.respond(payload, false).await
    }

    /// Decodes a push payload, signs the accept/reject response under
    /// the enrollment's keypair, and submits it to the provider.
    ///
    /// The enrollment lookup is exact: an unmatched challenge fails with
    /// `EnrollmentNotFound` and never falls back to another enrollment.
    /// The operation has no durable side effects regardless of outcome.
    pub async fn respond(&self, payload: &HashMap<String, String>, accept: bool) -> MfaResult<()> {
        let challenge = Challenge::from_payload(payload)?;

        let (base_url, key_handle, device_token) = {
            let guard = self.session.read().await;
            let session = guard.as_ref().ok_or(MfaError::NotInitialized)?;
            let target = resolve(
                &session.enrollments,
                Some(&challenge.enrollment_id),
                LookupPolicy::Exact,
            )?;
            (
                session.base_url.clone(),
                session.key_handle.clone(),
                target.device_token.clone(),
            )
        };

        let response = ChallengeResponse::for_challenge(&challenge, accept);
        let message = response.signing_input()?;
        let signature = self.keys.sign(&key_handle, &message)?;

        self.provider
            .submit_challenge_response(&base_url, &response, &device_token, &signature)
            .await?;

        info!(
            enrollment_id = %challenge.enrollment_id,
            accept,
            "challenge response submitted"
        );
        Ok(())
    }
}
