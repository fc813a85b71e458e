use std::time::{SystemTime, UNIX_EPOCH};

use authega_core::{MfaError, MfaResult};

use super::{DeviceMfaService, LookupPolicy, resolve};

impl DeviceMfaService {
    /// Returns the current one-time code for an enrollment, left-padded
    /// with `0` to the enrollment's digit width. An empty or absent id
    /// falls back to the first enrollment.
    pub async fn get_totp(&self, enrollment_id: Option<&str>) -> MfaResult<String> {
        let guard = self.session.read().await;
        let session = guard.as_ref().ok_or(MfaError::NotInitialized)?;

        let enrollment = resolve(
            &session.enrollments,
            enrollment_id,
            LookupPolicy::ExactOrDefaultFirst,
        )?;

        let params = enrollment.totp.as_ref().ok_or_else(|| {
            MfaError::TotpNotConfigured(format!(
                "enrollment '{}' has no TOTP secret",
                enrollment.id
            ))
        })?;

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|error| MfaError::Validation(format!("system clock before epoch: {error}")))?
            .as_secs();

        let code = self.totp.generate_at(params, now)?;
        Ok(format!("{code:0>width$}", width = params.digits as usize))
    }
}
