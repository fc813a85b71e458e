use authega_core::{MfaError, MfaResult};
use authega_domain::{Enrollment, EnrollmentTicket};
use tracing::info;

use super::{DeviceMfaService, LookupPolicy, resolve};
use crate::ports::DeviceMetadata;

impl DeviceMfaService {
    /// Enrolls this device under a provider enrollment URI.
    ///
    /// Arguments are validated before any network interaction; on any
    /// exchange failure no partial record is persisted. Two calls with
    /// the same URI yield two independent enrollments unless the
    /// provider itself rejects re-enrollment.
    pub async fn enroll(&self, enrollment_uri: &str, push_token: &str) -> MfaResult<Enrollment> {
        let (base_url, key_handle) = {
            let guard = self.session.read().await;
            let session = guard.as_ref().ok_or(MfaError::NotInitialized)?;
            (session.base_url.clone(), session.key_handle.clone())
        };

        if push_token.trim().is_empty() {
            return Err(MfaError::MissingPushToken);
        }
        if enrollment_uri.trim().is_empty() {
            return Err(MfaError::MissingEnrollmentUri);
        }

        let ticket = EnrollmentTicket::parse(enrollment_uri)?;
        let exchange_base = ticket.base_url.clone().unwrap_or(base_url);

        let public_key = self.keys.public_key(&key_handle)?;
        let device = DeviceMetadata {
            identifier: self.device.identifier.clone(),
            name: self.device.name.clone(),
            push_token: push_token.to_owned(),
        };

        let registered = self
            .provider
            .register_enrollment(&exchange_base, &ticket, &device, &public_key)
            .await?;

        // The URI secret is the TOTP secret when the provider response
        // does not carry its own parameters.
        let totp = registered
            .totp
            .or_else(|| Some(ticket.totp_parameters()));

        let enrollment = Enrollment {
            id: registered.id,
            user_id: registered.user_id,
            device_identifier: self.device.identifier.clone(),
            device_name: self.device.name.clone(),
            device_token: registered.device_token,
            push_token: push_token.to_owned(),
            totp,
        };

        let mut guard = self.session.write().await;
        let session = guard.as_mut().ok_or(MfaError::NotInitialized)?;
        let mut snapshot = session.enrollments.clone();
        snapshot.push(enrollment.clone());
        self.repository.save_all(&snapshot).await?;
        session.enrollments = snapshot;

        info!(enrollment_id = %enrollment.id, user_id = %enrollment.user_id, "device enrolled");
        Ok(enrollment)
    }

    /// Revokes an enrollment with the provider and removes it from the
    /// store. An empty or absent id falls back to the first enrollment.
    ///
    /// The signing keypair is left untouched: it may be shared by future
    /// enrollments on this device.
    pub async fn unenroll(&self, enrollment_id: Option<&str>) -> MfaResult<()> {
        let mut guard = self.session.write().await;
        let session = guard.as_mut().ok_or(MfaError::NotInitialized)?;

        let target = resolve(
            &session.enrollments,
            enrollment_id,
            LookupPolicy::ExactOrDefaultFirst,
        )?
        .clone();

        self.provider
            .revoke_enrollment(&session.base_url, &target.id, &target.device_token)
            .await?;

        let snapshot: Vec<Enrollment> = session
            .enrollments
            .iter()
            .filter(|enrollment| enrollment.id != target.id)
            .cloned()
            .collect();
        self.repository.save_all(&snapshot).await?;
        session.enrollments = snapshot;

        info!(enrollment_id = %target.id, "device unenrolled");
        Ok(())
    }

    /// Replaces the push token of one enrollment and persists the
    /// change. A rotated token supplied to any other operation is never
    /// written back implicitly.
    pub async fn update_push_token(&self, enrollment_id: &str, push_token: &str) -> MfaResult<()> {
        if push_token.trim().is_empty() {
            return Err(MfaError::MissingPushToken);
        }

        let mut guard = self.session.write().await;
        let session = guard.as_mut().ok_or(MfaError::NotInitialized)?;

        resolve(
            &session.enrollments,
            Some(enrollment_id),
            LookupPolicy::Exact,
        )?;

        let snapshot: Vec<Enrollment> = session
            .enrollments
            .iter()
            .map(|enrollment| {
                if enrollment.id == enrollment_id {
                    let mut updated = enrollment.clone();
                    updated.push_token = push_token.to_owned();
                    updated
                } else {
                    enrollment.clone()
                }
            })
            .collect();
        self.repository.save_all(&snapshot).await?;
        session.enrollments = snapshot;

        info!(enrollment_id, "push token updated");
        Ok(())
    }
}
