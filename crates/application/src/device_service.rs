//! Device MFA application service.
//!
//! Owns the process-wide session: the active tenant base URL, the signing
//! key handle, and the in-memory mirror of the enrollment store. The
//! mirror is the single owned copy, guarded by one lock; the repository
//! is the sole persistence boundary and every mutation is a full
//! read-modify-write performed while the write half of that lock is held.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};
use url::Url;

use authega_core::{MfaError, MfaResult};
use authega_domain::{DeviceInfo, Enrollment};

use crate::ports::{
    EnrollmentRepository, IdentityProvider, KeyHandle, SecureKeyProvider, TotpGenerator,
};

/// How an enrollment lookup treats an empty or absent id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupPolicy {
    /// Only an exact id match resolves. Used for challenge response:
    /// approving under the wrong device's identity is a security defect,
    /// so an unmatched challenge never falls back to another enrollment.
    Exact,
    /// An empty or absent id resolves to the first enrollment in store
    /// order. Single-device convenience for TOTP and unenroll.
    ExactOrDefaultFirst,
}

/// Session state established by `initialize`.
struct Session {
    base_url: Url,
    key_handle: KeyHandle,
    enrollments: Vec<Enrollment>,
}

/// Application service for device enrollment, TOTP, and challenge
/// response.
pub struct DeviceMfaService {
    provider: Arc<dyn IdentityProvider>,
    repository: Arc<dyn EnrollmentRepository>,
    keys: Arc<dyn SecureKeyProvider>,
    totp: Arc<dyn TotpGenerator>,
    device: DeviceInfo,
    session: RwLock<Option<Session>>,
}

impl DeviceMfaService {
    /// Creates a service over the given ports and device identity. No
    /// operation beyond construction succeeds until [`Self::initialize`]
    /// has completed.
    #[must_use]
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        repository: Arc<dyn EnrollmentRepository>,
        keys: Arc<dyn SecureKeyProvider>,
        totp: Arc<dyn TotpGenerator>,
        device: DeviceInfo,
    ) -> Self {
        Self {
            provider,
            repository,
            keys,
            totp,
            device,
            session: RwLock::new(None),
        }
    }

    /// Establishes the session for a provider tenant: gets or creates
    /// the signing keypair under the installation identifier and re-reads
    /// the enrollment store.
    ///
    /// A storage failure on load degrades to an empty enrollment set
    /// rather than blocking initialization: a corrupt local store must
    /// not make the device permanently un-enrollable.
    pub async fn initialize(&self, provider_domain: &str) -> MfaResult<()> {
        let domain = provider_domain.trim();
        if domain.is_empty() {
            return Err(MfaError::Validation(
                "provider domain must not be empty".to_owned(),
            ));
        }

        let base_url = Url::parse(&format!("https://{domain}")).map_err(|error| {
            MfaError::Validation(format!("invalid provider domain '{domain}': {error}"))
        })?;

        let key_handle = self.keys.get_or_create_keypair(&self.device.identifier)?;

        let enrollments = match self.repository.load_all().await {
            Ok(enrollments) => enrollments,
            Err(error) => {
                warn!(%error, "enrollment store unreadable, starting with an empty session");
                Vec::new()
            }
        };

        info!(
            domain,
            enrollments = enrollments.len(),
            "device MFA session initialized"
        );

        let mut guard = self.session.write().await;
        *guard = Some(Session {
            base_url,
            key_handle,
            enrollments,
        });
        Ok(())
    }

    /// Returns the current enrollments in store (insertion) order.
    pub async fn get_enrollments(&self) -> MfaResult<Vec<Enrollment>> {
        let guard = self.session.read().await;
        let session = guard.as_ref().ok_or(MfaError::NotInitialized)?;
        Ok(session.enrollments.clone())
    }
}

/// Resolves an enrollment by id under the given lookup policy.
fn resolve<'a>(
    enrollments: &'a [Enrollment],
    enrollment_id: Option<&str>,
    policy: LookupPolicy,
) -> MfaResult<&'a Enrollment> {
    match enrollment_id.filter(|id| !id.is_empty()) {
        Some(id) => enrollments
            .iter()
            .find(|enrollment| enrollment.id == id)
            .ok_or_else(|| MfaError::EnrollmentNotFound(format!("no enrollment with id '{id}'"))),
        None => match policy {
            LookupPolicy::Exact => Err(MfaError::EnrollmentNotFound(
                "an explicit enrollment id is required".to_owned(),
            )),
            LookupPolicy::ExactOrDefaultFirst => {
                if enrollments.len() > 1 {
                    warn!(
                        enrollments = enrollments.len(),
                        "empty enrollment id resolved to the first of several enrollments; \
                         pass an explicit id on multi-enrollment devices"
                    );
                }
                enrollments.first().ok_or_else(|| {
                    MfaError::EnrollmentNotFound("no enrollments are stored".to_owned())
                })
            }
        },
    }
}

mod challenge;
mod enrollment;
mod totp;
