//! End-to-end wiring of the service over the real local adapters, with
//! only the provider exchange stubbed out.

use std::collections::HashMap;
use std::error::Error;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rsa::RsaPublicKey;
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::DecodePublicKey;
use rsa::sha2::Sha256;
use rsa::signature::Verifier;
use url::Url;

use authega_application::{
    DeviceMetadata, DeviceMfaService, EnrollmentRepository, IdentityProvider, RegisteredEnrollment,
};
use authega_core::{MfaError, MfaResult};
use authega_domain::{ChallengeResponse, DeviceInfo, EnrollmentTicket};

use crate::{InMemoryEnrollmentRepository, RsaKeyProvider, TotpRsGenerator};

const ENROLLMENT_URI: &str =
    "otpauth://totp/Acme:alice?secret=GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ&enrollment_tx_id=tx_1";

#[derive(Default)]
struct RecordingProvider {
    public_keys: Mutex<Vec<Vec<u8>>>,
    submissions: Mutex<Vec<Vec<u8>>>,
}

#[async_trait]
impl IdentityProvider for RecordingProvider {
    async fn register_enrollment(
        &self,
        _base: &Url,
        _ticket: &EnrollmentTicket,
        _device: &DeviceMetadata,
        public_key_der: &[u8],
    ) -> MfaResult<RegisteredEnrollment> {
        self.public_keys
            .lock()
            .map_err(|error| MfaError::Validation(format!("failed to lock stub state: {error}")))?
            .push(public_key_der.to_vec());
        Ok(RegisteredEnrollment {
            id: "dev_1".to_owned(),
            user_id: "user|abc".to_owned(),
            device_token: "devtok_1".to_owned(),
            totp: None,
        })
    }

    async fn revoke_enrollment(
        &self,
        _base: &Url,
        _enrollment_id: &str,
        _device_token: &str,
    ) -> MfaResult<()> {
        Ok(())
    }

    async fn submit_challenge_response(
        &self,
        _base: &Url,
        _response: &ChallengeResponse,
        _device_token: &str,
        signature: &[u8],
    ) -> MfaResult<()> {
        self.submissions
            .lock()
            .map_err(|error| MfaError::Validation(format!("failed to lock stub state: {error}")))?
            .push(signature.to_vec());
        Ok(())
    }
}

fn temp_key_dir() -> PathBuf {
    std::env::temp_dir().join(format!("authega-wiring-{}", uuid::Uuid::new_v4()))
}

#[tokio::test]
async fn get_totp_handles_short_provider_issued_secrets() -> Result<(), Box<dyn Error>> {
    let key_dir = temp_key_dir();
    let service = DeviceMfaService::new(
        Arc::new(RecordingProvider::default()),
        Arc::new(InMemoryEnrollmentRepository::new()),
        Arc::new(RsaKeyProvider::new(key_dir.clone())),
        Arc::new(TotpRsGenerator::new()),
        DeviceInfo::new("install-1", "Test Device"),
    );

    service.initialize("tenant.example.com").await?;

    // A 16-character base32 secret, below the RFC 4226 minimum length.
    let uri = "otpauth://totp/Acme:alice?secret=JBSWY3DPEHPK3PXP&enrollment_tx_id=tx_1";
    service.enroll(uri, "push-token-1").await?;

    let code = service.get_totp(None).await?;
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));

    let _ = std::fs::remove_dir_all(&key_dir);
    Ok(())
}

#[tokio::test]
async fn full_lifecycle_over_real_local_adapters() -> Result<(), Box<dyn Error>> {
    let provider = Arc::new(RecordingProvider::default());
    let repository = Arc::new(InMemoryEnrollmentRepository::new());
    let key_dir = temp_key_dir();
    let service = DeviceMfaService::new(
        provider.clone(),
        repository.clone(),
        Arc::new(RsaKeyProvider::new(key_dir.clone())),
        Arc::new(TotpRsGenerator::new()),
        DeviceInfo::new("install-1", "Test Device"),
    );

    service.initialize("tenant.example.com").await?;
    assert!(service.get_enrollments().await?.is_empty());

    let enrollment = service.enroll(ENROLLMENT_URI, "push-token-1").await?;
    assert_eq!(enrollment.id, "dev_1");
    assert_eq!(repository.load_all().await?.len(), 1);

    let code = service.get_totp(None).await?;
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));

    // The signature submitted for a challenge must verify against the
    // public key registered at enrollment time.
    let payload: HashMap<String, String> = [
        ("enrollmentId", "dev_1"),
        ("transactionToken", "txtkn_9"),
    ]
    .into_iter()
    .map(|(key, value)| (key.to_owned(), value.to_owned()))
    .collect();
    service.allow(&payload).await?;

    let registered_key = provider
        .public_keys
        .lock()
        .ok()
        .and_then(|guard| guard.first().cloned())
        .ok_or("no public key registered")?;
    let signature = provider
        .submissions
        .lock()
        .ok()
        .and_then(|guard| guard.first().cloned())
        .ok_or("no challenge response submitted")?;

    let expected_message = ChallengeResponse {
        enrollment_id: "dev_1".to_owned(),
        transaction_token: "txtkn_9".to_owned(),
        transaction_linking_id: None,
        accept: true,
    }
    .signing_input()?;

    let public = RsaPublicKey::from_public_key_der(&registered_key)?;
    let verifying_key = VerifyingKey::<Sha256>::new(public);
    verifying_key.verify(&expected_message, &Signature::try_from(signature.as_slice())?)?;

    service.unenroll(Some("dev_1")).await?;
    assert!(repository.load_all().await?.is_empty());

    let _ = std::fs::remove_dir_all(&key_dir);
    Ok(())
}
