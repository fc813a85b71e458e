//! File-backed RSA signing key provider.
//!
//! Stands in for a platform secure enclave on desktop and server hosts:
//! one 2048-bit RSA keypair per installation identifier, persisted as
//! PKCS#8 PEM under the key directory and cached in memory. Private key
//! material never leaves this module; callers only receive handles and
//! PKCS#1 v1.5 SHA-256 signatures.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use rand::rngs::OsRng;
use rsa::RsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::sha2::Sha256;
use rsa::signature::{SignatureEncoding, Signer};
use tracing::info;

use authega_application::{KeyHandle, SecureKeyProvider};
use authega_core::{MfaError, MfaResult};

const KEY_BITS: usize = 2048;

/// RSA key provider storing keys under a directory.
pub struct RsaKeyProvider {
    dir: PathBuf,
    keys: RwLock<HashMap<String, RsaPrivateKey>>,
}

impl RsaKeyProvider {
    /// Creates a provider that keeps key files under `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            keys: RwLock::new(HashMap::new()),
        }
    }

    fn key_path(&self, installation_id: &str) -> MfaResult<PathBuf> {
        if installation_id.is_empty()
            || installation_id.contains(['/', '\\'])
            || installation_id.contains("..")
        {
            return Err(MfaError::KeySigning(format!(
                "invalid installation id '{installation_id}'"
            )));
        }
        Ok(self.dir.join(format!("{installation_id}.pem")))
    }

    fn with_key<T>(
        &self,
        handle: &KeyHandle,
        operation: impl FnOnce(&RsaPrivateKey) -> MfaResult<T>,
    ) -> MfaResult<T> {
        let keys = self
            .keys
            .read()
            .map_err(|error| MfaError::KeySigning(format!("key cache poisoned: {error}")))?;
        let key = keys.get(handle.as_str()).ok_or_else(|| {
            MfaError::KeySigning(format!("unknown key handle '{}'", handle.as_str()))
        })?;
        operation(key)
    }
}

impl SecureKeyProvider for RsaKeyProvider {
    fn get_or_create_keypair(&self, installation_id: &str) -> MfaResult<KeyHandle> {
        // The write lock is held across the whole load-or-generate
        // sequence: two concurrent first calls must not each generate a
        // keypair and leave the cache disagreeing with the file on disk.
        let mut keys = self
            .keys
            .write()
            .map_err(|error| MfaError::KeySigning(format!("key cache poisoned: {error}")))?;
        if keys.contains_key(installation_id) {
            return Ok(KeyHandle::new(installation_id));
        }

        let path = self.key_path(installation_id)?;
        let key = if path.is_file() {
            let pem = std::fs::read_to_string(&path).map_err(|error| {
                MfaError::KeySigning(format!("cannot read key file {}: {error}", path.display()))
            })?;
            RsaPrivateKey::from_pkcs8_pem(&pem).map_err(|error| {
                MfaError::KeySigning(format!("corrupt key file {}: {error}", path.display()))
            })?
        } else {
            info!(installation_id, "generating device signing keypair");
            let key = RsaPrivateKey::new(&mut OsRng, KEY_BITS)
                .map_err(|error| MfaError::KeySigning(format!("key generation failed: {error}")))?;

            std::fs::create_dir_all(&self.dir).map_err(|error| {
                MfaError::KeySigning(format!(
                    "cannot create key directory {}: {error}",
                    self.dir.display()
                ))
            })?;
            let pem = key.to_pkcs8_pem(LineEnding::LF).map_err(|error| {
                MfaError::KeySigning(format!("key encoding failed: {error}"))
            })?;
            std::fs::write(&path, pem.as_bytes()).map_err(|error| {
                MfaError::KeySigning(format!("cannot write key file {}: {error}", path.display()))
            })?;
            key
        };

        keys.insert(installation_id.to_owned(), key);
        Ok(KeyHandle::new(installation_id))
    }

    fn public_key(&self, handle: &KeyHandle) -> MfaResult<Vec<u8>> {
        self.with_key(handle, |key| {
            key.to_public_key()
                .to_public_key_der()
                .map(|der| der.as_bytes().to_vec())
                .map_err(|error| {
                    MfaError::KeySigning(format!("public key export failed: {error}"))
                })
        })
    }

    fn sign(&self, handle: &KeyHandle, message: &[u8]) -> MfaResult<Vec<u8>> {
        self.with_key(handle, |key| {
            let signing_key = SigningKey::<Sha256>::new(key.clone());
            signing_key
                .try_sign(message)
                .map(|signature| signature.to_vec())
                .map_err(|error| MfaError::KeySigning(format!("signing failed: {error}")))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;
    use std::path::PathBuf;

    use rsa::RsaPublicKey;
    use rsa::pkcs1v15::{Signature, VerifyingKey};
    use rsa::pkcs8::DecodePublicKey;
    use rsa::sha2::Sha256;
    use rsa::signature::Verifier;

    use authega_application::{KeyHandle, SecureKeyProvider};
    use authega_core::MfaError;

    use super::RsaKeyProvider;

    fn temp_key_dir() -> PathBuf {
        std::env::temp_dir().join(format!("authega-keys-{}", uuid::Uuid::new_v4()))
    }

    #[test]
    fn keypair_is_created_once_and_survives_a_new_provider() -> Result<(), Box<dyn Error>> {
        let dir = temp_key_dir();
        let provider = RsaKeyProvider::new(&dir);

        let handle = provider.get_or_create_keypair("install-1")?;
        let first = provider.public_key(&handle)?;

        let handle_again = provider.get_or_create_keypair("install-1")?;
        assert_eq!(provider.public_key(&handle_again)?, first);

        // A fresh provider over the same directory loads the same key.
        let reloaded = RsaKeyProvider::new(&dir);
        let handle = reloaded.get_or_create_keypair("install-1")?;
        assert_eq!(reloaded.public_key(&handle)?, first);

        let _ = std::fs::remove_dir_all(&dir);
        Ok(())
    }

    #[test]
    fn concurrent_first_calls_agree_on_one_keypair() -> Result<(), Box<dyn Error>> {
        let dir = temp_key_dir();
        let provider = RsaKeyProvider::new(&dir);

        let exported: Vec<Vec<u8>> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        let handle = provider.get_or_create_keypair("install-1")?;
                        provider.public_key(&handle)
                    })
                })
                .collect();
            workers
                .into_iter()
                .map(|worker| worker.join().map_err(|_| "worker panicked".to_owned())?
                    .map_err(|error| error.to_string()))
                .collect::<Result<Vec<_>, String>>()
        })?;

        assert!(exported.windows(2).all(|pair| pair[0] == pair[1]));

        // The key on disk is the one every caller was handed.
        let reloaded = RsaKeyProvider::new(&dir);
        let handle = reloaded.get_or_create_keypair("install-1")?;
        assert_eq!(reloaded.public_key(&handle)?, exported[0]);

        let _ = std::fs::remove_dir_all(&dir);
        Ok(())
    }

    #[test]
    fn signatures_verify_against_the_exported_public_key() -> Result<(), Box<dyn Error>> {
        let dir = temp_key_dir();
        let provider = RsaKeyProvider::new(&dir);
        let handle = provider.get_or_create_keypair("install-1")?;

        let message = b"challenge response bytes";
        let signature = provider.sign(&handle, message)?;

        let public = RsaPublicKey::from_public_key_der(&provider.public_key(&handle)?)?;
        let verifying_key = VerifyingKey::<Sha256>::new(public);
        verifying_key.verify(message, &Signature::try_from(signature.as_slice())?)?;

        let _ = std::fs::remove_dir_all(&dir);
        Ok(())
    }

    #[test]
    fn operations_on_an_unknown_handle_fail_with_key_signing() {
        let provider = RsaKeyProvider::new(temp_key_dir());
        let handle = KeyHandle::new("never-created");

        let result = provider.sign(&handle, b"message");
        assert!(matches!(result, Err(MfaError::KeySigning(_))));

        let result = provider.public_key(&handle);
        assert!(matches!(result, Err(MfaError::KeySigning(_))));
    }

    #[test]
    fn rejects_path_traversal_in_installation_ids() {
        let provider = RsaKeyProvider::new(temp_key_dir());
        let result = provider.get_or_create_keypair("../outside");
        assert!(matches!(result, Err(MfaError::KeySigning(_))));
    }
}
