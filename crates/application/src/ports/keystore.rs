use authega_core::MfaResult;

/// Opaque reference to a keypair held in secure storage.
///
/// Only the provider that issued the handle can resolve it; private key
/// material never crosses this boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyHandle(String);

impl KeyHandle {
    /// Wraps the identifier a keypair is stored under.
    #[must_use]
    pub fn new(identifier: impl Into<String>) -> Self {
        Self(identifier.into())
    }

    /// Returns the storage identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Port for the platform-backed secure key store.
///
/// Implementations should use hardware-backed storage where the platform
/// offers one (Keychain, Android Keystore, TPM); a file-backed key is
/// acceptable for desktop and test use. Signing failures (invalid
/// handle, locked or corrupted store) surface as `KeySigning`.
pub trait SecureKeyProvider: Send + Sync {
    /// Returns the keypair stored under `installation_id`, generating a
    /// new asymmetric keypair (RSA 2048-bit or stronger) on first use.
    /// Idempotent: the public key stays stable for the installation's
    /// lifetime.
    fn get_or_create_keypair(&self, installation_id: &str) -> MfaResult<KeyHandle>;

    /// Exports the public key in a form suitable for provider
    /// registration (DER-encoded SubjectPublicKeyInfo).
    fn public_key(&self, handle: &KeyHandle) -> MfaResult<Vec<u8>>;

    /// Signs a message with the private key behind `handle`.
    fn sign(&self, handle: &KeyHandle, message: &[u8]) -> MfaResult<Vec<u8>>;
}
