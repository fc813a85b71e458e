//! Device identity presented to the identity provider.

use uuid::Uuid;

/// Stable identity of this installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Per-installation identifier; also names the signing keypair.
    pub identifier: String,
    /// Human-readable device label (model name or similar).
    pub name: String,
}

impl DeviceInfo {
    /// Creates a device identity from known values.
    #[must_use]
    pub fn new(identifier: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
        }
    }

    /// Creates a device identity with a freshly generated identifier.
    ///
    /// Callers must persist the identifier themselves if it has to stay
    /// stable across restarts.
    #[must_use]
    pub fn generate(name: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4().to_string(), name)
    }
}
