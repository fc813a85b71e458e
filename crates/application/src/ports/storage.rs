use async_trait::async_trait;
use authega_core::MfaResult;
use authega_domain::Enrollment;

/// Repository port for enrollment persistence.
///
/// The store holds the full collection as one opaque serialized value
/// under a fixed storage key; every mutation is a full read-modify-write
/// performed by the service under its single mutation gate. Order must
/// be preserved: `load_all` returns records in the order `save_all`
/// received them.
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Loads every persisted enrollment, in insertion order.
    async fn load_all(&self) -> MfaResult<Vec<Enrollment>>;

    /// Replaces the persisted collection.
    async fn save_all(&self, enrollments: &[Enrollment]) -> MfaResult<()>;
}
