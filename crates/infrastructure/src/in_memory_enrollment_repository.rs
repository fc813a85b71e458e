//! In-memory enrollment repository for tests and embedded use.

use async_trait::async_trait;
use tokio::sync::RwLock;

use authega_application::EnrollmentRepository;
use authega_core::MfaResult;
use authega_domain::Enrollment;

/// Enrollment repository holding the collection in process memory.
#[derive(Debug, Default)]
pub struct InMemoryEnrollmentRepository {
    enrollments: RwLock<Vec<Enrollment>>,
}

impl InMemoryEnrollmentRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EnrollmentRepository for InMemoryEnrollmentRepository {
    async fn load_all(&self) -> MfaResult<Vec<Enrollment>> {
        Ok(self.enrollments.read().await.clone())
    }

    async fn save_all(&self, enrollments: &[Enrollment]) -> MfaResult<()> {
        let mut guard = self.enrollments.write().await;
        *guard = enrollments.to_vec();
        Ok(())
    }
}
