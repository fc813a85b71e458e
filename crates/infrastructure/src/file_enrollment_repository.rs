//! JSON-file enrollment store.

use std::path::PathBuf;

use async_trait::async_trait;

use authega_application::EnrollmentRepository;
use authega_core::{MfaError, MfaResult};
use authega_domain::Enrollment;

/// Fixed storage key the serialized collection lives under.
pub const STORAGE_FILE_NAME: &str = "enrollments.json";

/// Enrollment repository persisting the collection as one JSON document.
#[derive(Debug, Clone)]
pub struct FileEnrollmentRepository {
    path: PathBuf,
}

impl FileEnrollmentRepository {
    /// Creates a repository storing [`STORAGE_FILE_NAME`] under `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join(STORAGE_FILE_NAME),
        }
    }
}

#[async_trait]
impl EnrollmentRepository for FileEnrollmentRepository {
    async fn load_all(&self) -> MfaResult<Vec<Enrollment>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|error| {
                MfaError::Storage(format!(
                    "corrupt enrollment store {}: {error}",
                    self.path.display()
                ))
            }),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(error) => Err(MfaError::Storage(format!(
                "cannot read enrollment store {}: {error}",
                self.path.display()
            ))),
        }
    }

    async fn save_all(&self, enrollments: &[Enrollment]) -> MfaResult<()> {
        let encoded = serde_json::to_vec_pretty(enrollments).map_err(|error| {
            MfaError::Storage(format!("cannot encode enrollment store: {error}"))
        })?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|error| {
                MfaError::Storage(format!(
                    "cannot create store directory {}: {error}",
                    parent.display()
                ))
            })?;
        }

        // Write-then-rename so a crash mid-write cannot truncate the store.
        let staging = self.path.with_extension("json.tmp");
        tokio::fs::write(&staging, &encoded).await.map_err(|error| {
            MfaError::Storage(format!(
                "cannot write enrollment store {}: {error}",
                staging.display()
            ))
        })?;
        tokio::fs::rename(&staging, &self.path).await.map_err(|error| {
            MfaError::Storage(format!(
                "cannot replace enrollment store {}: {error}",
                self.path.display()
            ))
        })
    }
}
