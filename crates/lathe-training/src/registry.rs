use crate::artifacts::{sha256_file, ModelArtifact};
use crate::error::ModelStoreError;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

pub type ModelStoreResult<T> = std::result::Result<T, ModelStoreError>;

/// The single model slot. Each `save` replaces the previous artifact wholesale.
pub trait ModelRepository: Send + Sync {
    /// Overwrite the slot. Readers see either the old or the new artifact, never a mix.
    fn save(&self, artifact: &ModelArtifact) -> ModelStoreResult<()>;

    /// `Ok(None)` when nothing has been trained yet.
    fn load(&self) -> ModelStoreResult<Option<ModelArtifact>>;

    /// Empty the slot. Clearing an empty slot is not an error.
    fn clear(&self) -> ModelStoreResult<()>;
}

/// Model slot stored as one JSON file at a fixed path.
#[derive(Debug, Clone)]
pub struct FileModelRepository {
    path: PathBuf,
}

impl FileModelRepository {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> ModelStoreError {
        ModelStoreError::Io { path: self.path.clone(), source }
    }
}

impl ModelRepository for FileModelRepository {
    fn save(&self, artifact: &ModelArtifact) -> ModelStoreResult<()> {
        let json = serde_json::to_vec(artifact)?;

        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| self.io_error(e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(&json).map_err(|e| self.io_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;

        let digest = sha256_file(&self.path).map_err(|e| self.io_error(e))?;
        tracing::info!(
            path = %self.path.display(),
            job_id = %artifact.manifest.job_id,
            sha256 = %digest,
            "model slot updated"
        );
        Ok(())
    }

    fn load(&self) -> ModelStoreResult<Option<ModelArtifact>> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.io_error(e)),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn clear(&self) -> ModelStoreResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "model slot cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryModelRepository {
    slot: RwLock<Option<ModelArtifact>>,
}

impl InMemoryModelRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModelRepository for InMemoryModelRepository {
    fn save(&self, artifact: &ModelArtifact) -> ModelStoreResult<()> {
        *self.slot.write().unwrap_or_else(std::sync::PoisonError::into_inner) = Some(artifact.clone());
        Ok(())
    }

    fn load(&self) -> ModelStoreResult<Option<ModelArtifact>> {
        Ok(self.slot.read().unwrap_or_else(std::sync::PoisonError::into_inner).clone())
    }

    fn clear(&self) -> ModelStoreResult<()> {
        *self.slot.write().unwrap_or_else(std::sync::PoisonError::into_inner) = None;
        Ok(())
    }
}
