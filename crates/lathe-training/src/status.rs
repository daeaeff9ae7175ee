//! Training status flag.
//!
//! A tri-state value (`Empty -> Training -> Trained`) that lives outside the
//! process so a poller in another request or process sees the trainer's progress.
//! Writers replace the whole value atomically; readers never see a partial write.

use crate::error::StatusError;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

pub type StatusResult<T> = std::result::Result<T, StatusError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainingStatus {
    Empty,
    Training,
    Trained,
}

impl TrainingStatus {
    /// Token stored in the flag file. Kept compatible with existing deployments.
    #[must_use]
    pub fn as_token(self) -> &'static str {
        match self {
            Self::Empty => "no file",
            Self::Training => "training",
            Self::Trained => "trained",
        }
    }

    pub fn from_token(token: &str) -> StatusResult<Self> {
        match token.trim() {
            "no file" => Ok(Self::Empty),
            "training" => Ok(Self::Training),
            "trained" => Ok(Self::Trained),
            other => Err(StatusError::Corrupt(other.to_string())),
        }
    }
}

impl std::fmt::Display for TrainingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_token())
    }
}

/// Durable single-writer, multi-reader storage for the [`TrainingStatus`].
pub trait TrainingStatusStore: Send + Sync {
    /// Replace the stored status. Same-state writes are no-ops for readers.
    fn set(&self, status: TrainingStatus) -> StatusResult<()>;

    /// Last fully written status. Never blocks on a writer.
    fn get(&self) -> StatusResult<TrainingStatus>;

    fn is_empty(&self) -> StatusResult<bool> {
        Ok(self.get()? == TrainingStatus::Empty)
    }

    fn is_training(&self) -> StatusResult<bool> {
        Ok(self.get()? == TrainingStatus::Training)
    }

    /// `Empty/Trained -> Training`.
    fn lock(&self) -> StatusResult<()> {
        self.set(TrainingStatus::Training)
    }

    /// `Training -> Trained`.
    fn unlock(&self) -> StatusResult<()> {
        self.set(TrainingStatus::Trained)
    }

    /// `* -> Empty`.
    fn reset(&self) -> StatusResult<()> {
        self.set(TrainingStatus::Empty)
    }
}

/// Flag stored as a one-line text file, replaced by write-to-temp then rename.
#[derive(Debug, Clone)]
pub struct FileStatusStore {
    path: PathBuf,
}

impl FileStatusStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `Empty` if no flag exists yet, otherwise leave the stored value alone.
    ///
    /// Returns the status in effect afterwards, or `None` when the stored token is
    /// unrecognized. A corrupt flag is left for `reset` to repair; `get` keeps reporting it.
    pub fn initialize(&self) -> StatusResult<Option<TrainingStatus>> {
        match std::fs::read_to_string(&self.path) {
            Ok(token) => match TrainingStatus::from_token(&token) {
                Ok(status) => Ok(Some(status)),
                Err(e) => {
                    tracing::warn!(path = %self.path.display(), error = %e, "training status flag is corrupt");
                    Ok(None)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                self.set(TrainingStatus::Empty)?;
                Ok(Some(TrainingStatus::Empty))
            }
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn io_error(&self, source: std::io::Error) -> StatusError {
        StatusError::Io { path: self.path.clone(), source }
    }
}

impl TrainingStatusStore for FileStatusStore {
    fn set(&self, status: TrainingStatus) -> StatusResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| self.io_error(e))?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir).map_err(|e| self.io_error(e))?;
        tmp.write_all(status.as_token().as_bytes()).map_err(|e| self.io_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;

        tracing::debug!(path = %self.path.display(), status = %status, "training status written");
        Ok(())
    }

    fn get(&self) -> StatusResult<TrainingStatus> {
        let token = std::fs::read_to_string(&self.path).map_err(|e| self.io_error(e))?;
        TrainingStatus::from_token(&token)
    }
}

/// Process-local flag for tests and single-process embedding.
#[derive(Debug)]
pub struct InMemoryStatusStore {
    status: RwLock<TrainingStatus>,
}

impl InMemoryStatusStore {
    #[must_use]
    pub fn new(initial: TrainingStatus) -> Self {
        Self { status: RwLock::new(initial) }
    }
}

impl Default for InMemoryStatusStore {
    fn default() -> Self {
        Self::new(TrainingStatus::Empty)
    }
}

impl TrainingStatusStore for InMemoryStatusStore {
    fn set(&self, status: TrainingStatus) -> StatusResult<()> {
        // A poisoned lock still holds a whole value; the enum is Copy.
        let mut guard = self.status.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        *guard = status;
        Ok(())
    }

    fn get(&self) -> StatusResult<TrainingStatus> {
        Ok(*self.status.read().unwrap_or_else(std::sync::PoisonError::into_inner))
    }
}
