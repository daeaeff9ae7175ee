use std::path::{Path, PathBuf};

/// Filesystem layout for the dashboard's shared state inside a data directory.
///
/// ```text
/// <data_dir>/process_indicator.txt      training status flag
/// <data_dir>/models/trained_model.json  model slot
/// ```
#[derive(Debug, Clone)]
pub struct DashboardLayout {
    root: PathBuf,
}

impl DashboardLayout {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn status_path(&self) -> PathBuf {
        self.root.join("process_indicator.txt")
    }

    #[must_use]
    pub fn models_dir(&self) -> PathBuf {
        self.root.join("models")
    }

    #[must_use]
    pub fn model_path(&self) -> PathBuf {
        self.models_dir().join("trained_model.json")
    }

    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(self.models_dir())
    }
}
