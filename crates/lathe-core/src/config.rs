//! Configuration for the Lathe dashboard.
//!
//! Precedence, highest first:
//! 1. CLI arguments (applied by the binary)
//! 2. Environment variables (`LATHE_*`)
//! 3. Local config file (`./.latherc`)
//! 4. Global config file (`~/.lathe/config.toml`)
//! 5. Defaults

use crate::error::{DashboardError, Result};
use lathe_training::{ClassWeight, TrainingHyperParams, DEFAULT_LABEL_COLUMN};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatheConfig {
    /// Directory holding the status flag and the model slot.
    pub data_dir: PathBuf,
    pub label_column: String,
    pub n_estimators: usize,
    pub seed: u64,
    pub max_depth: Option<usize>,
    pub class_weight: ClassWeight,
    /// How often pollers re-read the status flag.
    pub poll_interval_ms: u64,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for LatheConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".lathe"),
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            n_estimators: 100,
            seed: 42,
            max_depth: None,
            class_weight: ClassWeight::Balanced,
            poll_interval_ms: 1000,
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

/// One config file. Every key is optional; present keys override earlier layers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub label_column: Option<String>,
    #[serde(default)]
    pub n_estimators: Option<usize>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub max_depth: Option<usize>,
    #[serde(default)]
    pub class_weight: Option<ClassWeight>,
    #[serde(default)]
    pub poll_interval_ms: Option<u64>,
    #[serde(default)]
    pub log_level: Option<String>,
    #[serde(default)]
    pub log_format: Option<LogFormat>,
}

impl ConfigFile {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DashboardError::Config(format!("failed to read {}: {}", path.display(), e)))?;
        toml::from_str(&content).map_err(|e| DashboardError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }
}

impl LatheConfig {
    #[must_use]
    pub fn default_global_path() -> PathBuf {
        dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".lathe").join("config.toml")
    }

    #[must_use]
    pub fn default_local_path() -> PathBuf {
        PathBuf::from(".latherc")
    }

    /// Defaults, then global and local files when present, then the process environment.
    pub fn discover_and_load() -> Result<Self> {
        let mut config = Self::default();

        for path in [Self::default_global_path(), Self::default_local_path()] {
            if path.exists() {
                config.merge(&ConfigFile::load_from_file(&path)?);
                tracing::debug!(path = %path.display(), "loaded config file");
            }
        }

        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn merge(&mut self, file: &ConfigFile) {
        if let Some(ref data_dir) = file.data_dir {
            self.data_dir = data_dir.clone();
        }
        if let Some(ref label_column) = file.label_column {
            self.label_column = label_column.clone();
        }
        if let Some(n) = file.n_estimators {
            self.n_estimators = n;
        }
        if let Some(seed) = file.seed {
            self.seed = seed;
        }
        if file.max_depth.is_some() {
            self.max_depth = file.max_depth;
        }
        if let Some(weight) = file.class_weight {
            self.class_weight = weight;
        }
        if let Some(ms) = file.poll_interval_ms {
            self.poll_interval_ms = ms;
        }
        if let Some(ref level) = file.log_level {
            self.log_level = level.clone();
        }
        if let Some(format) = file.log_format {
            self.log_format = format;
        }
    }

    /// Apply `LATHE_*` overrides read through `lookup`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(dir) = lookup("LATHE_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(label) = lookup("LATHE_LABEL_COLUMN") {
            self.label_column = label;
        }
        if let Some(level) = lookup("LATHE_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(ms) = lookup("LATHE_POLL_INTERVAL_MS") {
            self.poll_interval_ms = ms
                .trim()
                .parse()
                .map_err(|_| DashboardError::Config(format!("LATHE_POLL_INTERVAL_MS is not a number: {ms}")))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.label_column.trim().is_empty() {
            return Err(DashboardError::Config("label_column must not be empty".to_string()));
        }
        if self.n_estimators == 0 {
            return Err(DashboardError::Config("n_estimators must be >= 1".to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(DashboardError::Config("poll_interval_ms must be >= 1".to_string()));
        }
        Ok(())
    }

    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[must_use]
    pub fn hyperparams(&self) -> TrainingHyperParams {
        TrainingHyperParams {
            n_estimators: self.n_estimators,
            class_weight: self.class_weight,
            max_depth: self.max_depth,
            seed: self.seed,
            ..TrainingHyperParams::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = LatheConfig::default();
        assert_eq!(config.label_column, "label");
        assert_eq!(config.n_estimators, 100);
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_merge_overrides_only_present_keys() {
        let mut config = LatheConfig::default();
        let file: ConfigFile = toml::from_str("label_column = \"defect\"\nseed = 7\n").unwrap();
        config.merge(&file);

        assert_eq!(config.label_column, "defect");
        assert_eq!(config.seed, 7);
        assert_eq!(config.n_estimators, 100);
        assert_eq!(config.data_dir, PathBuf::from(".lathe"));
    }

    #[test]
    fn test_load_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "data_dir = \"/srv/lathe\"\nlog_format = \"json\"\npoll_interval_ms = 250\n").unwrap();

        let file = ConfigFile::load_from_file(&path).unwrap();
        assert_eq!(file.data_dir, Some(PathBuf::from("/srv/lathe")));
        assert_eq!(file.log_format, Some(LogFormat::Json));
        assert_eq!(file.poll_interval_ms, Some(250));
    }

    #[test]
    fn test_load_rejects_unknown_keys() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "n_trees = 5\n").unwrap();
        assert!(matches!(ConfigFile::load_from_file(&path), Err(DashboardError::Config(_))));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([("LATHE_DATA_DIR", "/tmp/x"), ("LATHE_POLL_INTERVAL_MS", "50")]);
        let mut config = LatheConfig::default();
        config.apply_env(|k| env.get(k).map(|v| (*v).to_string())).unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/x"));
        assert_eq!(config.poll_interval_ms, 50);
    }

    #[test]
    fn test_env_bad_interval() {
        let mut config = LatheConfig::default();
        let result = config.apply_env(|k| (k == "LATHE_POLL_INTERVAL_MS").then(|| "soon".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        let config = LatheConfig { n_estimators: 0, ..LatheConfig::default() };
        assert!(config.validate().is_err());
        let config = LatheConfig { poll_interval_ms: 0, ..LatheConfig::default() };
        assert!(config.validate().is_err());
        let config = LatheConfig { label_column: String::new(), ..LatheConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_hyperparams_default_to_balanced() {
        let config = LatheConfig { n_estimators: 10, max_depth: Some(4), ..LatheConfig::default() };
        let params = config.hyperparams();
        assert_eq!(params.n_estimators, 10);
        assert_eq!(params.max_depth, Some(4));
        assert_eq!(params.class_weight, ClassWeight::Balanced);
    }

    #[test]
    fn test_class_weight_from_file() {
        let mut config = LatheConfig::default();
        let file: ConfigFile = toml::from_str("class_weight = \"uniform\"\n").unwrap();
        config.merge(&file);

        assert_eq!(config.class_weight, ClassWeight::Uniform);
        assert_eq!(config.hyperparams().class_weight, ClassWeight::Uniform);
        assert!(toml::from_str::<ConfigFile>("class_weight = \"heavy\"\n").is_err());
    }
}
