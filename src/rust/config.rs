use std::env;
use std::num::NonZeroUsize;
use std::path::PathBuf;

use crate::classifier::LearnerConfig;
use crate::trainer::StatePaths;

/// Environment variable overriding the default data directory.
pub const HOME_ENV: &str = "SPAM_LABELER_HOME";

pub const DEFAULT_MODEL_FILE: &str = "model.bin";
pub const DEFAULT_LABELS_FILE: &str = "user_labels.json";
pub const DEFAULT_MAX_PASSES: usize = 1000;

/// Everything needed to open a [`Labeler`](crate::Labeler). Fixed at startup.
#[derive(Debug, Clone)]
pub struct LabelerConfig {
    /// Directory holding the dataset partition
    pub data_dir: PathBuf,
    /// Model snapshot; defaults to `model.bin` in the data directory
    pub model_path: Option<PathBuf>,
    /// Label store snapshot; defaults to `user_labels.json` in the data directory
    pub labels_path: Option<PathBuf>,
    /// Hyperparameters for a freshly created model
    pub learner: LearnerConfig,
    /// Bound on learning passes per label, `None` for no bound
    pub max_passes: Option<NonZeroUsize>,
}

impl Default for LabelerConfig {
    fn default() -> Self {
        Self {
            data_dir: Self::default_data_dir(),
            model_path: None,
            labels_path: None,
            learner: LearnerConfig::default(),
            max_passes: NonZeroUsize::new(DEFAULT_MAX_PASSES),
        }
    }
}

impl LabelerConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Returns the default data directory path
    pub fn default_data_dir() -> PathBuf {
        // 1. Check environment variable
        if let Ok(path) = env::var(HOME_ENV) {
            return PathBuf::from(path);
        }

        // 2. Use platform-specific data directory
        if let Some(data_dir) = dirs::data_dir() {
            return data_dir.join("spam-labeler");
        }

        // 3. Fallback to user's home directory
        if let Some(home_dir) = dirs::home_dir() {
            return home_dir.join(".local").join("share").join("spam-labeler");
        }

        // 4. If all else fails, use system temp directory (platform agnostic)
        env::temp_dir().join("spam-labeler")
    }

    pub fn model_path(&self) -> PathBuf {
        self.model_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DEFAULT_MODEL_FILE))
    }

    pub fn labels_path(&self) -> PathBuf {
        self.labels_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(DEFAULT_LABELS_FILE))
    }

    pub fn state_paths(&self) -> StatePaths {
        StatePaths {
            model: self.model_path(),
            labels: self.labels_path(),
        }
    }
}
