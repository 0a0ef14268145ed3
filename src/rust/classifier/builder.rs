use std::path::PathBuf;

use log::{info, warn};

use super::error::LearnerError;
use super::learner::{LearnerConfig, Link, Loss};
use super::linear::LinearLearner;

/// A builder for constructing a [`LinearLearner`] with a fluent interface.
///
/// The configuration is fixed once the learner is built.
///
/// ```rust
/// use spam_labeler::{LearnerBuilder, Loss, Link};
///
/// let learner = LearnerBuilder::new()
///     .with_loss(Loss::Logistic)
///     .with_link(Link::Logistic)
///     .with_bits(16)
///     .with_seed(42)
///     .build()?;
/// assert_eq!(learner.config().bits, 16);
/// # Ok::<(), spam_labeler::LearnerError>(())
/// ```
#[derive(Debug, Default)]
pub struct LearnerBuilder {
    config: LearnerConfig,
    resume_path: Option<PathBuf>,
}

impl LearnerBuilder {
    /// Creates a builder with the default hyperparameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every hyperparameter at once
    pub fn with_config(mut self, config: LearnerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_loss(mut self, loss: Loss) -> Self {
        self.config.loss = loss;
        self
    }

    pub fn with_link(mut self, link: Link) -> Self {
        self.config.link = link;
        self
    }

    pub fn with_l2(mut self, l2: f32) -> Self {
        self.config.l2 = l2;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f32) -> Self {
        self.config.learning_rate = learning_rate;
        self
    }

    pub fn with_bits(mut self, bits: u8) -> Self {
        self.config.bits = bits;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Resumes from the snapshot at `path` when the learner is built.
    ///
    /// A missing file is not an error: the learner then starts untrained with the
    /// configured hyperparameters. An existing snapshot keeps the hyperparameters it
    /// was trained with, whatever this builder was given.
    pub fn resume_from(mut self, path: impl Into<PathBuf>) -> Self {
        self.resume_path = Some(path.into());
        self
    }

    /// Builds the learner.
    ///
    /// # Errors
    /// * `InvalidConfig` if the hyperparameters are out of range
    /// * `Io`, `Encoding` or `CorruptSnapshot` if a snapshot exists but cannot be read
    pub fn build(self) -> Result<LinearLearner, LearnerError> {
        self.config.validate()?;

        if let Some(path) = &self.resume_path {
            if path.exists() {
                let learner = LinearLearner::load(path)?;
                if learner.config() != &self.config {
                    warn!(
                        "Snapshot {:?} was trained with {:?}; ignoring requested {:?}",
                        path,
                        learner.config(),
                        self.config
                    );
                }
                return Ok(learner);
            }
            info!("No model snapshot at {:?}, starting from an untrained model", path);
        }

        LinearLearner::new(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Example, OnlineLearner};

    #[test]
    fn test_builder_applies_settings() {
        let learner = LearnerBuilder::new()
            .with_loss(Loss::Squared)
            .with_link(Link::Identity)
            .with_l2(0.01)
            .with_learning_rate(0.25)
            .with_bits(8)
            .with_seed(7)
            .build()
            .unwrap();

        let config = learner.config();
        assert_eq!(config.loss, Loss::Squared);
        assert_eq!(config.link, Link::Identity);
        assert_eq!(config.l2, 0.01);
        assert_eq!(config.learning_rate, 0.25);
        assert_eq!(config.bits, 8);
        assert_eq!(config.seed, 7);
    }

    #[test]
    fn test_invalid_settings_fail_to_build() {
        assert!(matches!(
            LearnerBuilder::new().with_bits(40).build(),
            Err(LearnerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_snapshot_starts_untrained() {
        let dir = tempfile::tempdir().unwrap();
        let learner = LearnerBuilder::new()
            .with_bits(8)
            .resume_from(dir.path().join("missing.bin"))
            .build()
            .unwrap();
        assert_eq!(learner.examples_seen(), 0);
        assert_eq!(learner.config().bits, 8);
    }

    #[test]
    fn test_snapshot_config_wins_on_resume() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.bin");

        let mut learner = LearnerBuilder::new().with_bits(8).build().unwrap();
        let example = Example::new().with_label(-1.0).with_namespace("content", ["x"]);
        learner.learn(&example).unwrap();
        learner.save(&path).unwrap();

        let resumed = LearnerBuilder::new()
            .with_bits(12)
            .resume_from(&path)
            .build()
            .unwrap();
        assert_eq!(resumed.config().bits, 8);
        assert_eq!(resumed.examples_seen(), 1);
    }
}
