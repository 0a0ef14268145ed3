use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::LearnerError;
use super::example::Example;

/// Scores above or at this value are read as ham.
pub const DECISION_THRESHOLD: f32 = 0.5;

/// An online binary classifier that is updated one example at a time.
///
/// Labels follow the `{+1, -1}` convention, `+1` being ham. Scores are
/// probability-like values in `[0, 1]` where higher means more ham-like.
pub trait OnlineLearner: Send + Sync {
    /// Scores an example without learning from it. Any label on the example is ignored.
    fn predict(&self, example: &Example) -> Result<f32, LearnerError>;

    /// Applies a single online update from a labeled example.
    fn learn(&mut self, example: &Example) -> Result<(), LearnerError>;

    /// Writes a snapshot of the current model state to `path`.
    fn save(&self, path: &Path) -> Result<(), LearnerError>;
}

/// Loss minimised by each online update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Loss {
    #[default]
    Logistic,
    Squared,
}

/// Function mapping the raw linear score to the reported prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Link {
    #[default]
    Logistic,
    /// The raw score, clamped to `[0, 1]`
    Identity,
}

/// Hyperparameters of the learner. Fixed for the lifetime of a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnerConfig {
    pub loss: Loss,
    pub link: Link,
    /// L2 regularization strength added to every gradient
    pub l2: f32,
    /// Base step size, scaled per weight by the adaptive accumulator
    pub learning_rate: f32,
    /// The weight table holds `2^bits` slots
    pub bits: u8,
    /// Mixed into feature hashing
    pub seed: u64,
}

impl Default for LearnerConfig {
    fn default() -> Self {
        Self {
            loss: Loss::Logistic,
            link: Link::Logistic,
            l2: 0.0,
            learning_rate: 0.5,
            bits: 18,
            seed: 11399,
        }
    }
}

impl LearnerConfig {
    pub const MAX_BITS: u8 = 28;

    pub fn validate(&self) -> Result<(), LearnerError> {
        if self.bits == 0 || self.bits > Self::MAX_BITS {
            return Err(LearnerError::InvalidConfig(format!(
                "bits must be between 1 and {} (got {})",
                Self::MAX_BITS,
                self.bits
            )));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(LearnerError::InvalidConfig(format!(
                "learning rate must be positive (got {})",
                self.learning_rate
            )));
        }
        if !(self.l2.is_finite() && self.l2 >= 0.0) {
            return Err(LearnerError::InvalidConfig(format!(
                "l2 must be non-negative (got {})",
                self.l2
            )));
        }
        Ok(())
    }
}
