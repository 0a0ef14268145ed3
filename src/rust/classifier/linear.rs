use std::fs;
use std::path::Path;

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::error::LearnerError;
use super::example::Example;
use super::learner::{LearnerConfig, Link, Loss, OnlineLearner};
use crate::storage::{sha256_hex, write_atomically};

/// Bumped whenever the serialized model layout changes.
const SNAPSHOT_VERSION: u32 = 1;

/// Model state as stored in a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ModelState {
    version: u32,
    config: LearnerConfig,
    weights: Array1<f32>,
    /// Sum of squared gradients seen by each weight
    accumulators: Array1<f32>,
    examples_seen: u64,
}

/// On-disk wrapper carrying the checksum of the encoded state.
#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    checksum: String,
    payload: Vec<u8>,
}

/// A hashed sparse linear model trained by online gradient descent with
/// per-weight adaptive step sizes.
///
/// Every feature is hashed, together with its namespace and the configured seed,
/// into a table of `2^bits` weights. A constant feature acts as the bias.
///
/// ```rust
/// use spam_labeler::{Example, LinearLearner, LearnerConfig, OnlineLearner};
///
/// let mut learner = LinearLearner::new(LearnerConfig { bits: 12, ..Default::default() })?;
/// let spam = Example::new().with_label(-1.0).with_namespace("subject", ["win", "cash"]);
///
/// learner.learn(&spam)?;
/// assert!(learner.predict(&spam.unlabeled())? < 0.5);
/// # Ok::<(), spam_labeler::LearnerError>(())
/// ```
#[derive(Debug, Clone)]
pub struct LinearLearner {
    state: ModelState,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<LinearLearner>();
    }
};

fn hash_index(seed: u64, namespace: &[u8], name: &[u8], mask: u64) -> usize {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update(namespace);
    hasher.update([0u8]);
    hasher.update(name);
    let digest = hasher.finalize();

    let mut head = [0u8; 8];
    head.copy_from_slice(&digest[..8]);
    (u64::from_le_bytes(head) & mask) as usize
}

fn sigmoid(z: f32) -> f32 {
    1.0 / (1.0 + (-z).exp())
}

impl LinearLearner {
    /// Creates an untrained model.
    pub fn new(config: LearnerConfig) -> Result<Self, LearnerError> {
        config.validate()?;
        let size = 1usize << config.bits;
        Ok(Self {
            state: ModelState {
                version: SNAPSHOT_VERSION,
                config,
                weights: Array1::zeros(size),
                accumulators: Array1::zeros(size),
                examples_seen: 0,
            },
        })
    }

    /// Loads a model from a snapshot written by [`OnlineLearner::save`].
    pub fn load(path: &Path) -> Result<Self, LearnerError> {
        log::info!("Loading model snapshot from {:?}", path);
        let bytes = fs::read(path)?;
        let file: SnapshotFile = bincode::deserialize(&bytes)?;

        let checksum = sha256_hex(&file.payload);
        if checksum != file.checksum {
            log::error!("Snapshot checksum mismatch: expected {}, got {}", file.checksum, checksum);
            return Err(LearnerError::CorruptSnapshot(format!(
                "checksum mismatch for {}",
                path.display()
            )));
        }

        let state: ModelState = bincode::deserialize(&file.payload)?;
        if state.version != SNAPSHOT_VERSION {
            return Err(LearnerError::CorruptSnapshot(format!(
                "unsupported snapshot version {}",
                state.version
            )));
        }
        state.config.validate()?;

        let size = 1usize << state.config.bits;
        if state.weights.len() != size || state.accumulators.len() != size {
            return Err(LearnerError::CorruptSnapshot(format!(
                "expected {} weights for {} bits, found {}",
                size,
                state.config.bits,
                state.weights.len()
            )));
        }

        log::info!(
            "Model snapshot loaded ({} examples seen, {} bits)",
            state.examples_seen,
            state.config.bits
        );
        Ok(Self { state })
    }

    pub fn config(&self) -> &LearnerConfig {
        &self.state.config
    }

    /// Number of updates applied since the model was created.
    pub fn examples_seen(&self) -> u64 {
        self.state.examples_seen
    }

    fn mask(&self) -> u64 {
        (1u64 << self.state.config.bits) - 1
    }

    /// Weight slots and values of every feature in the example, plus the constant.
    fn indexed_features(&self, example: &Example) -> Vec<(usize, f32)> {
        let seed = self.state.config.seed;
        let mask = self.mask();

        let mut indexed = Vec::with_capacity(example.feature_count() + 1);
        for ns in example.namespaces() {
            for feature in &ns.features {
                let index = hash_index(seed, ns.name.as_bytes(), feature.name.as_bytes(), mask);
                indexed.push((index, feature.value));
            }
        }
        // 0xff never appears in a UTF-8 namespace name
        indexed.push((hash_index(seed, &[0xff], b"constant", mask), 1.0));
        indexed
    }

    fn raw_score(&self, features: &[(usize, f32)]) -> f32 {
        features
            .iter()
            .map(|&(index, value)| self.state.weights[index] * value)
            .sum()
    }

    fn apply_link(&self, raw: f32) -> f32 {
        match self.state.config.link {
            Link::Logistic => sigmoid(raw),
            Link::Identity => raw.clamp(0.0, 1.0),
        }
    }

    /// Derivative of the configured loss with respect to the raw score.
    fn loss_gradient(&self, raw: f32, label: f32) -> f32 {
        match self.state.config.loss {
            Loss::Logistic => -label / (1.0 + (label * raw).exp()),
            Loss::Squared => raw - label,
        }
    }
}

impl OnlineLearner for LinearLearner {
    fn predict(&self, example: &Example) -> Result<f32, LearnerError> {
        let features = self.indexed_features(example);
        Ok(self.apply_link(self.raw_score(&features)))
    }

    fn learn(&mut self, example: &Example) -> Result<(), LearnerError> {
        let label = example
            .label()
            .ok_or_else(|| LearnerError::MalformedExample("cannot learn from an unlabeled example".into()))?;
        if self.state.config.loss == Loss::Logistic && label != 1.0 && label != -1.0 {
            return Err(LearnerError::MalformedExample(format!(
                "logistic loss expects a label of 1 or -1, got {}",
                label
            )));
        }

        let features = self.indexed_features(example);
        let raw = self.raw_score(&features);
        let gradient = self.loss_gradient(raw, label);

        let l2 = self.state.config.l2;
        let learning_rate = self.state.config.learning_rate;
        let state = &mut self.state;
        for &(index, value) in &features {
            let g = gradient * value + l2 * state.weights[index];
            if g == 0.0 {
                continue;
            }
            state.accumulators[index] += g * g;
            state.weights[index] -= learning_rate * g / state.accumulators[index].sqrt();
        }
        state.examples_seen += 1;
        Ok(())
    }

    fn save(&self, path: &Path) -> Result<(), LearnerError> {
        let payload = bincode::serialize(&self.state)?;
        let file = SnapshotFile {
            checksum: sha256_hex(&payload),
            payload,
        };
        let bytes = bincode::serialize(&file)?;
        write_atomically(path, &bytes)?;
        log::debug!("Model snapshot written to {:?} ({} bytes)", path, bytes.len());
        Ok(())
    }
}
