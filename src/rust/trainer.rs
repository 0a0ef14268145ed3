use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use log::{debug, error, info, warn};

use crate::classifier::{Example, OnlineLearner};
use crate::emails::EmailCorpus;
use crate::encoder::FeatureEncoder;
use crate::error::{LabelerError, Result};
use crate::label::Label;
use crate::state::{ModelState, SharedState};

/// Where the trainer persists its state after each committed label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatePaths {
    pub model: PathBuf,
    pub labels: PathBuf,
}

/// Teaches the model one label at a time and commits the label once the model agrees.
///
/// A single online update may not move the model's decision across the threshold,
/// so the same example is learned repeatedly until the model's own prediction for
/// the email matches the label. Only then is the label recorded and both snapshots
/// written. All of this happens under the write lock of the shared state, which
/// serializes labeling requests against each other and hides in-progress updates
/// from readers.
pub struct ConvergenceTrainer<L> {
    state: SharedState<L>,
    corpus: Arc<EmailCorpus>,
    encoder: FeatureEncoder,
    paths: StatePaths,
    max_passes: Option<NonZeroUsize>,
}

impl<L: OnlineLearner> ConvergenceTrainer<L> {
    /// `max_passes` bounds the learning passes per label; `None` never gives up.
    pub fn new(
        state: SharedState<L>,
        corpus: Arc<EmailCorpus>,
        paths: StatePaths,
        max_passes: Option<NonZeroUsize>,
    ) -> Self {
        if max_passes.is_none() {
            warn!("Convergence loop is unbounded; a label the model cannot learn will block labeling");
        }
        Self {
            state,
            corpus,
            encoder: FeatureEncoder::new(),
            paths,
            max_passes,
        }
    }

    pub fn max_passes(&self) -> Option<NonZeroUsize> {
        self.max_passes
    }

    /// Trains the model until it agrees with `label` for the email, then commits the label.
    ///
    /// # Errors
    /// * `NotFound` if the email does not exist
    /// * `Learning` if the learner rejects the example
    /// * `ConvergenceFailure` if the model still disagrees after `max_passes` passes;
    ///   the updates already applied stay in the in-memory model
    /// * `Persistence` if a snapshot cannot be written; the label is not recorded
    pub fn assign_label(&self, email_id: usize, label: Label) -> Result<Label> {
        let email = self.corpus.get(email_id)?;
        let start_time = Instant::now();

        let mut state = self.state.write();

        let labeled = self.encoder.encode(email, Some(label));
        let probe = labeled.unlabeled();
        let (passes, score) = self.converge(&mut state.learner, email_id, label, &labeled, &probe)?;

        self.commit(&mut state, email_id, label)?;
        drop(state);

        info!(
            "Email {} labeled {} after {} pass(es), score {:.4} (took {:.2?})",
            email_id,
            label,
            passes,
            score,
            start_time.elapsed()
        );
        Ok(label)
    }

    /// Learns `labeled` until the score for `probe` falls on the side of `label`.
    /// Returns the number of passes and the final score.
    fn converge(
        &self,
        learner: &mut L,
        email_id: usize,
        label: Label,
        labeled: &Example,
        probe: &Example,
    ) -> Result<(usize, f32)> {
        let mut passes = 0;
        loop {
            if let Some(max) = self.max_passes {
                if passes >= max.get() {
                    warn!("Email {} did not converge to {} within {} passes", email_id, label, passes);
                    return Err(LabelerError::ConvergenceFailure { email_id, passes });
                }
            }

            learner.learn(labeled)?;
            passes += 1;

            let score = learner.predict(probe)?;
            debug!("Email {} pass {}: score {:.4}", email_id, passes, score);
            if Label::from_score(score) == label {
                return Ok((passes, score));
            }
        }
    }

    /// Records the label, then writes the model and label snapshots.
    /// On a failed write the label entry is put back as it was.
    fn commit(&self, state: &mut ModelState<L>, email_id: usize, label: Label) -> Result<()> {
        let previous = state.labels.set(email_id, label);

        if let Err(e) = state.learner.save(&self.paths.model) {
            error!("Failed to save model snapshot to {:?}: {}", self.paths.model, e);
            state.labels.restore(email_id, previous);
            return Err(LabelerError::persistence(&self.paths.model, e));
        }

        if let Err(e) = state.labels.save(&self.paths.labels) {
            error!("Failed to save labels to {:?}: {}", self.paths.labels, e);
            state.labels.restore(email_id, previous);
            return Err(e);
        }

        Ok(())
    }
}
