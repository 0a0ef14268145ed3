use std::num::NonZeroUsize;
use std::sync::Arc;

use serde::Serialize;

use crate::classifier::{LearnerBuilder, LinearLearner, OnlineLearner};
use crate::config::LabelerConfig;
use crate::emails::{Dataset, Email, EmailCorpus};
use crate::encoder::FeatureEncoder;
use crate::error::{LabelerError, Result};
use crate::label::Label;
use crate::label_store::LabelStore;
use crate::reporter::{EvaluationReporter, Report};
use crate::state::{ModelState, SharedState};
use crate::trainer::{ConvergenceTrainer, StatePaths};

/// An email together with its current label and the model's score for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailView {
    pub id: usize,
    pub subject: String,
    pub content: String,
    pub label: Option<Label>,
    pub prediction: f32,
}

/// `{id, label}` where an unlabeled email has an empty label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelView {
    pub id: usize,
    pub label: String,
}

impl LabelView {
    fn new(id: usize, label: Option<Label>) -> Self {
        Self {
            id,
            label: label.map(|l| l.as_str().to_string()).unwrap_or_default(),
        }
    }
}

/// The labeling tool: email access, the convergence trainer and the evaluation
/// reporter over one shared model.
///
/// Reads run concurrently; [`assign_label`](Self::assign_label) calls are serialized.
pub struct Labeler<L = LinearLearner> {
    corpus: Arc<EmailCorpus>,
    state: SharedState<L>,
    encoder: FeatureEncoder,
    trainer: ConvergenceTrainer<L>,
    reporter: EvaluationReporter<L>,
}

impl Labeler<LinearLearner> {
    /// Loads the dataset, resumes the model if a snapshot exists and loads the label store.
    pub fn open(config: &LabelerConfig) -> Result<Self> {
        let dataset = Dataset::load(&config.data_dir)?;
        let paths = config.state_paths();

        let learner = LearnerBuilder::new()
            .with_config(config.learner.clone())
            .resume_from(&paths.model)
            .build()
            .map_err(|e| {
                if e.is_persistence() {
                    LabelerError::persistence(&paths.model, e)
                } else {
                    LabelerError::from(e)
                }
            })?;
        let labels = LabelStore::load(&paths.labels)?;

        Ok(Self::new(dataset, learner, labels, paths, config.max_passes))
    }
}

impl<L: OnlineLearner> Labeler<L> {
    pub fn new(
        dataset: Dataset,
        learner: L,
        labels: LabelStore,
        paths: StatePaths,
        max_passes: Option<NonZeroUsize>,
    ) -> Self {
        let corpus = Arc::new(dataset.train);
        let state = ModelState::new(learner, labels).into_shared();
        let trainer = ConvergenceTrainer::new(Arc::clone(&state), Arc::clone(&corpus), paths, max_passes);
        let reporter = EvaluationReporter::new(Arc::clone(&state), Arc::new(dataset.test));
        Self {
            corpus,
            state,
            encoder: FeatureEncoder::new(),
            trainer,
            reporter,
        }
    }

    pub fn corpus(&self) -> &EmailCorpus {
        &self.corpus
    }

    /// The raw source content of an email.
    pub fn raw_email(&self, id: usize) -> Result<&Email> {
        self.corpus.get(id)
    }

    fn view(&self, state: &ModelState<L>, id: usize) -> Result<EmailView> {
        let email = self.corpus.get(id)?;
        let prediction = state.learner.predict(&self.encoder.encode(email, None))?;
        Ok(EmailView {
            id,
            subject: email.subject.clone(),
            content: email.content.clone(),
            label: state.labels.get(id),
            prediction,
        })
    }

    pub fn email(&self, id: usize) -> Result<EmailView> {
        let state = self.state.read();
        self.view(&state, id)
    }

    /// `k` distinct random emails from the train partition.
    pub fn random_emails(&self, k: usize) -> Result<Vec<EmailView>> {
        let ids = self.corpus.sample(k)?;
        let state = self.state.read();
        ids.into_iter().map(|id| self.view(&state, id)).collect()
    }

    pub fn label(&self, id: usize) -> Result<LabelView> {
        self.corpus.get(id)?;
        Ok(LabelView::new(id, self.state.read().labels.get(id)))
    }

    /// Teaches the label to the model and records it. See [`ConvergenceTrainer::assign_label`].
    pub fn assign_label(&self, id: usize, label: Label) -> Result<LabelView> {
        let committed = self.trainer.assign_label(id, label)?;
        Ok(LabelView::new(id, Some(committed)))
    }

    /// The model's current ham score for an email, in `[0, 1]`.
    pub fn prediction(&self, id: usize) -> Result<f32> {
        let email = self.corpus.get(id)?;
        let example = self.encoder.encode(email, None);
        Ok(self.state.read().learner.predict(&example)?)
    }

    /// `(count_ham, count_spam)`
    pub fn counts(&self) -> (usize, usize) {
        self.state.read().labels.counts()
    }

    pub fn report(&self) -> Result<Report> {
        self.reporter.report()
    }
}
