use std::io::BufRead;
use std::sync::Arc;

use serde::Serialize;

use crate::classifier::{Example, LearnerError, OnlineLearner};
use crate::emails::numbered_lines;
use crate::error::Result;
use crate::label::Label;
use crate::metrics::ClassificationReport;
use crate::state::SharedState;

/// Held-out examples with their true labels. Never changed by labeling.
#[derive(Debug, Clone, Default)]
pub struct TestSet {
    examples: Vec<Example>,
    labels: Vec<Label>,
}

fn true_label(example: &Example) -> std::result::Result<Label, LearnerError> {
    match example.label() {
        Some(l) if l == Label::Ham.target() => Ok(Label::Ham),
        Some(l) if l == Label::Spam.target() => Ok(Label::Spam),
        Some(l) => Err(LearnerError::MalformedExample(format!(
            "test label must be 1 or -1, got {}",
            l
        ))),
        None => Err(LearnerError::MalformedExample("test example has no label".into())),
    }
}

impl TestSet {
    /// Builds a test set from labeled examples.
    pub fn new(examples: Vec<Example>) -> std::result::Result<Self, LearnerError> {
        let labels = examples
            .iter()
            .map(true_label)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Self { examples, labels })
    }

    /// Parses one labeled example per non-empty line.
    pub fn from_reader<R: BufRead>(reader: R) -> std::result::Result<Self, LearnerError> {
        let mut examples = Vec::new();
        for (line_number, line) in numbered_lines(reader) {
            let example: Example = line?.parse().map_err(|e| match e {
                LearnerError::MalformedExample(msg) => {
                    LearnerError::MalformedExample(format!("line {}: {}", line_number, msg))
                }
                other => other,
            })?;
            examples.push(example);
        }
        Self::new(examples)
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Example, Label)> + '_ {
        self.examples.iter().zip(self.labels.iter().copied())
    }
}

/// Label counts plus the quality of the current model on the test set.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub count_ham: usize,
    pub count_spam: usize,
    pub quality: ClassificationReport,
}

/// Scores the test set against the live model without changing it.
pub struct EvaluationReporter<L> {
    state: SharedState<L>,
    test_set: Arc<TestSet>,
}

impl<L: OnlineLearner> EvaluationReporter<L> {
    pub fn new(state: SharedState<L>, test_set: Arc<TestSet>) -> Self {
        Self { state, test_set }
    }

    pub fn report(&self) -> Result<Report> {
        let state = self.state.read();

        let mut y_true = Vec::with_capacity(self.test_set.len());
        let mut y_pred = Vec::with_capacity(self.test_set.len());
        for (example, label) in self.test_set.iter() {
            let score = state.learner.predict(example)?;
            y_true.push(label);
            y_pred.push(Label::from_score(score));
        }

        let (count_ham, count_spam) = state.labels.counts();
        drop(state);

        let quality = ClassificationReport::compute(&y_true, &y_pred);
        log::debug!(
            "Evaluated {} test examples, accuracy {:.3}",
            y_true.len(),
            quality.accuracy
        );
        Ok(Report {
            count_ham,
            count_spam,
            quality,
        })
    }
}
