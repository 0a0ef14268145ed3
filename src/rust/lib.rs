//! An interactive spam/ham labeling tool backed by an online logistic classifier.
//!
//! A person reviews emails and labels them. Every label is taught to the model
//! immediately: the same example is learned until the model's own prediction for
//! the email agrees with the label, and only then is the label committed. A
//! held-out test set tracks how well the model does as labels accumulate.
//!
//! # Basic Usage
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::num::NonZeroUsize;
//! use spam_labeler::{
//!     Dataset, Email, EmailCorpus, Label, LabelStore, Labeler, LearnerBuilder, StatePaths, TestSet,
//! };
//!
//! let dir = std::env::temp_dir().join("spam-labeler-doctest");
//! let dataset = Dataset {
//!     train: EmailCorpus::new(vec![Email::new("Cheap pills", "Buy now, limited offer")]),
//!     test: TestSet::from_reader("-1 |subject cheap |content buy now\n".as_bytes())?,
//! };
//! let labeler = Labeler::new(
//!     dataset,
//!     LearnerBuilder::new().with_bits(16).build()?,
//!     LabelStore::new(),
//!     StatePaths { model: dir.join("model.bin"), labels: dir.join("labels.json") },
//!     NonZeroUsize::new(1000),
//! );
//!
//! labeler.assign_label(0, Label::Spam)?;
//! assert!(labeler.prediction(0)? < 0.5);
//! assert_eq!(labeler.counts(), (0, 1));
//! println!("{}", labeler.report()?.quality);
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! A [`Labeler`] can be shared across threads with `Arc`. Reads (emails,
//! predictions, reports) run concurrently; labeling requests are serialized and
//! readers never observe a partially applied update.

pub mod classifier;
pub mod config;
pub mod emails;
pub mod encoder;
pub mod error;
pub mod label;
pub mod label_store;
pub mod labeler;
pub mod metrics;
pub mod reporter;
pub mod server;
pub mod state;
mod storage;
pub mod trainer;

pub use classifier::{
    Example, LearnerBuilder, LearnerConfig, LearnerError, LinearLearner, Link, Loss, OnlineLearner,
};
pub use config::LabelerConfig;
pub use emails::{Dataset, Email, EmailCorpus};
pub use encoder::FeatureEncoder;
pub use error::LabelerError;
pub use label::Label;
pub use label_store::LabelStore;
pub use labeler::{EmailView, LabelView, Labeler};
pub use metrics::{ClassMetrics, ClassificationReport};
pub use reporter::{EvaluationReporter, Report, TestSet};
pub use server::ServerConfig;
pub use trainer::{ConvergenceTrainer, StatePaths};

pub fn init_logger() {
    env_logger::init();
}
