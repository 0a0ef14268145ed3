//! The online classifier: example encoding, the learner contract and the
//! hashed logistic engine behind it.

mod builder;
mod error;
mod example;
mod learner;
mod linear;

pub use builder::LearnerBuilder;
pub use error::LearnerError;
pub use example::{sanitize_token, Example, Feature, Namespace};
pub use learner::{LearnerConfig, Link, Loss, OnlineLearner, DECISION_THRESHOLD};
pub use linear::LinearLearner;
