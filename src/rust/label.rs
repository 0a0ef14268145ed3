use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::classifier::DECISION_THRESHOLD;
use crate::error::LabelerError;

/// A user-assigned class for an email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Ham,
    Spam,
}

impl Label {
    /// The learner's target value: `+1` for ham, `-1` for spam.
    pub fn target(self) -> f32 {
        match self {
            Label::Ham => 1.0,
            Label::Spam => -1.0,
        }
    }

    /// The label a score in `[0, 1]` stands for.
    pub fn from_score(score: f32) -> Self {
        if score >= DECISION_THRESHOLD {
            Label::Ham
        } else {
            Label::Spam
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Ham => "ham",
            Label::Spam => "spam",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Label {
    type Err = LabelerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ham" => Ok(Label::Ham),
            "spam" => Ok(Label::Spam),
            other => Err(LabelerError::InvalidArgument(format!(
                "Label must be \"ham\" or \"spam\", got \"{}\"",
                other
            ))),
        }
    }
}
