use lazy_static::lazy_static;
use regex::Regex;

use crate::classifier::Example;
use crate::emails::Email;
use crate::label::Label;

lazy_static! {
    static ref NON_ALPHA: Regex = Regex::new(r"([^a-z ]+)").expect("valid regex");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("valid regex");
}

/// Normalizes free text into space-separated tokens.
///
/// The text is lowercased, every run of characters other than `a-z` and space is
/// split out into its own token, and whitespace is collapsed to single spaces.
/// The result is not trimmed.
///
/// ```rust
/// use spam_labeler::encoder::process_text;
///
/// assert_eq!(process_text("Buy NOW!!! 50% off"), "buy now !!! 50% off");
/// ```
pub fn process_text(text: &str) -> String {
    let folded = text.to_lowercase();
    let split = NON_ALPHA.replace_all(&folded, " $1 ");
    WHITESPACE.replace_all(&split, " ").into_owned()
}

/// Turns emails into examples with a `subject` and a `content` namespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureEncoder;

impl FeatureEncoder {
    pub const SUBJECT: &'static str = "subject";
    pub const CONTENT: &'static str = "content";

    pub fn new() -> Self {
        Self
    }

    /// Encodes an email, attaching the learner target of `label` if one is given.
    pub fn encode(&self, email: &Email, label: Option<Label>) -> Example {
        let subject = process_text(&email.subject);
        let content = process_text(&email.content);

        let example = Example::new()
            .with_namespace(Self::SUBJECT, subject.split_whitespace())
            .with_namespace(Self::CONTENT, content.split_whitespace());

        match label {
            Some(label) => example.with_label(label.target()),
            None => example,
        }
    }
}
