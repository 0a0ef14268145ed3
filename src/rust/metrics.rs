//! Binary classification quality metrics.

use std::fmt;

use serde::Serialize;

use crate::label::Label;

/// Precision, recall and F1 for one class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub precision: f32,
    pub recall: f32,
    pub f1: f32,
    /// Number of examples whose true label is this class
    pub support: usize,
}

/// Per-class scores plus averages over a set of predictions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    pub ham: ClassMetrics,
    pub spam: ClassMetrics,
    pub accuracy: f32,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

fn ratio(numerator: usize, denominator: usize) -> f32 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f32 / denominator as f32
    }
}

fn f1(precision: f32, recall: f32) -> f32 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

fn class_metrics(y_true: &[Label], y_pred: &[Label], class: Label) -> ClassMetrics {
    let mut tp = 0;
    let mut fp = 0;
    let mut fn_count = 0;
    for (&truth, &pred) in y_true.iter().zip(y_pred) {
        match (truth == class, pred == class) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (true, false) => fn_count += 1,
            (false, false) => {}
        }
    }

    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_count);
    ClassMetrics {
        precision,
        recall,
        f1: f1(precision, recall),
        support: tp + fn_count,
    }
}

impl ClassificationReport {
    /// Compares predictions against the true labels, position by position.
    ///
    /// Both slices must have the same length. A class that is never predicted
    /// (or never present) scores a precision (or recall) of zero.
    pub fn compute(y_true: &[Label], y_pred: &[Label]) -> Self {
        assert_eq!(y_true.len(), y_pred.len(), "Label slices must have the same length");

        let ham = class_metrics(y_true, y_pred, Label::Ham);
        let spam = class_metrics(y_true, y_pred, Label::Spam);
        let total = y_true.len();

        let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();

        let macro_avg = ClassMetrics {
            precision: (ham.precision + spam.precision) / 2.0,
            recall: (ham.recall + spam.recall) / 2.0,
            f1: (ham.f1 + spam.f1) / 2.0,
            support: total,
        };

        let weight = |m: &ClassMetrics| ratio(m.support, total);
        let weighted_avg = ClassMetrics {
            precision: ham.precision * weight(&ham) + spam.precision * weight(&spam),
            recall: ham.recall * weight(&ham) + spam.recall * weight(&spam),
            f1: ham.f1 * weight(&ham) + spam.f1 * weight(&spam),
            support: total,
        };

        Self {
            ham,
            spam,
            accuracy: ratio(correct, total),
            macro_avg,
            weighted_avg,
        }
    }

    pub fn total(&self) -> usize {
        self.ham.support + self.spam.support
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn row(f: &mut fmt::Formatter<'_>, name: &str, m: &ClassMetrics) -> fmt::Result {
            writeln!(
                f,
                "{:>12}{:>10.2}{:>10.2}{:>10.2}{:>10}",
                name, m.precision, m.recall, m.f1, m.support
            )
        }

        writeln!(f, "{:>12}{:>10}{:>10}{:>10}{:>10}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        row(f, Label::Ham.as_str(), &self.ham)?;
        row(f, Label::Spam.as_str(), &self.spam)?;
        writeln!(f)?;
        writeln!(f, "{:>12}{:>10}{:>10}{:>10.2}{:>10}", "accuracy", "", "", self.accuracy, self.total())?;
        row(f, "macro avg", &self.macro_avg)?;
        row(f, "weighted avg", &self.weighted_avg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Label::{Ham, Spam};

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_perfect_predictions() {
        let y = [Ham, Spam, Spam, Ham];
        let report = ClassificationReport::compute(&y, &y);
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.ham.f1, 1.0);
        assert_eq!(report.spam.support, 2);
    }

    #[test]
    fn test_mixed_predictions() {
        let y_true = [Ham, Ham, Ham, Spam];
        let y_pred = [Ham, Spam, Ham, Spam];
        let report = ClassificationReport::compute(&y_true, &y_pred);

        assert!(close(report.ham.precision, 1.0));
        assert!(close(report.ham.recall, 2.0 / 3.0));
        assert!(close(report.spam.precision, 0.5));
        assert!(close(report.spam.recall, 1.0));
        assert!(close(report.accuracy, 0.75));
        assert_eq!(report.ham.support, 3);
        assert!(close(
            report.weighted_avg.recall,
            (2.0 / 3.0) * 0.75 + 1.0 * 0.25
        ));
    }

    #[test]
    fn test_class_never_predicted_scores_zero() {
        let y_true = [Ham, Spam];
        let y_pred = [Ham, Ham];
        let report = ClassificationReport::compute(&y_true, &y_pred);
        assert_eq!(report.spam.precision, 0.0);
        assert_eq!(report.spam.recall, 0.0);
        assert_eq!(report.spam.f1, 0.0);
    }

    #[test]
    fn test_empty_input() {
        let report = ClassificationReport::compute(&[], &[]);
        assert_eq!(report.accuracy, 0.0);
        assert_eq!(report.total(), 0);
    }

    #[test]
    fn test_display_layout() {
        let report = ClassificationReport::compute(&[Ham, Spam], &[Ham, Spam]);
        let text = report.to_string();
        assert!(text.contains("precision"));
        assert!(text.contains("         ham      1.00      1.00      1.00         1"));
        assert!(text.contains("    accuracy                          1.00         2"));
        assert!(text.contains("weighted avg"));
    }
}
