//! Evaluation metrics written to `metrics.json` by the training job.

use serde::{Deserialize, Serialize};

/// Precision/recall/F1 for one class, or an average over classes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

/// Per-class metrics plus macro and support-weighted averages.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ClassificationReport {
    pub not_spam: ClassMetrics,
    pub spam: ClassMetrics,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

/// Everything computable from a truth/prediction pair.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Evaluation {
    pub accuracy: f64,
    /// Rows are truth, columns are prediction; index 0 is ham, 1 is spam.
    pub confusion_matrix: [[usize; 2]; 2],
    pub classification_report: ClassificationReport,
}

/// Counts of the samples each side of the train/test split.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Samples {
    pub train: usize,
    pub test: usize,
}

/// The full report the training job serializes to `metrics.json`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MetricsReport {
    #[serde(flatten)]
    pub evaluation: Evaluation,
    pub samples: Samples,
    pub model_path: String,
}

fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

fn class_metrics(confusion: &[[usize; 2]; 2], class: usize) -> ClassMetrics {
    let tp = confusion[class][class] as f64;
    let predicted = (confusion[0][class] + confusion[1][class]) as f64;
    let support = confusion[class][0] + confusion[class][1];

    let precision = safe_div(tp, predicted);
    let recall = safe_div(tp, support as f64);
    let f1_score = safe_div(2.0 * precision * recall, precision + recall);
    ClassMetrics {
        precision,
        recall,
        f1_score,
        support,
    }
}

/// Computes accuracy, the confusion matrix, and the per-class report.
///
/// `truth` and `predicted` are parallel 0/1 label vectors.
pub fn evaluate(truth: &[u8], predicted: &[u8]) -> Evaluation {
    assert_eq!(truth.len(), predicted.len());

    let mut confusion_matrix = [[0usize; 2]; 2];
    for (&t, &p) in truth.iter().zip(predicted) {
        confusion_matrix[usize::from(t)][usize::from(p)] += 1;
    }

    let total = truth.len() as f64;
    let correct = (confusion_matrix[0][0] + confusion_matrix[1][1]) as f64;
    let accuracy = safe_div(correct, total);

    let not_spam = class_metrics(&confusion_matrix, 0);
    let spam = class_metrics(&confusion_matrix, 1);

    let macro_avg = ClassMetrics {
        precision: (not_spam.precision + spam.precision) / 2.0,
        recall: (not_spam.recall + spam.recall) / 2.0,
        f1_score: (not_spam.f1_score + spam.f1_score) / 2.0,
        support: not_spam.support + spam.support,
    };
    let total_support = (not_spam.support + spam.support) as f64;
    let weighted = |a: f64, b: f64| {
        safe_div(
            a * not_spam.support as f64 + b * spam.support as f64,
            total_support,
        )
    };
    let weighted_avg = ClassMetrics {
        precision: weighted(not_spam.precision, spam.precision),
        recall: weighted(not_spam.recall, spam.recall),
        f1_score: weighted(not_spam.f1_score, spam.f1_score),
        support: not_spam.support + spam.support,
    };

    Evaluation {
        accuracy,
        confusion_matrix,
        classification_report: ClassificationReport {
            not_spam,
            spam,
            macro_avg,
            weighted_avg,
        },
    }
}
