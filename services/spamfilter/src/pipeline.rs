//! The fitted vectorizer/classifier bundle and its on-disk artifact.

use crate::logreg::{LogisticRegression, TrainOptions};
use crate::preprocess;
use crate::tfidf::{DEFAULT_MAX_FEATURES, TfidfVectorizer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(
        "model artifact '{0}' not found. Run `spam-train` first to fit and save the model."
    )]
    ArtifactMissing(PathBuf),
    #[error("failed to access model artifact: {0}")]
    Io(#[from] std::io::Error),
    #[error("model artifact is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// The classifier's verdict for one message.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    Spam,
    NotSpam,
}

impl Label {
    fn from_class(class: u8) -> Self {
        if class == 1 { Label::Spam } else { Label::NotSpam }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Spam => write!(f, "Spam"),
            Label::NotSpam => write!(f, "Not Spam"),
        }
    }
}

/// A prediction with the winning class's probability as confidence.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: Label,
    /// Probability of the predicted class, in `[0.5, 1]`.
    pub confidence: f64,
    pub spam_probability: f64,
}

/// Knobs for [`SpamPipeline::fit`].
#[derive(Debug, Clone)]
pub struct FitOptions {
    pub max_features: usize,
    pub train: TrainOptions,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_features: DEFAULT_MAX_FEATURES,
            train: TrainOptions::default(),
        }
    }
}

/// The fitted pipeline: preprocessing is stateless, so the artifact is the
/// vectorizer plus the classifier.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SpamPipeline {
    vectorizer: TfidfVectorizer,
    classifier: LogisticRegression,
}

impl SpamPipeline {
    /// Fits the vectorizer and classifier on raw messages with 0/1 labels.
    pub fn fit(messages: &[String], labels: &[u8], options: &FitOptions) -> Self {
        let documents: Vec<Vec<String>> =
            messages.iter().map(|m| preprocess::clean(m)).collect();
        let vectorizer = TfidfVectorizer::fit(&documents, options.max_features);
        let rows: Vec<Vec<(usize, f64)>> = documents
            .iter()
            .map(|doc| vectorizer.transform(doc))
            .collect();
        let classifier = LogisticRegression::fit(
            &rows,
            labels,
            vectorizer.vocabulary_size(),
            &options.train,
        );
        Self {
            vectorizer,
            classifier,
        }
    }

    /// Hard 0/1 prediction, used when evaluating against label vectors.
    pub fn predict_class(&self, text: &str) -> u8 {
        let row = self.vectorizer.transform(&preprocess::clean(text));
        self.classifier.predict(&row)
    }

    /// Classifies one raw message.
    pub fn predict(&self, text: &str) -> Prediction {
        let row = self.vectorizer.transform(&preprocess::clean(text));
        let spam_probability = self.classifier.predict_proba(&row);
        let label = Label::from_class(u8::from(spam_probability >= 0.5));
        Prediction {
            label,
            confidence: spam_probability.max(1.0 - spam_probability),
            spam_probability,
        }
    }

    /// Writes the artifact as JSON.
    pub fn save(&self, path: &Path) -> Result<(), PipelineError> {
        let json = serde_json::to_vec_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Loads the artifact, distinguishing a missing file (with the
    /// actionable run-the-trainer message) from an unreadable or corrupt
    /// one.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(PipelineError::ArtifactMissing(path.to_path_buf()));
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&json)?)
    }
}
