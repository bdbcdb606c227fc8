//! Spam-classification demo library.
//!
//! Implements the full classification pipeline: text preprocessing, TF-IDF
//! vectorization, a binary logistic-regression classifier, and the
//! train/evaluate/serve plumbing around them. The `spam-train` binary fits
//! the pipeline on a labeled SMS dataset and writes the artifact plus a
//! metrics report; the `spam-web` binary serves predictions from the saved
//! artifact.

pub mod dataset;
pub mod logreg;
pub mod metrics;
pub mod pipeline;
pub mod preprocess;
pub mod split;
pub mod tfidf;
pub mod webapp;
