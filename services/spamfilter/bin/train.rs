//! Offline training job for the spam classifier.
//!
//! Downloads the labeled SMS dataset (once), fits the TF-IDF +
//! logistic-regression pipeline on a stratified train split, evaluates on
//! the held-out test split, and writes the model artifact plus a metrics
//! report to disk.

use anyhow::Context;
use clap::Parser;
use spamfilter::{
    dataset,
    logreg::TrainOptions,
    metrics::{self, MetricsReport, Samples},
    pipeline::{FitOptions, SpamPipeline},
    split, tfidf,
};
use std::fs;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "spam-train", about = "Fit and save the spam-classification pipeline")]
struct Args {
    /// Where the dataset is cached locally.
    #[arg(long, default_value = "sms.tsv")]
    data_path: PathBuf,

    /// Where the dataset is downloaded from if the local copy is missing.
    #[arg(long, default_value = dataset::DATA_URL)]
    data_url: String,

    /// Where the fitted pipeline artifact is written.
    #[arg(long, default_value = "spam_model.json")]
    model_path: PathBuf,

    /// Where the evaluation report is written.
    #[arg(long, default_value = "metrics.json")]
    metrics_path: PathBuf,

    /// Fraction of each class held out for evaluation.
    #[arg(long, default_value_t = 0.2)]
    test_fraction: f64,

    /// Seed for the stratified shuffle.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Vocabulary cap for the TF-IDF vectorizer.
    #[arg(long, default_value_t = tfidf::DEFAULT_MAX_FEATURES)]
    max_features: usize,

    #[arg(long, default_value_t = 1.0)]
    learning_rate: f64,

    #[arg(long, default_value_t = 200)]
    max_iterations: usize,

    /// L2 regularization strength.
    #[arg(long, default_value_t = 1e-4)]
    l2: f64,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    let args = Args::parse();

    dataset::download_if_missing(&args.data_url, &args.data_path)
        .context("Failed to download the SMS dataset")?;
    let records = dataset::load(&args.data_path).context("Failed to parse the SMS dataset")?;
    info!(total = records.len(), "Dataset loaded.");

    let (train, test) = split::stratified_split(records, args.test_fraction, args.seed);
    let samples = Samples {
        train: train.len(),
        test: test.len(),
    };
    info!(train = samples.train, test = samples.test, "Stratified split done.");

    let (train_texts, train_labels): (Vec<String>, Vec<u8>) =
        train.into_iter().map(|r| (r.message, r.label)).unzip();
    let options = FitOptions {
        max_features: args.max_features,
        train: TrainOptions {
            learning_rate: args.learning_rate,
            max_iterations: args.max_iterations,
            l2: args.l2,
            ..TrainOptions::default()
        },
    };
    let pipeline = SpamPipeline::fit(&train_texts, &train_labels, &options);
    info!("Pipeline fitted.");

    let (test_texts, test_labels): (Vec<String>, Vec<u8>) =
        test.into_iter().map(|r| (r.message, r.label)).unzip();
    let predicted: Vec<u8> = test_texts
        .iter()
        .map(|text| pipeline.predict_class(text))
        .collect();
    let evaluation = metrics::evaluate(&test_labels, &predicted);

    pipeline
        .save(&args.model_path)
        .context("Failed to write the model artifact")?;
    let report = MetricsReport {
        evaluation,
        samples,
        model_path: args.model_path.display().to_string(),
    };
    fs::write(&args.metrics_path, serde_json::to_vec_pretty(&report)?)
        .context("Failed to write the metrics report")?;

    info!(
        accuracy = report.evaluation.accuracy,
        model_path = %args.model_path.display(),
        metrics_path = %args.metrics_path.display(),
        "Training complete."
    );
    Ok(())
}
