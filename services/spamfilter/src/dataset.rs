//! The labeled SMS dataset used by the offline training job.
//!
//! The file is a headerless TSV of `label<TAB>message` rows with `ham` and
//! `spam` labels. It is downloaded once and reused from disk on later runs.

use std::fs;
use std::path::Path;
use std::time::Duration;

/// Where the labeled SMS corpus is published.
pub const DATA_URL: &str =
    "https://raw.githubusercontent.com/justmarkham/pycon-2016-tutorial/master/data/sms.tsv";

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to download dataset: {0}")]
    Download(#[from] reqwest::Error),
    #[error("failed to read dataset file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse dataset: {0}")]
    Parse(#[from] csv::Error),
    #[error("unknown label '{0}' in dataset")]
    UnknownLabel(String),
    #[error("malformed dataset row {0}: expected label and message")]
    MalformedRow(u64),
}

/// One labeled message. `label` is 0 for ham, 1 for spam.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsRecord {
    pub label: u8,
    pub message: String,
}

/// Downloads the dataset to `dest` unless it is already present.
pub fn download_if_missing(url: &str, dest: &Path) -> Result<(), DatasetError> {
    if dest.exists() {
        return Ok(());
    }
    let client = reqwest::blocking::Client::builder()
        .timeout(DOWNLOAD_TIMEOUT)
        .build()?;
    let bytes = client.get(url).send()?.error_for_status()?.bytes()?;
    fs::write(dest, &bytes)?;
    Ok(())
}

/// Parses the TSV file into labeled records.
pub fn load(path: &Path) -> Result<Vec<SmsRecord>, DatasetError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        // Messages contain raw quote characters; they are not CSV quoting.
        .quoting(false)
        .flexible(true)
        .from_path(path)?;

    let mut records = Vec::new();
    for (line, result) in reader.records().enumerate() {
        let record = result?;
        let raw_label = record
            .get(0)
            .ok_or(DatasetError::MalformedRow(line as u64 + 1))?;
        let message = record
            .get(1)
            .ok_or(DatasetError::MalformedRow(line as u64 + 1))?;
        let label = match raw_label {
            "ham" => 0,
            "spam" => 1,
            other => return Err(DatasetError::UnknownLabel(other.to_string())),
        };
        records.push(SmsRecord {
            label,
            message: message.to_string(),
        });
    }
    Ok(records)
}
