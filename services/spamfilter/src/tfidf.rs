//! TF-IDF vectorization over cleaned token sequences.
//!
//! Matches the usual text-classification setup: unigram + bigram terms,
//! sublinear term frequency (`1 + ln tf`), smoothed inverse document
//! frequency (`ln((1 + n) / (1 + df)) + 1`), and L2-normalized rows.
//! The vocabulary keeps the `max_features` terms with the highest total
//! corpus count, ties broken alphabetically; column indices are assigned
//! in alphabetical term order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Vocabulary cap used when the trainer does not override it.
pub const DEFAULT_MAX_FEATURES: usize = 20_000;

/// A fitted TF-IDF vectorizer. Serializable as part of the model artifact.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
}

/// The unigram and bigram terms of one cleaned document.
fn terms(tokens: &[String]) -> Vec<String> {
    let mut out: Vec<String> = tokens.to_vec();
    for pair in tokens.windows(2) {
        out.push(format!("{} {}", pair[0], pair[1]));
    }
    out
}

impl TfidfVectorizer {
    /// Fits the vocabulary and idf table on a cleaned corpus.
    pub fn fit(documents: &[Vec<String>], max_features: usize) -> Self {
        let mut total_counts: HashMap<String, u64> = HashMap::new();
        let mut doc_freq: HashMap<String, u64> = HashMap::new();

        for doc in documents {
            let doc_terms = terms(doc);
            for term in &doc_terms {
                *total_counts.entry(term.clone()).or_insert(0) += 1;
            }
            let mut seen: Vec<&String> = doc_terms.iter().collect();
            seen.sort_unstable();
            seen.dedup();
            for term in seen {
                *doc_freq.entry(term.clone()).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(String, u64)> = total_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(max_features);

        let mut selected: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        selected.sort_unstable();

        let n = documents.len() as f64;
        let mut vocabulary = HashMap::with_capacity(selected.len());
        let mut idf = Vec::with_capacity(selected.len());
        for (index, term) in selected.into_iter().enumerate() {
            let df = doc_freq[&term] as f64;
            idf.push(((1.0 + n) / (1.0 + df)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        Self { vocabulary, idf }
    }

    /// Vectorizes one cleaned document into a sparse `(index, weight)` row,
    /// sorted by column index and L2-normalized.
    pub fn transform(&self, tokens: &[String]) -> Vec<(usize, f64)> {
        let mut tf: HashMap<usize, f64> = HashMap::new();
        for term in terms(tokens) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *tf.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut row: Vec<(usize, f64)> = tf
            .into_iter()
            .map(|(index, count)| (index, (1.0 + count.ln()) * self.idf[index]))
            .collect();
        row.sort_by_key(|&(index, _)| index);

        let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, weight) in &mut row {
                *weight /= norm;
            }
        }
        row
    }

    /// Number of terms in the fitted vocabulary.
    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    /// Column index of a term, if it made the vocabulary.
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn doc(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn small_corpus() -> Vec<Vec<String>> {
        vec![doc(&["free", "prize"]), doc(&["free", "call"])]
    }

    #[test]
    fn test_fit_builds_alphabetical_vocabulary_with_bigrams() {
        let vectorizer = TfidfVectorizer::fit(&small_corpus(), DEFAULT_MAX_FEATURES);

        assert_eq!(vectorizer.vocabulary_size(), 5);
        assert_eq!(vectorizer.index_of("call"), Some(0));
        assert_eq!(vectorizer.index_of("free"), Some(1));
        assert_eq!(vectorizer.index_of("free call"), Some(2));
        assert_eq!(vectorizer.index_of("free prize"), Some(3));
        assert_eq!(vectorizer.index_of("prize"), Some(4));
    }

    #[test]
    fn test_smoothed_idf_values() {
        let vectorizer = TfidfVectorizer::fit(&small_corpus(), DEFAULT_MAX_FEATURES);

        // "free" appears in both documents: ln(3/3) + 1 = 1.
        assert_relative_eq!(vectorizer.idf[1], 1.0, epsilon = 1e-12);
        // "prize" appears in one: ln(3/2) + 1.
        assert_relative_eq!(vectorizer.idf[4], (3.0f64 / 2.0).ln() + 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_transform_rows_are_l2_normalized() {
        let vectorizer = TfidfVectorizer::fit(&small_corpus(), DEFAULT_MAX_FEATURES);
        let row = vectorizer.transform(&doc(&["free", "prize"]));

        assert_eq!(row.len(), 3); // free, prize, "free prize"
        let norm: f64 = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        assert_relative_eq!(norm, 1.0, epsilon = 1e-12);

        // The rarer terms outweigh the ubiquitous "free".
        let free = row.iter().find(|(i, _)| *i == 1).unwrap().1;
        let prize = row.iter().find(|(i, _)| *i == 4).unwrap().1;
        assert!(prize > free);
    }

    #[test]
    fn test_sublinear_term_frequency() {
        let vectorizer = TfidfVectorizer::fit(&small_corpus(), DEFAULT_MAX_FEATURES);
        let row = vectorizer.transform(&doc(&["free", "free", "free", "prize"]));

        let free = row.iter().find(|(i, _)| *i == 1).unwrap().1;
        let prize = row.iter().find(|(i, _)| *i == 4).unwrap().1;
        // Weight ratio survives normalization: (1 + ln 3) * idf_free
        // against (1 + ln 1) * idf_prize.
        let expected = (1.0 + 3.0f64.ln()) / ((3.0f64 / 2.0).ln() + 1.0);
        assert_relative_eq!(free / prize, expected, epsilon = 1e-12);
    }

    #[test]
    fn test_max_features_keeps_most_frequent_terms() {
        let corpus = vec![
            doc(&["spam"]),
            doc(&["spam"]),
            doc(&["ham"]),
            doc(&["eggs"]),
        ];
        let vectorizer = TfidfVectorizer::fit(&corpus, 2);

        assert_eq!(vectorizer.vocabulary_size(), 2);
        assert!(vectorizer.index_of("spam").is_some());
        // "eggs" beats "ham" alphabetically at equal count.
        assert!(vectorizer.index_of("eggs").is_some());
        assert!(vectorizer.index_of("ham").is_none());
    }

    #[test]
    fn test_unknown_tokens_produce_an_empty_row() {
        let vectorizer = TfidfVectorizer::fit(&small_corpus(), DEFAULT_MAX_FEATURES);
        assert!(vectorizer.transform(&doc(&["unrelated"])).is_empty());
    }
}
