//! Text normalization applied before vectorization.
//!
//! Each document is lowercased, stripped of everything outside `[a-z0-9]`,
//! whitespace-tokenized, filtered of English stopwords and one-character
//! tokens, and stemmed with the Snowball English stemmer.

use rust_stemmers::{Algorithm, Stemmer};

/// English stopwords, sorted for binary search. Contractions are absent
/// because apostrophes are stripped during normalization, which splits
/// them into their base word and a one-character remainder.
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "ain", "all", "am", "an", "and", "any",
    "are", "aren", "as", "at", "be", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "can", "couldn", "d", "did", "didn", "do", "does", "doesn", "doing",
    "don", "down", "during", "each", "few", "for", "from", "further", "had", "hadn", "has",
    "hasn", "have", "haven", "having", "he", "her", "here", "hers", "herself", "him", "himself",
    "his", "how", "i", "if", "in", "into", "is", "isn", "it", "its", "itself", "just", "ll", "m",
    "ma", "me", "mightn", "more", "most", "mustn", "my", "myself", "needn", "no", "nor", "not",
    "now", "o", "of", "off", "on", "once", "only", "or", "other", "our", "ours", "ourselves",
    "out", "over", "own", "re", "s", "same", "shan", "she", "should", "shouldn", "so", "some",
    "such", "t", "than", "that", "the", "their", "theirs", "them", "themselves", "then", "there",
    "these", "they", "this", "those", "through", "to", "too", "under", "until", "up", "ve",
    "very", "was", "wasn", "we", "were", "weren", "what", "when", "where", "which", "while",
    "who", "whom", "why", "will", "with", "won", "wouldn", "y", "you", "your", "yours",
    "yourself", "yourselves",
];

fn is_stopword(token: &str) -> bool {
    STOPWORDS.binary_search(&token).is_ok()
}

/// Cleans one document into the token sequence fed to the vectorizer.
pub fn clean(text: &str) -> Vec<String> {
    let stemmer = Stemmer::create(Algorithm::English);
    let mut normalized = String::with_capacity(text.len());
    for ch in text.chars() {
        let ch = ch.to_ascii_lowercase();
        if ch.is_ascii_alphanumeric() {
            normalized.push(ch);
        } else {
            normalized.push(' ');
        }
    }
    normalized
        .split_whitespace()
        .filter(|token| token.len() > 1 && !is_stopword(token))
        .map(|token| stemmer.stem(token).into_owned())
        .collect()
}

/// The cleaned document as a single space-joined string, for inspection.
pub fn normalize(text: &str) -> String {
    clean(text).join(" ")
}
