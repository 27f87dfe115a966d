// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! LexRank extractive summarization
//!
//! Sentences are compared with IDF-modified cosine similarity, linked when the
//! similarity exceeds the threshold, and ranked by the stationary distribution
//! of the row-normalised graph (power method).

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use unicode_segmentation::UnicodeSegmentation;

/// Similarity above which two sentences are linked
pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// Power method convergence bound
pub const DEFAULT_EPSILON: f64 = 0.1;

/// Hard cap on power iterations
const MAX_ITERATIONS: usize = 1000;

#[derive(Debug, Error, PartialEq)]
pub enum SummaryError {
    #[error("Requested summary length must be at least one sentence")]
    ZeroSentences,

    #[error("Sentence ranking did not converge")]
    Diverged,
}

/// LexRank summarizer
#[derive(Debug, Clone, Copy)]
pub struct LexRankSummarizer {
    pub threshold: f64,
    pub epsilon: f64,
}

impl Default for LexRankSummarizer {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            epsilon: DEFAULT_EPSILON,
        }
    }
}

impl LexRankSummarizer {
    /// Return the `count` highest-ranked sentences joined by a space, in document order.
    ///
    /// Empty input yields an empty string.
    pub fn summarize(&self, text: &str, count: usize) -> Result<String, SummaryError> {
        if count == 0 {
            return Err(SummaryError::ZeroSentences);
        }

        let sentences = split_sentences(text);
        if sentences.is_empty() {
            return Ok(String::new());
        }
        if sentences.len() <= count {
            return Ok(sentences.join(" "));
        }

        let words: Vec<Vec<String>> = sentences.iter().map(|s| tokenize_words(s)).collect();
        let ratings = self.rate(&words)?;

        let mut order: Vec<usize> = (0..sentences.len()).collect();
        // Stable sort keeps earlier sentences first on ties
        order.sort_by(|&a, &b| ratings[b].total_cmp(&ratings[a]));
        let mut best: Vec<usize> = order.into_iter().take(count).collect();
        best.sort_unstable();

        Ok(best
            .into_iter()
            .map(|i| sentences[i].as_str())
            .collect::<Vec<_>>()
            .join(" "))
    }

    /// Centrality score of every sentence
    pub fn rate(&self, sentences: &[Vec<String>]) -> Result<Vec<f64>, SummaryError> {
        let tf: Vec<HashMap<&str, f64>> = sentences.iter().map(|s| term_frequencies(s)).collect();
        let idf = inverse_document_frequencies(sentences);

        let n = sentences.len();
        let mut matrix = vec![vec![0.0f64; n]; n];
        for row in 0..n {
            let mut degree = 0.0;
            for col in 0..n {
                let similarity = cosine_similarity(&tf[row], &tf[col], &idf);
                if similarity > self.threshold {
                    matrix[row][col] = 1.0;
                    degree += 1.0;
                }
            }
            if degree > 0.0 {
                for value in matrix[row].iter_mut() {
                    *value /= degree;
                }
            }
        }

        let ratings = self.power_method(&matrix);
        if ratings.iter().any(|r| !r.is_finite()) {
            return Err(SummaryError::Diverged);
        }
        Ok(ratings)
    }

    fn power_method(&self, matrix: &[Vec<f64>]) -> Vec<f64> {
        let n = matrix.len();
        let mut p = vec![1.0 / n as f64; n];

        for _ in 0..MAX_ITERATIONS {
            // next = Mᵀ · p
            let mut next = vec![0.0; n];
            for (row, weights) in matrix.iter().enumerate() {
                for (col, w) in weights.iter().enumerate() {
                    next[col] += w * p[row];
                }
            }

            let delta = next
                .iter()
                .zip(&p)
                .map(|(a, b)| (a - b).powi(2))
                .sum::<f64>()
                .sqrt();
            p = next;
            if delta < self.epsilon {
                break;
            }
        }

        p
    }
}

/// Split text into trimmed sentences at UAX #29 sentence boundaries
///
/// Segments without any alphanumeric character are dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    text.unicode_sentences()
        .map(str::trim)
        .filter(|s| s.chars().any(char::is_alphanumeric))
        .map(str::to_string)
        .collect()
}

/// Lower-cased UAX #29 word tokens
pub fn tokenize_words(sentence: &str) -> Vec<String> {
    sentence
        .unicode_words()
        .map(str::to_lowercase)
        .collect()
}

/// Term frequency normalised by the most frequent term
fn term_frequencies(words: &[String]) -> HashMap<&str, f64> {
    let mut counts: HashMap<&str, f64> = HashMap::new();
    for w in words {
        *counts.entry(w.as_str()).or_insert(0.0) += 1.0;
    }
    let max = counts.values().cloned().fold(1.0, f64::max);
    for v in counts.values_mut() {
        *v /= max;
    }
    counts
}

/// `ln(N / (1 + n_t))` per term
fn inverse_document_frequencies(sentences: &[Vec<String>]) -> HashMap<&str, f64> {
    let total = sentences.len() as f64;
    let sets: Vec<HashSet<&str>> = sentences
        .iter()
        .map(|s| s.iter().map(String::as_str).collect())
        .collect();

    let mut idf = HashMap::new();
    for set in &sets {
        for &term in set {
            idf.entry(term).or_insert_with(|| {
                let containing = sets.iter().filter(|s| s.contains(term)).count() as f64;
                (total / (1.0 + containing)).ln()
            });
        }
    }
    idf
}

fn cosine_similarity(
    a: &HashMap<&str, f64>,
    b: &HashMap<&str, f64>,
    idf: &HashMap<&str, f64>,
) -> f64 {
    let weight = |term: &str| idf.get(term).copied().unwrap_or(0.0);

    let numerator: f64 = a
        .iter()
        .filter_map(|(term, tf_a)| b.get(term).map(|tf_b| tf_a * tf_b * weight(*term).powi(2)))
        .sum();

    let norm = |tf: &HashMap<&str, f64>| {
        tf.iter()
            .map(|(term, v)| (v * weight(*term)).powi(2))
            .sum::<f64>()
            .sqrt()
    };
    let (norm_a, norm_b) = (norm(a), norm(b));

    if norm_a > 0.0 && norm_b > 0.0 {
        numerator / (norm_a * norm_b)
    } else {
        0.0
    }
}
