//! Lexical answer-comparison metrics.
//!
//! Four pure functions (token F1, exact match, chrF, BLEU) plus the shared
//! SQuAD-style answer normalization. chrF and BLEU are sentence-level and
//! reported on the usual 0-100 scale; F1 and exact match are 0-1.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// chrF character n-gram order.
const CHRF_ORDER: usize = 6;
/// chrF recall weight (beta).
const CHRF_BETA: f64 = 2.0;
/// BLEU n-gram order.
const BLEU_ORDER: usize = 4;

static ARTICLES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(a|an|the)\b").expect("article regex is valid"));

/// Fixed-field score record for one (prediction, reference) answer pair.
///
/// All four metrics are always produced together; per-line and corpus values
/// are plain arithmetic means of these records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerScores {
    /// Token-overlap F1, 0-1.
    pub f1: f64,
    /// Exact match as 0/1.
    pub exact_match: f64,
    /// Sentence chrF, 0-100.
    pub chrf: f64,
    /// Sentence BLEU, 0-100.
    pub bleu: f64,
}

impl AnswerScores {
    /// Add another record field-wise.
    pub fn accumulate(&mut self, other: &AnswerScores) {
        self.f1 += other.f1;
        self.exact_match += other.exact_match;
        self.chrf += other.chrf;
        self.bleu += other.bleu;
    }

    /// Divide all fields by `factor`.
    #[must_use]
    pub fn scaled(self, factor: f64) -> AnswerScores {
        AnswerScores {
            f1: self.f1 / factor,
            exact_match: self.exact_match / factor,
            chrf: self.chrf / factor,
            bleu: self.bleu / factor,
        }
    }

    /// Mean of a slice of records; all zeros for an empty slice.
    #[must_use]
    pub fn mean(records: &[AnswerScores]) -> AnswerScores {
        if records.is_empty() {
            return AnswerScores::default();
        }
        let mut total = AnswerScores::default();
        for record in records {
            total.accumulate(record);
        }
        total.scaled(records.len() as f64)
    }
}

/// Lowercase, strip punctuation, drop English articles, collapse whitespace.
#[must_use]
pub fn normalize_answer(s: &str) -> String {
    let lowered = s.to_lowercase();
    let no_punct: String = lowered
        .chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect();
    let no_articles = ARTICLES.replace_all(&no_punct, " ");
    no_articles.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn prepare(text: &str, normalize: bool) -> Vec<String> {
    if normalize {
        normalize_answer(text)
            .split_whitespace()
            .map(str::to_string)
            .collect()
    } else {
        text.split_whitespace().map(str::to_string).collect()
    }
}

/// Word-level F1 between prediction and ground truth.
///
/// Token-multiset overlap; returns 0 when there is no overlap (including
/// empty inputs) rather than dividing by zero.
#[must_use]
pub fn f1_score(prediction: &str, ground_truth: &str, normalize: bool) -> f64 {
    let pred_tokens = prepare(prediction, normalize);
    let truth_tokens = prepare(ground_truth, normalize);

    let mut truth_counts: HashMap<&str, usize> = HashMap::new();
    for token in &truth_tokens {
        *truth_counts.entry(token.as_str()).or_insert(0) += 1;
    }

    let mut num_same = 0usize;
    for token in &pred_tokens {
        if let Some(count) = truth_counts.get_mut(token.as_str()) {
            if *count > 0 {
                *count -= 1;
                num_same += 1;
            }
        }
    }

    if num_same == 0 {
        return 0.0;
    }
    let precision = num_same as f64 / pred_tokens.len() as f64;
    let recall = num_same as f64 / truth_tokens.len() as f64;
    2.0 * precision * recall / (precision + recall)
}

/// Exact string match as 0/1.
#[must_use]
pub fn exact_match_score(prediction: &str, ground_truth: &str, normalize: bool) -> f64 {
    let matched = if normalize {
        normalize_answer(prediction) == normalize_answer(ground_truth)
    } else {
        prediction == ground_truth
    };
    if matched {
        1.0
    } else {
        0.0
    }
}

fn char_ngram_counts(chars: &[char], n: usize) -> HashMap<&[char], usize> {
    let mut counts = HashMap::new();
    if n == 0 || chars.len() < n {
        return counts;
    }
    for window in chars.windows(n) {
        *counts.entry(window).or_insert(0) += 1;
    }
    counts
}

/// Sentence-level chrF (character n-gram F-score, beta = 2, n <= 6), 0-100.
///
/// Computed on whitespace-removed characters, averaging precision and recall
/// over the n-gram orders both sides have, as the standard sacrebleu
/// formulation does.
#[must_use]
pub fn chrf_score(prediction: &str, ground_truth: &str, normalize: bool) -> f64 {
    let (pred, truth) = if normalize {
        (normalize_answer(prediction), normalize_answer(ground_truth))
    } else {
        (prediction.to_string(), ground_truth.to_string())
    };

    let pred_chars: Vec<char> = pred.chars().filter(|c| !c.is_whitespace()).collect();
    let truth_chars: Vec<char> = truth.chars().filter(|c| !c.is_whitespace()).collect();

    let mut precision_sum = 0.0;
    let mut recall_sum = 0.0;
    let mut orders = 0usize;

    for n in 1..=CHRF_ORDER {
        let pred_ngrams = char_ngram_counts(&pred_chars, n);
        let truth_ngrams = char_ngram_counts(&truth_chars, n);

        let pred_total: usize = pred_ngrams.values().sum();
        let truth_total: usize = truth_ngrams.values().sum();
        if pred_total == 0 && truth_total == 0 {
            continue;
        }
        orders += 1;

        let mut matches = 0usize;
        for (ngram, &count) in &pred_ngrams {
            matches += count.min(truth_ngrams.get(ngram).copied().unwrap_or(0));
        }

        if pred_total > 0 {
            precision_sum += matches as f64 / pred_total as f64;
        }
        if truth_total > 0 {
            recall_sum += matches as f64 / truth_total as f64;
        }
    }

    if orders == 0 {
        return 0.0;
    }
    let precision = precision_sum / orders as f64;
    let recall = recall_sum / orders as f64;
    if precision + recall == 0.0 {
        return 0.0;
    }
    let beta_sq = CHRF_BETA * CHRF_BETA;
    100.0 * (1.0 + beta_sq) * precision * recall / (beta_sq * precision + recall)
}

fn word_ngram_counts(tokens: &[String], n: usize) -> HashMap<&[String], usize> {
    let mut counts = HashMap::new();
    if n == 0 || tokens.len() < n {
        return counts;
    }
    for window in tokens.windows(n) {
        *counts.entry(window).or_insert(0) += 1;
    }
    counts
}

/// Sentence-level smoothed BLEU (clipped 4-gram precision, brevity penalty),
/// 0-100.
///
/// Zero n-gram matches are exponentially smoothed and the geometric mean runs
/// over the effective orders only, so short answers still get graded instead
/// of collapsing to 0.
#[must_use]
pub fn bleu_score(prediction: &str, ground_truth: &str, normalize: bool) -> f64 {
    let pred_tokens = prepare(prediction, normalize);
    let truth_tokens = prepare(ground_truth, normalize);

    if pred_tokens.is_empty() || truth_tokens.is_empty() {
        return 0.0;
    }

    let mut log_precision_sum = 0.0;
    let mut effective_order = 0usize;
    let mut smooth = 1.0f64;

    for n in 1..=BLEU_ORDER {
        let pred_ngrams = word_ngram_counts(&pred_tokens, n);
        let truth_ngrams = word_ngram_counts(&truth_tokens, n);

        let total: usize = pred_ngrams.values().sum();
        if total == 0 {
            break;
        }
        effective_order = n;

        let mut clipped = 0usize;
        for (ngram, &count) in &pred_ngrams {
            clipped += count.min(truth_ngrams.get(ngram).copied().unwrap_or(0));
        }

        let precision = if clipped > 0 {
            clipped as f64 / total as f64
        } else {
            smooth *= 2.0;
            1.0 / (smooth * total as f64)
        };
        log_precision_sum += precision.ln();
    }

    if effective_order == 0 {
        return 0.0;
    }

    let geo_mean = (log_precision_sum / effective_order as f64).exp();
    let pred_len = pred_tokens.len() as f64;
    let truth_len = truth_tokens.len() as f64;
    let brevity_penalty = if pred_len >= truth_len {
        1.0
    } else {
        (1.0 - truth_len / pred_len).exp()
    };

    100.0 * brevity_penalty * geo_mean
}

/// Score one (prediction, reference) answer pair with all four metrics,
/// normalization applied.
#[must_use]
pub fn compare_answers(prediction: &str, ground_truth: &str) -> AnswerScores {
    AnswerScores {
        f1: f1_score(prediction, ground_truth, true),
        exact_match: exact_match_score(prediction, ground_truth, true),
        chrf: chrf_score(prediction, ground_truth, true),
        bleu: bleu_score(prediction, ground_truth, true),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_strips_articles_punct_case() {
        assert_eq!(normalize_answer("The Red Mat!"), "red mat");
        assert_eq!(normalize_answer("an  apple, a day"), "apple day");
        assert_eq!(normalize_answer("THE"), "");
    }

    #[test]
    fn f1_identity_on_raw_tokens() {
        assert_eq!(f1_score("the red mat", "the red mat", false), 1.0);
        assert_eq!(f1_score("one", "one", false), 1.0);
    }

    #[test]
    fn f1_zero_overlap_is_zero_not_error() {
        assert_eq!(f1_score("alpha beta", "gamma delta", false), 0.0);
        assert_eq!(f1_score("", "gamma", false), 0.0);
        assert_eq!(f1_score("", "", true), 0.0);
    }

    #[test]
    fn f1_bounds() {
        let cases = [
            ("a cat", "the cat", true),
            ("red mat", "a red carpet", false),
            ("x y z", "x", false),
        ];
        for (pred, truth, norm) in cases {
            let score = f1_score(pred, truth, norm);
            assert!((0.0..=1.0).contains(&score), "{pred}/{truth}: {score}");
        }
    }

    #[test]
    fn f1_respects_multiset_counts() {
        // "the the" vs "the": only one token can match.
        let score = f1_score("the the", "the", false);
        let expected = 2.0 * (0.5 * 1.0) / (0.5 + 1.0);
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn exact_match_symmetry() {
        for (a, b) in [("cat", "the cat"), ("same", "same"), ("", "x")] {
            for norm in [false, true] {
                assert_eq!(
                    exact_match_score(a, b, norm),
                    exact_match_score(b, a, norm)
                );
            }
        }
        assert_eq!(exact_match_score("The cat", "cat", true), 1.0);
        assert_eq!(exact_match_score("The cat", "cat", false), 0.0);
    }

    #[test]
    fn chrf_identical_is_maximal() {
        let score = chrf_score("the red mat", "the red mat", false);
        assert!((score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn chrf_disjoint_is_zero() {
        assert_eq!(chrf_score("aaaa", "zzzz", false), 0.0);
        assert_eq!(chrf_score("", "", false), 0.0);
    }

    #[test]
    fn chrf_partial_overlap_in_between() {
        let score = chrf_score("a red hat", "the red mat", true);
        assert!(score > 20.0 && score < 100.0, "chrf = {score}");
    }

    #[test]
    fn bleu_identical_is_maximal() {
        let score = bleu_score("the red mat sat here", "the red mat sat here", false);
        assert!((score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn bleu_empty_and_disjoint() {
        assert_eq!(bleu_score("", "anything", false), 0.0);
        assert_eq!(bleu_score("anything", "", false), 0.0);
        let disjoint = bleu_score("alpha beta", "gamma delta", false);
        assert!(disjoint < 30.0);
    }

    #[test]
    fn bleu_short_prediction_penalized() {
        let long = bleu_score("the red mat", "the red mat", false);
        let short = bleu_score("the", "the red mat", false);
        assert!(short < long);
    }

    #[test]
    fn compare_answers_is_normalized_tuple() {
        let scores = compare_answers("The red mat", "red mat");
        assert_eq!(scores.f1, 1.0);
        assert_eq!(scores.exact_match, 1.0);
        assert!(scores.chrf > 99.0);
        assert!(scores.bleu > 99.0);
    }

    #[test]
    fn mean_of_records() {
        let a = AnswerScores {
            f1: 1.0,
            exact_match: 1.0,
            chrf: 100.0,
            bleu: 100.0,
        };
        let b = AnswerScores::default();
        let mean = AnswerScores::mean(&[a, b]);
        assert_eq!(mean.f1, 0.5);
        assert_eq!(mean.chrf, 50.0);
        assert_eq!(AnswerScores::mean(&[]), AnswerScores::default());
    }
}
