//! Correctness scoring for extracted facts.
//!
//! Title similarity is the symmetric matched-run ratio 2*M / (len_a + len_b),
//! where M counts characters in recursively matched longest common runs. It
//! is order-preserving, not permutation-invariant. The ratio is taken as the
//! max over the raw strings and their leading-article-stripped forms, so
//! "Matrix" against "The Matrix" scores 1.0.

use std::collections::BTreeSet;

use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize)]
pub struct TitleScore {
    pub exact: bool,
    pub fuzzy: bool,
    pub similarity: f64,
    pub token_overlap: f64,
}

impl TitleScore {
    pub fn failed() -> Self {
        Self {
            exact: false,
            fuzzy: false,
            similarity: 0.0,
            token_overlap: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct NumericScore {
    pub exact: bool,
    pub within_tolerance: bool,
    pub error_rate: f64,
}

impl NumericScore {
    pub fn failed() -> Self {
        Self {
            exact: false,
            within_tolerance: false,
            error_rate: 1.0,
        }
    }
}

pub fn score_title(predicted: &str, expected: &str, fuzzy_threshold: f64) -> TitleScore {
    let exact = predicted.trim().to_lowercase() == expected.trim().to_lowercase();
    let similarity = similarity(predicted, expected);
    TitleScore {
        exact,
        fuzzy: similarity >= fuzzy_threshold,
        similarity,
        token_overlap: token_overlap(predicted, expected),
    }
}

/// Exact means equal after rounding to the dataset's two-decimal precision;
/// tolerance means relative error within `tolerance`.
pub fn score_rating(predicted: f64, expected: f64, tolerance: f64) -> NumericScore {
    let exact = round2(predicted) == round2(expected);
    let error_rate = relative_error(predicted, expected);
    NumericScore {
        exact,
        within_tolerance: error_rate <= tolerance,
        error_rate,
    }
}

/// Years match exactly or not at all; the error rate is still the relative
/// error so near misses aggregate differently from wild ones.
pub fn score_year(predicted: i32, expected: i32) -> NumericScore {
    let exact = predicted == expected;
    NumericScore {
        exact,
        within_tolerance: exact,
        error_rate: relative_error(predicted as f64, expected as f64),
    }
}

pub fn similarity(a: &str, b: &str) -> f64 {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    let raw = matched_ratio(&a, &b);
    let stripped = matched_ratio(strip_leading_article(&a), strip_leading_article(&b));
    raw.max(stripped)
}

/// Fraction of the expected title's tokens present among the predicted
/// title's tokens.
pub fn token_overlap(predicted: &str, expected: &str) -> f64 {
    let predicted = tokens(predicted);
    let expected = tokens(expected);
    if expected.is_empty() {
        return 0.0;
    }
    let shared = expected.iter().filter(|t| predicted.contains(*t)).count();
    shared as f64 / expected.len() as f64
}

fn tokens(s: &str) -> BTreeSet<String> {
    s.split_whitespace().map(|t| t.to_lowercase()).collect()
}

fn strip_leading_article(s: &str) -> &str {
    for article in ["the ", "an ", "a "] {
        if let Some(rest) = s.strip_prefix(article) {
            return rest;
        }
    }
    s
}

fn matched_ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let matched = matched_chars(&a, &b) as f64;
    2.0 * matched / (a.len() + b.len()) as f64
}

fn matched_chars(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let (start_a, start_b, length) = longest_common_run(a, b);
    if length == 0 {
        return 0;
    }
    length
        + matched_chars(&a[..start_a], &b[..start_b])
        + matched_chars(&a[start_a + length..], &b[start_b + length..])
}

fn longest_common_run(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    for i in 0..a.len() {
        for j in 0..b.len() {
            if a[i] != b[j] {
                continue;
            }
            let mut k = 1;
            while i + k < a.len() && j + k < b.len() && a[i + k] == b[j + k] {
                k += 1;
            }
            if k > best.2 {
                best = (i, j, k);
            }
        }
    }
    best
}

pub(super) fn round2(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

fn relative_error(predicted: f64, expected: f64) -> f64 {
    if expected == 0.0 {
        if predicted == 0.0 {
            0.0
        } else {
            1.0
        }
    } else {
        (predicted - expected).abs() / expected.abs()
    }
}
