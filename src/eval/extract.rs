//! Fact extraction from response text.
//!
//! Each variable has an ordered list of declarative rules; the first rule
//! whose first capture parses and passes the range check wins. An
//! out-of-range capture fails that rule only, and later rules still run.

use regex::Regex;
use serde::Serialize;

/// Facts pulled from one response. All three variables are attempted for
/// every response, whatever the observation's target.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExtractedFacts {
    pub title: Option<String>,
    pub rating: Option<f64>,
    pub year: Option<i32>,
}

impl ExtractedFacts {
    pub fn extracted_count(&self) -> usize {
        self.title.is_some() as usize
            + self.rating.is_some() as usize
            + self.year.is_some() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.extracted_count() == 0
    }
}

struct NumericRule {
    name: &'static str,
    pattern: Regex,
    min: f64,
    max: f64,
}

impl NumericRule {
    fn new(name: &'static str, pattern: &str, min: f64, max: f64) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("extraction rule regex is valid"),
            min,
            max,
        }
    }

    fn apply(&self, text: &str) -> Option<f64> {
        let captures = self.pattern.captures(text)?;
        let value: f64 = captures.get(1)?.as_str().parse().ok()?;
        if value >= self.min && value <= self.max {
            tracing::debug!(rule = self.name, value, "extraction rule matched");
            Some(value)
        } else {
            None
        }
    }
}

/// Regex-driven extractor, constructed with the catalog's known titles.
pub struct ResponseExtractor {
    rating_rules: Vec<NumericRule>,
    year_rules: Vec<NumericRule>,
    titles: Vec<(String, String)>,
}

impl ResponseExtractor {
    pub fn new(known_titles: Vec<String>) -> Self {
        let rating_rules = vec![
            NumericRule::new("rating-keyword", r"rating\D{0,40}?(\d+\.?\d*)", 0.0, 5.0),
            NumericRule::new("rated-keyword", r"rated\D{0,40}?(\d+\.?\d*)", 0.0, 5.0),
            NumericRule::new("score-keyword", r"score\D{0,40}?(\d+\.?\d*)", 0.0, 5.0),
            NumericRule::new(
                "scale-suffix",
                r"(\d+\.?\d*)\s*(?:/\s*5|out of 5|stars?)",
                0.0,
                5.0,
            ),
            NumericRule::new("bare-decimal", r"(\d+\.\d+)", 0.0, 5.0),
        ];

        // The cue rule requires the year in the same sentence as a release
        // cue; crossing a sentence boundary fails it and the bare rule takes
        // over.
        let year_rules = vec![
            NumericRule::new(
                "release-cue",
                r"\b(?:released|made|came out|premiered)\b[^.!?]*?\b((?:19|20)\d{2})\b",
                1900.0,
                2030.0,
            ),
            NumericRule::new("bare-year", r"\b((?:19|20)\d{2})\b", 1900.0, 2030.0),
        ];

        let titles = known_titles
            .into_iter()
            .map(|title| {
                let lowered = title.to_lowercase();
                (title, lowered)
            })
            .collect();

        Self {
            rating_rules,
            year_rules,
            titles,
        }
    }

    pub fn extract_all(&self, response: &str) -> ExtractedFacts {
        ExtractedFacts {
            title: self.extract_title(response),
            rating: self.extract_rating(response),
            year: self.extract_year(response),
        }
    }

    pub fn extract_rating(&self, response: &str) -> Option<f64> {
        let lowered = response.to_lowercase();
        self.rating_rules.iter().find_map(|rule| rule.apply(&lowered))
    }

    pub fn extract_year(&self, response: &str) -> Option<i32> {
        let lowered = response.to_lowercase();
        self.year_rules
            .iter()
            .find_map(|rule| rule.apply(&lowered))
            .map(|year| year as i32)
    }

    /// Longest known title appearing in the response, case-insensitive;
    /// equal lengths break toward the earliest occurrence.
    pub fn extract_title(&self, response: &str) -> Option<String> {
        let lowered = response.to_lowercase();
        let mut best: Option<(usize, usize, &str)> = None;
        for (canonical, lower) in &self.titles {
            let Some(position) = lowered.find(lower.as_str()) else {
                continue;
            };
            let length = lower.len();
            let better = match best {
                None => true,
                Some((best_length, best_position, _)) => {
                    length > best_length || (length == best_length && position < best_position)
                }
            };
            if better {
                best = Some((length, position, canonical.as_str()));
            }
        }
        best.map(|(_, _, title)| title.to_string())
    }
}
