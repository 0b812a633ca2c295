//! Query understanding: intent classification and parameter extraction.

mod processor;

pub use processor::{QueryProcessor, MAX_YEAR, MIN_YEAR};

use serde::{Deserialize, Serialize};

use crate::catalog::{MovieFilter, YearRange};

/// Query intent kinds, first-match ordered in the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Lookup,
    Recommend,
    Compare,
    FilteredSearch,
    #[default]
    Unknown,
}

impl IntentKind {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "lookup" => IntentKind::Lookup,
            "recommend" => IntentKind::Recommend,
            "compare" => IntentKind::Compare,
            "filtered_search" => IntentKind::FilteredSearch,
            _ => IntentKind::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentKind::Lookup => "lookup",
            IntentKind::Recommend => "recommend",
            IntentKind::Compare => "compare",
            IntentKind::FilteredSearch => "filtered_search",
            IntentKind::Unknown => "unknown",
        }
    }
}

/// Parameters extracted from a query. Extraction is additive: a later rule
/// never overwrites a field an earlier rule has set, and nothing mutates
/// the params after extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryParams {
    pub title: Option<String>,
    pub genres: Vec<String>,
    pub years: Option<YearRange>,
    pub min_rating: Option<f32>,
}

impl QueryParams {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.genres.is_empty()
            && self.years.is_none()
            && self.min_rating.is_none()
    }

    /// Translates the extracted parameters into attribute predicates.
    pub fn to_filter(&self) -> MovieFilter {
        MovieFilter {
            title: self.title.clone(),
            genres: self.genres.clone(),
            years: self.years,
            min_rating: self.min_rating,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Intent {
    pub kind: IntentKind,
    pub params: QueryParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_kind_names_round_trip() {
        for kind in [
            IntentKind::Lookup,
            IntentKind::Recommend,
            IntentKind::Compare,
            IntentKind::FilteredSearch,
            IntentKind::Unknown,
        ] {
            assert_eq!(IntentKind::from_str(kind.as_str()), kind);
        }
    }

    #[test]
    fn intent_kind_parse_is_case_insensitive_with_unknown_catch_all() {
        assert_eq!(IntentKind::from_str("LOOKUP"), IntentKind::Lookup);
        assert_eq!(
            IntentKind::from_str("Filtered_Search"),
            IntentKind::FilteredSearch
        );
        assert_eq!(IntentKind::from_str("bogus"), IntentKind::Unknown);
        assert_eq!(IntentKind::from_str(""), IntentKind::Unknown);
    }

    #[test]
    fn exported_year_bounds_match_extraction() {
        let processor = QueryProcessor::new(Vec::new());

        let inside = processor.extract_params(&format!("movies from {MIN_YEAR}"));
        assert_eq!(inside.years, Some(YearRange::single(MIN_YEAR)));

        let outside = processor.extract_params(&format!("movies from {}", MAX_YEAR + 1));
        assert!(outside.years.is_none());
    }
}
