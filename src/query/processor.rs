//! Rule-based query processor.
//!
//! Classification walks an ordered list of (predicate, kind) rules and the
//! first match wins. Extraction applies ordered rule lists per parameter
//! with set-if-absent semantics. Both are total and deterministic.

use regex::Regex;

use super::{Intent, IntentKind, QueryParams};
use crate::catalog::{YearRange, GENRES};

const RECOMMEND_CUES: [&str; 4] = ["recommend", "suggest", "find me", "show me"];
const COMPARE_CUES: [&str; 2] = ["similar to", "compare"];

// Inclusive bounds of the plausible release-year window.
pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2030;

pub struct QueryProcessor {
    /// Known titles, longest first, with lowercase forms for matching.
    titles: Vec<(String, String)>,
    genre_rules: Vec<(Regex, &'static str)>,
    rating_rules: Vec<Regex>,
    decade_rule: Regex,
    year_rule: Regex,
    quoted_rule: Regex,
    about_rule: Regex,
}

impl QueryProcessor {
    pub fn new(mut titles: Vec<String>) -> Self {
        titles.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
        let titles = titles
            .into_iter()
            .map(|t| {
                let lowered = t.to_lowercase();
                (t, lowered)
            })
            .collect();

        let genre_rules = GENRES
            .iter()
            .map(|genre| {
                let pattern = match *genre {
                    "Sci-Fi" => r"\b(?:sci-fi|sci fi|science fiction)\b".to_string(),
                    "Film-Noir" => r"\b(?:film-noir|film noir)\b".to_string(),
                    other => format!(r"\b{}\b", other.to_lowercase()),
                };
                let regex = Regex::new(&pattern).expect("genre regex is valid");
                (regex, *genre)
            })
            .collect();

        let rating_rules = vec![
            Regex::new(r"(?:rated|rating)\s+(?:above|over|higher than|at least)\s+(\d+(?:\.\d+)?)")
                .expect("rating rule regex is valid"),
            Regex::new(r"at least\s+(\d+(?:\.\d+)?)\s+stars?")
                .expect("rating rule regex is valid"),
        ];

        Self {
            titles,
            genre_rules,
            rating_rules,
            decade_rule: Regex::new(r"\b(19\d0|20\d0|[2-9]0)s\b").expect("decade regex is valid"),
            year_rule: Regex::new(r"\b((?:19|20)\d{2})\b").expect("year regex is valid"),
            quoted_rule: Regex::new(r#""([^"]+)""#).expect("quote regex is valid"),
            about_rule: Regex::new(r"about\s+(?:the\s+)?(?:movie\s+|film\s+)?([^?.!]+)")
                .expect("about regex is valid"),
        }
    }

    pub fn process(&self, query: &str) -> Intent {
        let params = self.extract_params(query);
        let kind = self.classify_extracted(query, &params);
        tracing::debug!("query classified as {}", kind.as_str());
        Intent { kind, params }
    }

    pub fn classify(&self, query: &str) -> IntentKind {
        self.classify_extracted(query, &self.extract_params(query))
    }

    fn classify_extracted(&self, query: &str, params: &QueryParams) -> IntentKind {
        let lowered = query.to_lowercase();
        if lowered.trim().is_empty() {
            return IntentKind::Unknown;
        }

        let has_known_title = self.known_title(&lowered).is_some();
        let has_constraints =
            !params.genres.is_empty() || params.years.is_some() || params.min_rating.is_some();

        let rules = [
            (
                RECOMMEND_CUES.iter().any(|cue| lowered.contains(cue)),
                IntentKind::Recommend,
            ),
            (
                COMPARE_CUES.iter().any(|cue| lowered.contains(cue))
                    || (lowered.contains(" like ") && has_known_title),
                IntentKind::Compare,
            ),
            (has_known_title, IntentKind::Lookup),
            (has_constraints, IntentKind::FilteredSearch),
        ];

        for (matched, kind) in rules {
            if matched {
                return kind;
            }
        }
        IntentKind::Unknown
    }

    pub fn extract_params(&self, query: &str) -> QueryParams {
        let lowered = query.to_lowercase();
        let mut params = QueryParams::default();

        // Title rules: known title, quoted span, "about ..." tail.
        if let Some(title) = self.known_title(&lowered) {
            params.title = Some(title.to_string());
        }
        if params.title.is_none() {
            if let Some(captures) = self.quoted_rule.captures(query) {
                params.title = Some(captures[1].trim().to_string());
            }
        }
        if params.title.is_none() {
            if let Some(captures) = self.about_rule.captures(&lowered) {
                let tail = captures[1].trim();
                if !tail.is_empty() {
                    params.title = Some(tail.to_string());
                }
            }
        }

        for (rule, genre) in &self.genre_rules {
            if rule.is_match(&lowered) && !params.genres.iter().any(|g| g == genre) {
                params.genres.push(genre.to_string());
            }
        }

        // Year rules: decade phrasing first so "1990s" is not read as 1990.
        if let Some(captures) = self.decade_rule.captures(&lowered) {
            let digits = &captures[1];
            let start = match digits.len() {
                2 => 1900 + digits[..1].parse::<i32>().unwrap_or(0) * 10,
                _ => digits.parse::<i32>().unwrap_or(0),
            };
            if (MIN_YEAR..=MAX_YEAR).contains(&start) {
                params.years = Some(YearRange {
                    from: start,
                    to: start + 9,
                });
            }
        }
        if params.years.is_none() {
            if let Some(captures) = self.year_rule.captures(&lowered) {
                if let Ok(year) = captures[1].parse::<i32>() {
                    if (MIN_YEAR..=MAX_YEAR).contains(&year) {
                        params.years = Some(YearRange::single(year));
                    }
                }
            }
        }

        for rule in &self.rating_rules {
            if params.min_rating.is_some() {
                break;
            }
            if let Some(captures) = rule.captures(&lowered) {
                if let Ok(value) = captures[1].parse::<f32>() {
                    if (0.0..=5.0).contains(&value) {
                        params.min_rating = Some(value);
                    }
                }
            }
        }

        params
    }

    /// Longest known title appearing as a substring of the lowercased query.
    fn known_title(&self, lowered: &str) -> Option<&str> {
        self.titles
            .iter()
            .find(|(_, lower)| lowered.contains(lower.as_str()))
            .map(|(title, _)| title.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_processor() -> QueryProcessor {
        QueryProcessor::new(vec![
            "Toy Story".to_string(),
            "The Matrix".to_string(),
            "Inception".to_string(),
            "Heat".to_string(),
        ])
    }

    #[test]
    fn recommendation_cues_win_over_titles() {
        let p = test_processor();
        assert_eq!(
            p.classify("recommend movies like Toy Story"),
            IntentKind::Recommend
        );
        assert_eq!(
            p.classify("suggest a good thriller"),
            IntentKind::Recommend
        );
        assert_eq!(p.classify("show me sci-fi movies"), IntentKind::Recommend);
    }

    #[test]
    fn comparison_phrasing_is_compare() {
        let p = test_processor();
        assert_eq!(
            p.classify("movies similar to The Matrix"),
            IntentKind::Compare
        );
        assert_eq!(
            p.classify("anything like Inception?"),
            IntentKind::Compare
        );
    }

    #[test]
    fn like_without_a_known_title_is_not_compare() {
        let p = test_processor();
        assert_eq!(
            p.classify("I like action movies from the 1990s"),
            IntentKind::FilteredSearch
        );
    }

    #[test]
    fn known_title_means_lookup() {
        let p = test_processor();
        assert_eq!(
            p.classify("what is the rating of Inception?"),
            IntentKind::Lookup
        );
        assert_eq!(p.classify("How is Toy Story rated?"), IntentKind::Lookup);
    }

    #[test]
    fn constraints_without_title_mean_filtered_search() {
        let p = test_processor();
        let intent = p.process("action movies from the 1990s rated above 4");

        assert_eq!(intent.kind, IntentKind::FilteredSearch);
        assert_eq!(intent.params.genres, vec!["Action".to_string()]);
        assert_eq!(intent.params.years, Some(YearRange { from: 1990, to: 1999 }));
        assert_eq!(intent.params.min_rating, Some(4.0));
    }

    #[test]
    fn unmatched_queries_are_unknown() {
        let p = test_processor();
        assert_eq!(p.classify("hello there"), IntentKind::Unknown);
        assert_eq!(p.classify(""), IntentKind::Unknown);
        assert_eq!(p.classify("   "), IntentKind::Unknown);
    }

    #[test]
    fn known_title_beats_quoted_span() {
        let p = test_processor();
        let params = p.extract_params("is \"Arrival\" similar to The Matrix?");
        assert_eq!(params.title.as_deref(), Some("The Matrix"));
    }

    #[test]
    fn quoted_span_serves_when_no_known_title() {
        let p = test_processor();
        let params = p.extract_params("tell me about \"Arrival\"");
        assert_eq!(params.title.as_deref(), Some("Arrival"));
    }

    #[test]
    fn about_tail_is_the_last_resort() {
        let p = test_processor();
        let params = p.extract_params("tell me about the movie with the sinking ship");
        assert_eq!(params.title.as_deref(), Some("with the sinking ship"));
    }

    #[test]
    fn longest_title_wins_substring_ties() {
        let p = test_processor();
        // "Heat" is a substring-level red herring inside longer queries.
        let params = p.extract_params("the matrix or heat?");
        assert_eq!(params.title.as_deref(), Some("The Matrix"));
    }

    #[test]
    fn genre_aliases_map_to_taxonomy_names() {
        let p = test_processor();
        let params = p.extract_params("science fiction movies from 2010");
        assert_eq!(params.genres, vec!["Sci-Fi".to_string()]);
        assert_eq!(params.years, Some(YearRange::single(2010)));
    }

    #[test]
    fn short_decades_expand_to_full_ranges() {
        let p = test_processor();
        let params = p.extract_params("comedy movies from the 90s");
        assert_eq!(params.genres, vec!["Comedy".to_string()]);
        assert_eq!(params.years, Some(YearRange { from: 1990, to: 1999 }));
    }

    #[test]
    fn implausible_years_are_ignored() {
        let p = test_processor();
        assert_eq!(p.extract_params("movies from 2050").years, None);
        assert_eq!(p.extract_params("movies from 1850").years, None);
    }

    #[test]
    fn out_of_scale_rating_thresholds_are_ignored() {
        let p = test_processor();
        assert_eq!(p.extract_params("movies rated above 9").min_rating, None);
        assert_eq!(
            p.extract_params("movies rated above 4.5").min_rating,
            Some(4.5)
        );
    }

    #[test]
    fn params_never_change_once_set() {
        let p = test_processor();
        // Known title first; the quoted span and about-tail must not replace it.
        let params = p.extract_params("tell me about \"Dune\" and Inception");
        assert_eq!(params.title.as_deref(), Some("Inception"));
    }
}
