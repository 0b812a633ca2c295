//! Movie catalog: records, attribute filtering, and the store abstraction.
//!
//! The catalog owns the `MovieRecord`s. The vector index mirrors their
//! textual content as embedding input but never owns them.

mod seed;

pub use seed::seed_catalog;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::errors::AgentError;

pub type MovieId = u32;

/// Genre taxonomy used for attribute filtering and query extraction.
pub const GENRES: [&str; 18] = [
    "Action",
    "Adventure",
    "Animation",
    "Children",
    "Comedy",
    "Crime",
    "Documentary",
    "Drama",
    "Fantasy",
    "Film-Noir",
    "Horror",
    "Musical",
    "Mystery",
    "Romance",
    "Sci-Fi",
    "Thriller",
    "War",
    "Western",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: MovieId,
    pub title: String,
    pub year: i32,
    pub genres: Vec<String>,
    /// Mean user rating on the 0.0 to 5.0 scale, two-decimal precision.
    pub avg_rating: f32,
    pub plot: String,
}

impl MovieRecord {
    /// Textual content fed to the embedder for this record.
    pub fn embedding_text(&self) -> String {
        format!(
            "Title: {}. Genres: {}. Plot: {} Year: {}.",
            self.title,
            self.genres.join(", "),
            self.plot,
            self.year
        )
    }
}

/// Inclusive release-year range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    pub from: i32,
    pub to: i32,
}

impl YearRange {
    pub fn single(year: i32) -> Self {
        Self { from: year, to: year }
    }

    pub fn contains(&self, year: i32) -> bool {
        year >= self.from && year <= self.to
    }
}

/// Attribute predicates for a filtered catalog search. Empty fields match
/// everything; an entirely empty filter matches nothing useful and callers
/// check `is_empty` before running it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovieFilter {
    pub title: Option<String>,
    pub genres: Vec<String>,
    pub years: Option<YearRange>,
    pub min_rating: Option<f32>,
}

impl MovieFilter {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.genres.is_empty()
            && self.years.is_none()
            && self.min_rating.is_none()
    }

    pub fn matches(&self, record: &MovieRecord) -> bool {
        if let Some(title) = &self.title {
            if !record
                .title
                .to_lowercase()
                .contains(&title.to_lowercase())
            {
                return false;
            }
        }

        for genre in &self.genres {
            let wanted = genre.to_lowercase();
            if !record
                .genres
                .iter()
                .any(|g| g.to_lowercase() == wanted)
            {
                return false;
            }
        }

        if let Some(years) = &self.years {
            if !years.contains(record.year) {
                return false;
            }
        }

        if let Some(min_rating) = self.min_rating {
            if record.avg_rating < min_rating {
                return false;
            }
        }

        true
    }
}

/// Abstract attribute store backing the filter arm of hybrid retrieval.
#[async_trait]
pub trait AttributeStore: Send + Sync {
    /// Filtered search, ordered by average rating descending (ties by id).
    async fn find(&self, filter: &MovieFilter, limit: usize)
        -> Result<Vec<MovieRecord>, AgentError>;

    async fn by_id(&self, id: MovieId) -> Result<Option<MovieRecord>, AgentError>;

    /// All `(id, title)` pairs, for title matching in the query processor
    /// and the evaluation extractor.
    async fn titles(&self) -> Result<Vec<(MovieId, String)>, AgentError>;

    async fn count(&self) -> Result<usize, AgentError>;
}

/// In-memory catalog over an immutable record set.
pub struct InMemoryCatalog {
    movies: Vec<MovieRecord>,
}

impl InMemoryCatalog {
    pub fn new(mut movies: Vec<MovieRecord>) -> Result<Self, AgentError> {
        movies.sort_by_key(|m| m.id);
        for pair in movies.windows(2) {
            if pair[0].id == pair[1].id {
                return Err(AgentError::BadRequest(format!(
                    "duplicate movie id {} in catalog",
                    pair[0].id
                )));
            }
        }
        Ok(Self { movies })
    }
}

#[async_trait]
impl AttributeStore for InMemoryCatalog {
    async fn find(
        &self,
        filter: &MovieFilter,
        limit: usize,
    ) -> Result<Vec<MovieRecord>, AgentError> {
        let mut hits: Vec<MovieRecord> = self
            .movies
            .iter()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect();

        hits.sort_by(|a, b| {
            b.avg_rating
                .partial_cmp(&a.avg_rating)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        hits.truncate(limit);
        Ok(hits)
    }

    async fn by_id(&self, id: MovieId) -> Result<Option<MovieRecord>, AgentError> {
        Ok(self.movies.iter().find(|m| m.id == id).cloned())
    }

    async fn titles(&self) -> Result<Vec<(MovieId, String)>, AgentError> {
        Ok(self
            .movies
            .iter()
            .map(|m| (m.id, m.title.clone()))
            .collect())
    }

    async fn count(&self) -> Result<usize, AgentError> {
        Ok(self.movies.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_movie(id: MovieId, title: &str, year: i32, rating: f32, genres: &[&str]) -> MovieRecord {
        MovieRecord {
            id,
            title: title.to_string(),
            year,
            genres: genres.iter().map(|g| g.to_string()).collect(),
            avg_rating: rating,
            plot: String::new(),
        }
    }

    fn test_catalog() -> InMemoryCatalog {
        InMemoryCatalog::new(vec![
            make_movie(1, "Toy Story", 1995, 3.92, &["Animation", "Children", "Comedy"]),
            make_movie(2571, "The Matrix", 1999, 4.32, &["Action", "Sci-Fi", "Thriller"]),
            make_movie(79132, "Inception", 2010, 4.07, &["Action", "Sci-Fi", "Thriller"]),
        ])
        .unwrap()
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let result = InMemoryCatalog::new(vec![
            make_movie(1, "A", 2000, 3.0, &[]),
            make_movie(1, "B", 2001, 3.5, &[]),
        ]);
        assert!(matches!(result, Err(AgentError::BadRequest(_))));
    }

    #[tokio::test]
    async fn title_substring_is_case_insensitive() {
        let catalog = test_catalog();
        let filter = MovieFilter {
            title: Some("matrix".to_string()),
            ..Default::default()
        };

        let hits = catalog.find(&filter, 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "The Matrix");
    }

    #[tokio::test]
    async fn combined_predicates_all_apply() {
        let catalog = test_catalog();
        let filter = MovieFilter {
            genres: vec!["Sci-Fi".to_string()],
            years: Some(YearRange { from: 2000, to: 2020 }),
            min_rating: Some(4.0),
            ..Default::default()
        };

        let hits = catalog.find(&filter, 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Inception");
    }

    #[tokio::test]
    async fn results_order_by_rating_descending() {
        let catalog = test_catalog();
        let filter = MovieFilter {
            genres: vec!["Sci-Fi".to_string()],
            ..Default::default()
        };

        let hits = catalog.find(&filter, 10).await.unwrap();
        let titles: Vec<&str> = hits.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles, vec!["The Matrix", "Inception"]);
    }

    #[tokio::test]
    async fn limit_truncates_results() {
        let catalog = test_catalog();
        let filter = MovieFilter::default();
        assert!(filter.is_empty());

        let hits = catalog.find(&filter, 2).await.unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[tokio::test]
    async fn by_id_misses_return_none() {
        let catalog = test_catalog();
        assert!(catalog.by_id(79132).await.unwrap().is_some());
        assert!(catalog.by_id(999999).await.unwrap().is_none());
        assert_eq!(catalog.count().await.unwrap(), 3);
    }

    #[test]
    fn seed_corpus_is_consistent() {
        let movies = seed_catalog();
        let catalog = InMemoryCatalog::new(movies.clone());
        assert!(catalog.is_ok(), "seed corpus must have unique ids");

        for movie in &movies {
            assert!((0.0..=5.0).contains(&movie.avg_rating), "{}", movie.title);
            assert!((1900..=2030).contains(&movie.year), "{}", movie.title);
            assert!(!movie.plot.is_empty(), "{}", movie.title);
            for genre in &movie.genres {
                assert!(GENRES.contains(&genre.as_str()), "{}: {}", movie.title, genre);
            }
        }
    }
}
