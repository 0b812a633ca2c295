//! Embedded ground-truth observations: five reference movies, three target
//! variables, one observation per (movie, variable) pair. Expected values
//! mirror the seed catalog records and are checked against them by a test.

use super::{ExpectedValue, GroundTruthObservation};
use crate::catalog::MovieId;

fn observation(
    id: &str,
    query: &str,
    expected: ExpectedValue,
    movie_id: MovieId,
) -> GroundTruthObservation {
    GroundTruthObservation {
        id: id.to_string(),
        query: query.to_string(),
        expected,
        movie_id,
    }
}

pub fn ground_truth_observations() -> Vec<GroundTruthObservation> {
    vec![
        // Title questions describe the plot and expect the movie to be named.
        observation(
            "title-1",
            "What movie is about toys that come alive when humans leave?",
            ExpectedValue::Title("Toy Story".to_string()),
            1,
        ),
        observation(
            "title-2",
            "Which movie features a young lion cub who becomes king?",
            ExpectedValue::Title("The Lion King".to_string()),
            364,
        ),
        observation(
            "title-3",
            "What movie is about a ship that sinks after hitting an iceberg?",
            ExpectedValue::Title("Titanic".to_string()),
            1721,
        ),
        observation(
            "title-4",
            "Which movie is about a hacker who discovers reality is a simulation?",
            ExpectedValue::Title("The Matrix".to_string()),
            2571,
        ),
        observation(
            "title-5",
            "What movie is about a thief who steals secrets from people's dreams?",
            ExpectedValue::Title("Inception".to_string()),
            79132,
        ),
        observation(
            "rating-1",
            "What is the average rating of Toy Story?",
            ExpectedValue::Rating(3.92),
            1,
        ),
        observation(
            "rating-2",
            "How is The Lion King rated?",
            ExpectedValue::Rating(4.15),
            364,
        ),
        observation(
            "rating-3",
            "What rating does Titanic have?",
            ExpectedValue::Rating(3.89),
            1721,
        ),
        observation(
            "rating-4",
            "What is the average rating of The Matrix?",
            ExpectedValue::Rating(4.32),
            2571,
        ),
        observation(
            "rating-5",
            "How highly is Inception rated?",
            ExpectedValue::Rating(4.07),
            79132,
        ),
        observation(
            "year-1",
            "When was Toy Story released?",
            ExpectedValue::Year(1995),
            1,
        ),
        observation(
            "year-2",
            "What year did The Lion King come out?",
            ExpectedValue::Year(1994),
            364,
        ),
        observation(
            "year-3",
            "In what year was Titanic released?",
            ExpectedValue::Year(1997),
            1721,
        ),
        observation(
            "year-4",
            "When was The Matrix released?",
            ExpectedValue::Year(1999),
            2571,
        ),
        observation(
            "year-5",
            "What year did Inception come out?",
            ExpectedValue::Year(2010),
            79132,
        ),
    ]
}
