//! Drives the embedded observations through the orchestrator, extracts and
//! scores every response, and aggregates the report.

use std::sync::Arc;

use crate::catalog::{AttributeStore, MovieRecord};
use crate::config::EvaluationConfig;
use crate::core::errors::AgentError;
use crate::rag::{ChatRequest, RagOrchestrator};

use super::score::{round2, score_rating, score_title, score_year};
use super::{
    ground_truth_observations, EvaluationReport, ExpectedValue, ExtractedFacts,
    GroundTruthObservation, ObservationResult, ResponseExtractor, TargetVariable, VariableScore,
};

pub struct EvaluationPipeline<'a> {
    orchestrator: &'a RagOrchestrator,
    store: Arc<dyn AttributeStore>,
    extractor: ResponseExtractor,
    config: EvaluationConfig,
}

impl<'a> EvaluationPipeline<'a> {
    pub async fn new(
        orchestrator: &'a RagOrchestrator,
        store: Arc<dyn AttributeStore>,
        config: EvaluationConfig,
    ) -> Result<Self, AgentError> {
        let titles = store
            .titles()
            .await?
            .into_iter()
            .map(|(_, title)| title)
            .collect();
        Ok(Self {
            orchestrator,
            store,
            extractor: ResponseExtractor::new(titles),
            config,
        })
    }

    /// Evaluates every embedded observation. Chat-level failures become
    /// unsuccessful results rather than aborting the run.
    pub async fn run(&self) -> Result<EvaluationReport, AgentError> {
        let observations = ground_truth_observations();
        tracing::info!("evaluating {} observations", observations.len());

        let mut results = Vec::with_capacity(observations.len());
        for observation in observations {
            results.push(self.evaluate(observation).await);
        }
        Ok(EvaluationReport::from_results(results))
    }

    async fn evaluate(&self, observation: GroundTruthObservation) -> ObservationResult {
        let variable = observation.variable();
        let outcome = match self
            .orchestrator
            .chat(ChatRequest::new(observation.query.clone()))
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!("observation {} failed: {}", observation.id, err);
                return ObservationResult {
                    observation_id: observation.id,
                    variable,
                    movie_id: observation.movie_id,
                    expected: observation.expected,
                    response: String::new(),
                    answer_path: None,
                    extracted: ExtractedFacts::default(),
                    score: VariableScore::failed_for(variable),
                    truthfulness: 0.0,
                    groundedness: 0.0,
                    success: false,
                };
            }
        };

        let extracted = self.extractor.extract_all(&outcome.response);
        let score = self.score_target(&observation, &extracted);

        let truthfulness = match self.store.by_id(observation.movie_id).await.ok().flatten() {
            Some(record) => self.truthfulness(&extracted, &record),
            None => {
                tracing::warn!(
                    "observation {} references unknown movie {}",
                    observation.id,
                    observation.movie_id
                );
                0.0
            }
        };

        let mut context_records = Vec::new();
        for id in &outcome.context {
            if let Ok(Some(record)) = self.store.by_id(*id).await {
                context_records.push(record);
            }
        }
        let groundedness = groundedness(&extracted, &context_records);

        ObservationResult {
            observation_id: observation.id,
            variable,
            movie_id: observation.movie_id,
            expected: observation.expected,
            response: outcome.response,
            answer_path: Some(outcome.path),
            extracted,
            score,
            truthfulness,
            groundedness,
            success: true,
        }
    }

    fn score_target(
        &self,
        observation: &GroundTruthObservation,
        extracted: &ExtractedFacts,
    ) -> VariableScore {
        match &observation.expected {
            ExpectedValue::Title(expected) => match &extracted.title {
                Some(predicted) => VariableScore::Categorical(score_title(
                    predicted,
                    expected,
                    self.config.fuzzy_threshold,
                )),
                None => VariableScore::failed_for(TargetVariable::MovieTitle),
            },
            ExpectedValue::Rating(expected) => match extracted.rating {
                Some(predicted) => VariableScore::Numeric(score_rating(
                    predicted,
                    *expected,
                    self.config.rating_tolerance,
                )),
                None => VariableScore::failed_for(TargetVariable::AvgRating),
            },
            ExpectedValue::Year(expected) => match extracted.year {
                Some(predicted) => VariableScore::Numeric(score_year(predicted, *expected)),
                None => VariableScore::failed_for(TargetVariable::ReleaseYear),
            },
        }
    }

    /// Fraction of the extracted facts matching the reference record within
    /// the configured tolerances. 0.0 when nothing was extracted.
    fn truthfulness(&self, extracted: &ExtractedFacts, record: &MovieRecord) -> f64 {
        let mut checked = 0usize;
        let mut correct = 0usize;

        if let Some(title) = &extracted.title {
            checked += 1;
            let score = score_title(title, &record.title, self.config.fuzzy_threshold);
            if score.exact || score.fuzzy {
                correct += 1;
            }
        }
        if let Some(rating) = extracted.rating {
            checked += 1;
            let score = score_rating(rating, record.avg_rating as f64, self.config.rating_tolerance);
            if score.exact || score.within_tolerance {
                correct += 1;
            }
        }
        if let Some(year) = extracted.year {
            checked += 1;
            if year == record.year {
                correct += 1;
            }
        }

        if checked == 0 {
            0.0
        } else {
            correct as f64 / checked as f64
        }
    }
}

/// Fraction of the extracted facts traceable to a record in the retrieval
/// context: title equality, rating equal after two-decimal rounding, year
/// equality. 0.0 when nothing was extracted.
fn groundedness(extracted: &ExtractedFacts, context: &[MovieRecord]) -> f64 {
    let mut checked = 0usize;
    let mut grounded = 0usize;

    if let Some(title) = &extracted.title {
        checked += 1;
        if context.iter().any(|r| r.title.eq_ignore_ascii_case(title)) {
            grounded += 1;
        }
    }
    if let Some(rating) = extracted.rating {
        checked += 1;
        if context
            .iter()
            .any(|r| round2(r.avg_rating as f64) == round2(rating))
        {
            grounded += 1;
        }
    }
    if let Some(year) = extracted.year {
        checked += 1;
        if context.iter().any(|r| r.year == year) {
            grounded += 1;
        }
    }

    if checked == 0 {
        0.0
    } else {
        grounded as f64 / checked as f64
    }
}
