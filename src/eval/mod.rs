//! End-to-end evaluation: embedded ground truth, response extraction,
//! scoring, and report aggregation.

mod extract;
mod ground_truth;
mod pipeline;
mod score;

pub use extract::{ExtractedFacts, ResponseExtractor};
pub use ground_truth::ground_truth_observations;
pub use pipeline::EvaluationPipeline;
pub use score::{similarity, token_overlap, NumericScore, TitleScore};

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::MovieId;
use crate::core::errors::AgentError;
use crate::rag::AnswerPath;

/// The single fact an observation evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetVariable {
    MovieTitle,
    AvgRating,
    ReleaseYear,
}

impl TargetVariable {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetVariable::MovieTitle => "movie_title",
            TargetVariable::AvgRating => "avg_rating",
            TargetVariable::ReleaseYear => "release_year",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "movie_title" => Some(TargetVariable::MovieTitle),
            "avg_rating" => Some(TargetVariable::AvgRating),
            "release_year" => Some(TargetVariable::ReleaseYear),
            _ => None,
        }
    }
}

/// Expected value for an observation, typed by target variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ExpectedValue {
    Title(String),
    Rating(f64),
    Year(i32),
}

impl ExpectedValue {
    pub fn variable(&self) -> TargetVariable {
        match self {
            ExpectedValue::Title(_) => TargetVariable::MovieTitle,
            ExpectedValue::Rating(_) => TargetVariable::AvgRating,
            ExpectedValue::Year(_) => TargetVariable::ReleaseYear,
        }
    }
}

/// One embedded evaluation case: a query, the fact it probes, and the
/// catalog movie it refers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundTruthObservation {
    pub id: String,
    pub query: String,
    pub expected: ExpectedValue,
    pub movie_id: MovieId,
}

impl GroundTruthObservation {
    pub fn variable(&self) -> TargetVariable {
        self.expected.variable()
    }
}

/// Score of an observation's target variable. Categorical for titles,
/// numeric for ratings and years.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VariableScore {
    Categorical(TitleScore),
    Numeric(NumericScore),
}

impl VariableScore {
    /// Score shape for an observation whose extraction failed.
    pub fn failed_for(variable: TargetVariable) -> Self {
        match variable {
            TargetVariable::MovieTitle => VariableScore::Categorical(TitleScore::failed()),
            _ => VariableScore::Numeric(NumericScore::failed()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ObservationResult {
    pub observation_id: String,
    pub variable: TargetVariable,
    pub movie_id: MovieId,
    pub expected: ExpectedValue,
    pub response: String,
    /// `None` when the chat turn itself errored.
    pub answer_path: Option<AnswerPath>,
    pub extracted: ExtractedFacts,
    pub score: VariableScore,
    pub truthfulness: f64,
    pub groundedness: f64,
    pub success: bool,
}

/// Aggregated metrics for one target variable.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VariableMetrics {
    Categorical {
        tests: usize,
        exact_accuracy: f64,
        fuzzy_accuracy: f64,
        mean_similarity: f64,
    },
    Numeric {
        tests: usize,
        exact_accuracy: f64,
        tolerance_accuracy: f64,
        mean_error_rate: f64,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub total_observations: usize,
    pub successful: usize,
    pub success_rate: f64,
    pub mean_groundedness: f64,
    pub mean_truthfulness: f64,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub summary: ReportSummary,
    /// Per-variable metrics keyed by variable name, deterministically ordered.
    pub variables: BTreeMap<String, VariableMetrics>,
    pub results: Vec<ObservationResult>,
}

impl EvaluationReport {
    pub(crate) fn from_results(results: Vec<ObservationResult>) -> Self {
        let total = results.len();
        let successful = results.iter().filter(|r| r.success).count();

        let mut variables = BTreeMap::new();
        for variable in [
            TargetVariable::MovieTitle,
            TargetVariable::AvgRating,
            TargetVariable::ReleaseYear,
        ] {
            let bucket: Vec<&ObservationResult> = results
                .iter()
                .filter(|r| r.variable == variable)
                .collect();
            if bucket.is_empty() {
                continue;
            }
            variables.insert(
                variable.as_str().to_string(),
                aggregate_variable(variable, &bucket),
            );
        }

        let summary = ReportSummary {
            total_observations: total,
            successful,
            success_rate: ratio(successful, total),
            mean_groundedness: mean(results.iter().map(|r| r.groundedness), total),
            mean_truthfulness: mean(results.iter().map(|r| r.truthfulness), total),
            generated_at: Utc::now(),
        };

        Self {
            summary,
            variables,
            results,
        }
    }

    /// Writes the report as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<(), AgentError> {
        let json = serde_json::to_string_pretty(self).map_err(AgentError::internal)?;
        std::fs::write(path, json).map_err(AgentError::internal)?;
        tracing::info!("evaluation report written to {}", path.display());
        Ok(())
    }

    /// Human-readable summary for the CLI: overall metrics, then one block
    /// per target variable.
    pub fn render_summary(&self) -> String {
        use std::fmt::Write;

        let mut out = String::new();
        let s = &self.summary;
        let _ = writeln!(
            out,
            "Evaluation report ({})",
            s.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
        let _ = writeln!(
            out,
            "  observations:      {} ({} successful, {:.1}% success rate)",
            s.total_observations,
            s.successful,
            s.success_rate * 100.0
        );
        let _ = writeln!(out, "  mean truthfulness: {:.2}", s.mean_truthfulness);
        let _ = writeln!(out, "  mean groundedness: {:.2}", s.mean_groundedness);

        for (name, metrics) in &self.variables {
            let _ = writeln!(out);
            match metrics {
                VariableMetrics::Categorical {
                    tests,
                    exact_accuracy,
                    fuzzy_accuracy,
                    mean_similarity,
                } => {
                    let _ = writeln!(out, "{name} ({tests} tests)");
                    let _ = writeln!(out, "  exact accuracy:     {:.1}%", exact_accuracy * 100.0);
                    let _ = writeln!(out, "  fuzzy accuracy:     {:.1}%", fuzzy_accuracy * 100.0);
                    let _ = writeln!(out, "  mean similarity:    {mean_similarity:.3}");
                }
                VariableMetrics::Numeric {
                    tests,
                    exact_accuracy,
                    tolerance_accuracy,
                    mean_error_rate,
                } => {
                    let _ = writeln!(out, "{name} ({tests} tests)");
                    let _ = writeln!(out, "  exact accuracy:     {:.1}%", exact_accuracy * 100.0);
                    let _ = writeln!(
                        out,
                        "  tolerance accuracy: {:.1}%",
                        tolerance_accuracy * 100.0
                    );
                    let _ = writeln!(out, "  mean error rate:    {mean_error_rate:.3}");
                }
            }
        }
        out
    }
}

fn aggregate_variable(variable: TargetVariable, bucket: &[&ObservationResult]) -> VariableMetrics {
    let tests = bucket.len();
    match variable {
        TargetVariable::MovieTitle => {
            let mut exact = 0;
            let mut fuzzy = 0;
            let mut similarity_sum = 0.0;
            for result in bucket {
                if let VariableScore::Categorical(score) = &result.score {
                    exact += score.exact as usize;
                    fuzzy += score.fuzzy as usize;
                    similarity_sum += score.similarity;
                }
            }
            VariableMetrics::Categorical {
                tests,
                exact_accuracy: ratio(exact, tests),
                fuzzy_accuracy: ratio(fuzzy, tests),
                mean_similarity: mean_value(similarity_sum, tests),
            }
        }
        _ => {
            let mut exact = 0;
            let mut within = 0;
            let mut error_sum = 0.0;
            for result in bucket {
                if let VariableScore::Numeric(score) = &result.score {
                    exact += score.exact as usize;
                    within += score.within_tolerance as usize;
                    error_sum += score.error_rate;
                }
            }
            VariableMetrics::Numeric {
                tests,
                exact_accuracy: ratio(exact, tests),
                tolerance_accuracy: ratio(within, tests),
                mean_error_rate: mean_value(error_sum, tests),
            }
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

fn mean(values: impl Iterator<Item = f64>, count: usize) -> f64 {
    mean_value(values.sum(), count)
}

fn mean_value(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}
