use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::errors::AgentError;

pub const CONFIG_PATH_ENV: &str = "CINERAG_CONFIG_PATH";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub retrieval: RetrievalConfig,
    pub generation: GenerationConfig,
    pub evaluation: EvaluationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Candidates requested from the vector index per query.
    pub semantic_k: usize,
    /// Upper bound on the merged candidate list.
    pub max_results: usize,
    /// Rank bonus applied when a movie appears in both retrieval arms.
    pub filter_bonus: f32,
    pub embedding_dim: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            semantic_k: 10,
            max_results: 10,
            filter_bonus: 0.3,
            embedding_dim: 1024,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    /// Movies included in the generation context.
    pub max_context: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llama3.1:8b".to_string(),
            temperature: 0.7,
            max_tokens: 500,
            timeout_secs: 30,
            max_context: 5,
        }
    }
}

impl GenerationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Relative error accepted for a rating to count as tolerance-correct.
    pub rating_tolerance: f64,
    /// Minimum sequence similarity for a fuzzy title match.
    pub fuzzy_threshold: f64,
    pub report_path: PathBuf,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            rating_tolerance: 0.05,
            fuzzy_threshold: 0.80,
            report_path: PathBuf::from("evaluation_report.json"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for daily rolling log files. Stdout only when unset.
    pub dir: Option<PathBuf>,
    pub filter: Option<String>,
}

impl AppConfig {
    /// Loads configuration from `path`, falling back to the
    /// `CINERAG_CONFIG_PATH` environment variable and then to defaults.
    /// A missing file yields defaults; a malformed file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, AgentError> {
        let path = match path {
            Some(p) => Some(p.to_path_buf()),
            None => env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from),
        };

        let Some(path) = path else {
            return Ok(Self::default());
        };

        if !path.exists() {
            tracing::debug!("config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path).map_err(AgentError::internal)?;
        toml::from_str(&contents).map_err(|err| {
            AgentError::BadRequest(format!("invalid config {}: {}", path.display(), err))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.retrieval.semantic_k, 10);
        assert!((config.retrieval.filter_bonus - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.generation.base_url, "http://localhost:11434");
        assert_eq!(config.generation.timeout(), Duration::from_secs(30));
        assert!((config.evaluation.fuzzy_threshold - 0.80).abs() < f64::EPSILON);
        assert_eq!(
            config.evaluation.report_path,
            PathBuf::from("evaluation_report.json")
        );
        assert!(config.logging.dir.is_none());
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[retrieval]\nfilter_bonus = 0.5\n").unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert!((config.retrieval.filter_bonus - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.retrieval.semantic_k, 10);
        assert_eq!(config.generation.model, "llama3.1:8b");
    }

    #[test]
    fn missing_file_yields_defaults() {
        let config = AppConfig::load(Some(Path::new("/nonexistent/cinerag.toml"))).unwrap();
        assert_eq!(config.retrieval.max_results, 10);
    }

    #[test]
    fn malformed_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "retrieval = \"not a table\"").unwrap();

        let err = AppConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, AgentError::BadRequest(_)));
    }
}
